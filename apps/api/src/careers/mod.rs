//! Career Matcher: static placeholder careers scored against the user's
//! skills and competency ratings.
//!
//! The catalogue is fixed; only the arithmetic depends on the user. When any
//! competency is rated, the competency percentage is blended 50/50 with the
//! career's base score.

use serde::Serialize;

use crate::profile::CompetencyRating;

struct CareerTemplate {
    title: &'static str,
    description: &'static str,
    base_score: u32,
    required_skills: &'static [&'static str],
    skill_gaps: &'static [&'static str],
    /// (competency, required level)
    competencies: &'static [(&'static str, u8)],
}

const CAREERS: &[CareerTemplate] = &[
    CareerTemplate {
        title: "Software Developer (ANZSCO: 261312)",
        description: "Designs, develops, and maintains software applications and systems.",
        base_score: 85,
        required_skills: &["Python", "JavaScript", "Problem Solving"],
        skill_gaps: &["DevOps", "Cloud Computing"],
        competencies: &[
            ("Digital Literacy", 5),
            ("Problem Solving", 5),
            ("Learning", 4),
            ("Communication", 3),
            ("Teamwork", 3),
        ],
    },
    CareerTemplate {
        title: "Data Analyst (ANZSCO: 224711)",
        description: "Analyzes data to provide business insights and support decision-making.",
        base_score: 78,
        required_skills: &["SQL", "Data Analysis", "Communication"],
        skill_gaps: &["Statistical Modeling", "Tableau"],
        competencies: &[
            ("Digital Literacy", 5),
            ("Numeracy", 5),
            ("Problem Solving", 4),
            ("Communication", 3),
            ("Initiative and Innovation", 3),
        ],
    },
    CareerTemplate {
        title: "Project Manager (ANZSCO: 511112)",
        description: "Plans, organizes, and oversees the completion of projects.",
        base_score: 72,
        required_skills: &["Project Management", "Leadership", "Communication"],
        skill_gaps: &["Risk Management", "Agile Methodologies"],
        competencies: &[
            ("Communication", 5),
            ("Planning and Organisation", 5),
            ("Teamwork", 4),
            ("Problem Solving", 3),
            ("Initiative and Innovation", 3),
        ],
    },
    CareerTemplate {
        title: "UX Designer (ANZSCO: 232414)",
        description: "Designs user experiences for digital products and services.",
        base_score: 65,
        required_skills: &["UI Design", "User Research", "Problem Solving"],
        skill_gaps: &["Prototyping", "User Testing", "Information Architecture"],
        competencies: &[
            ("Digital Literacy", 4),
            ("Communication", 4),
            ("Problem Solving", 4),
            ("Initiative and Innovation", 5),
            ("Teamwork", 3),
        ],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerMatch {
    pub title: String,
    pub description: String,
    pub match_score: u32,
    pub required_skills: Vec<String>,
    /// Catalogue gaps plus required skills the user does not hold.
    pub skill_gaps: Vec<String>,
    /// Share of required skills the user holds, in percent.
    pub skill_match: u32,
    /// Present only when at least one competency is rated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competency_match: Option<u32>,
    pub key_competencies: Vec<String>,
}

/// Percentage of `job_skills` present in `user_skills`, case-insensitive.
pub fn calculate_skill_match(user_skills: &[String], job_skills: &[&str]) -> u32 {
    if job_skills.is_empty() {
        return 0;
    }
    let held = job_skills
        .iter()
        .filter(|job| holds_skill(user_skills, job))
        .count();
    ((held as f64 / job_skills.len() as f64) * 100.0).round() as u32
}

/// Required skills the user does not hold, in catalogue order.
pub fn identify_skill_gaps(user_skills: &[String], job_skills: &[&str]) -> Vec<String> {
    job_skills
        .iter()
        .filter(|job| !holds_skill(user_skills, job))
        .map(|job| job.to_string())
        .collect()
}

fn holds_skill(user_skills: &[String], skill: &str) -> bool {
    user_skills
        .iter()
        .any(|s| s.trim().eq_ignore_ascii_case(skill))
}

/// Competency fit in percent: each required level is met up to the user's
/// rating. `None` when nothing relevant is rated.
fn competency_match(required: &[(&str, u8)], ratings: &[CompetencyRating]) -> Option<u32> {
    let total: u32 = required.iter().map(|(_, level)| u32::from(*level)).sum();
    if total == 0 || !ratings.iter().any(CompetencyRating::is_rated) {
        return None;
    }
    let met: u32 = required
        .iter()
        .map(|(name, level)| {
            let user = ratings
                .iter()
                .find(|r| r.name == *name && r.is_rated())
                .map_or(0, |r| r.rating);
            u32::from(user.min(*level))
        })
        .sum();
    Some(((met as f64 / total as f64) * 100.0) as u32)
}

/// Scores every catalogue career for the user, best first.
pub fn match_careers(skills: &[String], ratings: &[CompetencyRating]) -> Vec<CareerMatch> {
    let mut matches: Vec<CareerMatch> = CAREERS
        .iter()
        .map(|career| {
            let competency = competency_match(career.competencies, ratings);
            let match_score = match competency {
                Some(pct) => (career.base_score + pct) / 2,
                None => career.base_score,
            };

            let mut skill_gaps: Vec<String> =
                career.skill_gaps.iter().map(|s| s.to_string()).collect();
            for missing in identify_skill_gaps(skills, career.required_skills) {
                if !skill_gaps.contains(&missing) {
                    skill_gaps.push(missing);
                }
            }

            CareerMatch {
                title: career.title.to_string(),
                description: career.description.to_string(),
                match_score,
                required_skills: career.required_skills.iter().map(|s| s.to_string()).collect(),
                skill_gaps,
                skill_match: calculate_skill_match(skills, career.required_skills),
                competency_match: competency,
                key_competencies: career
                    .competencies
                    .iter()
                    .map(|(name, _)| name.to_string())
                    .collect(),
            }
        })
        .collect();

    // Stable sort keeps catalogue order between equal scores.
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn rating(name: &str, value: u8) -> CompetencyRating {
        CompetencyRating::new(name, value).unwrap()
    }

    #[test]
    fn test_skill_match_is_case_insensitive() {
        let user = skills(&["python", "problem solving"]);
        assert_eq!(
            calculate_skill_match(&user, &["Python", "JavaScript", "Problem Solving"]),
            67
        );
        assert_eq!(calculate_skill_match(&user, &[]), 0);
    }

    #[test]
    fn test_without_ratings_base_scores_are_kept() {
        let matches = match_careers(&[], &[]);
        let scores: Vec<u32> = matches.iter().map(|m| m.match_score).collect();
        assert_eq!(scores, vec![85, 78, 72, 65]);
        assert!(matches.iter().all(|m| m.competency_match.is_none()));
    }

    #[test]
    fn test_zero_ratings_are_treated_as_unrated() {
        let ratings = vec![rating("Numeracy", 0), rating("Teamwork", 0)];
        let matches = match_careers(&[], &ratings);
        assert_eq!(matches[0].match_score, 85);
    }

    #[test]
    fn test_competencies_blend_and_resort() {
        // Strong communicator and planner, nothing else rated.
        let ratings = vec![
            rating("Communication", 5),
            rating("Planning and Organisation", 5),
            rating("Teamwork", 4),
        ];
        let matches = match_careers(&[], &ratings);

        let pm = matches
            .iter()
            .find(|m| m.title.starts_with("Project Manager"))
            .unwrap();
        // 14 of 20 required levels met -> 70%, blended with 72.
        assert_eq!(pm.competency_match, Some(70));
        assert_eq!(pm.match_score, 71);

        let sorted: Vec<u32> = matches.iter().map(|m| m.match_score).collect();
        let mut expected = sorted.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(sorted, expected);
        assert_eq!(matches[0].title, pm.title);
    }

    #[test]
    fn test_ratings_above_requirement_are_capped() {
        let ratings = vec![rating("Teamwork", 5)];
        let matches = match_careers(&[], &ratings);
        let dev = matches
            .iter()
            .find(|m| m.title.starts_with("Software Developer"))
            .unwrap();
        // Teamwork requires 3 of a 20 total.
        assert_eq!(dev.competency_match, Some(15));
    }

    #[test]
    fn test_missing_required_skills_are_added_to_gaps() {
        let matches = match_careers(&skills(&["sql"]), &[]);
        let analyst = matches
            .iter()
            .find(|m| m.title.starts_with("Data Analyst"))
            .unwrap();
        assert_eq!(
            analyst.skill_gaps,
            vec!["Statistical Modeling", "Tableau", "Data Analysis", "Communication"]
        );
        assert_eq!(analyst.skill_match, 33);
    }
}
