//! Keyword spotting of well-known skills in free-text chat messages.
//! No hosted call; runs on every chat turn.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::SkillList;

/// Skill families and their member keywords.
const SKILL_FAMILIES: &[(&str, &[&str])] = &[
    (
        "Programming Languages",
        &[
            "Python", "JavaScript", "Java", "C++", "C#", "PHP", "Ruby", "Swift", "TypeScript",
            "Golang", "Kotlin", "Rust",
        ],
    ),
    (
        "Web Development",
        &[
            "HTML", "CSS", "React", "Angular", "Vue.js", "Node.js", "Django", "Flask", "Laravel",
            "Express.js",
        ],
    ),
    (
        "Data Technologies",
        &[
            "SQL", "NoSQL", "MongoDB", "PostgreSQL", "MySQL", "Oracle", "Database",
            "Data Analysis", "Data Science", "Data Mining", "Big Data", "Tableau", "Power BI",
            "Excel",
        ],
    ),
    (
        "Cloud & DevOps",
        &[
            "AWS", "Amazon Web Services", "Azure", "Google Cloud", "GCP", "Cloud Computing",
            "Docker", "Kubernetes", "DevOps", "CI/CD",
        ],
    ),
    (
        "AI & Machine Learning",
        &[
            "Machine Learning", "Deep Learning", "AI", "Artificial Intelligence",
            "Neural Networks", "TensorFlow", "PyTorch", "NLP", "Computer Vision",
        ],
    ),
    (
        "Communication Skills",
        &[
            "Communication", "Public Speaking", "Presentation", "Technical Writing",
            "Documentation",
        ],
    ),
    (
        "Leadership & Management",
        &[
            "Leadership", "Team Management", "Project Management", "Agile", "Scrum", "Kanban",
            "JIRA",
        ],
    ),
    (
        "Problem Solving",
        &["Problem Solving", "Critical Thinking", "Troubleshooting", "Debugging"],
    ),
    (
        "Business Skills",
        &[
            "Marketing", "Sales", "Business Development", "Strategy", "Finance", "Accounting",
            "Human Resources", "Customer Service",
        ],
    ),
];

static SKILL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let mut keywords: Vec<&str> = SKILL_FAMILIES
        .iter()
        .flat_map(|(_, members)| members.iter().copied())
        .collect();
    // Longest first so "Data Science" wins over "Data" style prefixes and
    // "JavaScript" over "Java".
    keywords.sort_by_key(|k| std::cmp::Reverse(k.len()));
    let alternation = keywords
        .iter()
        .map(|k| keyword_pattern(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alternation})")).expect("skill keyword pattern should compile")
});

static RELATED_SKILLS: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| {
        HashMap::from([
            (
                "python",
                &["django", "flask", "data analysis", "machine learning", "ai"][..],
            ),
            (
                "javascript",
                &["html", "css", "react", "angular", "vue.js", "node.js"][..],
            ),
            ("java", &["spring", "hibernate", "android development"][..]),
            ("sql", &["database", "data analysis", "postgresql", "mysql"][..]),
            ("aws", &["cloud computing", "docker", "kubernetes", "devops"][..]),
            (
                "machine learning",
                &["python", "data science", "ai", "tensorflow", "pytorch"][..],
            ),
            ("communication", &["presentation", "writing", "teamwork"][..]),
            (
                "leadership",
                &["management", "project management", "team management"][..],
            ),
            (
                "project management",
                &["agile", "scrum", "leadership", "time management"][..],
            ),
        ])
    });

/// Word boundaries only where the keyword edge is a word character, so
/// "C++" and "C#" still match.
fn keyword_pattern(keyword: &str) -> String {
    let escaped = regex::escape(keyword).replace(' ', r"\s+");
    let starts_word = keyword.chars().next().is_some_and(|c| c.is_alphanumeric());
    let ends_word = keyword.chars().last().is_some_and(|c| c.is_alphanumeric());
    format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        escaped,
        if ends_word { r"\b" } else { "" }
    )
}

/// Skills mentioned in `message`, lowercased, in order of appearance.
pub fn spot_skills(message: &str) -> Vec<String> {
    let found: SkillList = SKILL_PATTERN
        .find_iter(message)
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    found.as_slice().to_vec()
}

/// Skills commonly learned alongside `skill`.
pub fn related_skills(skill: &str) -> &'static [&'static str] {
    RELATED_SKILLS
        .get(skill.trim().to_lowercase().as_str())
        .copied()
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spots_skills_in_order_of_appearance() {
        let skills = spot_skills("I know SQL, a bit of Python and some project management");
        assert_eq!(skills, vec!["sql", "python", "project management"]);
    }

    #[test]
    fn test_prefers_longer_keyword() {
        assert_eq!(spot_skills("Mostly JavaScript"), vec!["javascript"]);
        assert_eq!(spot_skills("data science work"), vec!["data science"]);
    }

    #[test]
    fn test_symbol_suffixed_languages() {
        assert_eq!(spot_skills("C++ and C# daily"), vec!["c++", "c#"]);
    }

    #[test]
    fn test_repeated_mentions_are_reported_once() {
        assert_eq!(spot_skills("python, Python, PYTHON"), vec!["python"]);
    }

    #[test]
    fn test_whole_words_only() {
        assert!(spot_skills("I said the salesman was javanese").is_empty());
    }

    #[test]
    fn test_related_skills_lookup() {
        assert!(related_skills("SQL").contains(&"postgresql"));
        assert!(related_skills("underwater basket weaving").is_empty());
    }
}
