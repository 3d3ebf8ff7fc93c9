use crate::profile::CompetencyRating;

/// Snapshot of what the agents may know about the user, taken when the
/// message arrives and rendered as text for the `get_user_profile` tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub chat_skills: Vec<String>,
    pub resume_skills: Vec<String>,
    pub competencies: Vec<CompetencyRating>,
}

impl UserProfile {
    pub fn all_skills(&self) -> Vec<String> {
        let mut all = self.chat_skills.clone();
        for skill in &self.resume_skills {
            if !all.contains(skill) {
                all.push(skill.clone());
            }
        }
        all
    }

    pub fn render(&self) -> String {
        let rated: Vec<&CompetencyRating> =
            self.competencies.iter().filter(|r| r.is_rated()).collect();
        if self.chat_skills.is_empty() && self.resume_skills.is_empty() && rated.is_empty() {
            return "The user has not shared any skills or competency ratings yet.".to_string();
        }

        let mut out = String::new();
        out.push_str(&format!("Skills mentioned in chat: {}\n", list_or_none(&self.chat_skills)));
        out.push_str(&format!("Skills from resume: {}\n", list_or_none(&self.resume_skills)));
        out.push_str(&format!("All skills: {}\n", list_or_none(&self.all_skills())));
        if rated.is_empty() {
            out.push_str("Core competency ratings: none yet\n");
        } else {
            out.push_str("Core competency ratings (1-5):\n");
            for rating in rated {
                out.push_str(&format!("- {}: {}\n", rating.name, rating.rating));
            }
        }
        out
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_says_so() {
        assert!(UserProfile::default().render().contains("not shared any skills"));
    }

    #[test]
    fn test_render_lists_sources_and_rated_competencies() {
        let profile = UserProfile {
            chat_skills: vec!["python".to_string()],
            resume_skills: vec!["python".to_string(), "sql".to_string()],
            competencies: vec![
                CompetencyRating::new("Numeracy", 4).unwrap(),
                CompetencyRating::new("Writing", 0).unwrap(),
            ],
        };
        let text = profile.render();
        assert!(text.contains("Skills mentioned in chat: python\n"));
        assert!(text.contains("All skills: python, sql\n"));
        assert!(text.contains("- Numeracy: 4"));
        assert!(!text.contains("Writing"));
    }
}
