//! Skill Categorizer: sorts the accumulated skill list into the four fixed buckets.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::prompts::STRUCTURED_REPLY_SYSTEM;
use crate::llm_client::CompletionClient;
use crate::skills::parse::parse_category_lists;
use crate::skills::prompts::CATEGORIZATION_PROMPT;
use crate::skills::{normalize_skill, DegradeReason, Outcome, SkillCategory};

const CATEGORIZATION_TEMPERATURE: f32 = 0.2;

/// Skills grouped by category. All four keys are always present, which the
/// layout renderer relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedSkills {
    #[serde(rename = "Technical Skills")]
    pub technical: Vec<String>,
    #[serde(rename = "Soft Skills")]
    pub soft: Vec<String>,
    #[serde(rename = "Business Skills")]
    pub business: Vec<String>,
    #[serde(rename = "Other Skills")]
    pub other: Vec<String>,
}

impl CategorizedSkills {
    /// Fallback mapping: every skill under "Other Skills".
    pub fn all_other(skills: &[String]) -> Self {
        Self {
            other: skills.to_vec(),
            ..Self::default()
        }
    }

    pub fn get(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::Technical => &self.technical,
            SkillCategory::Soft => &self.soft,
            SkillCategory::Business => &self.business,
            SkillCategory::Other => &self.other,
        }
    }

    fn get_mut(&mut self, category: SkillCategory) -> &mut Vec<String> {
        match category {
            SkillCategory::Technical => &mut self.technical,
            SkillCategory::Soft => &mut self.soft,
            SkillCategory::Business => &mut self.business,
            SkillCategory::Other => &mut self.other,
        }
    }

    /// Categories in fixed order with their members.
    pub fn iter(&self) -> impl Iterator<Item = (SkillCategory, &[String])> {
        SkillCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn total(&self) -> usize {
        self.iter().map(|(_, skills)| skills.len()).sum()
    }
}

/// Classifies `skills` with the hosted model.
///
/// Each input skill lands in at most one category (the first one the model
/// names it under); skills the model invents are dropped and skills it omits
/// are not added back. An empty input never reaches the hosted model.
pub async fn categorize(client: &dyn CompletionClient, skills: &[String]) -> Outcome<CategorizedSkills> {
    if skills.is_empty() {
        return Outcome::Complete(CategorizedSkills::default());
    }

    let listing = skills
        .iter()
        .map(|s| format!("\"{}\"", s.replace('"', "'")))
        .collect::<Vec<_>>()
        .join(", ");
    let prompt = CATEGORIZATION_PROMPT.replace("{skills}", &format!("[{listing}]"));

    let fallback = |reason: String| {
        warn!("Falling back to 'Other Skills' for {} skill(s): {reason}", skills.len());
        Outcome::Degraded {
            fallback: CategorizedSkills::all_other(skills),
            reason: DegradeReason::CategorizationFailed(reason),
        }
    };

    let reply = match client
        .complete(STRUCTURED_REPLY_SYSTEM, &prompt, CATEGORIZATION_TEMPERATURE)
        .await
    {
        Ok(reply) => reply,
        Err(e) => return fallback(e.to_string()),
    };

    let Some(lists) = parse_category_lists(&reply) else {
        return fallback("the model reply had no recognizable categories".to_string());
    };

    let mut result = CategorizedSkills::default();
    let mut placed: Vec<String> = Vec::new();
    for (category, members) in lists {
        for skill in members.iter().filter_map(|s| normalize_skill(s)) {
            if skills.contains(&skill) && !placed.contains(&skill) {
                placed.push(skill.clone());
                result.get_mut(category).push(skill);
            }
        }
    }

    if result.total() == 0 {
        return fallback("the model did not place any of the given skills".to_string());
    }

    Outcome::Complete(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::extractor::tests::ScriptedCompletion;

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_input_gives_four_empty_buckets_without_call() {
        let stub = ScriptedCompletion::replying("unused");
        let outcome = categorize(&stub, &[]).await;
        assert_eq!(outcome, Outcome::Complete(CategorizedSkills::default()));
        assert_eq!(stub.calls(), 0);
        let json = serde_json::to_value(outcome.value()).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_transport_error_puts_everything_under_other() {
        let input = skills(&["python", "teamwork", "budgeting"]);
        let stub = ScriptedCompletion::failing(500);
        let outcome = categorize(&stub, &input).await;

        assert!(outcome.is_degraded());
        let json = serde_json::to_value(outcome.value()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Technical Skills": [],
                "Soft Skills": [],
                "Business Skills": [],
                "Other Skills": ["python", "teamwork", "budgeting"]
            })
        );
    }

    #[tokio::test]
    async fn test_reply_is_mapped_to_buckets() {
        let input = skills(&["python", "teamwork", "budgeting"]);
        let stub = ScriptedCompletion::replying(
            r#"{"Technical Skills": ["Python"], "Soft Skills": ["teamwork"], "Business Skills": ["budgeting"], "Other Skills": []}"#,
        );
        let outcome = categorize(&stub, &input).await;
        let cats = outcome.value();
        assert!(!outcome.is_degraded());
        assert_eq!(cats.technical, vec!["python"]);
        assert_eq!(cats.soft, vec!["teamwork"]);
        assert_eq!(cats.business, vec!["budgeting"]);
        assert!(cats.other.is_empty());
    }

    #[tokio::test]
    async fn test_invented_and_repeated_skills_are_dropped() {
        let input = skills(&["python", "sql"]);
        let stub = ScriptedCompletion::replying(
            "{'Technical Skills': ['python', 'kubernetes'], 'Other Skills': ['python', 'sql']}",
        );
        let cats = categorize(&stub, &input).await.into_value();
        assert_eq!(cats.technical, vec!["python"]);
        assert_eq!(cats.other, vec!["sql"]);
        assert_eq!(cats.total(), 2);
    }

    #[tokio::test]
    async fn test_unstructured_reply_falls_back() {
        let input = skills(&["python"]);
        let stub = ScriptedCompletion::replying("Python is a technical skill.");
        let outcome = categorize(&stub, &input).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), &CategorizedSkills::all_other(&input));
    }

    #[test]
    fn test_iter_always_yields_four_categories() {
        let cats = CategorizedSkills::all_other(&skills(&["x"]));
        let labels: Vec<_> = cats.iter().map(|(c, _)| c.label()).collect();
        assert_eq!(
            labels,
            vec!["Technical Skills", "Soft Skills", "Business Skills", "Other Skills"]
        );
    }
}
