// Skill pipeline: extraction from masked resume text, four-bucket
// categorization, and keyword spotting in chat messages.
// Hosted calls go through llm_client::CompletionClient only.

pub mod categorizer;
pub mod extractor;
pub mod parse;
pub mod prompts;
pub mod spotting;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use categorizer::{categorize, CategorizedSkills};
pub use extractor::extract_skills;

/// The four fixed skill buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    #[serde(rename = "Technical Skills")]
    Technical,
    #[serde(rename = "Soft Skills")]
    Soft,
    #[serde(rename = "Business Skills")]
    Business,
    #[serde(rename = "Other Skills")]
    Other,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 4] = [
        SkillCategory::Technical,
        SkillCategory::Soft,
        SkillCategory::Business,
        SkillCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SkillCategory::Technical => "Technical Skills",
            SkillCategory::Soft => "Soft Skills",
            SkillCategory::Business => "Business Skills",
            SkillCategory::Other => "Other Skills",
        }
    }
}

/// Why a pipeline step fell back to a default result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DegradeReason {
    #[error("No OpenAI API key is configured for this session")]
    CredentialMissing,

    #[error("Skill extraction failed: {0}")]
    SkillExtractionFailed(String),

    #[error("Skill categorization failed: {0}")]
    CategorizationFailed(String),
}

/// Fail-open result of a pipeline step.
///
/// `Degraded` still carries a usable value, so callers can keep going, but the
/// reason stays visible and a legitimately empty result is never confused with
/// a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Degraded { fallback: T, reason: DegradeReason },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Outcome::Complete(v) => v,
            Outcome::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Complete(v) => v,
            Outcome::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn reason(&self) -> Option<&DegradeReason> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }
}

/// Canonical skill form: trimmed and lowercased. Blank input yields `None`.
pub fn normalize_skill(raw: &str) -> Option<String> {
    let skill = raw.trim().to_lowercase();
    (!skill.is_empty()).then_some(skill)
}

/// Ordered skill list with exact-match uniqueness.
///
/// Near-duplicates ("js" vs "javascript") are kept as distinct skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillList(Vec<String>);

impl SkillList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the normalized skill unless already present. Returns whether it was added.
    pub fn push_unique(&mut self, raw: &str) -> bool {
        match normalize_skill(raw) {
            Some(skill) if !self.0.contains(&skill) => {
                self.0.push(skill);
                true
            }
            _ => false,
        }
    }

    /// Appends each skill in order; returns how many were new.
    pub fn extend_unique<'a, I>(&mut self, skills: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        skills
            .into_iter()
            .filter(|s| self.push_unique(s))
            .count()
    }

    pub fn contains(&self, skill: &str) -> bool {
        normalize_skill(skill).is_some_and(|s| self.0.contains(&s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl FromIterator<String> for SkillList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut list = SkillList::new();
        for skill in iter {
            list.push_unique(&skill);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_existing_skill_never_grows_list() {
        let mut list: SkillList = ["python", "sql"].iter().map(|s| s.to_string()).collect();
        for repeat in ["python", "sql", "python"] {
            let before = list.len();
            assert!(!list.push_unique(repeat));
            assert_eq!(list.len(), before);
        }
    }

    #[test]
    fn test_push_normalizes_before_checking() {
        let mut list = SkillList::new();
        assert!(list.push_unique("  Python "));
        assert!(!list.push_unique("PYTHON"));
        assert_eq!(list.as_slice(), ["python"]);
    }

    #[test]
    fn test_blank_skills_are_ignored() {
        let mut list = SkillList::new();
        assert!(!list.push_unique("   "));
        assert!(list.is_empty());
    }

    #[test]
    fn test_near_duplicates_are_not_merged() {
        let mut list = SkillList::new();
        list.push_unique("js");
        list.push_unique("javascript");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_extend_counts_only_new_skills() {
        let mut list: SkillList = vec!["sql".to_string()].into_iter().collect();
        let added = list.extend_unique(&["sql".to_string(), "excel".to_string()]);
        assert_eq!(added, 1);
        assert_eq!(list.as_slice(), ["sql", "excel"]);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok: Outcome<Vec<String>> = Outcome::Complete(vec![]);
        assert!(!ok.is_degraded());
        let degraded = Outcome::Degraded {
            fallback: vec!["x".to_string()],
            reason: DegradeReason::CredentialMissing,
        };
        assert_eq!(degraded.reason(), Some(&DegradeReason::CredentialMissing));
        assert_eq!(degraded.into_value(), vec!["x".to_string()]);
    }

    #[test]
    fn test_category_labels_serialize_as_display_names() {
        let json = serde_json::to_string(&SkillCategory::Business).unwrap();
        assert_eq!(json, "\"Business Skills\"");
    }
}
