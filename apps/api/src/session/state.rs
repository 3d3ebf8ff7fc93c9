use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::UserProfile;
use crate::profile::CompetencyRating;
use crate::skills::{normalize_skill, SkillList};

pub const WELCOME_MESSAGE: &str = "Hi there! Welcome to chatAussieGPT. Tell me about your skills \
and interests, or upload your resume to get personalized career recommendations.";

/// Skills named in the resume follow-up message before it says "and N more".
const RESUME_SUMMARY_SKILLS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    #[default]
    Initial,
    SkillsCollected,
    RecommendationsProvided,
}

/// Server-side state of one browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
    /// Skills spotted in chat messages.
    #[serde(default)]
    pub chat_skills: SkillList,
    /// Skills extracted from uploaded resumes.
    #[serde(default)]
    pub resume_skills: SkillList,
    /// Normalized text of the latest resume. Unmasked; never leaves the server.
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub ratings: Vec<CompetencyRating>,
    /// Per-session API key; overrides the server default.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub stage: ConversationStage,
}

impl SessionState {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            messages: vec![ChatMessage {
                role: Role::Assistant,
                content: WELCOME_MESSAGE.to_string(),
            }],
            chat_skills: SkillList::new(),
            resume_skills: SkillList::new(),
            resume_text: None,
            ratings: Vec::new(),
            api_key: None,
            stage: ConversationStage::Initial,
        }
    }

    pub fn push_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    /// Chat skills first, then resume skills not already listed.
    pub fn all_skills(&self) -> Vec<String> {
        let mut all = self.chat_skills.clone();
        all.extend_unique(self.resume_skills.iter());
        all.as_slice().to_vec()
    }

    /// Returns the skills that were not known from any source before.
    pub fn record_chat_skills(&mut self, skills: &[String]) -> Vec<String> {
        let known = self.all_skills();
        let mut fresh = Vec::new();
        for skill in skills {
            if !self.chat_skills.push_unique(skill) {
                continue;
            }
            if let Some(skill) = normalize_skill(skill) {
                if !known.contains(&skill) {
                    fresh.push(skill);
                }
            }
        }
        self.note_skills();
        fresh
    }

    /// Returns how many of `skills` were new to the session.
    pub fn record_resume_skills(&mut self, skills: &[String]) -> usize {
        let known = self.all_skills();
        self.resume_skills.extend_unique(skills.iter());
        self.note_skills();
        self.all_skills().len() - known.len()
    }

    /// Upserts ratings by competency name.
    pub fn apply_ratings(&mut self, ratings: &[CompetencyRating]) {
        for rating in ratings {
            match self.ratings.iter_mut().find(|r| r.name == rating.name) {
                Some(existing) => existing.rating = rating.rating,
                None => self.ratings.push(rating.clone()),
            }
        }
    }

    pub fn note_recommendations(&mut self) {
        self.stage = ConversationStage::RecommendationsProvided;
    }

    fn note_skills(&mut self) {
        if self.stage == ConversationStage::Initial && !self.all_skills().is_empty() {
            self.stage = ConversationStage::SkillsCollected;
        }
    }

    /// Follow-up posted after the first resume upload of a fresh conversation.
    pub fn resume_follow_up(&self, extracted: &[String]) -> Option<String> {
        if self.messages.len() > 2 || extracted.is_empty() {
            return None;
        }
        let shown = extracted
            .iter()
            .take(RESUME_SUMMARY_SKILLS)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let mut message = format!("Based on your resume, I can see you have skills in: {shown}");
        if extracted.len() > RESUME_SUMMARY_SKILLS {
            message.push_str(&format!(
                " and {} more.",
                extracted.len() - RESUME_SUMMARY_SKILLS
            ));
        }
        message.push_str("\n\nWhat kind of career are you interested in exploring?");
        Some(message)
    }

    pub fn prompt_suggestions(&self) -> Vec<&'static str> {
        let mut suggestions = vec![
            "What careers match my skills?",
            "What skills should I develop?",
            "What are the top tech careers?",
        ];
        match self.stage {
            ConversationStage::Initial => {}
            ConversationStage::SkillsCollected => {
                suggestions.push("What industry is growing fastest?")
            }
            ConversationStage::RecommendationsProvided => {
                suggestions.push("What education do I need for this career?")
            }
        }
        suggestions
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            chat_skills: self.chat_skills.as_slice().to_vec(),
            resume_skills: self.resume_skills.as_slice().to_vec(),
            competencies: self.ratings.clone(),
        }
    }

    /// Client-facing view. The API key and resume text are left out.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            user_id: self.user_id,
            created_at: self.created_at,
            messages: self.messages.clone(),
            skills: self.all_skills(),
            chat_skills: self.chat_skills.as_slice().to_vec(),
            resume_skills: self.resume_skills.as_slice().to_vec(),
            has_resume: self.resume_text.is_some(),
            ratings: self.ratings.clone(),
            has_session_credential: self.api_key.is_some(),
            stage: self.stage,
            suggestions: self.prompt_suggestions(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
    pub skills: Vec<String>,
    pub chat_skills: Vec<String>,
    pub resume_skills: Vec<String>,
    pub has_resume: bool,
    pub ratings: Vec<CompetencyRating>,
    pub has_session_credential: bool,
    pub stage: ConversationStage,
    pub suggestions: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_session_starts_with_welcome() {
        let state = SessionState::new(Uuid::new_v4());
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::Assistant);
        assert_eq!(state.stage, ConversationStage::Initial);
        assert_eq!(state.prompt_suggestions().len(), 3);
    }

    #[test]
    fn test_skills_merge_across_sources_and_advance_stage() {
        let mut state = SessionState::new(Uuid::new_v4());
        let fresh = state.record_chat_skills(&strings(&["python"]));
        assert_eq!(fresh, vec!["python"]);
        assert_eq!(state.stage, ConversationStage::SkillsCollected);

        let added = state.record_resume_skills(&strings(&["python", "sql"]));
        assert_eq!(added, 1);
        assert_eq!(state.all_skills(), vec!["python", "sql"]);

        let fresh = state.record_chat_skills(&strings(&["sql"]));
        assert!(fresh.is_empty());
        assert_eq!(state.all_skills(), vec!["python", "sql"]);
        assert!(state
            .prompt_suggestions()
            .contains(&"What industry is growing fastest?"));
    }

    #[test]
    fn test_ratings_are_upserted() {
        let mut state = SessionState::new(Uuid::new_v4());
        state.apply_ratings(&[CompetencyRating::new("Teamwork", 2).unwrap()]);
        state.apply_ratings(&[CompetencyRating::new("Teamwork", 4).unwrap()]);
        assert_eq!(state.ratings, vec![CompetencyRating::new("Teamwork", 4).unwrap()]);
    }

    #[test]
    fn test_resume_follow_up_only_early_in_conversation() {
        let mut state = SessionState::new(Uuid::new_v4());
        let skills = strings(&["a", "b", "c", "d", "e", "f", "g"]);
        let message = state.resume_follow_up(&skills).unwrap();
        assert!(message.starts_with("Based on your resume, I can see you have skills in: a, b, c, d, e and 2 more."));

        state.push_message(Role::User, "hi");
        state.push_message(Role::Assistant, "hello");
        assert!(state.resume_follow_up(&skills).is_none());
    }

    #[test]
    fn test_snapshot_hides_secrets() {
        let mut state = SessionState::new(Uuid::new_v4());
        state.api_key = Some("sk-secret".to_string());
        state.resume_text = Some("Jane Citizen, 12 Smith St".to_string());
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(!json.contains("Smith St"));
        assert!(json.contains("\"has_session_credential\":true"));
    }

    #[test]
    fn test_state_survives_serialization() {
        let mut state = SessionState::new(Uuid::new_v4());
        state.record_chat_skills(&strings(&["rust"]));
        let restored: SessionState =
            serde_json::from_str(&serde_json::to_string(&state).unwrap()).unwrap();
        assert_eq!(restored.all_skills(), vec!["rust"]);
        assert_eq!(restored.stage, ConversationStage::SkillsCollected);
    }
}
