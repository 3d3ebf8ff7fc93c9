//! Skill Extractor: masked resume text in, lowercase skill list out.

use tracing::{info, warn};

use crate::llm_client::prompts::MASKED_INPUT_NOTE;
use crate::llm_client::CompletionClient;
use crate::skills::parse::parse_quoted_list;
use crate::skills::prompts::{NO_SKILLS_PHRASES, SKILL_EXTRACTION_PROMPT, SKILL_EXTRACTION_SYSTEM};
use crate::skills::{DegradeReason, Outcome, SkillList};

/// Low sampling temperature keeps the list format stable.
const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// Asks the hosted model for the skills listed in `masked_text`.
///
/// Order is first-seen order in the reply. Never fails: transport, credential
/// and format problems come back as `Outcome::Degraded` with an empty list.
pub async fn extract_skills(client: &dyn CompletionClient, masked_text: &str) -> Outcome<Vec<String>> {
    if masked_text.trim().is_empty() {
        return Outcome::Complete(Vec::new());
    }

    let prompt = SKILL_EXTRACTION_PROMPT
        .replace("{masked_note}", MASKED_INPUT_NOTE)
        .replace("{resume_text}", masked_text);

    let reply = match client
        .complete(SKILL_EXTRACTION_SYSTEM, &prompt, EXTRACTION_TEMPERATURE)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Skill extraction call failed: {e}");
            return Outcome::Degraded {
                fallback: Vec::new(),
                reason: DegradeReason::SkillExtractionFailed(e.to_string()),
            };
        }
    };

    if reports_no_skills(&reply) {
        info!("Model reported no skills section in the resume");
        return Outcome::Complete(Vec::new());
    }

    match parse_quoted_list(&reply) {
        Some(items) => {
            let skills: SkillList = items.into_iter().collect();
            info!("Extracted {} skill(s) from resume", skills.len());
            Outcome::Complete(skills.as_slice().to_vec())
        }
        None => {
            warn!("Skill extraction reply contained no list");
            Outcome::Degraded {
                fallback: Vec::new(),
                reason: DegradeReason::SkillExtractionFailed(
                    "the model reply did not contain a skill list".to_string(),
                ),
            }
        }
    }
}

fn reports_no_skills(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    NO_SKILLS_PHRASES.iter().any(|p| lower.contains(p))
}
