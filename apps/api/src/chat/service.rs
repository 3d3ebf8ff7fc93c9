//! Request-level operations behind the session endpoints.
//!
//! Each operation loads the session, runs its pipeline, and saves the session
//! back. Hosted-service and row-store problems degrade to warnings in the
//! response; only a missing session, bad input, a busy agent run or an
//! unreachable session store become error statuses.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::Warning;
use crate::agents::{OrchestratorError, PersonaId};
use crate::careers::{match_careers, CareerMatch};
use crate::documents::{extract_text, DocumentKind, ExtractError, RawDocument};
use crate::errors::AppError;
use crate::profile::CompetencyRating;
use crate::session::{Role, SessionContext, SessionSnapshot, SessionState};
use crate::skills::spotting::{related_skills, spot_skills};
use crate::skills::{categorize, extract_skills, CategorizedSkills, Outcome, SkillList};
use crate::state::AppState;
use crate::visualization::{render_skill_map, SkillMap};

pub const CREDENTIAL_PROMPT: &str =
    "Please provide an OpenAI API key in the sidebar to use advanced features.";

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionSnapshot,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    pub reply: String,
    /// Persona that answered; absent when no agent ran.
    pub answered_by: Option<&'static str>,
    /// Skills spotted in this message that the session did not know yet.
    pub new_skills: Vec<String>,
    pub suggestions: Vec<&'static str>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub extracted_skills: Vec<String>,
    pub added: usize,
    pub skills: Vec<String>,
    /// Assistant message appended to the conversation, if any.
    pub message: Option<String>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
    pub chat_skills: Vec<String>,
    pub resume_skills: Vec<String>,
    /// Related skills worth developing that the user does not list yet.
    pub suggested: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SkillMapResponse {
    #[serde(flatten)]
    pub map: SkillMap,
    pub categories: CategorizedSkills,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Deserialize)]
pub struct RatingInput {
    pub name: String,
    pub rating: u8,
}

#[derive(Debug, Serialize)]
pub struct CompetenciesResponse {
    pub ratings: Vec<CompetencyRating>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize)]
pub struct CareersResponse {
    pub careers: Vec<CareerMatch>,
}

/// Starts a session and restores the user's saved skills and ratings.
pub async fn create_session(state: &AppState, user_id: Uuid) -> Result<SessionResponse, AppError> {
    let mut session = SessionState::new(user_id);
    let mut warnings = Vec::new();

    match state.profiles.load_skills(user_id).await {
        Ok(saved) => {
            session.record_resume_skills(&saved);
        }
        Err(e) => {
            warn!("Could not load saved skills for user {user_id}: {e}");
            warnings.push(Warning::from(&e));
        }
    }
    match state.profiles.load_ratings(user_id).await {
        Ok(saved) => session.apply_ratings(&saved),
        Err(e) => {
            warn!("Could not load saved ratings for user {user_id}: {e}");
            warnings.push(Warning::from(&e));
        }
    }

    state.sessions.save(&session).await?;
    info!("Created session {} for user {user_id}", session.id);
    Ok(SessionResponse {
        session: session.snapshot(),
        warnings,
    })
}

pub async fn get_session(state: &AppState, id: Uuid) -> Result<SessionSnapshot, AppError> {
    Ok(state.sessions.load(id).await?.snapshot())
}

/// Reloads the session, applies `change`, and saves it back.
///
/// Slow hosted calls run against an earlier copy; only this short
/// load-apply-save step touches the stored state, so writes from
/// overlapping requests on the same session are kept.
async fn update_session<T>(
    state: &AppState,
    id: Uuid,
    change: impl FnOnce(&mut SessionState) -> T,
) -> Result<(SessionState, T), AppError> {
    let mut session = state.sessions.load(id).await?;
    let out = change(&mut session);
    state.sessions.save(&session).await?;
    Ok((session, out))
}

/// Sets or clears the session's own API key. A blank key clears it.
pub async fn set_credential(
    state: &AppState,
    id: Uuid,
    api_key: Option<String>,
) -> Result<SessionSnapshot, AppError> {
    let api_key = api_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let (session, ()) = update_session(state, id, |session| session.api_key = api_key).await?;
    info!(
        "Session {id} credential {}",
        if session.api_key.is_some() { "set" } else { "cleared" }
    );
    Ok(session.snapshot())
}

/// One chat turn: spot skills, run the agent team, record both sides.
pub async fn chat_turn(state: &AppState, id: Uuid, message: &str) -> Result<ChatTurnResponse, AppError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message must not be empty".to_string()));
    }

    let spotted = spot_skills(message);
    let mut draft = state.sessions.load(id).await?;
    draft.record_chat_skills(&spotted);
    let mut warnings = Vec::new();

    let ctx = SessionContext::resolve(&draft, state.config.openai_api_key.as_deref());
    let (reply, answered_by) = match ctx.agent(state.clients.as_ref()) {
        Err(reason) => {
            warnings.push(Warning::from(&reason));
            (CREDENTIAL_PROMPT.to_string(), None)
        }
        Ok(transport) => {
            match state
                .orchestrator
                .reply(transport, ctx.session_id, message.to_string(), draft.profile())
                .await
            {
                Ok(reply) => (reply.text, Some(reply.answered_by)),
                Err(OrchestratorError::Busy(_)) => {
                    return Err(AppError::Conflict(
                        "A reply to your previous message is still being prepared".to_string(),
                    ))
                }
                Err(OrchestratorError::Agent(e)) => {
                    warn!("Agent run failed for session {id} (user {}): {e}", ctx.user_id);
                    (e.remediation(), None)
                }
            }
        }
    };

    let (session, new_skills) = update_session(state, id, |session| {
        session.push_message(Role::User, message);
        let new_skills = session.record_chat_skills(&spotted);
        if answered_by == Some(PersonaId::CareerRecommendations) {
            session.note_recommendations();
        }
        session.push_message(Role::Assistant, reply.clone());
        new_skills
    })
    .await?;

    Ok(ChatTurnResponse {
        reply,
        answered_by: answered_by.map(|persona| persona.persona().name),
        new_skills,
        suggestions: session.prompt_suggestions(),
        warnings,
    })
}

/// Resume pipeline: extract, mask, extract skills, merge, persist.
///
/// The raw text stays in the session; only the masked text reaches the
/// hosted model.
pub async fn upload_resume(
    state: &AppState,
    id: Uuid,
    doc: RawDocument,
) -> Result<ResumeUploadResponse, AppError> {
    DocumentKind::from_mime(&doc.mime)?;
    let draft = state.sessions.load(id).await?;
    let mut warnings = Vec::new();

    let text = match extract_text(&doc).await {
        Ok(text) => Some(text),
        Err(e @ ExtractError::ExtractionFailed(_)) => {
            warn!("ExtractionFailed for session {id}: {e}");
            warnings.push(Warning::from(&e));
            None
        }
        Err(e) => return Err(e.into()),
    };

    let mut extracted = Vec::new();
    if let Some(text) = &text {
        let ctx = SessionContext::resolve(&draft, state.config.openai_api_key.as_deref());
        let outcome = match ctx.completion(state.clients.as_ref()) {
            Ok(client) => {
                let masked = state.masker.mask(text);
                extract_skills(client.as_ref(), &masked).await
            }
            Err(reason) => Outcome::Degraded {
                fallback: Vec::new(),
                reason,
            },
        };
        if let Some(reason) = outcome.reason() {
            warnings.push(Warning::from(reason));
        }
        extracted = outcome.into_value();
    }

    if !extracted.is_empty() {
        if let Err(e) = state.profiles.save_skills(draft.user_id, &extracted).await {
            warn!("PersistenceFailed saving skills for user {}: {e}", draft.user_id);
            warnings.push(Warning::from(&e));
        }
    }

    let (session, (added, message)) = update_session(state, id, |session| {
        if text.is_some() {
            session.resume_text = text;
        }
        let added = session.record_resume_skills(&extracted);
        let message = session.resume_follow_up(&extracted);
        if let Some(follow_up) = &message {
            session.push_message(Role::Assistant, follow_up.clone());
        }
        (added, message)
    })
    .await?;
    info!(
        "Resume processed for session {id}: {} skill(s) extracted, {added} new",
        extracted.len()
    );

    Ok(ResumeUploadResponse {
        extracted_skills: extracted,
        added,
        skills: session.all_skills(),
        message,
        warnings,
    })
}

pub async fn skills(state: &AppState, id: Uuid) -> Result<SkillsResponse, AppError> {
    let session = state.sessions.load(id).await?;
    let skills = session.all_skills();

    let held: SkillList = skills.iter().cloned().collect();
    let mut suggested = SkillList::new();
    for skill in &skills {
        for related in related_skills(skill) {
            if !held.contains(related) {
                suggested.push_unique(related);
            }
        }
    }

    Ok(SkillsResponse {
        skills,
        chat_skills: session.chat_skills.as_slice().to_vec(),
        resume_skills: session.resume_skills.as_slice().to_vec(),
        suggested: suggested.as_slice().to_vec(),
    })
}

/// Categorizes the session's skills and renders them as a skill map.
pub async fn skill_map(state: &AppState, id: Uuid) -> Result<SkillMapResponse, AppError> {
    let session = state.sessions.load(id).await?;
    let skills = session.all_skills();

    let ctx = SessionContext::resolve(&session, state.config.openai_api_key.as_deref());
    let outcome = match ctx.completion(state.clients.as_ref()) {
        Ok(client) => categorize(client.as_ref(), &skills).await,
        Err(_) if skills.is_empty() => Outcome::Complete(CategorizedSkills::default()),
        Err(reason) => Outcome::Degraded {
            fallback: CategorizedSkills::all_other(&skills),
            reason,
        },
    };

    let warnings = outcome.reason().map(Warning::from).into_iter().collect();
    let categories = outcome.into_value();
    Ok(SkillMapResponse {
        map: render_skill_map(&categories),
        categories,
        warnings,
    })
}

pub async fn competencies(state: &AppState, id: Uuid) -> Result<CompetenciesResponse, AppError> {
    let session = state.sessions.load(id).await?;
    Ok(CompetenciesResponse {
        ratings: session.ratings,
        warnings: Vec::new(),
    })
}

/// Validates and stores self-ratings. Any invalid entry rejects the whole batch.
pub async fn save_competencies(
    state: &AppState,
    id: Uuid,
    inputs: &[RatingInput],
) -> Result<CompetenciesResponse, AppError> {
    let ratings = inputs
        .iter()
        .map(|r| CompetencyRating::new(&r.name, r.rating))
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::Validation)?;

    let user_id = state.sessions.load(id).await?.user_id;
    let mut warnings = Vec::new();
    if let Err(e) = state.profiles.save_ratings(user_id, &ratings).await {
        warn!("PersistenceFailed saving ratings for user {user_id}: {e}");
        warnings.push(Warning::from(&e));
    }

    let (session, ()) = update_session(state, id, |session| session.apply_ratings(&ratings)).await?;
    Ok(CompetenciesResponse {
        ratings: session.ratings,
        warnings,
    })
}

pub async fn careers(state: &AppState, id: Uuid) -> Result<CareersResponse, AppError> {
    let (_, careers) = update_session(state, id, |session| {
        session.note_recommendations();
        match_careers(&session.all_skills(), &session.ratings)
    })
    .await?;
    Ok(CareersResponse { careers })
}
