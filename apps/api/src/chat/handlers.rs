use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::service::{
    self, CareersResponse, ChatTurnResponse, CompetenciesResponse, RatingInput,
    ResumeUploadResponse, SessionResponse, SkillMapResponse, SkillsResponse,
};
use crate::documents::RawDocument;
use crate::errors::AppError;
use crate::profile::competencies::Competency;
use crate::profile::CORE_COMPETENCIES;
use crate::session::SessionSnapshot;
use crate::state::AppState;

/// Multipart field carrying the resume upload.
const UPLOAD_FIELD: &str = "file";

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CredentialRequest {
    pub api_key: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Deserialize)]
pub struct RatingsRequest {
    pub ratings: Vec<RatingInput>,
}

/// GET /api/v1/competencies
pub async fn handle_list_competencies() -> Json<Vec<Competency>> {
    Json(CORE_COMPETENCIES.to_vec())
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let response = service::create_session(&state, req.user_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(service::get_session(&state, id).await?))
}

/// PUT /api/v1/sessions/:id/credential
pub async fn handle_set_credential(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(service::set_credential(&state, id, req.api_key).await?))
}

/// POST /api/v1/sessions/:id/messages
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatTurnResponse>, AppError> {
    Ok(Json(service::chat_turn(&state, id, &req.message).await?))
}

/// POST /api/v1/sessions/:id/resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let mime = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| AppError::UnsupportedMediaType("missing content type".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        let doc = RawDocument::new(bytes, mime);
        return Ok(Json(service::upload_resume(&state, id, doc).await?));
    }
    Err(AppError::Validation(format!(
        "Expected a multipart field named '{UPLOAD_FIELD}'"
    )))
}

/// GET /api/v1/sessions/:id/skills
pub async fn handle_get_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillsResponse>, AppError> {
    Ok(Json(service::skills(&state, id).await?))
}

/// GET /api/v1/sessions/:id/skills/map
pub async fn handle_skill_map(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillMapResponse>, AppError> {
    Ok(Json(service::skill_map(&state, id).await?))
}

/// GET /api/v1/sessions/:id/skills/map.svg
pub async fn handle_skill_map_svg(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let response = service::skill_map(&state, id).await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], response.map.svg))
}

/// GET /api/v1/sessions/:id/competencies
pub async fn handle_get_competencies(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetenciesResponse>, AppError> {
    Ok(Json(service::competencies(&state, id).await?))
}

/// PUT /api/v1/sessions/:id/competencies
pub async fn handle_save_competencies(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RatingsRequest>,
) -> Result<Json<CompetenciesResponse>, AppError> {
    Ok(Json(service::save_competencies(&state, id, &req.ratings).await?))
}

/// GET /api/v1/sessions/:id/careers
pub async fn handle_get_careers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CareersResponse>, AppError> {
    Ok(Json(service::careers(&state, id).await?))
}
