use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and whether knowledge-base retrieval is available.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "careerguide-api",
        "knowledge_base": if state.orchestrator.retrieval_enabled() { "ready" } else { "unavailable" }
    }))
}
