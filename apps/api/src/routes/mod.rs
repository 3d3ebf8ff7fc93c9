pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::chat::handlers;
use crate::state::AppState;

/// Largest accepted request body, sized for resume uploads.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/competencies", get(handlers::handle_list_competencies))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route("/api/v1/sessions/:id", get(handlers::handle_get_session))
        .route(
            "/api/v1/sessions/:id/credential",
            put(handlers::handle_set_credential),
        )
        .route("/api/v1/sessions/:id/messages", post(handlers::handle_chat))
        .route(
            "/api/v1/sessions/:id/resume",
            post(handlers::handle_upload_resume),
        )
        .route("/api/v1/sessions/:id/skills", get(handlers::handle_get_skills))
        .route(
            "/api/v1/sessions/:id/skills/map",
            get(handlers::handle_skill_map),
        )
        .route(
            "/api/v1/sessions/:id/skills/map.svg",
            get(handlers::handle_skill_map_svg),
        )
        .route(
            "/api/v1/sessions/:id/competencies",
            get(handlers::handle_get_competencies).put(handlers::handle_save_competencies),
        )
        .route("/api/v1/sessions/:id/careers", get(handlers::handle_get_careers))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::agents::runtime::tests::ScriptedTransport;
    use crate::profile::repository::memory::MemoryProfileRepository;
    use crate::skills::extractor::tests::ScriptedCompletion;
    use crate::state::testing::{stub_clients, test_state};

    fn app() -> Router {
        let clients = stub_clients(ScriptedCompletion::replying("[]"), ScriptedTransport::new(vec![]));
        build_router(test_state(None, MemoryProfileRepository::default(), clients))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_knowledge_base_status() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["knowledge_base"], "unavailable");
    }

    #[tokio::test]
    async fn test_competency_catalogue_lists_ten() {
        let response = app()
            .oneshot(Request::get("/api/v1/competencies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_session_lifecycle_over_http() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/sessions",
                serde_json::json!({ "user_id": Uuid::new_v4() }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["session"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/messages"),
                serde_json::json!({ "message": "I know SQL" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let turn = json_body(response).await;
        assert_eq!(turn["new_skills"][0], "sql");
        assert_eq!(turn["warnings"][0]["code"], "CREDENTIAL_MISSING");

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/sessions/{id}/skills/map.svg"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let response = app()
            .oneshot(
                Request::get(format!("/api/v1/sessions/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_rating_is_400() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/sessions",
                serde_json::json!({ "user_id": Uuid::new_v4() }),
            ))
            .await
            .unwrap();
        let id = json_body(response).await["session"]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/competencies"),
                serde_json::json!({ "ratings": [{ "name": "Teamwork", "rating": 9 }] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
