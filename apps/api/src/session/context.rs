use std::sync::Arc;

use reqwest::Client;
use uuid::Uuid;

use super::SessionState;
use crate::agents::{AgentTransport, OpenAiResponses};
use crate::llm_client::{CompletionClient, LlmClient};
use crate::skills::DegradeReason;

/// Builds hosted-service clients bound to one credential.
pub trait HostedClients: Send + Sync {
    fn completion(&self, api_key: &str) -> Arc<dyn CompletionClient>;
    fn agent(&self, api_key: &str) -> Arc<dyn AgentTransport>;
}

/// OpenAI clients sharing one pooled HTTP client.
pub struct OpenAiClients {
    http: Client,
    base_url: String,
    completion_model: String,
}

impl OpenAiClients {
    pub fn new(http: Client, base_url: &str, completion_model: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            completion_model: completion_model.to_string(),
        }
    }
}

impl HostedClients for OpenAiClients {
    fn completion(&self, api_key: &str) -> Arc<dyn CompletionClient> {
        Arc::new(LlmClient::new(
            self.http.clone(),
            api_key.to_string(),
            &self.base_url,
            &self.completion_model,
        ))
    }

    fn agent(&self, api_key: &str) -> Arc<dyn AgentTransport> {
        Arc::new(OpenAiResponses::new(
            self.http.clone(),
            api_key.to_string(),
            &self.base_url,
        ))
    }
}

/// Per-request view of a session: who it belongs to and which credential
/// its hosted calls use. Clients are built from it on demand and dropped
/// with the request, so no credential outlives its session.
#[derive(Clone)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub user_id: Uuid,
    credential: Option<String>,
}

impl SessionContext {
    /// The session's own key wins over the server default.
    pub fn resolve(state: &SessionState, default_key: Option<&str>) -> Self {
        let credential = state
            .api_key
            .clone()
            .or_else(|| default_key.map(str::to_string));
        Self {
            session_id: state.id,
            user_id: state.user_id,
            credential,
        }
    }

    pub fn completion(
        &self,
        clients: &dyn HostedClients,
    ) -> Result<Arc<dyn CompletionClient>, DegradeReason> {
        self.credential
            .as_deref()
            .map(|key| clients.completion(key))
            .ok_or(DegradeReason::CredentialMissing)
    }

    pub fn agent(&self, clients: &dyn HostedClients) -> Result<Arc<dyn AgentTransport>, DegradeReason> {
        self.credential
            .as_deref()
            .map(|key| clients.agent(key))
            .ok_or(DegradeReason::CredentialMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clients() -> OpenAiClients {
        OpenAiClients::new(Client::new(), "http://localhost:1", "gpt-4o-mini")
    }

    #[test]
    fn test_session_key_overrides_default() {
        let mut state = SessionState::new(Uuid::new_v4());
        state.api_key = Some("sk-session".to_string());
        let ctx = SessionContext::resolve(&state, Some("sk-default"));
        assert_eq!(ctx.credential.as_deref(), Some("sk-session"));
        assert_eq!(ctx.session_id, state.id);
    }

    #[test]
    fn test_default_key_is_used_when_session_has_none() {
        let state = SessionState::new(Uuid::new_v4());
        let ctx = SessionContext::resolve(&state, Some("sk-default"));
        assert!(ctx.credential.is_some());
        assert!(ctx.completion(&clients()).is_ok());
    }

    #[test]
    fn test_no_key_anywhere_is_credential_missing() {
        let state = SessionState::new(Uuid::new_v4());
        let ctx = SessionContext::resolve(&state, None);
        assert!(ctx.credential.is_none());
        assert_eq!(ctx.completion(&clients()).err(), Some(DegradeReason::CredentialMissing));
        assert_eq!(ctx.agent(&clients()).err(), Some(DegradeReason::CredentialMissing));
    }
}
