// Conversation Orchestrator: a triage persona and two specialists on the
// hosted Responses API. Each run is spawned on its own task and awaited by
// the request; at most one run per session is in flight.

pub mod personas;
pub mod profile_tool;
pub mod runtime;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

pub use personas::{AgentTeam, PersonaId};
pub use profile_tool::UserProfile;
pub use runtime::{run_conversation, AgentError, AgentReply, AgentTransport, OpenAiResponses};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("An agent reply is already in progress for session {0}")]
    Busy(Uuid),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

#[derive(Clone)]
pub struct Orchestrator {
    model: String,
    team: AgentTeam,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

/// Releases the session's slot when dropped. Owned by the spawned run, so
/// the slot outlives a cancelled request until the hosted call finishes.
struct RunSlot {
    session_id: Uuid,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl Drop for RunSlot {
    fn drop(&mut self) {
        if let Ok(mut running) = self.in_flight.lock() {
            running.remove(&self.session_id);
        }
    }
}

impl Orchestrator {
    pub fn new(model: &str, knowledge_index_id: Option<String>) -> Self {
        Self {
            model: model.to_string(),
            team: AgentTeam::new(knowledge_index_id),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn retrieval_enabled(&self) -> bool {
        self.team.knowledge_index_id.is_some()
    }

    fn claim(&self, session_id: Uuid) -> Option<RunSlot> {
        let mut running = self.in_flight.lock().ok()?;
        running.insert(session_id).then(|| RunSlot {
            session_id,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Runs `message` through the persona team for one session.
    pub async fn reply(
        &self,
        transport: Arc<dyn AgentTransport>,
        session_id: Uuid,
        message: String,
        profile: UserProfile,
    ) -> Result<AgentReply, OrchestratorError> {
        let slot = self
            .claim(session_id)
            .ok_or(OrchestratorError::Busy(session_id))?;

        let model = self.model.clone();
        let team = self.team.clone();
        let handle = tokio::spawn(async move {
            let _slot = slot;
            run_conversation(transport.as_ref(), &model, &team, &profile, &message).await
        });

        match handle.await {
            Ok(result) => Ok(result?),
            Err(e) => {
                warn!("Agent task for session {session_id} failed to complete: {e}");
                Err(AgentError::Crashed(e.to_string()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::runtime::tests::{text_reply, ScriptedTransport};
    use super::runtime::{ResponseBody, ResponseRequest};
    use super::*;
    use crate::llm_client::LlmError;

    /// Answers after a delay so a second request can overlap the first.
    struct SlowTransport;

    #[async_trait]
    impl AgentTransport for SlowTransport {
        async fn respond(&self, _request: &ResponseRequest) -> Result<ResponseBody, LlmError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            text_reply("r1", "done")
        }
    }

    #[tokio::test]
    async fn test_reply_runs_on_a_spawned_task() {
        let orchestrator = Orchestrator::new("gpt-4o", None);
        let transport = Arc::new(ScriptedTransport::new(vec![text_reply("r1", "Hi there")]));
        let reply = orchestrator
            .reply(transport, Uuid::new_v4(), "hello".to_string(), UserProfile::default())
            .await
            .unwrap();
        assert_eq!(reply.text, "Hi there");
    }

    #[tokio::test]
    async fn test_second_concurrent_run_for_same_session_is_rejected() {
        let orchestrator = Orchestrator::new("gpt-4o", None);
        let session = Uuid::new_v4();

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .reply(Arc::new(SlowTransport), session, "one".to_string(), UserProfile::default())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = orchestrator
            .reply(Arc::new(SlowTransport), session, "two".to_string(), UserProfile::default())
            .await;
        assert!(matches!(second, Err(OrchestratorError::Busy(id)) if id == session));

        assert!(first.await.unwrap().is_ok());
        // Slot is released afterwards.
        let third = orchestrator
            .reply(Arc::new(SlowTransport), session, "three".to_string(), UserProfile::default())
            .await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_abandoned_request_keeps_session_busy_until_run_ends() {
        let orchestrator = Orchestrator::new("gpt-4o", None);
        let session = Uuid::new_v4();

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .reply(Arc::new(SlowTransport), session, "one".to_string(), UserProfile::default())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        let second = orchestrator
            .reply(Arc::new(SlowTransport), session, "two".to_string(), UserProfile::default())
            .await;
        assert!(matches!(second, Err(OrchestratorError::Busy(id)) if id == session));

        // The detached run finishes and frees the slot.
        tokio::time::sleep(Duration::from_millis(250)).await;
        let third = orchestrator
            .reply(Arc::new(SlowTransport), session, "three".to_string(), UserProfile::default())
            .await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_other_sessions_are_not_blocked() {
        let orchestrator = Orchestrator::new("gpt-4o", None);
        let _slot = orchestrator.claim(Uuid::new_v4()).unwrap();
        let transport = Arc::new(ScriptedTransport::new(vec![text_reply("r1", "ok")]));
        let reply = orchestrator
            .reply(transport, Uuid::new_v4(), "hi".to_string(), UserProfile::default())
            .await;
        assert!(reply.is_ok());
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_agent_error() {
        let orchestrator = Orchestrator::new("gpt-4o", Some("vs_1".to_string()));
        assert!(orchestrator.retrieval_enabled());
        let transport = Arc::new(ScriptedTransport::new(vec![Err(LlmError::InvalidCredential(
            "bad key".to_string(),
        ))]));
        let err = orchestrator
            .reply(transport, Uuid::new_v4(), "hi".to_string(), UserProfile::default())
            .await
            .unwrap_err();
        match err {
            OrchestratorError::Agent(e) => assert!(e.remediation().contains("API key")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
