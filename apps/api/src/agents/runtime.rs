//! Agent runtime on the hosted Responses API.
//!
//! The hosted service runs file search and web search itself. Function tools
//! (the profile lookup and the `transfer_to_*` handoffs) come back as
//! `function_call` items; they are executed here and their outputs sent back
//! chained to the previous response. The loop ends at the first response with
//! no function calls, or fails after `MAX_TURNS` model calls.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::personas::{AgentTeam, PersonaId, PROFILE_TOOL};
use super::profile_tool::UserProfile;
use crate::llm_client::{check_response, LlmError};

pub const MAX_TURNS: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolSpec {
    Function {
        name: String,
        description: String,
        parameters: Value,
    },
    FileSearch {
        vector_store_ids: Vec<String>,
        max_num_results: u32,
    },
    WebSearchPreview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputItem {
    Message { role: String, content: String },
    FunctionCallOutput { call_id: String, output: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseRequest {
    pub model: String,
    pub instructions: String,
    pub input: Vec<InputItem>,
    pub tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseBody {
    pub id: String,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    FunctionCall { call_id: String, name: String },
    /// Hosted tool calls (file search, web search) and anything newer.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

impl ResponseBody {
    fn text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message { content } => Some(content),
                _ => None,
            })
            .flatten()
            .filter_map(|part| match part {
                ContentPart::OutputText { text } => Some(text.as_str()),
                ContentPart::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn function_calls(&self) -> Vec<(&str, &str)> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::FunctionCall { call_id, name, .. } => {
                    Some((call_id.as_str(), name.as_str()))
                }
                _ => None,
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transport
// ────────────────────────────────────────────────────────────────────────────

/// One call to the hosted agent runtime.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn respond(&self, request: &ResponseRequest) -> Result<ResponseBody, LlmError>;
}

pub struct OpenAiResponses {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiResponses {
    pub fn new(http: Client, api_key: String, base_url: &str) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AgentTransport for OpenAiResponses {
    async fn respond(&self, request: &ResponseRequest) -> Result<ResponseBody, LlmError> {
        let response = self
            .http
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let body: ResponseBody = check_response(response).await?.json().await?;
        Ok(body)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Run loop
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Hosted(#[from] LlmError),

    #[error("No final reply after {0} agent turns")]
    MaxTurnsExceeded(usize),

    #[error("The agent returned an empty reply")]
    EmptyReply,

    #[error("The agent task stopped unexpectedly: {0}")]
    Crashed(String),
}

impl AgentError {
    /// Message shown to the user in place of an agent reply.
    pub fn remediation(&self) -> String {
        match self {
            AgentError::Hosted(e) => e.remediation(),
            other => format!(
                "I encountered an issue processing your request: {other}. Please try again."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub text: String,
    /// Persona that produced the final reply.
    pub answered_by: PersonaId,
    pub turns: usize,
}

/// Drives one user message through the persona team, starting at triage.
pub async fn run_conversation(
    transport: &dyn AgentTransport,
    model: &str,
    team: &AgentTeam,
    profile: &UserProfile,
    message: &str,
) -> Result<AgentReply, AgentError> {
    let mut current = PersonaId::CareerGuide;
    let mut previous_response_id: Option<String> = None;
    let mut input = vec![InputItem::Message {
        role: "user".to_string(),
        content: message.to_string(),
    }];

    for turn in 1..=MAX_TURNS {
        let request = ResponseRequest {
            model: model.to_string(),
            instructions: current.persona().instructions.to_string(),
            input: std::mem::take(&mut input),
            tools: team.tools_for(current),
            previous_response_id: previous_response_id.take(),
        };
        let response = transport.respond(&request).await?;

        let calls = response.function_calls();
        if calls.is_empty() {
            let text = response.text();
            if text.trim().is_empty() {
                return Err(AgentError::EmptyReply);
            }
            info!(
                "Agent reply from '{}' after {turn} turn(s)",
                current.persona().name
            );
            return Ok(AgentReply {
                text,
                answered_by: current,
                turns: turn,
            });
        }

        for (call_id, name) in calls {
            let output = if name == PROFILE_TOOL {
                debug!("Serving {PROFILE_TOOL} to '{}'", current.persona().name);
                profile.render()
            } else if let Some(target) = PersonaId::from_handoff_tool(name) {
                debug!(
                    "Handoff from '{}' to '{}'",
                    current.persona().name,
                    target.persona().name
                );
                current = target;
                serde_json::json!({ "assistant": target.persona().name }).to_string()
            } else {
                warn!("Agent called unknown tool '{name}'");
                format!("Error: tool '{name}' is not available.")
            };
            input.push(InputItem::FunctionCallOutput {
                call_id: call_id.to_string(),
                output,
            });
        }
        previous_response_id = Some(response.id.clone());
    }

    Err(AgentError::MaxTurnsExceeded(MAX_TURNS))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Replays canned response bodies and records every request.
    pub(crate) struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<ResponseBody, LlmError>>>,
        pub requests: Mutex<Vec<ResponseRequest>>,
        delay: Option<Duration>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(replies: Vec<Result<ResponseBody, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        /// Waits `delay` before each reply.
        pub(crate) fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn requests(&self) -> Vec<ResponseRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AgentTransport for ScriptedTransport {
        async fn respond(&self, request: &ResponseRequest) -> Result<ResponseBody, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }

    pub(crate) fn text_reply(id: &str, text: &str) -> Result<ResponseBody, LlmError> {
        Ok(serde_json::from_value(serde_json::json!({
            "id": id,
            "output": [
                {"type": "web_search_call", "id": "ws_1", "status": "completed"},
                {
                    "type": "message",
                    "role": "assistant",
                    "content": [{"type": "output_text", "text": text, "annotations": []}]
                }
            ]
        }))
        .unwrap())
    }

    pub(crate) fn tool_call(id: &str, call_id: &str, name: &str) -> Result<ResponseBody, LlmError> {
        Ok(serde_json::from_value(serde_json::json!({
            "id": id,
            "output": [
                {"type": "function_call", "call_id": call_id, "name": name, "arguments": "{}"}
            ]
        }))
        .unwrap())
    }

    fn profile() -> UserProfile {
        UserProfile {
            chat_skills: vec!["python".to_string()],
            ..UserProfile::default()
        }
    }

    #[tokio::test]
    async fn test_direct_answer_from_triage() {
        let transport = ScriptedTransport::new(vec![text_reply("r1", "Hello!")]);
        let reply = run_conversation(&transport, "gpt-4o", &AgentTeam::default(), &profile(), "hi")
            .await
            .unwrap();
        assert_eq!(reply.text, "Hello!");
        assert_eq!(reply.answered_by, PersonaId::CareerGuide);
        assert_eq!(reply.turns, 1);

        let requests = transport.requests();
        assert_eq!(
            requests[0].input,
            vec![InputItem::Message {
                role: "user".to_string(),
                content: "hi".to_string()
            }]
        );
        assert!(requests[0].previous_response_id.is_none());
    }

    #[tokio::test]
    async fn test_profile_tool_and_handoff_are_executed_locally() {
        let transport = ScriptedTransport::new(vec![
            tool_call("r1", "c1", "get_user_profile"),
            tool_call("r2", "c2", "transfer_to_job_search_assistant"),
            text_reply("r3", "Here are three openings."),
        ]);
        let reply = run_conversation(
            &transport,
            "gpt-4o",
            &AgentTeam::default(),
            &profile(),
            "find me python jobs",
        )
        .await
        .unwrap();

        assert_eq!(reply.answered_by, PersonaId::JobSearch);
        assert_eq!(reply.turns, 3);

        let requests = transport.requests();
        assert_eq!(requests[1].previous_response_id.as_deref(), Some("r1"));
        match &requests[1].input[0] {
            InputItem::FunctionCallOutput { call_id, output } => {
                assert_eq!(call_id, "c1");
                assert!(output.contains("python"));
            }
            other => panic!("unexpected input: {other:?}"),
        }
        // After the handoff the specialist's instructions and tools are used.
        assert_eq!(
            requests[2].instructions,
            PersonaId::JobSearch.persona().instructions
        );
        assert!(requests[2].tools.contains(&ToolSpec::WebSearchPreview));
    }

    #[tokio::test]
    async fn test_turn_cap() {
        let replies = (0..MAX_TURNS + 2)
            .map(|i| tool_call(&format!("r{i}"), &format!("c{i}"), "get_user_profile"))
            .collect();
        let transport = ScriptedTransport::new(replies);
        let err = run_conversation(&transport, "gpt-4o", &AgentTeam::default(), &profile(), "loop")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MaxTurnsExceeded(MAX_TURNS)));
        assert_eq!(transport.requests().len(), MAX_TURNS);
    }

    #[tokio::test]
    async fn test_quota_error_maps_to_remediation() {
        let transport = ScriptedTransport::new(vec![Err(LlmError::QuotaExceeded(
            "insufficient_quota".to_string(),
        ))]);
        let err = run_conversation(&transport, "gpt-4o", &AgentTeam::default(), &profile(), "hi")
            .await
            .unwrap_err();
        assert!(err.remediation().contains("quota"));
    }

    #[tokio::test]
    async fn test_unknown_tool_gets_an_error_output() {
        let transport = ScriptedTransport::new(vec![
            tool_call("r1", "c1", "delete_everything"),
            text_reply("r2", "Sorry about that."),
        ]);
        let reply = run_conversation(&transport, "gpt-4o", &AgentTeam::default(), &profile(), "x")
            .await
            .unwrap();
        assert_eq!(reply.text, "Sorry about that.");
        match &transport.requests()[1].input[0] {
            InputItem::FunctionCallOutput { output, .. } => assert!(output.contains("not available")),
            other => panic!("unexpected input: {other:?}"),
        }
    }

    #[test]
    fn test_request_serializes_to_responses_shape() {
        let request = ResponseRequest {
            model: "gpt-4o".to_string(),
            instructions: "be nice".to_string(),
            input: vec![InputItem::FunctionCallOutput {
                call_id: "c1".to_string(),
                output: "{}".to_string(),
            }],
            tools: vec![
                ToolSpec::WebSearchPreview,
                ToolSpec::FileSearch {
                    vector_store_ids: vec!["vs_1".to_string()],
                    max_num_results: 5,
                },
            ],
            previous_response_id: Some("r1".to_string()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"][0]["type"], "function_call_output");
        assert_eq!(json["tools"][0]["type"], "web_search_preview");
        assert_eq!(json["tools"][1]["type"], "file_search");
        assert_eq!(json["tools"][1]["vector_store_ids"][0], "vs_1");
        assert_eq!(json["previous_response_id"], "r1");
    }
}
