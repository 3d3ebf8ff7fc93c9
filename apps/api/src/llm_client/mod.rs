/// LLM Client: the single point of entry for hosted completion calls.
///
/// ARCHITECTURAL RULE: No other module builds chat-completion requests itself.
/// The agent runtime and the vector index reuse `check_response` so every
/// hosted call reports credential and quota problems the same way.
///
/// One attempt per call. A transport failure is surfaced once and the user
/// resubmits; the shared HTTP client timeout is the only deadline.
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const HTTP_TIMEOUT_SECS: u64 = 120;
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("The API key was rejected: {0}")]
    InvalidCredential(String),

    #[error("The API quota is exhausted: {0}")]
    QuotaExceeded(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Message shown to the end user in place of a model reply.
    pub fn remediation(&self) -> String {
        match self {
            LlmError::InvalidCredential(_) => "Your OpenAI API key was rejected. \
                Please check the key in the sidebar and try again."
                .to_string(),
            LlmError::QuotaExceeded(_) => "Your OpenAI account has run out of quota. \
                Please review your plan and billing details, or provide a different API key."
                .to_string(),
            LlmError::RateLimited(_) => {
                "The AI service is busy right now. Please wait a moment and resend your message."
                    .to_string()
            }
            other => format!(
                "I encountered an issue processing your request: {other}. \
                 Please try again or check your API key."
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
pub struct ReplyMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if the model produced any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
}

/// Text-in, text-out completion seam used by the skill pipeline.
/// `LlmClient` is the production implementation; tests script replies.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str, temperature: f32)
        -> Result<String, LlmError>;
}

/// Builds the HTTP client shared by every hosted-service caller.
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")
}

/// Chat-completion client bound to one credential.
/// Constructed per session from `SessionContext`; never shared across sessions.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(http: Client, api_key: String, base_url: &str, model: &str) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Makes a raw chat-completion call and returns the full response object.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let chat: ChatResponse = check_response(response).await?.json().await?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded ({}): prompt_tokens={}, completion_tokens={}",
                self.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let response = self.call(prompt, system, temperature).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Passes successful responses through and classifies failures.
pub async fn check_response(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(status.as_u16(), &body))
}

/// Maps an HTTP status plus error body to the error taxonomy.
fn classify_failure(status: u16, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| body.to_string());
    let quota = parsed
        .as_ref()
        .map(|e| {
            e.error.code.as_deref() == Some("insufficient_quota")
                || e.error.error_type.as_deref() == Some("insufficient_quota")
        })
        .unwrap_or(false);

    match status {
        401 | 403 => LlmError::InvalidCredential(message),
        429 if quota => LlmError::QuotaExceeded(message),
        429 => LlmError::RateLimited(message),
        _ => LlmError::Api { status, message },
    }
}
