use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Application configuration loaded from environment variables.
/// Startup fails if the row store or session store URLs are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    /// Server-wide default credential. Sessions may supply their own.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub completion_model: String,
    pub agent_model: String,
    pub vector_store_name: String,
    pub occupation_dataset_path: PathBuf,
    pub knowledge_docs_dir: PathBuf,
    pub kb_upload_threshold: usize,
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            completion_model: optional_env("COMPLETION_MODEL")
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            agent_model: optional_env("AGENT_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            vector_store_name: optional_env("VECTOR_STORE_NAME")
                .unwrap_or_else(|| "asc_knowledge_base".to_string()),
            occupation_dataset_path: optional_env("OCCUPATION_DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/asc_knowledge_base.json")),
            knowledge_docs_dir: optional_env("KNOWLEDGE_DOCS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/asc_documents")),
            kb_upload_threshold: parse_env("KB_UPLOAD_THRESHOLD", 5)?,
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 86_400)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns the variable if set and non-blank.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
