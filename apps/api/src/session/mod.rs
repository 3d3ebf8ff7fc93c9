// Session state, its Redis-backed store, and the per-request context that
// decides which credential hosted calls use.

pub mod context;
pub mod state;
pub mod store;

use thiserror::Error;
use uuid::Uuid;

pub use context::{HostedClients, OpenAiClients, SessionContext};
pub use state::{Role, SessionSnapshot, SessionState};
pub use store::{RedisSessionStore, SessionStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session {0} not found or expired")]
    NotFound(Uuid),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
