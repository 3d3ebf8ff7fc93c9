use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use super::{SessionError, SessionState};

const KEY_PREFIX: &str = "careerguide:session:";

/// Persists session state between requests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<SessionState, SessionError>;
    async fn save(&self, state: &SessionState) -> Result<(), SessionError>;
}

/// Session state as JSON strings in Redis, refreshed to the full TTL on every save.
///
/// The connection is opened on first use, so an unreachable Redis fails
/// requests rather than startup.
pub struct RedisSessionStore {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(redis_url: &str, ttl_secs: u64) -> Result<Self, SessionError> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
            conn: OnceCell::new(),
            ttl_secs,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, SessionError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = ConnectionManager::new(self.client.clone()).await?;
                info!("Redis session store connected");
                Ok::<_, redis::RedisError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }

    fn key(id: Uuid) -> String {
        format!("{KEY_PREFIX}{id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<SessionState, SessionError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(Self::key(id))
            .query_async(&mut conn)
            .await?;
        let raw = raw.ok_or(SessionError::NotFound(id))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        let mut conn = self.connection().await?;
        let payload = serde_json::to_string(state)?;
        let _: () = redis::cmd("SET")
            .arg(Self::key(state.id))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await?;
        debug!("Saved session {} ({} messages)", state.id, state.messages.len());
        Ok(())
    }
}
