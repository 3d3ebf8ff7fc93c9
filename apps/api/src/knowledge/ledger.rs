//! Provisioning ledger: the row-store record that a named index has been
//! populated. Shared by every deployment instance pointing at the same
//! database, unlike a marker file on local disk.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::IndexError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProvisionRecord {
    pub index_name: String,
    pub index_id: String,
    pub document_count: i32,
    pub completed_at: DateTime<Utc>,
}

#[async_trait]
pub trait ProvisionLedger: Send + Sync {
    async fn completion(&self, index_name: &str) -> Result<Option<ProvisionRecord>, IndexError>;

    async fn record_completion(
        &self,
        index_name: &str,
        index_id: &str,
        document_count: usize,
    ) -> Result<(), IndexError>;
}

#[derive(Clone)]
pub struct PgProvisionLedger {
    pool: PgPool,
}

impl PgProvisionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProvisionLedger for PgProvisionLedger {
    async fn completion(&self, index_name: &str) -> Result<Option<ProvisionRecord>, IndexError> {
        let record = sqlx::query_as::<_, ProvisionRecord>(
            "SELECT index_name, index_id, document_count, completed_at \
             FROM kb_provisioning WHERE index_name = $1",
        )
        .bind(index_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn record_completion(
        &self,
        index_name: &str,
        index_id: &str,
        document_count: usize,
    ) -> Result<(), IndexError> {
        // Two instances racing here both land on the same row.
        sqlx::query(
            r#"
            INSERT INTO kb_provisioning (index_name, index_id, document_count)
            VALUES ($1, $2, $3)
            ON CONFLICT (index_name) DO UPDATE
                SET index_id = EXCLUDED.index_id,
                    document_count = EXCLUDED.document_count,
                    completed_at = now()
            "#,
        )
        .bind(index_name)
        .bind(index_id)
        .bind(i32::try_from(document_count).unwrap_or(i32::MAX))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
