// Knowledge base: the occupation dataset rendered as one text document per
// record and uploaded once to a hosted vector index for the recommendation
// agent's file search.

pub mod dataset;
pub mod ledger;
pub mod provisioner;
pub mod vector_index;

use std::path::PathBuf;

use thiserror::Error;

use crate::llm_client::LlmError;

pub use ledger::{PgProvisionLedger, ProvisionLedger};
pub use provisioner::{provision_knowledge_base, ProvisionSettings};
pub use vector_index::{OpenAiVectorIndex, VectorIndex};

/// Failure anywhere in index lookup, dataset rendering or upload.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Hosted index call failed: {0}")]
    Hosted(#[from] LlmError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Occupation dataset is invalid: {0}")]
    Dataset(String),

    #[error("Provisioning ledger error: {0}")]
    Ledger(#[from] sqlx::Error),
}
