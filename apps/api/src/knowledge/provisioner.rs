//! Knowledge-Base Provisioner: safe to run on every start.
//!
//! 1. Locate the named vector index, creating it if missing.
//! 2. List its documents.
//! 3. If the ledger already records completion for the name, stop.
//! 4. Render one text file per occupation record into `docs_dir` (existing
//!    files are left as they are).
//! 5. If the index holds at most `upload_threshold` documents, upload every
//!    file. Above the threshold it is treated as our own earlier upload: a
//!    complete one is recorded as is, a partial one resumes after the
//!    documents already attached. Completion is recorded with the dataset's
//!    document count.
//!
//! Failures never propagate to startup: they are logged and retrieval is
//! disabled for this process.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::dataset::load_dataset;
use super::{IndexError, ProvisionLedger, VectorIndex};
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub index_name: String,
    pub dataset_path: PathBuf,
    pub docs_dir: PathBuf,
    pub upload_threshold: usize,
}

impl ProvisionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            index_name: config.vector_store_name.clone(),
            dataset_path: config.occupation_dataset_path.clone(),
            docs_dir: config.knowledge_docs_dir.clone(),
            upload_threshold: config.kb_upload_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionStatus {
    /// The ledger already held a completion record.
    AlreadyProvisioned,
    /// The index already held at least every dataset document.
    IndexPopulated { existing: usize },
    /// An earlier partial upload was finished.
    Resumed { existing: usize, uploaded: usize },
    Uploaded { documents: usize },
}

#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub index_id: String,
    pub status: ProvisionStatus,
}

/// Runs provisioning and returns the index id to use for file search, or
/// `None` when the knowledge base is unavailable.
pub async fn provision_knowledge_base(
    index: &dyn VectorIndex,
    ledger: &dyn ProvisionLedger,
    settings: &ProvisionSettings,
) -> Option<String> {
    match try_provision(index, ledger, settings).await {
        Ok(report) => {
            info!(
                "Knowledge base '{}' ready (index {}): {:?}",
                settings.index_name, report.index_id, report.status
            );
            Some(report.index_id)
        }
        Err(e) => {
            error!(
                "IndexProvisioningFailed for '{}': {e}. Retrieval is disabled.",
                settings.index_name
            );
            None
        }
    }
}

pub async fn try_provision(
    index: &dyn VectorIndex,
    ledger: &dyn ProvisionLedger,
    settings: &ProvisionSettings,
) -> Result<ProvisionReport, IndexError> {
    let index_id = match index.find_index(&settings.index_name).await? {
        Some(id) => id,
        None => {
            info!("Creating vector index '{}'", settings.index_name);
            index.create_index(&settings.index_name).await?
        }
    };

    let existing = index.list_documents(&index_id).await?.len();

    if ledger.completion(&settings.index_name).await?.is_some() {
        return Ok(ProvisionReport {
            index_id,
            status: ProvisionStatus::AlreadyProvisioned,
        });
    }

    let documents = match write_documents(settings).await {
        Ok(documents) => documents,
        Err(e) if existing > settings.upload_threshold => {
            warn!("Cannot read the dataset to verify index '{}': {e}", settings.index_name);
            return Ok(ProvisionReport {
                index_id,
                status: ProvisionStatus::IndexPopulated { existing },
            });
        }
        Err(e) => return Err(e),
    };
    let expected = documents.len();

    if existing > settings.upload_threshold && existing >= expected {
        warn!(
            "Index '{}' already holds {existing} documents without a ledger record; recording it as provisioned",
            settings.index_name
        );
        ledger
            .record_completion(&settings.index_name, &index_id, existing)
            .await?;
        return Ok(ProvisionReport {
            index_id,
            status: ProvisionStatus::IndexPopulated { existing },
        });
    }

    let resume_from = if existing > settings.upload_threshold {
        warn!(
            "Index '{}' holds {existing} of {expected} documents; resuming the upload",
            settings.index_name
        );
        existing
    } else {
        0
    };

    let pending = &documents[resume_from..];
    for (file_name, path) in pending {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| io_error(path, e))?;
        index.upload_document(&index_id, file_name, contents).await?;
    }
    info!(
        "Uploaded {} occupation document(s) to '{}'",
        pending.len(),
        settings.index_name
    );

    ledger
        .record_completion(&settings.index_name, &index_id, expected)
        .await?;

    let status = if resume_from > 0 {
        ProvisionStatus::Resumed {
            existing,
            uploaded: pending.len(),
        }
    } else {
        ProvisionStatus::Uploaded {
            documents: pending.len(),
        }
    };
    Ok(ProvisionReport { index_id, status })
}

/// Renders the dataset into `docs_dir`, skipping files already on disk.
/// Returns every document's file name and path, written now or earlier.
async fn write_documents(settings: &ProvisionSettings) -> Result<Vec<(String, PathBuf)>, IndexError> {
    let records = load_dataset(&settings.dataset_path).await?;
    tokio::fs::create_dir_all(&settings.docs_dir)
        .await
        .map_err(|e| io_error(&settings.docs_dir, e))?;

    let mut documents = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        let file_name = record.file_name(position);
        let path = settings.docs_dir.join(&file_name);
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        if !exists {
            tokio::fs::write(&path, record.document_text())
                .await
                .map_err(|e| io_error(&path, e))?;
        }
        documents.push((file_name, path));
    }
    Ok(documents)
}

fn io_error(path: &Path, source: std::io::Error) -> IndexError {
    IndexError::Io {
        path: path.to_path_buf(),
        source,
    }
}
