// Chat service: ties sessions, the resume pipeline, the agent team and the
// profile store together behind the HTTP handlers.

pub mod handlers;
pub mod service;

use serde::Serialize;

use crate::documents::ExtractError;
use crate::profile::ProfileError;
use crate::skills::DegradeReason;

/// A degraded step reported inside an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub code: &'static str,
    pub message: String,
}

impl From<&DegradeReason> for Warning {
    fn from(reason: &DegradeReason) -> Self {
        let code = match reason {
            DegradeReason::CredentialMissing => "CREDENTIAL_MISSING",
            DegradeReason::SkillExtractionFailed(_) => "SKILL_EXTRACTION_FAILED",
            DegradeReason::CategorizationFailed(_) => "CATEGORIZATION_FAILED",
        };
        Self {
            code,
            message: reason.to_string(),
        }
    }
}

impl From<&ProfileError> for Warning {
    fn from(err: &ProfileError) -> Self {
        Self {
            code: "PERSISTENCE_FAILED",
            message: format!("Your profile could not be saved right now ({err}). It is kept for this session."),
        }
    }
}

impl From<&ExtractError> for Warning {
    fn from(err: &ExtractError) -> Self {
        Self {
            code: "EXTRACTION_FAILED",
            message: err.to_string(),
        }
    }
}
