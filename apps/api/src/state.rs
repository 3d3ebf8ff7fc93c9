use std::sync::Arc;

use crate::agents::Orchestrator;
use crate::config::Config;
use crate::privacy::PiiMasker;
use crate::profile::ProfileRepository;
use crate::session::{HostedClients, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds no credential-bound clients: those are built per request from the
/// session's `SessionContext` through `clients`.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub clients: Arc<dyn HostedClients>,
    pub masker: Arc<PiiMasker>,
    pub orchestrator: Orchestrator,
    pub config: Config,
}
