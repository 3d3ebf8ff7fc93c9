mod agents;
mod careers;
mod chat;
mod config;
mod db;
mod documents;
mod errors;
mod knowledge;
mod llm_client;
mod privacy;
mod profile;
mod routes;
mod session;
mod skills;
mod state;
mod visualization;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agents::Orchestrator;
use crate::config::Config;
use crate::db::create_pool;
use crate::knowledge::{
    provision_knowledge_base, OpenAiVectorIndex, PgProvisionLedger, ProvisionSettings,
};
use crate::llm_client::build_http_client;
use crate::privacy::PiiMasker;
use crate::profile::PgProfileRepository;
use crate::routes::build_router;
use crate::session::{OpenAiClients, RedisSessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerGuide API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL is the only fatal dependency
    let db = create_pool(&config.database_url).await?;

    let sessions = RedisSessionStore::new(&config.redis_url, config.session_ttl_secs)?;
    info!("Redis session store configured (ttl {}s)", config.session_ttl_secs);

    let http = build_http_client()?;

    let knowledge_index_id = match &config.openai_api_key {
        Some(api_key) => {
            let index = OpenAiVectorIndex::new(http.clone(), api_key.clone(), &config.openai_base_url);
            let ledger = PgProvisionLedger::new(db.clone());
            let settings = ProvisionSettings::from_config(&config);
            provision_knowledge_base(&index, &ledger, &settings).await
        }
        None => {
            warn!("OPENAI_API_KEY is not set; knowledge base not provisioned, retrieval disabled");
            None
        }
    };

    let state = AppState {
        sessions: Arc::new(sessions),
        profiles: Arc::new(PgProfileRepository::new(db)),
        clients: Arc::new(OpenAiClients::new(
            http,
            &config.openai_base_url,
            &config.completion_model,
        )),
        masker: Arc::new(PiiMasker::new()),
        orchestrator: Orchestrator::new(&config.agent_model, knowledge_index_id),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
