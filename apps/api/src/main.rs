mod config;
mod db;
mod errors;
mod generation;
mod intake;
mod llm_client;
mod models;
mod notify;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::generation::generator::LlmContentGenerator;
use crate::intake::store::SubmissionStore;
use crate::llm_client::LlmClient;
use crate::notify::{MailCredentials, Notifier, SmtpRelay};
use crate::render::DocumentFiller;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;
    let store = SubmissionStore::new(db);

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.generation_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    if !config.template_path.exists() {
        warn!(
            "Resume template not found at {}; generate requests will fail until it exists",
            config.template_path.display()
        );
    }
    let filler = DocumentFiller::new(config.template_path.clone(), config.output_dir.clone());
    info!(
        "Document filler: template {} → {}",
        config.template_path.display(),
        config.output_dir.display()
    );

    // Initialize SMTP relay
    let credentials = MailCredentials {
        address: config.email_address.clone(),
        password: config.email_password.clone(),
    };
    let relay = SmtpRelay::new(
        &config.smtp_host,
        config.smtp_port,
        &credentials,
        config.smtp_timeout,
    )?;
    info!(
        "SMTP relay {}:{} as {}",
        config.smtp_host, config.smtp_port, config.email_address
    );

    // Build app state
    let state = AppState {
        store,
        generator: Arc::new(LlmContentGenerator::new(llm)),
        filler,
        notifier: Notifier::new(credentials, Arc::new(relay)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
