mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::render::DocumentRenderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::RecordStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Draftsmith API v{}", env!("CARGO_PKG_VERSION"));

    // Record store (profile + application history)
    let store = RecordStore::open(&config.store_config()).context("opening record store")?;

    // LLM client
    let llm = LlmClient::new(config.llm_settings()).context("building LLM client")?;
    info!(
        "LLM client initialized (model: {}, base url: {})",
        llm.model(),
        config.llm_base_url
    );

    // PDF renderer
    let renderer =
        DocumentRenderer::new(config.render_config()).context("preparing output directory")?;

    let state = AppState {
        store,
        llm,
        renderer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the form is served from a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
