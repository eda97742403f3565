mod analysis;
mod config;
mod document;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on a missing GOOGLE_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hirelyzer API v{}", env!("CARGO_PKG_VERSION"));

    let gemini = GeminiClient::new(
        config.google_api_key.clone(),
        config.gemini_model.clone(),
        config.llm_timeout,
    );
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        gemini.model(),
        config.llm_timeout
    );

    let state = AppState::new(
        Arc::new(gemini),
        config.max_concurrent_analyses,
        config.max_upload_bytes,
    );
    info!(
        "Accepting up to {} concurrent analyses, uploads up to {} bytes",
        config.max_concurrent_analyses, config.max_upload_bytes
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
