mod catalog;
mod classify;
mod config;
mod enhance;
mod error;
mod executor;
mod fanout;
mod gemini;
mod media;
mod models;
mod orchestrator;
mod progress;
mod prompt;
mod provider;
mod routes;
mod variations;

use anyhow::Context;
use routes::{router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::orchestrator::Forge;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env().context("loading configuration")?;
    if config.gemini.api_key.is_none() {
        tracing::warn!("⚠️ GEMINI_API_KEY is not set; generation requests will fail with PERMISSION DENIED");
    }
    tracing::info!(text_model = %config.gemini.text_model, image_model = %config.gemini.image_model, "Using Gemini models");

    let provider = Arc::new(GeminiClient::new(config.gemini.clone()));
    let state = AppState {
        forge: Arc::new(Forge::new(provider, config.progress)),
    };
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await
        .context("server error")?;
    Ok(())
}
