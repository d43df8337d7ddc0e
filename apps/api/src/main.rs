mod config;
mod documents;
mod errors;
mod lfa;
mod messaging;
mod models;
mod repo;
mod retention;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::documents::MarkdownRenderer;
use crate::messaging::SimulatedProvider;
use crate::repo::Repositories;
use crate::retention::RuleBasedScorer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hireboard API v{}", env!("CARGO_PKG_VERSION"));

    let repos = if config.seed_fixtures {
        let repos = Repositories::seeded().context("demo fixtures are inconsistent")?;
        info!("In-memory stores seeded with demo fixtures");
        repos
    } else {
        info!("In-memory stores start empty");
        Repositories::empty()
    };

    let latency = config.simulated_latency();
    info!("Simulated provider latency: {}ms", latency.as_millis());

    let state = AppState {
        repos,
        messenger: Arc::new(SimulatedProvider::new(latency)),
        renderer: Arc::new(MarkdownRenderer::new(latency)),
        retention_scorer: Arc::new(RuleBasedScorer::default()),
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
