//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without reading a `.env` file.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `triage-run` binary serves the same
//! router after loading `.env`.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{config_from_env, router, AppState, DEFAULT_REST_ADDR};
use triage_core::TriageService;

/// Main entry point for the triage REST API server
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `TRIAGE_CATALOG_FILE`, `TRIAGE_DOCTORS_FILE`, `TRIAGE_MAX_RESULTS`: see
///   [`api_rest::config_from_env`]
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or its data files are invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("triage_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("-- Starting triage REST API on {}", addr);

    let cfg = Arc::new(config_from_env()?);
    let service = TriageService::new(cfg)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(AppState::new(service))).await?;

    Ok(())
}
