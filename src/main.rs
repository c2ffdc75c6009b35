use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, DEFAULT_REST_ADDR, config_from_env, router};
use triage_core::TriageService;

/// Main entry point for the triage application
///
/// Loads `.env`, resolves configuration once, loads the condition catalog and doctor directory,
/// then serves the REST API (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `TRIAGE_CATALOG_FILE`: condition catalog file (default: built-in catalog)
/// - `TRIAGE_DOCTORS_FILE`: doctor directory file (default: none)
/// - `TRIAGE_MAX_RESULTS`: conditions reported per assessment (default: 3)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, data loading, or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_run=info".parse()?)
                .add_directive("triage_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = Arc::new(config_from_env()?);
    let service = TriageService::new(cfg)?;
    tracing::info!(
        conditions = service.catalog().len(),
        doctors = service.doctors().len(),
        "++ Loaded triage data"
    );

    tracing::info!("++ Starting triage REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(AppState::new(service))).await?;

    Ok(())
}
