//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without the priority-refresh ticker.
//!
//! ## Intended use
//! Useful for development and debugging against the Swagger UI. The workspace's main
//! `kiosk-run` binary runs the REST server together with the ticker.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use kiosk_core::{CoreConfig, QueueRelay};

/// Main entry point for the kiosk REST API server
///
/// # Environment Variables
/// - `KIOSK_REST_ADDR`: Server address (default: "0.0.0.0:5000")
/// - plus everything read by [`CoreConfig::from_env`]
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the name store cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("kiosk_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("KIOSK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
    let cfg = CoreConfig::from_env()?;

    tracing::info!("-- Starting kiosk REST API on {}", addr);
    tracing::info!("-- Relaying to {}", cfg.queue_assigner_url());

    let relay = Arc::new(QueueRelay::connect(&cfg)?);
    let app = router(AppState::new(relay, &cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
