use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use kiosk_core::{CoreConfig, PriorityRefresher, QueueRelay};

/// Main entry point for the kiosk relay
///
/// Runs the REST server and the priority-refresh ticker together:
/// - REST server on port 5000 (configurable via KIOSK_REST_ADDR)
/// - priority refresh every five minutes (configurable via KIOSK_PRIORITY_REFRESH_SECS)
///
/// On Ctrl-C the server stops accepting connections, drains in-flight requests, and the
/// ticker is shut down before the process exits.
///
/// # Environment Variables
/// - `KIOSK_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `QUEUE_ASSIGNER_URL`: external queue-assigner base URL
/// - `KIOSK_NAME_STORE_DIR`: local name store directory (default: "kiosk_data/names")
/// - `KIOSK_HTTP_TIMEOUT_SECS`, `KIOSK_PRIORITY_REFRESH_SECS`, `KIOSK_RECONCILE_DELAY_MS`,
///   `KIOSK_ADMIN_API_KEY`: see [`CoreConfig::from_env`]
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kiosk_run=info".parse()?)
                .add_directive("kiosk_core=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("KIOSK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
    let cfg = CoreConfig::from_env()?;

    tracing::info!("++ Starting kiosk REST on {}", rest_addr);
    tracing::info!("++ Relaying to {}", cfg.queue_assigner_url());
    tracing::info!("++ Name store at {}", cfg.name_store_dir().display());

    let relay = Arc::new(QueueRelay::connect(&cfg)?);
    let refresher = PriorityRefresher::spawn(relay.assigner(), cfg.priority_refresh_interval());

    let app = router(AppState::new(relay.clone(), &cfg));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    refresher.shutdown().await;
    relay.names().flush().await?;
    served?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("-- Shutting down");
}
