use anyhow::Result;
use metrics_demo_api::{build_router, create_metrics, AppConfig};
use std::future::IntoFuture;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional .env file for local runs; real deployments set the environment.
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber to log to stdout
    tracing_subscriber::fmt::init();

    // Configuration and metric registration errors are fatal at startup.
    let config = AppConfig::from_env()?;
    let metrics = create_metrics(&config.metrics)?;
    let app = build_router(&config, metrics);

    info!(
        "Starting monitored API server v{}...",
        env!("CARGO_PKG_VERSION")
    );
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    // No draining: in-flight requests are abandoned when a signal arrives.
    tokio::select! {
        result = axum::serve(listener, app).into_future() => result?,
        () = shutdown_signal() => info!("Shutdown signal received, exiting"),
    }

    Ok(())
}

async fn shutdown_signal() {
    // ---
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
