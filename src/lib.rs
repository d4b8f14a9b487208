// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{middleware::from_fn_with_state, routing::get, Router};

use domain::MetricsPtr;
use handlers::{
    error_endpoint, get_data, health_check, metrics_handler, not_found, root_handler,
    slow_endpoint,
};

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod middleware;

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_noop_metrics, // ---
    create_prom_metrics,
    MetricRegistry,
    PrometheusMetrics,
    EXPOSITION_CONTENT_TYPE,
};
pub use middleware::{RouteLabeler, ABORTED_STATUS, OVERFLOW_ROUTE};

/// Build the metrics implementation selected by configuration.
pub fn create_metrics(config: &MetricsConfig) -> Result<MetricsPtr> {
    // ---
    match config.backend {
        MetricsBackend::Prometheus => create_prom_metrics(config.process_metrics),
        MetricsBackend::Noop => create_noop_metrics(),
    }
}

/// Build the HTTP router with configuration and metrics determined by environment variables.
pub fn create_router() -> Result<Router> {
    // ---
    let config = AppConfig::from_env()?;
    let metrics = create_metrics(&config.metrics)?;

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    Ok(build_router(&config, metrics))
}

/// Build the HTTP router around an explicitly provided metrics implementation.
///
/// Every route, including the fallback, runs inside the request-metrics
/// middleware. Tests pass their own `metrics` to get an isolated registry.
pub fn build_router(config: &AppConfig, metrics: MetricsPtr) -> Router {
    // ---
    let app_state = AppState::new(
        metrics,
        RouteLabeler::new(config.metrics.max_unmatched_routes),
        config.simulation.clone(),
    );

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest(
            "/api",
            Router::new()
                .route("/data", get(get_data))
                .route("/slow", get(slow_endpoint))
                .route("/error", get(error_endpoint)),
        )
        .fallback(not_found)
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::track_requests,
        ))
        .with_state(app_state)
}
