//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers and the request-metrics middleware via the `State`
//! extractor. The state is cheaply cloneable (everything heavy sits behind
//! an `Arc`) so each request gets its own handle without copying resources.

use crate::config::SimulationConfig;
use crate::domain::MetricsPtr;
use crate::middleware::RouteLabeler;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state passed to all Axum handlers.
///
/// # Lifecycle
///
/// 1. Created once in `build_router()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub(crate) struct AppState {
    /// Metrics implementation for recording requests and events.
    ///
    /// Either Prometheus-backed (production) or no-op.
    /// Wrapped in `Arc` via `MetricsPtr` for cheap cloning.
    metrics: MetricsPtr,

    /// Resolves the `route` label of each request, bounding the number of
    /// distinct raw paths from unmatched requests.
    route_labels: Arc<RouteLabeler>,

    /// Latency and failure-rate settings of the demo endpoints.
    simulation: Arc<SimulationConfig>,

    /// Instant the state was built; `/health` reports uptime from it.
    started_at: Instant,
}

impl AppState {
    // ---

    pub fn new(metrics: MetricsPtr, route_labels: RouteLabeler, simulation: SimulationConfig) -> Self {
        // ---
        AppState {
            metrics,
            route_labels: Arc::new(route_labels),
            simulation: Arc::new(simulation),
            started_at: Instant::now(),
        }
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    pub(crate) fn route_labels(&self) -> &RouteLabeler {
        &self.route_labels
    }

    pub(crate) fn simulation(&self) -> &SimulationConfig {
        &self.simulation
    }

    /// Seconds since the application state was created.
    pub(crate) fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
