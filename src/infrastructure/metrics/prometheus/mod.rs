mod prometheus_metrics;
mod registry;

pub use prometheus_metrics::PrometheusMetrics;
pub use registry::{MetricRegistry, EXPOSITION_CONTENT_TYPE};
use std::sync::Arc;

/// Creates a new Prometheus metrics implementation.
///
/// Every call builds a fresh, independent registry. When `process_metrics`
/// is set, process-level default metrics are registered alongside the
/// application's own instruments.
///
/// Returns a fully initialized metrics instance ready for use.
pub fn create(process_metrics: bool) -> anyhow::Result<crate::domain::MetricsPtr> {
    // ---
    tracing::info!(process_metrics, "Initializing Prometheus metrics");

    let registry = MetricRegistry::new();
    if process_metrics {
        registry.register_process_metrics()?;
    }

    Ok(Arc::new(PrometheusMetrics::new(registry)?))
}
