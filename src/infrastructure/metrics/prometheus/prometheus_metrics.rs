//! Prometheus metrics implementation.
//!
//! This module provides a concrete implementation of the `Metrics` trait on
//! top of an owned [`MetricRegistry`]. All instruments are registered once in
//! [`PrometheusMetrics::new`]; the typed trait methods are the only way
//! handlers and the request middleware mutate them.

use super::MetricRegistry;
use crate::domain::{
    BusinessEvent, ErrorKind, Metrics, MetricsError, APPLICATION_ERRORS_TOTAL,
    BUSINESS_EVENTS_TOTAL, HTTP_REQUESTS_ACTIVE, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS,
};
use prometheus::{HistogramVec, IntCounterVec, IntGauge};
use std::time::Instant;

/// Prometheus-based metrics implementation.
pub struct PrometheusMetrics {
    registry: MetricRegistry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    requests_active: IntGauge,
    business_events: IntCounterVec,
    application_errors: IntCounterVec,
}

impl PrometheusMetrics {
    /// Register the application's metric catalog into `registry`.
    ///
    /// # Errors
    /// Returns `MetricsError::DuplicateMetricName` if the registry already
    /// holds one of the catalog names.
    pub fn new(registry: MetricRegistry) -> Result<Self, MetricsError> {
        // ---
        tracing::info!("Creating Prometheus metrics");
        Ok(PrometheusMetrics {
            requests_total: registry.counter_vec(&HTTP_REQUESTS_TOTAL)?,
            request_duration: registry.histogram_vec(&HTTP_REQUEST_DURATION_SECONDS)?,
            requests_active: registry.gauge(&HTTP_REQUESTS_ACTIVE)?,
            business_events: registry.counter_vec(&BUSINESS_EVENTS_TOTAL)?,
            application_errors: registry.counter_vec(&APPLICATION_ERRORS_TOTAL)?,
            registry,
        })
    }

    /// Current number of in-flight requests.
    pub fn active_requests(&self) -> i64 {
        self.requests_active.get()
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> anyhow::Result<String> {
        Ok(self.registry.serialize()?)
    }

    fn track_request_start(&self) {
        self.requests_active.inc();
    }

    fn record_http_request(&self, start: Instant, route: &str, method: &str, status: u16) {
        // ---
        let elapsed = start.elapsed().as_secs_f64();
        let status = status.to_string();

        self.requests_active.dec();
        self.request_duration
            .with_label_values(&[method, route])
            .observe(elapsed);
        self.requests_total
            .with_label_values(&[method, route, status.as_str()])
            .inc();
    }

    fn record_business_event(&self, event: BusinessEvent) {
        tracing::debug!(event = event.as_str(), "Recording business event");
        self.business_events.with_label_values(&[event.as_str()]).inc();
    }

    fn record_error(&self, kind: ErrorKind) {
        tracing::debug!(error_type = kind.as_str(), "Recording application error");
        self.application_errors.with_label_values(&[kind.as_str()]).inc();
    }
}
