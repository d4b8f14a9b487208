use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Kind of a metric definition, with histogram bucket bounds attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram { buckets: &'static [f64] },
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram { .. } => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a metric: name, help text, kind and label names.
///
/// Definitions are registered once per registry; the registry hands back a
/// typed handle that producers use to record values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDefinition {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

impl MetricDefinition {
    pub const fn counter(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Counter,
            labels,
        }
    }

    pub const fn gauge(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            labels: &[],
        }
    }

    pub const fn histogram(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
        buckets: &'static [f64],
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Histogram { buckets },
            labels,
        }
    }
}

/// Request latency buckets, in seconds.
pub const REQUEST_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

pub const HTTP_REQUESTS_TOTAL: MetricDefinition = MetricDefinition::counter(
    "http_requests_total",
    "Total HTTP requests",
    &["method", "route", "status"],
);

pub const HTTP_REQUEST_DURATION_SECONDS: MetricDefinition = MetricDefinition::histogram(
    "http_request_duration_seconds",
    "HTTP request duration in seconds",
    &["method", "route"],
    REQUEST_DURATION_BUCKETS,
);

pub const HTTP_REQUESTS_ACTIVE: MetricDefinition =
    MetricDefinition::gauge("http_requests_active", "Number of active HTTP requests");

pub const BUSINESS_EVENTS_TOTAL: MetricDefinition = MetricDefinition::counter(
    "business_events_total",
    "Total business events",
    &["event_type"],
);

pub const APPLICATION_ERRORS_TOTAL: MetricDefinition = MetricDefinition::counter(
    "application_errors_total",
    "Total application errors",
    &["error_type"],
);

/// Domain events recorded by route handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessEvent {
    DataRequest,
    SlowRequest,
    ErrorTest,
}

impl BusinessEvent {
    pub const ALL: [BusinessEvent; 3] = [
        BusinessEvent::DataRequest,
        BusinessEvent::SlowRequest,
        BusinessEvent::ErrorTest,
    ];

    /// Value of the `event_type` label.
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessEvent::DataRequest => "data_request",
            BusinessEvent::SlowRequest => "slow_request",
            BusinessEvent::ErrorTest => "error_test",
        }
    }
}

/// Failure categories recorded in `application_errors_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RandomError,
    NotFound,
    InternalError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 3] = [
        ErrorKind::RandomError,
        ErrorKind::NotFound,
        ErrorKind::InternalError,
    ];

    /// Value of the `error_type` label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RandomError => "random_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

/// Abstraction for application metrics (counters, gauge, histogram).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> anyhow::Result<String>;

    /// Mark a request as in flight.
    fn track_request_start(&self);

    /// Complete a request started with `track_request_start`: release the
    /// in-flight slot and record duration and count.
    fn record_http_request(&self, start: Instant, route: &str, method: &str, status: u16);

    /// Record a business event.
    fn record_business_event(&self, event: BusinessEvent);

    /// Record an application error.
    fn record_error(&self, kind: ErrorKind);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
