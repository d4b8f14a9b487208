mod error;
mod metrics;

pub use error::MetricsError;

// Publicly expose the Metrics abstraction and the metric catalog
pub use metrics::{
    BusinessEvent, ErrorKind, MetricDefinition, MetricKind, Metrics, MetricsPtr,
    APPLICATION_ERRORS_TOTAL, BUSINESS_EVENTS_TOTAL, HTTP_REQUESTS_ACTIVE,
    HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS, REQUEST_DURATION_BUCKETS,
};
