use thiserror::Error;

/// Errors raised while registering or rendering metrics.
///
/// Registration errors are startup-time failures: a process must not keep
/// serving with an ambiguous metric namespace.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric `{0}` is already registered")]
    DuplicateMetricName(String),

    #[error("metric `{name}` is a {actual}, not a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("metric `{name}` has labels {labels:?}, which a {kind} handle cannot carry")]
    LabelMismatch {
        name: String,
        kind: &'static str,
        labels: Vec<String>,
    },

    #[error("exposition output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Prometheus(#[from] prometheus::Error),
}
