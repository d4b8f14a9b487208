use crate::domain::{BusinessEvent, ErrorKind, Metrics};
use std::time::Instant;

/// No-op metrics implementation for testing or when metrics are disabled.
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> anyhow::Result<String> {
        Ok(String::new())
    }
    fn track_request_start(&self) {}
    fn record_http_request(&self, _: Instant, _: &str, _: &str, _: u16) {}
    fn record_business_event(&self, _: BusinessEvent) {}
    fn record_error(&self, _: ErrorKind) {}
}
