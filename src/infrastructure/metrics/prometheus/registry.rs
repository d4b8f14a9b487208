//! Explicitly constructed Prometheus registry.
//!
//! Each `MetricRegistry` owns its own `prometheus::Registry`, so tests and
//! multiple application instances never share metric state. Definitions are
//! registered through typed constructors that check the definition's kind
//! and label set before handing back a handle.

use crate::domain::{MetricDefinition, MetricKind, MetricsError};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Instant;

/// Content type of the text exposition format produced by [`MetricRegistry::serialize`].
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub struct MetricRegistry {
    registry: Registry,
    names: Mutex<BTreeSet<&'static str>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        // ---
        Self {
            registry: Registry::new(),
            names: Mutex::new(BTreeSet::new()),
        }
    }

    /// Register a counter definition and return its labelled handle.
    pub fn counter_vec(&self, def: &MetricDefinition) -> Result<IntCounterVec, MetricsError> {
        // ---
        self.register(def, "counter", || {
            Ok(IntCounterVec::new(Opts::new(def.name, def.help), def.labels)?)
        })
    }

    /// Register an unlabelled gauge definition.
    pub fn gauge(&self, def: &MetricDefinition) -> Result<IntGauge, MetricsError> {
        // ---
        if !def.labels.is_empty() {
            return Err(MetricsError::LabelMismatch {
                name: def.name.to_string(),
                kind: "gauge",
                labels: def.labels.iter().map(|l| l.to_string()).collect(),
            });
        }
        self.register(def, "gauge", || {
            Ok(IntGauge::with_opts(Opts::new(def.name, def.help))?)
        })
    }

    /// Register a histogram definition with its bucket bounds.
    pub fn histogram_vec(&self, def: &MetricDefinition) -> Result<HistogramVec, MetricsError> {
        // ---
        let MetricKind::Histogram { buckets } = def.kind else {
            return Err(kind_mismatch(def, "histogram"));
        };
        self.register(def, "histogram", || {
            let opts = HistogramOpts::new(def.name, def.help).buckets(buckets.to_vec());
            Ok(HistogramVec::new(opts, def.labels)?)
        })
    }

    /// Register process-level default metrics: uptime everywhere, plus the
    /// prometheus process collector (CPU, memory, file descriptors) on Linux.
    pub fn register_process_metrics(&self) -> Result<(), MetricsError> {
        // ---
        self.registry.register(Box::new(UptimeCollector::new()?))?;

        #[cfg(target_os = "linux")]
        self.registry
            .register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))?;

        Ok(())
    }

    /// Render every registered metric in Prometheus text format.
    ///
    /// Read-only: gathering takes a snapshot of the atomic values and never
    /// resets them. Concurrent updates may or may not be reflected.
    pub fn serialize(&self) -> Result<String, MetricsError> {
        // ---
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn register<C, F>(
        &self,
        def: &MetricDefinition,
        expected: &'static str,
        build: F,
    ) -> Result<C, MetricsError>
    where
        C: Collector + Clone + 'static,
        F: FnOnce() -> Result<C, MetricsError>,
    {
        // ---
        if def.kind.as_str() != expected {
            return Err(kind_mismatch(def, expected));
        }

        let mut names = self.names.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if names.contains(def.name) {
            return Err(MetricsError::DuplicateMetricName(def.name.to_string()));
        }

        let collector = build()?;
        self.registry
            .register(Box::new(collector.clone()))
            .map_err(|err| match err {
                prometheus::Error::AlreadyReg => {
                    MetricsError::DuplicateMetricName(def.name.to_string())
                }
                other => MetricsError::Prometheus(other),
            })?;
        names.insert(def.name);

        tracing::debug!(metric = def.name, kind = expected, "Registered metric");
        Ok(collector)
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_mismatch(def: &MetricDefinition, expected: &'static str) -> MetricsError {
    MetricsError::KindMismatch {
        name: def.name.to_string(),
        expected,
        actual: def.kind.as_str(),
    }
}

/// Reports seconds since the collector was created, computed at scrape time.
struct UptimeCollector {
    started: Instant,
    gauge: Gauge,
}

impl UptimeCollector {
    fn new() -> Result<Self, MetricsError> {
        // ---
        let gauge = Gauge::with_opts(Opts::new(
            "process_uptime_seconds",
            "Seconds since the metrics registry was created",
        ))?;
        Ok(Self {
            started: Instant::now(),
            gauge,
        })
    }
}

impl Collector for UptimeCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.gauge.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.gauge.set(self.started.elapsed().as_secs_f64());
        self.gauge.collect()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::{BUSINESS_EVENTS_TOTAL, HTTP_REQUESTS_ACTIVE, HTTP_REQUEST_DURATION_SECONDS};

    #[test]
    fn duplicate_name_is_rejected() {
        // ---
        let registry = MetricRegistry::new();
        registry.counter_vec(&BUSINESS_EVENTS_TOTAL).unwrap();

        let err = registry.counter_vec(&BUSINESS_EVENTS_TOTAL).err().unwrap();
        assert!(matches!(err, MetricsError::DuplicateMetricName(ref name) if name == "business_events_total"));
    }

    #[test]
    fn duplicate_name_with_different_shape_is_rejected() {
        // ---
        let registry = MetricRegistry::new();
        registry.counter_vec(&BUSINESS_EVENTS_TOTAL).unwrap();

        let clash = MetricDefinition::counter("business_events_total", "Other help", &["kind"]);
        let err = registry.counter_vec(&clash).err().unwrap();
        assert!(matches!(err, MetricsError::DuplicateMetricName(_)));
    }

    #[test]
    fn wrong_handle_kind_is_rejected() {
        // ---
        let registry = MetricRegistry::new();

        let err = registry.counter_vec(&HTTP_REQUEST_DURATION_SECONDS).err().unwrap();
        assert!(matches!(
            err,
            MetricsError::KindMismatch { expected: "counter", actual: "histogram", .. }
        ));

        let err = registry.histogram_vec(&HTTP_REQUESTS_ACTIVE).err().unwrap();
        assert!(matches!(err, MetricsError::KindMismatch { expected: "histogram", .. }));
    }

    #[test]
    fn labelled_gauge_is_rejected() {
        // ---
        let registry = MetricRegistry::new();
        let def = MetricDefinition {
            labels: &["queue"],
            ..MetricDefinition::gauge("queue_depth", "Queue depth")
        };

        let err = registry.gauge(&def).err().unwrap();
        assert!(matches!(err, MetricsError::LabelMismatch { kind: "gauge", .. }));
    }

    #[test]
    fn failed_registration_does_not_reserve_name() {
        // ---
        let registry = MetricRegistry::new();
        let bad = MetricDefinition::counter("bad name", "Invalid metric name", &[]);
        assert!(registry.counter_vec(&bad).is_err());
        assert!(registry.counter_vec(&bad).is_err());

        let good = MetricDefinition::counter("good_total", "Valid", &["kind"]);
        assert!(registry.counter_vec(&good).is_ok());
    }

    #[test]
    fn serialize_renders_labelled_series() {
        // ---
        let registry = MetricRegistry::new();
        let events = registry.counter_vec(&BUSINESS_EVENTS_TOTAL).unwrap();
        events.with_label_values(&["data_request"]).inc_by(2);

        let text = registry.serialize().unwrap();
        assert!(text.contains("# HELP business_events_total Total business events"));
        assert!(text.contains("# TYPE business_events_total counter"));
        assert!(text.contains(r#"business_events_total{event_type="data_request"} 2"#));
    }

    #[test]
    fn histogram_observation_fills_cumulative_buckets() {
        // ---
        let registry = MetricRegistry::new();
        let hist = registry.histogram_vec(&HTTP_REQUEST_DURATION_SECONDS).unwrap();
        hist.with_label_values(&["GET", "/x"]).observe(0.3);

        let text = registry.serialize().unwrap();
        assert!(text.contains(r#"http_request_duration_seconds_bucket{method="GET",route="/x",le="0.25"} 0"#));
        assert!(text.contains(r#"http_request_duration_seconds_bucket{method="GET",route="/x",le="0.5"} 1"#));
        assert!(text.contains(r#"http_request_duration_seconds_bucket{method="GET",route="/x",le="+Inf"} 1"#));
        assert!(text.contains(r#"http_request_duration_seconds_count{method="GET",route="/x"} 1"#));
    }

    #[test]
    fn serialize_is_read_only() {
        // ---
        let registry = MetricRegistry::new();
        let events = registry.counter_vec(&BUSINESS_EVENTS_TOTAL).unwrap();
        let active = registry.gauge(&HTTP_REQUESTS_ACTIVE).unwrap();
        events.with_label_values(&["slow_request"]).inc();
        active.set(3);

        let first = registry.serialize().unwrap();
        let second = registry.serialize().unwrap();
        assert_eq!(first, second);
        assert_eq!(active.get(), 3);
    }

    #[test]
    fn process_metrics_include_uptime() {
        // ---
        let registry = MetricRegistry::new();
        registry.register_process_metrics().unwrap();

        let text = registry.serialize().unwrap();
        assert!(text.contains("# TYPE process_uptime_seconds gauge"));
    }
}
