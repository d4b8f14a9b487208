//! Request metrics middleware.
//!
//! Every inbound request is wrapped in an [`InFlightRequest`] guard: the
//! active-requests gauge goes up when the guard is created and the request
//! is completed (gauge down, duration observed, request counted) when the
//! guard is dropped. Dropping happens on every exit path, including a
//! handler panic and the request future being dropped because the client
//! went away.

use crate::app_state::AppState;
use crate::domain::{ErrorKind, MetricsPtr};
use crate::handlers::{AppError, UnhandledError};
use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;
use std::time::Instant;

/// Status recorded for requests that ended without a response.
pub const ABORTED_STATUS: u16 = 0;

/// Route label assigned once the unmatched-path budget is spent.
pub const OVERFLOW_ROUTE: &str = "__other__";

/// Axum middleware that records request metrics.
///
/// For each request, this records:
/// - `http_requests_active` - incremented on entry, decremented on completion
/// - `http_request_duration_seconds{method, route}` - latency in seconds
/// - `http_requests_total{method, route, status}` - incremented by 1
///
/// Panics escaping a handler are turned into a generic 500 response here,
/// and any response flagged as an unhandled error is counted as
/// `application_errors_total{error_type="internal_error"}`.
pub(crate) async fn track_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    let method = request.method().as_str().to_owned();

    // Prefer the matched route template so path parameters do not become labels.
    let route = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => state.route_labels().resolve(request.uri().path()),
    };

    let in_flight = InFlightRequest::start(state.metrics().clone(), method, route);

    let response = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => AppError::Internal(anyhow::anyhow!(
            "handler panicked: {}",
            panic_message(panic.as_ref())
        ))
        .into_response(),
    };

    if response.extensions().get::<UnhandledError>().is_some() {
        state.metrics().record_error(ErrorKind::InternalError);
    }

    in_flight.finish(response.status());
    response
}

/// Scoped in-flight request context.
///
/// Consumed exactly once: either through [`InFlightRequest::finish`] or,
/// if the owning future is dropped first, by `Drop` with [`ABORTED_STATUS`].
struct InFlightRequest {
    metrics: MetricsPtr,
    start: Instant,
    method: String,
    route: String,
    status: Option<StatusCode>,
}

impl InFlightRequest {
    fn start(metrics: MetricsPtr, method: String, route: String) -> Self {
        // ---
        metrics.track_request_start();
        Self {
            metrics,
            start: Instant::now(),
            method,
            route,
            status: None,
        }
    }

    fn finish(mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for InFlightRequest {
    fn drop(&mut self) {
        // ---
        let status = match self.status {
            Some(status) => status.as_u16(),
            None => {
                tracing::warn!(
                    method = %self.method,
                    route = %self.route,
                    "Request dropped before a response was produced"
                );
                ABORTED_STATUS
            }
        };
        self.metrics
            .record_http_request(self.start, &self.route, &self.method, status);
    }
}

/// Resolves `route` label values for requests no route matched.
///
/// Raw paths are used as-is until `max_values` distinct paths have been
/// seen; every later unseen path maps to [`OVERFLOW_ROUTE`].
pub struct RouteLabeler {
    known: Mutex<HashSet<String>>,
    max_values: usize,
}

impl RouteLabeler {
    pub fn new(max_values: usize) -> Self {
        Self {
            known: Mutex::new(HashSet::new()),
            max_values,
        }
    }

    pub fn resolve(&self, path: &str) -> String {
        // ---
        let mut known = self.known.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if known.contains(path) {
            path.to_owned()
        } else if known.len() < self.max_values {
            known.insert(path.to_owned());
            path.to_owned()
        } else {
            OVERFLOW_ROUTE.to_owned()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::config::SimulationConfig;
    use crate::infrastructure::create_prom_metrics;
    use axum::{body::Body, http::Request as HttpRequest, routing::get, Router};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_app() -> (Router, MetricsPtr) {
        // ---
        let metrics = create_prom_metrics(false).unwrap();
        let state = AppState::new(metrics.clone(), RouteLabeler::new(2), SimulationConfig::default());

        let app = Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/items/{id}", get(|| async { "item" }))
            .route("/panic", get(panics))
            .route("/fail", get(fails))
            .route("/hang", get(hangs))
            .layer(axum::middleware::from_fn_with_state(state.clone(), track_requests))
            .with_state(state);

        (app, metrics)
    }

    async fn panics() -> &'static str {
        panic!("boom")
    }

    async fn fails() -> Result<&'static str, AppError> {
        Err(AppError::Internal(anyhow::anyhow!("db gone")))
    }

    async fn hangs() -> &'static str {
        tokio::time::sleep(Duration::from_secs(30)).await;
        "late"
    }

    fn get_request(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn records_matched_route_template() {
        // ---
        let (app, metrics) = test_app();

        let res = app.clone().oneshot(get_request("/items/42")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        app.oneshot(get_request("/items/43")).await.unwrap();

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"http_requests_total{method="GET",route="/items/{id}",status="200"} 2"#));
        assert!(text.contains("http_requests_active 0"));
    }

    #[tokio::test]
    async fn panicking_handler_becomes_internal_error() {
        // ---
        let (app, metrics) = test_app();

        let res = app.clone().oneshot(get_request("/panic")).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");

        // The service keeps serving after a panic.
        let res = app.oneshot(get_request("/ok")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"application_errors_total{error_type="internal_error"} 1"#));
        assert!(text.contains(r#"http_requests_total{method="GET",route="/panic",status="500"} 1"#));
        assert!(text.contains("http_requests_active 0"));
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        // ---
        let (app, metrics) = test_app();

        let res = app.oneshot(get_request("/fail")).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("db gone"));

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"application_errors_total{error_type="internal_error"} 1"#));
    }

    #[tokio::test]
    async fn dropped_request_still_completes() {
        // ---
        let (app, metrics) = test_app();

        let pending = app.oneshot(get_request("/hang"));
        let outcome = tokio::time::timeout(Duration::from_millis(50), pending).await;
        assert!(outcome.is_err(), "request should still be pending");

        let text = metrics.render().unwrap();
        assert!(text.contains("http_requests_active 0"));
        assert!(text.contains(r#"http_requests_total{method="GET",route="/hang",status="0"} 1"#));
        assert!(text.contains(r#"http_request_duration_seconds_count{method="GET",route="/hang"} 1"#));
    }

    #[tokio::test]
    async fn unmatched_paths_are_capped() {
        // ---
        let (app, metrics) = test_app();

        for uri in ["/a", "/b", "/c", "/d", "/a"] {
            let res = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
        }

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"http_requests_total{method="GET",route="/a",status="404"} 2"#));
        assert!(text.contains(r#"http_requests_total{method="GET",route="/b",status="404"} 1"#));
        assert!(text.contains(r#"http_requests_total{method="GET",route="__other__",status="404"} 2"#));
        assert!(!text.contains(r#"route="/c""#));
    }

    #[test]
    fn route_labeler_keeps_known_paths_after_overflow() {
        // ---
        let labeler = RouteLabeler::new(1);
        assert_eq!(labeler.resolve("/x"), "/x");
        assert_eq!(labeler.resolve("/y"), OVERFLOW_ROUTE);
        assert_eq!(labeler.resolve("/x"), "/x");
    }
}
