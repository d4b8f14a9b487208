use crate::app_state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    /// Milliseconds since the Unix epoch.
    timestamp: i64,
    /// Seconds since the service started.
    uptime: f64,
}

/// Responds with the health status of the server.
///
/// There are no backing services to probe, so a response at all means the
/// process is healthy.
///
/// # Responses
/// - `200 OK` with `{ "status": "healthy", "timestamp": <epoch ms>, "uptime": <seconds> }`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // ---
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().timestamp_millis(),
        uptime: state.uptime_secs(),
    })
}
