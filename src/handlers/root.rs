use axum::Json;
use serde::Serialize;

/// Endpoints advertised by the root handler.
const ENDPOINTS: [&str; 5] = ["/metrics", "/health", "/api/data", "/api/slow", "/api/error"];

#[derive(Debug, Serialize)]
pub struct RootResponse {
    message: &'static str,
    version: &'static str,
    endpoints: [&'static str; 5],
}

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to the monitored Rust application",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}
