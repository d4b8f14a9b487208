use crate::app_state::AppState;
use crate::handlers::shared_types::AppError;
use crate::infrastructure::EXPOSITION_CONTENT_TYPE;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// Handler for the `/metrics` endpoint.
///
/// Returns metrics in Prometheus text format for scraping.
/// Uses the metrics implementation from AppState, which could be
/// either Prometheus or no-op depending on configuration.
/// Rendering only reads metric values, so concurrent scrapes are safe.
/// A render failure is an unhandled error: generic 500, cause logged.
pub async fn metrics_handler(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    // ---

    let metrics_text = app_state
        .metrics()
        .render()
        .map_err(|err| AppError::Internal(err.context("Failed to render metrics")))?;

    Ok((
        StatusCode::OK,
        [("content-type", EXPOSITION_CONTENT_TYPE)],
        metrics_text,
    ))
}
