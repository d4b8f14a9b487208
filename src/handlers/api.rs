//! Demo API endpoints with simulated latency and failures.

use crate::app_state::AppState;
use crate::domain::{BusinessEvent, ErrorKind};
use crate::handlers::shared_types::{ApiResponse, AppError};
use axum::{extract::State, Json};
use rand::Rng;
use serde::Serialize;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Number of items returned by `/api/data`.
const DATA_POINTS: u32 = 10;

#[derive(Debug, Serialize)]
pub struct DataPoint {
    id: u32,
    value: u32,
}

#[derive(Debug, Serialize)]
pub struct SlowResponse {
    processed: bool,
    duration: f64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    success: bool,
}

/// Handler for `GET /api/data`.
///
/// Waits a short random delay, then returns ten `{id, value}` objects with
/// random values in `1..=100`.
#[tracing::instrument(skip(state))]
pub async fn get_data(State(state): State<AppState>) -> ApiResponse<Vec<DataPoint>> {
    // ---
    state.metrics().record_business_event(BusinessEvent::DataRequest);

    let delay = random_delay(&state.simulation().data_delay);
    tokio::time::sleep(delay).await;

    let mut rng = rand::thread_rng();
    let data = (0..DATA_POINTS)
        .map(|id| DataPoint {
            id,
            value: rng.gen_range(1..=100),
        })
        .collect();

    ApiResponse { data }
}

/// Handler for `GET /api/slow`.
///
/// Simulates slow processing. The sleep is cancelled together with the
/// request if the client disconnects.
#[tracing::instrument(skip(state))]
pub async fn slow_endpoint(State(state): State<AppState>) -> Json<SlowResponse> {
    // ---
    state.metrics().record_business_event(BusinessEvent::SlowRequest);

    let delay = random_delay(&state.simulation().slow_delay);
    tokio::time::sleep(delay).await;

    Json(SlowResponse {
        processed: true,
        duration: delay.as_secs_f64(),
    })
}

/// Handler for `GET /api/error`.
///
/// Fails with probability `error_rate`, responding `500` and counting a
/// `random_error`; otherwise responds `{"success": true}`.
#[tracing::instrument(skip(state))]
pub async fn error_endpoint(State(state): State<AppState>) -> Result<Json<SuccessResponse>, AppError> {
    // ---
    state.metrics().record_business_event(BusinessEvent::ErrorTest);

    let failed = rand::thread_rng().gen_bool(state.simulation().error_rate);
    if failed {
        state.metrics().record_error(ErrorKind::RandomError);
        tracing::error!("Random error occurred");
        return Err(AppError::SimulatedFailure);
    }

    Ok(Json(SuccessResponse { success: true }))
}

/// Fallback for requests no route matched.
pub async fn not_found(State(state): State<AppState>) -> AppError {
    // ---
    state.metrics().record_error(ErrorKind::NotFound);
    AppError::NotFound
}

fn random_delay(range: &RangeInclusive<Duration>) -> Duration {
    // ---
    if range.start() >= range.end() {
        return *range.start();
    }
    rand::thread_rng().gen_range(range.clone())
}
