use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Wrapper type for successful API responses.
///
/// Encapsulates the data payload and prepares it for JSON serialization.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self).into_response()
    }
}

/// JSON body of every error response.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// Response extension marking a 500 produced from an unhandled error.
///
/// The request-metrics middleware counts responses carrying it as
/// `internal_error`, so handlers never record that category themselves.
#[derive(Debug, Clone, Copy)]
pub struct UnhandledError;

/// Errors a handler can surface to the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Deliberately injected failure of the error-test endpoint.
    #[error("Random error occurred")]
    SimulatedFailure,

    #[error("Not found")]
    NotFound,

    /// Anything unexpected. The cause is logged, never sent to the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        match self {
            AppError::SimulatedFailure => (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(ErrorBody {
                    error: "Random error occurred",
                }),
            )
                .into_response(),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                axum::Json(ErrorBody { error: "Not found" }),
            )
                .into_response(),
            AppError::Internal(err) => {
                tracing::error!("Internal error: {err:#}");
                let mut response = (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(ErrorBody {
                        error: "Internal server error",
                    }),
                )
                    .into_response();
                response.extensions_mut().insert(UnhandledError);
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_internal_errors_are_flagged() {
        // ---
        let simulated = AppError::SimulatedFailure.into_response();
        assert_eq!(simulated.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(simulated.extensions().get::<UnhandledError>().is_none());

        let not_found = AppError::NotFound.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert!(not_found.extensions().get::<UnhandledError>().is_none());

        let internal = AppError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(internal.extensions().get::<UnhandledError>().is_some());
    }
}
