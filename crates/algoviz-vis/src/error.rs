//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] algoviz_engine::Error),

    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Status code sent for this error.
    pub fn status(&self) -> StatusCode {
        use algoviz_engine::Error;

        match self {
            ApiError::Engine(Error::RunInProgress | Error::NoActiveRun) => StatusCode::CONFLICT,
            ApiError::Engine(Error::Spawn(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Engine(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
