//! API error mapping.
//!
//! Engine validation failures become 400, unknown ids 404, anything else 500.
//! Every error body is `{ "error": message }`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;
use upkeep_common::api::ErrorBody;
use upkeep_common::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid request body: {0}")]
    BadBody(String),

    #[error("invalid query string: {0}")]
    BadQuery(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(EngineError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::BadBody(_) | ApiError::BadQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadQuery(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("  Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(EngineError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(EngineError::not_found("Reminder", "r1")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadBody("eof".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_engine_message_passes_through() {
        let err = ApiError::from(EngineError::validation("title is required"));
        assert_eq!(err.to_string(), EngineError::validation("title is required").to_string());
    }
}
