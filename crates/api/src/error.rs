//! Translation of pipeline failures into HTTP responses.
//!
//! Bodies never carry internal details. Each error response gets a fresh
//! trace id that is also written to the server log next to the real cause.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use manual_core::{AppError, FieldError};
use uuid::Uuid;

use crate::dto::ApiErrorResponse;

pub const VALIDATION_FAILED: &str = "Validation failed";
pub const SEARCH_UNAVAILABLE: &str = "Search is temporarily unavailable. Please try again later.";
pub const ANSWER_UNAVAILABLE: &str = "Answer could not be generated. Please try again later.";
pub const INTERNAL_ERROR: &str = "Internal error.";

/// Error type returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request body failed validation
    Validation(Vec<FieldError>),

    /// Failure raised by the answer pipeline
    App(AppError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::App(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::App(AppError::Retrieval(_)) | ApiError::App(AppError::Generation(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::App(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => VALIDATION_FAILED,
            ApiError::App(AppError::Retrieval(_)) => SEARCH_UNAVAILABLE,
            ApiError::App(AppError::Generation(_)) => ANSWER_UNAVAILABLE,
            ApiError::App(_) => INTERNAL_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let trace_id = Uuid::new_v4().to_string();

        match &self {
            ApiError::Validation(errors) => {
                tracing::debug!(trace_id = %trace_id, errors = errors.len(), "Request rejected");
            }
            ApiError::App(err) if err.is_downstream() => {
                tracing::warn!(trace_id = %trace_id, error = %err, "Downstream failure");
            }
            ApiError::App(err) => {
                tracing::error!(trace_id = %trace_id, error = %err, "Request failed");
            }
        }

        let message = self.public_message().to_string();
        let field_errors = match self {
            ApiError::Validation(errors) => Some(errors),
            ApiError::App(_) => None,
        };

        let body = ApiErrorResponse {
            status: status.as_u16(),
            message,
            trace_id,
            field_errors,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Validation(vec![]), StatusCode::BAD_REQUEST, VALIDATION_FAILED),
            (
                ApiError::App(AppError::Retrieval("qdrant down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
                SEARCH_UNAVAILABLE,
            ),
            (
                ApiError::App(AppError::Generation("timeout".into())),
                StatusCode::SERVICE_UNAVAILABLE,
                ANSWER_UNAVAILABLE,
            ),
            (
                ApiError::App(AppError::Prompt("bad template".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR,
            ),
        ];

        for (err, status, message) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.public_message(), message);
        }
    }

    #[test]
    fn test_app_validation_becomes_field_errors() {
        let err = ApiError::from(AppError::Validation(vec![FieldError::new("id", "blank")]));
        assert!(matches!(err, ApiError::Validation(ref e) if e.len() == 1));
    }
}
