use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Too many requests: {0}")]
    TooManyRequests(String, Option<u64>),

    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        message: String,
        details: Option<Value>,
        retry_after: Option<u64>,
    },

    #[error("Upstream error: {message}")]
    UpstreamError {
        message: String,
        details: Option<Value>,
    },

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// First human-readable message attached to any field of a failed validation.
fn first_validation_message(err: &validator::ValidationErrors) -> Option<String> {
    err.field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<Value>,
        }

        let (status, error_message, details, retry_after) = match self {
            AppError::ValidationError(err) => (
                StatusCode::BAD_REQUEST,
                first_validation_message(&err).unwrap_or_else(|| "Validation error".to_string()),
                None,
                None,
            ),
            AppError::TooManyRequests(msg, retry) => {
                (StatusCode::TOO_MANY_REQUESTS, msg, None, retry)
            }
            AppError::ServiceUnavailable {
                message,
                details,
                retry_after,
            } => (StatusCode::SERVICE_UNAVAILABLE, message, details, retry_after),
            AppError::UpstreamError { message, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, details, None)
            }
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(Value::String(format!("{:#}", err))),
                None,
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(Value::String(err.to_string())),
                None,
            ),
        };

        let mut res = (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response();

        if let Some(retry) = retry_after {
            res.headers_mut()
                .insert(axum::http::header::RETRY_AFTER, retry.into());
        }

        res
    }
}
