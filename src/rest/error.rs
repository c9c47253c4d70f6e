// rest/error.rs — API error taxonomy.
//
// Each variant knows its HTTP status; `IntoResponse` turns it into the JSON
// error envelope `{ error, details? }`. Handlers return `Result<_, ApiError>`
// and never build error responses by hand.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown resource or a malformed item path for the method.
    #[error("route not found")]
    RouteNotFound,
    /// The id segment of the path is not an integer.
    #[error("invalid task id")]
    InvalidId,
    /// Bad request body: malformed JSON, missing title, empty update.
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<String>,
    },
    /// Well-formed id with no matching record.
    #[error("task not found")]
    TaskNotFound,
    /// Underlying I/O failure. Fatal for the request, never retried.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound | Self::TaskNotFound => StatusCode::NOT_FOUND,
            Self::InvalidId | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Storage(e) = &self {
            tracing::error!(err = %e, "storage operation failed");
        }
        let body = match &self {
            Self::Validation {
                message,
                details: Some(details),
            } => json!({ "error": message, "details": details }),
            other => json!({ "error": other.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}
