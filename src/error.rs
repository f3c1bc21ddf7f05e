//! Errors that reach the HTTP boundary.
//!
//! Every variant renders as a status code plus a `{"message": ...}` body.
//! Internal faults are logged here and never leak their cause to the client.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    /// Set for validation errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, invalid or expired bearer token.
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Same text for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User already exists")]
    DuplicateEmail,

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// Missing record or record owned by someone else.
    #[error("Expense not found or user unauthorized")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::DuplicateEmail | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Internal(e) => {
                error!(error = ?e, "internal error");
                ErrorBody {
                    message: "Server Error".to_string(),
                    field: None,
                }
            }
            ApiError::Validation { field, message } => {
                warn!(%field, %message, "validation failed");
                ErrorBody {
                    message,
                    field: Some(field),
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                field: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation("query", rejection.body_text())
    }
}

/// Path segments here are record ids; one that cannot be read names no record.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "path rejected");
        ApiError::NotFound
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
