// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The identity provider rejected the request; carries its message.
    #[error("{0}")]
    Identity(String),

    /// The identity provider could not be reached or answered garbage.
    #[error("Identity provider unavailable: {0}")]
    IdentityUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Provider message when the e-mail/password login method is switched off.
    pub const EMAIL_LOGINS_DISABLED: &'static str = "Email logins are disabled";
    /// Provider message for a wrong e-mail/password pair.
    pub const INVALID_CREDENTIALS: &'static str = "Invalid login credentials";

    /// Whether this is the provider refusing password login altogether.
    pub fn is_email_login_disabled(&self) -> bool {
        match self {
            AppError::Identity(msg) => msg
                .to_lowercase()
                .contains(&Self::EMAIL_LOGINS_DISABLED.to_lowercase()),
            _ => false,
        }
    }

    /// Whether this is the provider rejecting the supplied credentials.
    pub fn is_invalid_credentials(&self) -> bool {
        match self {
            AppError::Identity(msg) => msg
                .to_lowercase()
                .contains(&Self::INVALID_CREDENTIALS.to_lowercase()),
            _ => false,
        }
    }

    /// Short message suitable for an inline form error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Identity(msg) | AppError::BadRequest(msg) | AppError::Conflict(msg) => {
                msg.clone()
            }
            AppError::IdentityUnavailable(_) => {
                "Authentication service unavailable. Please try again.".to_string()
            }
            AppError::Database(_) | AppError::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Identity(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::IdentityUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (error, details) = match &self {
            AppError::Unauthorized => ("unauthorized", None),
            AppError::InvalidToken => ("invalid_token", None),
            AppError::Forbidden(msg) => ("forbidden", Some(msg.clone())),
            AppError::NotFound(msg) => ("not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => ("bad_request", Some(msg.clone())),
            AppError::Conflict(msg) => ("conflict", Some(msg.clone())),
            AppError::Identity(msg) => ("identity_error", Some(msg.clone())),
            AppError::IdentityUnavailable(msg) => {
                tracing::error!(error = %msg, "Identity provider unavailable");
                ("identity_unavailable", None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
