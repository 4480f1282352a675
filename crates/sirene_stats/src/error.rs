//! Error types for the statistics API server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// A specialized `Result` type for statistics API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type for all operations within the statistics API server.
#[derive(Debug, Error)]
pub enum Error {
    /// No bearer token was supplied with the request.
    #[error("Bearer token required")]
    MissingToken,

    /// The introspection server reported the token as inactive.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The introspection call could not be completed.
    #[error("OAuth2 server unavailable: {0}")]
    IntrospectionUnavailable(String),

    /// The upstream data engine could not produce a dataset.
    ///
    /// The snapshot cache absorbs this error and serves placeholder data,
    /// so it does not normally reach a client.
    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),

    /// The server configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An unexpected internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// An error from the underlying I/O system.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The standard JSON response body for an API error.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// A human-readable error message.
    pub error: String,
    /// A machine-readable error code string.
    pub code: String,
    /// Optional additional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Error {
    /// Returns the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingToken => StatusCode::UNAUTHORIZED,
            Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::IntrospectionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingToken => "MISSING_TOKEN",
            Error::InvalidToken => "INVALID_TOKEN",
            Error::IntrospectionUnavailable(_) => "INTROSPECTION_UNAVAILABLE",
            Error::SourceUnavailable(_) => "SOURCE_UNAVAILABLE",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
            details: None,
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_are_unauthorized() {
        assert_eq!(Error::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_introspection_outage_is_distinct_from_invalid_token() {
        let outage = Error::IntrospectionUnavailable("connection refused".into());
        assert_eq!(outage.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_ne!(outage.error_code(), Error::InvalidToken.error_code());
    }

    #[test]
    fn test_error_response_status() {
        let response = Error::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = Error::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
