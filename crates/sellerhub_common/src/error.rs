// --- File: crates/sellerhub_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all sellerhub errors.
///
/// Each crate keeps its own error enum and implements `From<CrateError> for SellerHubError`;
/// this is the shape the HTTP boundary renders.
#[derive(Error, Debug)]
pub enum SellerHubError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Caller supplied malformed input
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The remote service answered with an application-level failure
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// The caller went away before the operation finished
    #[error("Cancelled: {0}")]
    CancelledError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for SellerHubError {
    fn status_code(&self) -> u16 {
        match self {
            SellerHubError::HttpError(_) => 502,
            SellerHubError::ParseError(_) => 502,
            SellerHubError::ConfigError(_) => 500,
            SellerHubError::ValidationError(_) => 400,
            SellerHubError::DatabaseError(_) => 500,
            SellerHubError::ExternalServiceError { .. } => 502,
            SellerHubError::ConflictError(_) => 409,
            SellerHubError::NotFoundError(_) => 404,
            SellerHubError::TimeoutError(_) => 504,
            // nginx's "client closed request"
            SellerHubError::CancelledError(_) => 499,
            SellerHubError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, SellerHubError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, SellerHubError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, SellerHubError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| SellerHubError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, SellerHubError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| SellerHubError::InternalError(format!("{}: {}", f(), error)))
    }
}

// Common error conversions
impl From<reqwest::Error> for SellerHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SellerHubError::TimeoutError(err.to_string())
        } else {
            SellerHubError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SellerHubError {
    fn from(err: serde_json::Error) -> Self {
        SellerHubError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for SellerHubError {
    fn from(err: std::io::Error) -> Self {
        SellerHubError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> SellerHubError {
    SellerHubError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> SellerHubError {
    SellerHubError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> SellerHubError {
    SellerHubError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> SellerHubError {
    SellerHubError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> SellerHubError {
    SellerHubError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_boundary_mapping() {
        assert_eq!(not_found("shop 1").status_code(), 404);
        assert_eq!(validation_error("bad id").status_code(), 400);
        assert_eq!(external_service_error("Shopee", "error_auth").status_code(), 502);
        assert_eq!(SellerHubError::TimeoutError("slow".into()).status_code(), 504);
        assert_eq!(SellerHubError::DatabaseError("disk".into()).status_code(), 500);
    }

    #[test]
    fn context_wraps_source_message() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = result.context("binding listener").unwrap_err();
        assert_eq!(err.to_string(), "Internal error: binding listener: boom");
    }
}
