// --- File: crates/optibook_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for Optibook application errors.
///
/// Each crate converts its specific errors into this enum at the HTTP boundary.
#[derive(Error, Debug)]
pub enum OptibookError {
    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for OptibookError {
    fn status_code(&self) -> u16 {
        match self {
            OptibookError::ConfigError(_) => 500,
            OptibookError::ValidationError(_) => 400,
            OptibookError::ExternalServiceError { .. } => 502,
            OptibookError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, OptibookError>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, OptibookError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| OptibookError::InternalError(format!("{}: {}", context, error)))
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> OptibookError {
    OptibookError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> OptibookError {
    OptibookError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> OptibookError {
    OptibookError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
