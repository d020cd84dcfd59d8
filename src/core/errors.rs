// Domain error types - Secure error handling with no information disclosure

use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed request body or path parameter (HTTP 400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid credentials (HTTP 401)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Authenticated caller is not the resource owner (HTTP 403)
    #[error("Caller is not the owner of this group")]
    OwnershipViolation,

    /// Requested resource does not exist (HTTP 404)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Store-layer failure (HTTP 500)
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ServiceError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::Authentication(_) => 401,
            ServiceError::OwnershipViolation => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Database(_) => 500,
            ServiceError::Configuration(_) => 500,
        }
    }

    /// Get user-friendly error message (no sensitive information)
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Validation(reason) => reason.clone(),
            ServiceError::Authentication(reason) => reason.clone(),
            ServiceError::OwnershipViolation => "Not the owner of this group".to_string(),
            ServiceError::NotFound(resource) => format!("{} not found", resource),
            ServiceError::Database(_) => "Internal error".to_string(),
            ServiceError::Configuration(_) => "Internal error".to_string(),
        }
    }
}
