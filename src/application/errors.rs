//! Application-level errors

use thiserror::Error;

use crate::domain::auth::errors::AuthError;

/// Errors surfaced by application use cases
#[derive(Error, Debug, Clone)]
pub enum ApplicationError {
    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}
