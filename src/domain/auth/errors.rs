//! Authentication domain errors

use thiserror::Error;

/// Authentication-specific domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials provided")]
    InvalidCredentials,

    #[error("Invalid token provided")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Username or email already exists")]
    UserAlreadyExists,

    #[error("Invalid username: {reason}")]
    InvalidUsername { reason: String },

    #[error("Invalid email format: {email}")]
    InvalidEmail { email: String },

    #[error("Password does not meet requirements: {reason}")]
    WeakPassword { reason: String },

    #[error("Failed to process password")]
    PasswordHashing,

    #[error("Database error: {message}")]
    Database { message: String },
}
