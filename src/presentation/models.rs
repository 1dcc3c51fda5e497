//! API request/response DTOs and the JSON response envelope
//!
//! Every response uses one of two shapes:
//! `{"success": true, "message", "data"}` or
//! `{"success": false, "error": {"code", "message", "details"}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::errors::ApplicationError;
use crate::domain::auth::entities::User;
use crate::domain::auth::errors::AuthError;

/// Success envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Always true on this shape
    pub success: bool,
    /// Human-readable outcome description
    pub message: String,
    /// Operation payload
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Error detail carried inside the error envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Stable machine-readable error code
    #[schema(example = "RATE_LIMIT_EXCEEDED")]
    pub code: String,
    /// Human-readable error message
    #[schema(example = "Rate limit exceeded")]
    pub message: String,
    /// Additional context for the caller
    #[schema(example = "Too many requests from your IP address")]
    pub details: Option<String>,
}

/// Error envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false on this shape
    pub success: bool,
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details,
            },
        }
    }
}

/// Register new user request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Login name (3-30 characters, letters, digits, `_` and `-`)
    #[schema(example = "newuser")]
    pub username: String,
    /// User email address
    #[schema(example = "newuser@example.com")]
    pub email: String,
    /// Password (8-72 characters with upper, lower, digit and special)
    #[schema(example = "Secur3!password")]
    pub password: String,
}

/// Login request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name
    #[schema(example = "newuser")]
    pub username: String,
    /// Password
    #[schema(example = "Secur3!password")]
    pub password: String,
}

/// Refresh token request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    /// Refresh token issued at login
    pub refresh_token: String,
}

/// Safe user view, never includes the password hash
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "newuser")]
    pub username: String,
    #[schema(example = "newuser@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.as_uuid(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

/// Token response DTO returned on login
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// JWT refresh token
    pub refresh_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token expiration time in seconds
    #[schema(example = 3600)]
    pub expires_in: u64,
    /// The authenticated user
    pub user: UserResponse,
}

/// Response DTO for token refresh
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    /// New JWT access token
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    #[schema(example = 3600)]
    pub expires_in: u64,
}

/// Current user profile, built from access token claims
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Health check response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", "degraded" or "error"
    #[schema(example = "ok")]
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Seconds since process start
    pub uptime_seconds: u64,
    /// Per-dependency status
    pub services: BTreeMap<String, String>,
}

impl ApplicationError {
    /// HTTP status and stable error code for this error
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApplicationError::Authentication(auth) => match auth {
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                }
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
                AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "USER_NOT_FOUND"),
                AuthError::UserAlreadyExists => (StatusCode::CONFLICT, "USER_ALREADY_EXISTS"),
                AuthError::InvalidUsername { .. }
                | AuthError::InvalidEmail { .. }
                | AuthError::WeakPassword { .. } => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
                }
                AuthError::PasswordHashing | AuthError::Database { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            ApplicationError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApplicationError::Configuration { .. } | ApplicationError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never leak internals on 5xx
        let message = if status.is_server_error() {
            tracing::error!("Internal error: {}", self);
            "An unexpected error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse::new(code, message, None);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_serializes_to_expected_shape() {
        let body = ErrorResponse::new(
            "RATE_LIMIT_EXCEEDED",
            "Rate limit exceeded",
            Some("Too many requests from your IP address".to_string()),
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": {
                    "code": "RATE_LIMIT_EXCEEDED",
                    "message": "Rate limit exceeded",
                    "details": "Too many requests from your IP address"
                }
            })
        );
    }

    #[test]
    fn success_envelope_serializes_to_expected_shape() {
        let body = ApiResponse::new("ok", serde_json::json!({"x": 1}));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["message"], serde_json::json!("ok"));
        assert_eq!(json["data"]["x"], serde_json::json!(1));
    }

    #[test]
    fn auth_errors_map_to_expected_statuses() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::UserAlreadyExists, StatusCode::CONFLICT),
            (
                AuthError::WeakPassword {
                    reason: "too short".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                AuthError::Database {
                    message: "oops".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            let (status, _) = ApplicationError::Authentication(error).status_and_code();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn server_errors_are_sanitized() {
        let response = ApplicationError::Authentication(AuthError::Database {
            message: "connection refused at 10.0.0.5".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
