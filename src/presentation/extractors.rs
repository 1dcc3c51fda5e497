//! Request extractors for authenticated routes

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::auth::ValidateTokenUseCase;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::value_objects::{Email, UserId, Username};

use super::models::ErrorResponse;

/// Token validation state injected into request extensions by
/// `inject_auth_state_middleware` so the extractor works from any router.
#[derive(Clone)]
pub struct AuthState {
    pub validate_token_use_case: Arc<ValidateTokenUseCase>,
}

/// The authenticated caller, extracted from a `Bearer` access token.
///
/// Rejects with a 401 error envelope when the header is missing, malformed,
/// expired or carries a refresh token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: Username,
    pub email: Email,
}

fn unauthorized(code: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(code, message, None)),
    )
        .into_response()
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = parts
            .extensions
            .get::<AuthState>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("AuthState missing from request extensions");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(
                        "INTERNAL_ERROR",
                        "An unexpected error occurred",
                        None,
                    )),
                )
                    .into_response()
            })?;

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("MISSING_TOKEN", "Authorization header is required"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("INVALID_TOKEN", "Authorization header must use the Bearer scheme"))?;

        let (user_id, username, email) = auth_state
            .validate_token_use_case
            .execute(token)
            .map_err(|e| match e {
                AuthError::TokenExpired => unauthorized("TOKEN_EXPIRED", "Token has expired"),
                _ => unauthorized("INVALID_TOKEN", "Invalid or malformed token"),
            })?;

        Ok(AuthUser {
            user_id,
            username,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::auth::JwtService;
    use axum::http::Request;

    fn auth_state() -> AuthState {
        let jwt = Arc::new(JwtService::new(
            "test-secret-key-at-least-32-characters-long".to_string(),
            60,
            24 * 60,
            "keel-api".to_string(),
        ));
        AuthState {
            validate_token_use_case: Arc::new(ValidateTokenUseCase::new(jwt)),
        }
    }

    fn parts_with_auth(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/protected");
        if let Some(value) = header {
            builder = builder.header(axum::http::header::AUTHORIZATION, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        parts.extensions.insert(auth_state());
        parts
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let mut parts = parts_with_auth(None);
        let rejection = AuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        let rejection = AuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_access_token_is_accepted() {
        let jwt = JwtService::new(
            "test-secret-key-at-least-32-characters-long".to_string(),
            60,
            24 * 60,
            "keel-api".to_string(),
        );
        let user_id = UserId::generate();
        let username = Username::new("carol".to_string()).unwrap();
        let email = Email::new("carol@example.com".to_string()).unwrap();
        let token = jwt
            .generate_access_token(user_id, &username, &email)
            .unwrap();

        let mut parts = parts_with_auth(Some(&format!("Bearer {}", token)));
        let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.username.as_str(), "carol");
    }
}
