//! JWT service for token generation and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::domain::auth::{
    errors::AuthError,
    value_objects::{AuthToken, Email, UserId, Username},
};

/// JWT service for generating and validating tokens
#[derive(Clone)]
pub struct JwtService {
    /// Secret key for signing tokens
    secret: Arc<String>,
    /// Access token TTL in minutes
    access_token_ttl_minutes: u64,
    /// Refresh token TTL in minutes
    refresh_token_ttl_minutes: u64,
    /// Issuer claim
    issuer: String,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(
        secret: String,
        access_token_ttl_minutes: u64,
        refresh_token_ttl_minutes: u64,
        issuer: String,
    ) -> Self {
        Self {
            secret: Arc::new(secret),
            access_token_ttl_minutes,
            refresh_token_ttl_minutes,
            issuer,
        }
    }

    /// Access token TTL in seconds, for the `expires_in` response field
    pub fn access_token_ttl_seconds(&self) -> u64 {
        self.access_token_ttl_minutes * 60
    }

    /// Generate an access token for a user
    pub fn generate_access_token(
        &self,
        user_id: UserId,
        username: &Username,
        email: &Email,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_token_ttl_minutes as i64);

        let claims = AuthToken::new_access(
            user_id,
            username,
            email,
            &self.issuer,
            exp.timestamp() as usize,
            now.timestamp() as usize,
        );

        self.encode_claims(&claims)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.refresh_token_ttl_minutes as i64);

        let claims = AuthToken::new_refresh(
            user_id,
            &self.issuer,
            exp.timestamp() as usize,
            now.timestamp() as usize,
        );

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &AuthToken) -> Result<String, AuthError> {
        let header = Header::default();
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&header, claims, &encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT token: {}", e);
            AuthError::InvalidToken
        })
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<AuthToken, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.set_issuer(&[&self.issuer]);

        decode::<AuthToken>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new(
            "test-secret-key-at-least-32-characters-long".to_string(),
            60,
            24 * 60,
            "keel-api".to_string(),
        )
    }

    #[test]
    fn access_token_round_trips() {
        let service = test_service();
        let user_id = UserId::generate();
        let username = Username::new("testuser".to_string()).unwrap();
        let email = Email::new("test@example.com".to_string()).unwrap();

        let token = service
            .generate_access_token(user_id, &username, &email)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.username, "testuser");
        assert_eq!(claims.email, "test@example.com");
        assert!(claims.is_access_token());
        assert!(!claims.is_refresh_token());
    }

    #[test]
    fn refresh_token_round_trips() {
        let service = test_service();
        let user_id = UserId::generate();

        let token = service.generate_refresh_token(user_id).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert!(claims.is_refresh_token());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let service = test_service();
        let other = JwtService::new(
            "a-completely-different-secret-key-here".to_string(),
            60,
            24 * 60,
            "keel-api".to_string(),
        );
        let user_id = UserId::generate();
        let username = Username::new("testuser".to_string()).unwrap();
        let email = Email::new("test@example.com".to_string()).unwrap();

        let token = other
            .generate_access_token(user_id, &username, &email)
            .unwrap();
        assert_eq!(service.validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_with_wrong_issuer_is_rejected() {
        let service = test_service();
        let other = JwtService::new(
            "test-secret-key-at-least-32-characters-long".to_string(),
            60,
            24 * 60,
            "someone-else".to_string(),
        );
        let user_id = UserId::generate();

        let token = other.generate_refresh_token(user_id).unwrap();
        assert_eq!(service.validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = test_service();
        assert_eq!(
            service.validate_token("not.a.jwt"),
            Err(AuthError::InvalidToken)
        );
    }
}
