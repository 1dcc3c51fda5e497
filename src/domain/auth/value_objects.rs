//! Authentication value objects
//!
//! Validation rules live in the constructors so an invalid username, email
//! or password never makes it past the domain boundary.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

/// Maximum password length accepted. Bcrypt truncates input at 72 bytes.
pub const MAX_PASSWORD_LENGTH: usize = 72;
/// Minimum password length accepted.
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid username regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
            .expect("valid email regex")
    })
}

/// Unique user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from its canonical string form
    pub fn parse(s: &str) -> Result<Self, AuthError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AuthError::InvalidToken)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated username: 3-30 characters, letters, digits, underscores and hyphens
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, AuthError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(AuthError::InvalidUsername {
                reason: "username is required".to_string(),
            });
        }
        if value.len() < 3 {
            return Err(AuthError::InvalidUsername {
                reason: "username must be at least 3 characters long".to_string(),
            });
        }
        if value.len() > 30 {
            return Err(AuthError::InvalidUsername {
                reason: "username must be no more than 30 characters long".to_string(),
            });
        }
        if !username_regex().is_match(&value) {
            return Err(AuthError::InvalidUsername {
                reason: "username can only contain letters, numbers, underscores and hyphens"
                    .to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn new(value: String) -> Result<Self, AuthError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(AuthError::InvalidEmail { email: value });
        }
        if value.len() > 254 || !email_regex().is_match(&value) {
            return Err(AuthError::InvalidEmail { email: value });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hashed password. Never holds or exposes the plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

/// JWT claims for access and refresh tokens
///
/// The `token_type` discriminator keeps refresh tokens from being accepted
/// on protected routes and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Subject: user ID in canonical UUID form
    pub sub: String,
    /// Username (empty on refresh tokens)
    #[serde(default)]
    pub username: String,
    /// Email address (empty on refresh tokens)
    #[serde(default)]
    pub email: String,
    /// "access" or "refresh"
    pub token_type: String,
    /// Issuer
    pub iss: String,
    /// Expiration timestamp (seconds since epoch)
    pub exp: usize,
    /// Issued-at timestamp (seconds since epoch)
    pub iat: usize,
}

impl AuthToken {
    /// Build access token claims
    pub fn new_access(
        user_id: UserId,
        username: &Username,
        email: &Email,
        issuer: &str,
        exp: usize,
        iat: usize,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            username: username.as_str().to_string(),
            email: email.as_str().to_string(),
            token_type: "access".to_string(),
            iss: issuer.to_string(),
            exp,
            iat,
        }
    }

    /// Build refresh token claims
    pub fn new_refresh(user_id: UserId, issuer: &str, exp: usize, iat: usize) -> Self {
        Self {
            sub: user_id.to_string(),
            username: String::new(),
            email: String::new(),
            token_type: "refresh".to_string(),
            iss: issuer.to_string(),
            exp,
            iat,
        }
    }

    pub fn is_access_token(&self) -> bool {
        self.token_type == "access"
    }

    pub fn is_refresh_token(&self) -> bool {
        self.token_type == "refresh"
    }

    /// Parse the subject claim back into a `UserId`
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        UserId::parse(&self.sub)
    }
}

/// Check a plaintext password against the password policy.
///
/// Requires 8-72 characters with at least one uppercase letter, one
/// lowercase letter, one digit and one special character.
pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::WeakPassword {
            reason: "password is required".to_string(),
        });
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            reason: format!(
                "password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            ),
        });
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            reason: format!(
                "password must be no more than {} characters long",
                MAX_PASSWORD_LENGTH
            ),
        });
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_special = password
        .chars()
        .any(|c| c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace()));

    if !has_upper {
        return Err(AuthError::WeakPassword {
            reason: "password must contain at least one uppercase letter".to_string(),
        });
    }
    if !has_lower {
        return Err(AuthError::WeakPassword {
            reason: "password must contain at least one lowercase letter".to_string(),
        });
    }
    if !has_digit {
        return Err(AuthError::WeakPassword {
            reason: "password must contain at least one number".to_string(),
        });
    }
    if !has_special {
        return Err(AuthError::WeakPassword {
            reason: "password must contain at least one special character".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_username_is_accepted() {
        let username = Username::new("john_doe-42".to_string()).unwrap();
        assert_eq!(username.as_str(), "john_doe-42");
    }

    #[test]
    fn username_is_trimmed() {
        let username = Username::new("  alice  ".to_string()).unwrap();
        assert_eq!(username.as_str(), "alice");
    }

    #[test]
    fn short_and_long_usernames_are_rejected() {
        assert!(Username::new("ab".to_string()).is_err());
        assert!(Username::new("a".repeat(31)).is_err());
    }

    #[test]
    fn username_with_invalid_characters_is_rejected() {
        assert!(Username::new("john doe".to_string()).is_err());
        assert!(Username::new("john@doe".to_string()).is_err());
    }

    #[test]
    fn valid_email_is_accepted() {
        let email = Email::new("user@example.com".to_string()).unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        assert!(Email::new("not-an-email".to_string()).is_err());
        assert!(Email::new("missing@tld".to_string()).is_err());
        assert!(Email::new("".to_string()).is_err());
    }

    #[test]
    fn overlong_email_is_rejected() {
        let local = "a".repeat(250);
        assert!(Email::new(format!("{}@example.com", local)).is_err());
    }

    #[test]
    fn strong_password_passes_policy() {
        assert!(validate_password_strength("Str0ng!pass").is_ok());
    }

    #[test]
    fn weak_passwords_fail_policy() {
        // Too short
        assert!(validate_password_strength("S1!a").is_err());
        // Missing uppercase
        assert!(validate_password_strength("weak1!pass").is_err());
        // Missing digit
        assert!(validate_password_strength("Weakpass!!").is_err());
        // Missing special character
        assert!(validate_password_strength("Weakpass11").is_err());
        // Too long for bcrypt
        assert!(validate_password_strength(&format!("Aa1!{}", "x".repeat(72))).is_err());
    }

    #[test]
    fn password_hash_debug_hides_contents() {
        let hash = PasswordHash::new("$2b$12$secret".to_string());
        assert_eq!(format!("{:?}", hash), "PasswordHash(***)");
    }

    #[test]
    fn user_id_round_trips_through_string() {
        let id = UserId::generate();
        let parsed = UserId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }
}
