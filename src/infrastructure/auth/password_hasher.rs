//! Password hashing with bcrypt
//!
//! Hashing runs on the blocking thread pool so it never stalls the async
//! runtime.

use crate::domain::auth::{errors::AuthError, value_objects::PasswordHash};

/// Bcrypt-backed password hasher
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost factor
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password
    pub async fn hash(&self, password: &str) -> Result<PasswordHash, AuthError> {
        let password = password.to_string();
        let cost = self.cost;

        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| {
                tracing::error!("Password hashing task failed: {}", e);
                AuthError::PasswordHashing
            })?
            .map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                AuthError::PasswordHashing
            })?;

        Ok(PasswordHash::new(hash))
    }

    /// Verify a plaintext password against a stored hash
    pub async fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, AuthError> {
        let password = password.to_string();
        let hash = hash.as_str().to_string();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| {
                tracing::error!("Password verification task failed: {}", e);
                AuthError::PasswordHashing
            })?
            .map_err(|e| {
                tracing::error!("Failed to verify password: {}", e);
                AuthError::PasswordHashing
            })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
