//! Authentication repository traits

use async_trait::async_trait;

use super::entities::User;
use super::errors::AuthError;
use super::value_objects::{Email, UserId, Username};

/// User repository trait for user persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by username
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AuthError>;

    /// Find a user by email address
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AuthError>;

    /// Find a user by user ID
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, AuthError>;

    /// Find a user matching either the username or the email address.
    /// Used by registration to detect duplicates in one query.
    async fn find_by_username_or_email(
        &self,
        username: &Username,
        email: &Email,
    ) -> Result<Option<User>, AuthError>;

    /// Create a new user
    async fn create(&self, user: &User) -> Result<(), AuthError>;
}
