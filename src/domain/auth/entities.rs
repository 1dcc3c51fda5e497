//! Authentication domain entities

use chrono::{DateTime, Utc};

use super::value_objects::{Email, PasswordHash, UserId, Username};

/// User aggregate root
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user identifier
    pub user_id: UserId,
    /// Login name, unique across the system
    pub username: Username,
    /// User email address, unique across the system
    pub email: Email,
    /// Hashed password (never expose raw hash)
    pub password_hash: PasswordHash,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(
        user_id: UserId,
        username: Username,
        email: Email,
        password_hash: PasswordHash,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            UserId::generate(),
            Username::new("testuser".to_string()).unwrap(),
            Email::new("user@example.com".to_string()).unwrap(),
            PasswordHash::new("hashed".to_string()),
        )
    }

    #[test]
    fn new_user_has_matching_timestamps() {
        let user = sample_user();
        assert_eq!(user.created_at, user.updated_at);
    }
}
