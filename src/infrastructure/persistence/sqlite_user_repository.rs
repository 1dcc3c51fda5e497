//! SQLx implementation of the user repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::domain::auth::{
    entities::User,
    errors::AuthError,
    repositories::UserRepository,
    value_objects::{Email, PasswordHash, UserId, Username},
};

/// SQLx implementation of the user repository
pub struct SqliteUserRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteUserRepository {
    /// Create a new SQLite user repository
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Create the users table if it does not exist yet
    pub async fn migrate(pool: &SqlitePool) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, AuthError> {
        let id: String = row.try_get("id").map_err(db_error)?;
        let username: String = row.try_get("username").map_err(db_error)?;
        let email: String = row.try_get("email").map_err(db_error)?;
        let password_hash: String = row.try_get("password_hash").map_err(db_error)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(db_error)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(db_error)?;

        Ok(User {
            user_id: UserId::parse(&id).map_err(|_| AuthError::Database {
                message: format!("invalid user id in database: {}", id),
            })?,
            username: Username::new(username).map_err(|e| AuthError::Database {
                message: format!("invalid username in database: {}", e),
            })?,
            email: Email::new(email).map_err(|e| AuthError::Database {
                message: format!("invalid email in database: {}", e),
            })?,
            password_hash: PasswordHash::new(password_hash),
            created_at,
            updated_at,
        })
    }

    async fn fetch_one_by(
        &self,
        query: &str,
        binds: &[&str],
    ) -> Result<Option<User>, AuthError> {
        let mut q = sqlx::query(query);
        for bind in binds {
            q = q.bind(*bind);
        }

        let row = q
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

fn db_error(e: sqlx::Error) -> AuthError {
    tracing::error!("Database error: {}", e);
    AuthError::Database {
        message: e.to_string(),
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AuthError> {
        self.fetch_one_by(
            "SELECT id, username, email, password_hash, created_at, updated_at \
             FROM users WHERE username = ?",
            &[username.as_str()],
        )
        .await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AuthError> {
        self.fetch_one_by(
            "SELECT id, username, email, password_hash, created_at, updated_at \
             FROM users WHERE email = ?",
            &[email.as_str()],
        )
        .await
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, AuthError> {
        let id = user_id.to_string();
        self.fetch_one_by(
            "SELECT id, username, email, password_hash, created_at, updated_at \
             FROM users WHERE id = ?",
            &[id.as_str()],
        )
        .await
    }

    async fn find_by_username_or_email(
        &self,
        username: &Username,
        email: &Email,
    ) -> Result<Option<User>, AuthError> {
        self.fetch_one_by(
            "SELECT id, username, email, password_hash, created_at, updated_at \
             FROM users WHERE username = ? OR email = ?",
            &[username.as_str(), email.as_str()],
        )
        .await
    }

    async fn create(&self, user: &User) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.user_id.to_string())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| match e {
            // Unique constraint violation means the username or email is taken
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AuthError::UserAlreadyExists
            }
            other => db_error(other),
        })?;

        Ok(())
    }
}
