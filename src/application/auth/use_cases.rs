//! Authentication use cases

use std::sync::Arc;

use crate::domain::auth::{
    entities::User,
    errors::AuthError,
    repositories::UserRepository,
    value_objects::{validate_password_strength, Email, UserId, Username},
};
use crate::infrastructure::auth::{JwtService, PasswordHasher};

/// Result type for login operations
#[derive(Debug)]
pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Use case for user login
pub struct LoginUseCase {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<PasswordHasher>,
    jwt_service: Arc<JwtService>,
}

impl LoginUseCase {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<PasswordHasher>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            jwt_service,
        }
    }

    pub async fn execute(
        &self,
        username: String,
        password: String,
    ) -> Result<LoginResult, AuthError> {
        // A malformed username cannot match a stored account; respond with
        // the same error as a wrong password so probes learn nothing.
        let username =
            Username::new(username).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .user_repository
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = self
            .password_hasher
            .verify(&password, &user.password_hash)
            .await
            .map_err(|_| AuthError::InvalidCredentials)?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.jwt_service.generate_access_token(
            user.user_id,
            &user.username,
            &user.email,
        )?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.user_id)?;

        tracing::info!(user_id = %user.user_id, username = %user.username, "User logged in");

        Ok(LoginResult {
            access_token,
            refresh_token,
            user,
        })
    }
}

/// Use case for registering new users
pub struct RegisterUserUseCase {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<PasswordHasher>,
}

impl RegisterUserUseCase {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    pub async fn execute(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, AuthError> {
        let username = Username::new(username)?;
        let email = Email::new(email)?;
        validate_password_strength(&password)?;

        // Duplicate check covers both unique columns in one query
        if self
            .user_repository
            .find_by_username_or_email(&username, &email)
            .await?
            .is_some()
        {
            tracing::warn!(username = %username, "Registration attempt with existing username or email");
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = self.password_hasher.hash(&password).await?;

        let user = User::new(UserId::generate(), username, email, password_hash);
        self.user_repository.create(&user).await?;

        tracing::info!(user_id = %user.user_id, username = %user.username, "User registered");

        Ok(user)
    }
}

/// Use case for validating JWT access tokens
pub struct ValidateTokenUseCase {
    jwt_service: Arc<JwtService>,
}

impl ValidateTokenUseCase {
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }

    pub fn execute(&self, token: &str) -> Result<(UserId, Username, Email), AuthError> {
        let claims = self.jwt_service.validate_token(token)?;

        // Only accept access tokens on protected routes
        if !claims.is_access_token() {
            return Err(AuthError::InvalidToken);
        }

        let user_id = claims.user_id()?;
        let username =
            Username::new(claims.username).map_err(|_| AuthError::InvalidToken)?;
        let email = Email::new(claims.email).map_err(|_| AuthError::InvalidToken)?;

        Ok((user_id, username, email))
    }
}

/// Use case for refreshing access tokens
pub struct RefreshTokenUseCase {
    jwt_service: Arc<JwtService>,
    user_repository: Arc<dyn UserRepository>,
}

impl RefreshTokenUseCase {
    pub fn new(jwt_service: Arc<JwtService>, user_repository: Arc<dyn UserRepository>) -> Self {
        Self {
            jwt_service,
            user_repository,
        }
    }

    pub async fn execute(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.jwt_service.validate_token(refresh_token)?;

        if !claims.is_refresh_token() {
            return Err(AuthError::InvalidToken);
        }

        // The account may have been removed since the token was issued
        let user_id = claims.user_id()?;
        let user = self
            .user_repository
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.jwt_service
            .generate_access_token(user.user_id, &user.username, &user.email)
    }
}
