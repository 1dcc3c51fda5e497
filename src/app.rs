//! Application bootstrap: database pool, services, use cases and router

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use thiserror::Error;

use crate::application::auth::{
    LoginUseCase, RefreshTokenUseCase, RegisterUserUseCase, ValidateTokenUseCase,
};
use crate::config::Config;
use crate::domain::auth::repositories::UserRepository;
use crate::infrastructure::auth::{JwtService, PasswordHasher};
use crate::infrastructure::persistence::SqliteUserRepository;
use crate::infrastructure::ratelimit::{IpRateLimiter, RateLimitPolicy};
use crate::presentation::{create_router, AppState};

/// Errors that can occur while bootstrapping the application
#[derive(Debug, Error)]
pub enum CreateAppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// A fully wired application ready to serve
pub struct App {
    pub router: Router,
    pub state: AppState,
}

/// Wire up the application from configuration.
///
/// Connects the database pool, runs migrations and builds the two
/// independent per-IP rate limiters before assembling the router.
pub async fn create_app(config: Config) -> Result<App, CreateAppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
        .connect(&config.database.url)
        .await?;

    SqliteUserRepository::migrate(&pool)
        .await
        .map_err(|e| CreateAppError::Migration(e.to_string()))?;

    let db_pool = Arc::new(pool);
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(SqliteUserRepository::new(db_pool.clone()));

    let password_hasher = Arc::new(PasswordHasher::new(config.auth.bcrypt_cost));
    let jwt_service = Arc::new(JwtService::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_minutes,
        config.auth.refresh_token_ttl_minutes,
        config.auth.issuer.clone(),
    ));

    let register_use_case = Arc::new(RegisterUserUseCase::new(
        user_repository.clone(),
        password_hasher.clone(),
    ));
    let login_use_case = Arc::new(LoginUseCase::new(
        user_repository.clone(),
        password_hasher.clone(),
        jwt_service.clone(),
    ));
    let refresh_token_use_case = Arc::new(RefreshTokenUseCase::new(
        jwt_service.clone(),
        user_repository.clone(),
    ));
    let validate_token_use_case = Arc::new(ValidateTokenUseCase::new(jwt_service.clone()));

    // Two independent limiters; auth endpoints pass through both
    let general_limiter = Arc::new(IpRateLimiter::new(RateLimitPolicy::per_second(
        config.rate_limit.requests_per_second,
        config.rate_limit.burst,
    )));
    let auth_limiter = Arc::new(IpRateLimiter::new(RateLimitPolicy::per_minute(
        config.rate_limit.auth_requests_per_minute,
        config.rate_limit.auth_burst,
    )));

    let state = AppState {
        config: Arc::new(config),
        db_pool,
        jwt_service,
        register_use_case,
        login_use_case,
        refresh_token_use_case,
        validate_token_use_case,
        general_limiter,
        auth_limiter,
        startup_time: Instant::now(),
    };

    let router = create_router(state.clone());

    Ok(App {
        router,
        state,
    })
}
