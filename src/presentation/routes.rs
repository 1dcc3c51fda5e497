//! Router assembly and shared application state

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::auth::{
    LoginUseCase, RefreshTokenUseCase, RegisterUserUseCase, ValidateTokenUseCase,
};
use crate::config::Config;
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::ratelimit::IpRateLimiter;

use super::controllers::{auth, health, user};
use super::extractors::AuthState;
use super::middleware::{
    auth_rate_limit_middleware, inject_auth_state_middleware, rate_limit_middleware,
    request_id_middleware, security_headers_middleware, validate_content_type_middleware,
};
use super::models;

/// Shared application state threaded through every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: Arc<SqlitePool>,
    pub jwt_service: Arc<JwtService>,
    pub register_use_case: Arc<RegisterUserUseCase>,
    pub login_use_case: Arc<LoginUseCase>,
    pub refresh_token_use_case: Arc<RefreshTokenUseCase>,
    pub validate_token_use_case: Arc<ValidateTokenUseCase>,
    /// Per-IP limiter for all /api/v1 traffic
    pub general_limiter: Arc<IpRateLimiter>,
    /// Stricter per-IP limiter layered on the auth endpoints
    pub auth_limiter: Arc<IpRateLimiter>,
    pub startup_time: Instant,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::refresh_token,
        user::me,
        user::protected,
        health::health_check,
        health::liveness,
        health::readiness,
    ),
    components(schemas(
        models::RegisterRequest,
        models::LoginRequest,
        models::RefreshRequest,
        models::TokenResponse,
        models::RefreshResponse,
        models::UserResponse,
        models::ProfileResponse,
        models::HealthResponse,
        models::ErrorResponse,
        models::ErrorBody,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "users", description = "JWT-protected user endpoints"),
        (name = "health", description = "Health and readiness probes")
    ),
    info(
        title = "Keel API",
        description = "REST API template with JWT authentication and per-IP rate limiting"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    }
}

/// Build the application router.
///
/// Health routes stay outside the rate-limited `/api/v1` nest. Auth routes
/// pass both the general and the auth limiter.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();
    let auth_state = AuthState {
        validate_token_use_case: state.validate_token_use_case.clone(),
    };

    let mut auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token));
    if config.rate_limit.enabled {
        auth_routes = auth_routes.layer(middleware::from_fn_with_state(
            state.auth_limiter.clone(),
            auth_rate_limit_middleware,
        ));
    }

    let mut api_routes = Router::new()
        .route("/users/me", get(user::me))
        .route("/protected", get(user::protected))
        .merge(auth_routes)
        .layer(middleware::from_fn(validate_content_type_middleware));
    if config.rate_limit.enabled {
        api_routes = api_routes.layer(middleware::from_fn_with_state(
            state.general_limiter.clone(),
            rate_limit_middleware,
        ));
    }

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_routes);

    if config.server.enable_docs {
        router = router
            .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let mut router = router
        .layer(middleware::from_fn_with_state(
            auth_state,
            inject_auth_state_middleware,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )))
        .layer(build_cors_layer(&config.server.allowed_origins));

    if config.server.security.enable_security_headers {
        router = router.layer(middleware::from_fn_with_state(
            Arc::new(config.server.security.clone()),
            security_headers_middleware,
        ));
    }

    router.with_state(state)
}
