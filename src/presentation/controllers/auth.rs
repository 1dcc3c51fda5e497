//! Authentication endpoints: register, login, token refresh

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::application::errors::ApplicationError;
use crate::presentation::models::{
    ApiResponse, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, TokenResponse,
    UserResponse,
};
use crate::presentation::routes::AppState;

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Validation failed", body = crate::presentation::models::ErrorResponse),
        (status = 409, description = "Username or email already taken", body = crate::presentation::models::ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = crate::presentation::models::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApplicationError> {
    let user = state
        .register_use_case
        .execute(request.username, request.email, request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "User registered successfully",
            UserResponse::from(&user),
        )),
    ))
}

/// Authenticate and receive access and refresh tokens
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid credentials", body = crate::presentation::models::ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = crate::presentation::models::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApplicationError> {
    let result = state
        .login_use_case
        .execute(request.username, request.password)
        .await?;

    let response = TokenResponse {
        access_token: result.access_token,
        refresh_token: result.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_ttl_seconds(),
        user: UserResponse::from(&result.user),
    };

    Ok(Json(ApiResponse::new("Login successful", response)))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<RefreshResponse>),
        (status = 401, description = "Invalid or expired refresh token", body = crate::presentation::models::ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = crate::presentation::models::ErrorResponse)
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApplicationError> {
    let access_token = state
        .refresh_token_use_case
        .execute(&request.refresh_token)
        .await?;

    let response = RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_ttl_seconds(),
    };

    Ok(Json(ApiResponse::new(
        "Token refreshed successfully",
        response,
    )))
}
