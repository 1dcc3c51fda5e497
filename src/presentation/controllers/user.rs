//! JWT-protected user endpoints

use axum::Json;

use crate::presentation::extractors::AuthUser;
use crate::presentation::models::{ApiResponse, ProfileResponse};

/// Current user's profile, from the access token claims
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Missing or invalid token", body = crate::presentation::models::ErrorResponse)
    )
)]
pub async fn me(user: AuthUser) -> Json<ApiResponse<ProfileResponse>> {
    Json(ApiResponse::new(
        "Profile retrieved successfully",
        ProfileResponse {
            id: user.user_id.as_uuid(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
        },
    ))
}

/// Example protected route demonstrating token-gated access
#[utoipa::path(
    get,
    path = "/api/v1/protected",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Access granted", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Missing or invalid token", body = crate::presentation::models::ErrorResponse)
    )
)]
pub async fn protected(user: AuthUser) -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::new(
        "Access granted",
        serde_json::json!({
            "user_id": user.user_id,
            "username": user.username.as_str(),
        }),
    ))
}
