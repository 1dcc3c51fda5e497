//! Health, liveness and readiness endpoints
//!
//! These routes are intentionally not rate limited so orchestrator probes
//! never get throttled away.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::presentation::models::{ErrorResponse, HealthResponse};
use crate::presentation::routes::AppState;

async fn database_ok(state: &AppState) -> bool {
    match sqlx::query("SELECT 1").execute(&*state.db_pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            false
        }
    }
}

/// Full health report including dependency status
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 206, description = "Service degraded", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = database_ok(&state).await;

    let mut services = BTreeMap::new();
    services.insert(
        "database".to_string(),
        if db_ok { "ok" } else { "error" }.to_string(),
    );

    let response = HealthResponse {
        status: if db_ok { "ok" } else { "degraded" }.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.startup_time.elapsed().as_secs(),
        services,
    };

    // Degraded still answers, with partial content; readiness is the probe
    // that hard-fails on a dead database
    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::PARTIAL_CONTENT
    };
    (status, Json(response))
}

/// Liveness probe. Answers as long as the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "timestamp": Utc::now(),
    }))
}

/// Readiness probe. Fails when the database is unreachable so load
/// balancers stop routing traffic here.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve traffic"),
        (status = 503, description = "Not ready", body = ErrorResponse)
    )
)]
pub async fn readiness(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    if database_ok(&state).await {
        Ok(Json(serde_json::json!({
            "status": "ready",
            "timestamp": Utc::now(),
        })))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new(
                "NOT_READY",
                "Service is not ready",
                Some("Database is unreachable".to_string()),
            )),
        ))
    }
}
