//! Health probe.
//!
//! - `GET /healthz` — per-dependency status for Redis and the database.
//!   Public; used by replica-level orchestration, not by tenants.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    redis: String,
    database: String,
}

pub async fn healthz(State(state): State<AppState>) -> Response {
    let redis = match state.control.ping().await {
        Ok(()) => "healthy".to_string(),
        Err(e) => format!("unhealthy: {e}"),
    };
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "healthy".to_string(),
        Err(e) => format!("unhealthy: {e}"),
    };

    let healthy = redis == "healthy" && database == "healthy";
    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        redis,
        database,
    };
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}
