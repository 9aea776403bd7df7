use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    health: &'static str,
    message: String,
}

/// Liveness probe: also exercises the connection pool so a wedged database
/// shows up as unhealthy instead of a silently-green health check.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.db() {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                health: "healthy",
                message: "ok".to_string(),
            }),
        ),
        Err(err) => (
            StatusCode::OK,
            Json(HealthResponse {
                health: "unhealthy",
                message: err.to_string(),
            }),
        ),
    }
}
