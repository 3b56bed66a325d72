//! Health endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub migrations_applied: usize,
    pub migrations_total: usize,
}

/// `GET /health`
///
/// 200 when the store answers and every embedded migration is applied,
/// 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_up = state.db.health_check().await;

    let (applied, total) = match state.db.migration_status().await {
        Ok(status) => (status.applied, status.total),
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            (0, 0)
        }
    };

    let healthy = database_up && total > 0 && applied >= total;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        database: if database_up { "up" } else { "down" },
        migrations_applied: applied,
        migrations_total: total,
    };

    (status, Json(body))
}
