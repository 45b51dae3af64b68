use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Router};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

/// Liveness and database reachability.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

/// GET /health
///
/// Always answers; a failed database probe turns the status into
/// `degraded` with 503.
async fn health(State(state): State<AppState>) -> ApiResponse<HealthStatus> {
    let db_healthy = match logit_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health probe failed");
            false
        }
    };

    let (code, status) = if db_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    let body = HealthStatus {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    };
    ApiResponse::success(code, body, format!("Service is {status}"))
}

/// Root-level probe, mounted outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
