//! System endpoints: health check.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Server time, diary-local (`YYYY-MM-DD HH:mm:ss`).
    local_time: String,
    /// IANA name of the diary timezone.
    timezone: &'static str,
    /// Offset currently in effect, e.g. `-03:00`.
    utc_offset: String,
}

/// `GET /health` — Liveness plus the diary's calendar settings.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reports the service version and the local clock that day and month views are computed against.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let calendar = state.diary_service.calendar();
    let now = Utc::now();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        local_time: calendar.format_date_time(now),
        timezone: calendar.timezone().name(),
        utc_offset: calendar.offset_at(now).to_string(),
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
