//! Axum HTTP handlers for the web server
//!
//! Maps query-string input onto the unit provider and applies the boundary
//! defaults for log tails.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::domain::utils::{normalize_priority, normalize_unit, DEFAULT_LOG_LINES};
use crate::errors::AppError;
use crate::systemd_client::{LogLine, UnitStatus};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ts: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQueryParams {
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogsQueryParams {
    pub unit: Option<String>,
    pub priority: Option<String>,
    pub lines: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub lines: Vec<LogLine>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn unit_status(
    State(state): State<AppState>,
    Query(params): Query<StatusQueryParams>,
) -> Result<Json<UnitStatus>, AppError> {
    let unit = normalize_unit(params.unit)?;
    let cancel = request_token(&state);
    let _cancel_on_drop = cancel.clone().drop_guard();

    state
        .unit_provider
        .unit_status(&unit, &cancel)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("unit_not_found", "unit not found"))
}

pub async fn unit_logs(
    State(state): State<AppState>,
    Query(params): Query<LogsQueryParams>,
) -> Result<Json<LogsResponse>, AppError> {
    let unit = normalize_unit(params.unit)?;
    let priority = normalize_priority(params.priority)?;
    let lines = params.lines.unwrap_or(DEFAULT_LOG_LINES);
    let cancel = request_token(&state);
    let _cancel_on_drop = cancel.clone().drop_guard();

    let lines = state
        .unit_provider
        .tail_logs(&unit, lines, &priority, &cancel)
        .await?;

    Ok(Json(LogsResponse { lines }))
}

// Cancelled on server shutdown, or by the drop guard when the client goes away.
fn request_token(state: &AppState) -> CancellationToken {
    state.shutdown.child_token()
}
