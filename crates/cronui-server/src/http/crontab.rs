//! Crontab endpoints.
//!
//! - `GET /crontab` → `{"lines": [...], "checksum": "..."}`
//! - `POST /save_crontab` with the same shape (the legacy key `crontab` is
//!   accepted in place of `lines`). Answers with the table as re-read after
//!   the write, or 409 when it changed since `checksum` was taken.

use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use cronui_core::CronuiError;
use cronui_table::{WireLine, WireSnapshot};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::app::AppState;

#[derive(Deserialize)]
pub struct SaveRequest {
    pub checksum: Option<String>,
    #[serde(alias = "crontab")]
    pub lines: Option<Vec<WireLine>>,
}

/// GET /crontab: the current table.
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WireSnapshot>, ApiError> {
    let snapshot = state.reconciler.list().await?;
    Ok(Json(WireSnapshot::from_snapshot(&snapshot, Utc::now())))
}

/// POST /save_crontab: conditional replace of the whole table.
pub async fn save_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WireSnapshot>, ApiError> {
    let req: SaveRequest = serde_json::from_slice(&body).map_err(CronuiError::from)?;

    let checksum = req
        .checksum
        .filter(|c| !c.is_empty())
        .ok_or_else(|| CronuiError::BadRequest("checksum is missing".to_string()))?;
    let lines = req
        .lines
        .ok_or_else(|| CronuiError::BadRequest("crontab is missing".to_string()))?;

    let submitted = WireSnapshot { lines, checksum }.into_snapshot()?;
    info!(lines = submitted.len(), "save requested");

    let saved = state.reconciler.save(&submitted).await?;
    Ok(Json(WireSnapshot::from_snapshot(&saved, Utc::now())))
}
