//! Maps engine errors onto HTTP responses: `{"message": "...", "code": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cronui_core::CronuiError;
use cronui_sync::SyncError;
use cronui_table::TableError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
}

/// Handler error; wraps the client-facing taxonomy.
#[derive(Debug)]
pub struct ApiError(pub CronuiError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.0.is_server_error() {
            error!(code = self.0.code(), error = %self.0, "request failed");
        } else {
            warn!(code = self.0.code(), error = %self.0, "request rejected");
        }
        let body = ErrorBody {
            message: self.0.to_string(),
            code: self.0.code(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CronuiError> for ApiError {
    fn from(e: CronuiError) -> Self {
        ApiError(e)
    }
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        ApiError(match e {
            SyncError::Conflict { .. } => CronuiError::Conflict,
            SyncError::NoTable => CronuiError::GatewayRead("no crontab for user".to_string()),
            SyncError::GatewayRead(message) => CronuiError::GatewayRead(message),
            SyncError::GatewayWrite(message) => CronuiError::GatewayWrite(message),
            SyncError::Timeout { ms } => CronuiError::Timeout { ms },
            SyncError::Io(e) => CronuiError::Io(e),
        })
    }
}

impl From<TableError> for ApiError {
    fn from(e: TableError) -> Self {
        ApiError(match e {
            TableError::Json(e) => CronuiError::Serialization(e),
            invalid @ TableError::InvalidSchedule { .. } => {
                CronuiError::InvalidSchedule(invalid.to_string())
            }
            other => CronuiError::BadRequest(other.to_string()),
        })
    }
}
