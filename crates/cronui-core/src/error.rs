use thiserror::Error;

/// Errors as they are reported to clients of the HTTP boundary.
#[derive(Debug, Error)]
pub enum CronuiError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed request body or missing required field.
    #[error("{0}")]
    BadRequest(String),

    /// Carries the evaluator's own message, which already names the problem.
    #[error("{0}")]
    InvalidSchedule(String),

    /// The table changed externally since the client loaded it.
    #[error("crontab has changed")]
    Conflict,

    #[error("Failed to read crontab: {0}")]
    GatewayRead(String),

    #[error("Failed to write crontab: {0}")]
    GatewayWrite(String),

    /// The external tool did not answer within its time budget.
    #[error("Request timeout after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CronuiError {
    /// Short error code string sent to clients alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            CronuiError::Config(_) => "CONFIG_ERROR",
            CronuiError::BadRequest(_) => "BAD_REQUEST",
            CronuiError::InvalidSchedule(_) => "INVALID_SCHEDULE",
            CronuiError::Conflict => "CONFLICT",
            CronuiError::GatewayRead(_) => "GATEWAY_READ_ERROR",
            CronuiError::GatewayWrite(_) => "GATEWAY_WRITE_ERROR",
            CronuiError::Timeout { .. } => "TIMEOUT",
            CronuiError::Serialization(_) => "SERIALIZATION_ERROR",
            CronuiError::Io(_) => "IO_ERROR",
            CronuiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code equivalent.
    pub fn status(&self) -> u16 {
        match self {
            CronuiError::BadRequest(_)
            | CronuiError::InvalidSchedule(_)
            | CronuiError::Serialization(_) => 400,
            CronuiError::Conflict => 409,
            CronuiError::Config(_)
            | CronuiError::GatewayRead(_)
            | CronuiError::GatewayWrite(_)
            | CronuiError::Timeout { .. }
            | CronuiError::Io(_)
            | CronuiError::Internal(_) => 500,
        }
    }

    /// Whether the failure is on the server side and deserves an error log.
    pub fn is_server_error(&self) -> bool {
        self.status() >= 500
    }
}

pub type Result<T> = std::result::Result<T, CronuiError>;
