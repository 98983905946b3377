//! Error types for the cronui-sync crate.

use thiserror::Error;

/// All errors that can originate from reading, reconciling or writing the
/// external table.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The user has no crontab yet. Gateways report this distinctly so the
    /// reconciler can treat it as an empty table.
    #[error("no crontab for user")]
    NoTable,

    /// Reading the table failed for any other reason.
    #[error("Gateway read failed: {0}")]
    GatewayRead(String),

    /// Installing the new table failed; the external table is assumed
    /// unchanged.
    #[error("Gateway write failed: {0}")]
    GatewayWrite(String),

    /// The table changed since the client loaded it.
    #[error("crontab has changed (expected {expected}, found {actual})")]
    Conflict { expected: String, actual: String },

    /// The external tool did not finish within its time budget.
    #[error("crontab command timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Underlying I/O failure (staging file, process spawn).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, SyncError>;
