use thiserror::Error;

/// Errors raised when a client-built table is turned back into a snapshot.
///
/// Parsing raw crontab bytes never produces these; unrecognised content
/// degrades to opaque lines instead.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Line {id}: {source}")]
    InvalidSchedule {
        id: String,
        #[source]
        source: cronui_scheduler::ScheduleError,
    },

    #[error("Duplicate line id: {id}")]
    DuplicateId { id: String },

    #[error("Line not found: {id}")]
    LineNotFound { id: String },

    /// Comments, blanks and other opaque lines are carried verbatim only.
    #[error("Line {id} is not a job and cannot be edited")]
    NotAJob { id: String },

    #[error("Job command must not be empty")]
    EmptyCommand,

    /// Each line maps to exactly one physical line of the table.
    #[error("Line {id} must not contain a line break")]
    LineBreak { id: String },

    #[error("Malformed table JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;
