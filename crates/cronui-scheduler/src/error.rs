use thiserror::Error;

/// Errors that can occur while parsing or evaluating a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The expression is empty, has the wrong field count, contains a
    /// malformed field, or names an unknown macro.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// No instant within the search horizon satisfies the expression
    /// (e.g. `0 0 30 2 *`).
    #[error("No next occurrence for schedule: {schedule}")]
    NoNextOccurrence { schedule: String },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
