//! Line model for one physical crontab line.

use std::fmt;

use chrono::{DateTime, Utc};
use cronui_scheduler::{NextRun, ScheduleSpec};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// LineId
// ---------------------------------------------------------------------------

/// Opaque identifier for a line within a snapshot.
///
/// Generated at parse time (or by the client for new jobs), never derived
/// from content, so two parses of the same bytes yield different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(pub String);

impl LineId {
    /// Generate a fresh random line ID (UUIDv4).
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for LineId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LineId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// CronJob
// ---------------------------------------------------------------------------

/// A schedule plus the command the cron daemon runs on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronJob {
    pub id: LineId,
    pub schedule: ScheduleSpec,
    /// Trimmed command text; everything after the schedule.
    pub command: String,
}

impl CronJob {
    /// Next time this job fires after `now`. Derived, never stored.
    pub fn next_run(&self, now: DateTime<Utc>) -> cronui_scheduler::Result<NextRun> {
        self.schedule.next_run(now)
    }

    /// Canonical crontab text: `"{schedule} {command}"`.
    pub fn render(&self) -> String {
        format!("{} {}", self.schedule, self.command)
    }
}

// ---------------------------------------------------------------------------
// OpaqueLine
// ---------------------------------------------------------------------------

/// Any line that is not a schedule + command pair: blanks, comments,
/// environment assignments, malformed entries. Carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueLine {
    pub id: LineId,
    content: String,
}

impl OpaqueLine {
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_id(LineId::new(), content)
    }

    pub fn with_id(id: LineId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One physical line of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Job(CronJob),
    Opaque(OpaqueLine),
}

impl Line {
    pub fn id(&self) -> &LineId {
        match self {
            Line::Job(job) => &job.id,
            Line::Opaque(line) => &line.id,
        }
    }

    pub fn as_job(&self) -> Option<&CronJob> {
        match self {
            Line::Job(job) => Some(job),
            Line::Opaque(_) => None,
        }
    }

    pub fn is_job(&self) -> bool {
        matches!(self, Line::Job(_))
    }

    /// Text written back to the crontab for this line (no newline).
    pub fn render(&self) -> String {
        match self {
            Line::Job(job) => job.render(),
            Line::Opaque(line) => line.content.clone(),
        }
    }
}

impl From<CronJob> for Line {
    fn from(job: CronJob) -> Self {
        Line::Job(job)
    }
}

impl From<OpaqueLine> for Line {
    fn from(line: OpaqueLine) -> Self {
        Line::Opaque(line)
    }
}
