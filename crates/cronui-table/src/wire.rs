//! JSON shape exchanged with browser clients.
//!
//! ```json
//! {"lines": [
//!    {"type": "cronline", "id": "…", "content": "# comment"},
//!    {"type": "cronjob",  "id": "…", "schedule": "0 5 * * *", "command": "echo hi",
//!     "next": "2024-01-02T05:00:00.000Z"}
//!  ],
//!  "checksum": "…"}
//! ```
//!
//! `next` is `"reboot"` for `@reboot` jobs and `null` when no occurrence can
//! be found. Unknown `type` values are rejected.

use chrono::{DateTime, Utc};
use cronui_scheduler::NextRun;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{Result, TableError},
    snapshot::{non_empty_command, single_line, TableSnapshot},
    types::{CronJob, Line, LineId, OpaqueLine},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireLine {
    #[serde(rename = "cronjob")]
    Job {
        /// Absent for jobs the client just created.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        schedule: String,
        command: String,
        /// Output only; whatever the client sends back is ignored.
        #[serde(default, skip_deserializing)]
        next: Option<NextRun>,
    },
    #[serde(rename = "cronline")]
    Opaque {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: String,
    },
}

impl WireLine {
    /// Wire form of `line`, with `next` evaluated against `now`.
    pub fn from_line(line: &Line, now: DateTime<Utc>) -> Self {
        match line {
            Line::Job(job) => WireLine::Job {
                id: Some(job.id.to_string()),
                schedule: job.schedule.to_string(),
                command: job.command.clone(),
                next: next_or_warn(job, now),
            },
            Line::Opaque(line) => WireLine::Opaque {
                id: Some(line.id.to_string()),
                content: line.content().to_string(),
            },
        }
    }

    /// Validate and convert into a [`Line`], minting an id when absent.
    pub fn into_line(self) -> Result<Line> {
        match self {
            WireLine::Job {
                id,
                schedule,
                command,
                ..
            } => {
                let id = mint(id);
                let schedule = cronui_scheduler::parse(&schedule).map_err(|source| {
                    TableError::InvalidSchedule {
                        id: id.to_string(),
                        source,
                    }
                })?;
                let command = non_empty_command(&id, &command)?;
                Ok(CronJob {
                    id,
                    schedule,
                    command,
                }
                .into())
            }
            WireLine::Opaque { id, content } => {
                let id = mint(id);
                single_line(&id, &content)?;
                Ok(OpaqueLine::with_id(id, content).into())
            }
        }
    }
}

fn mint(id: Option<String>) -> LineId {
    match id {
        Some(id) if !id.trim().is_empty() => LineId(id),
        _ => LineId::new(),
    }
}

fn next_or_warn(job: &CronJob, now: DateTime<Utc>) -> Option<NextRun> {
    match job.next_run(now) {
        Ok(next) => Some(next),
        Err(e) => {
            warn!(line_id = %job.id, schedule = %job.schedule, error = %e, "no next run for job");
            None
        }
    }
}

/// A whole table on the wire; `checksum` carries the snapshot fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSnapshot {
    pub lines: Vec<WireLine>,
    pub checksum: String,
}

impl WireSnapshot {
    pub fn from_snapshot(snapshot: &TableSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            lines: snapshot
                .lines()
                .iter()
                .map(|line| WireLine::from_line(line, now))
                .collect(),
            checksum: snapshot.fingerprint().to_string(),
        }
    }

    /// Validate every line and rebuild a [`TableSnapshot`].
    ///
    /// # Errors
    ///
    /// `InvalidSchedule`, `EmptyCommand`, `LineBreak` or `DuplicateId`.
    pub fn into_snapshot(self) -> Result<TableSnapshot> {
        let lines = self
            .lines
            .into_iter()
            .map(WireLine::into_line)
            .collect::<Result<Vec<_>>>()?;
        TableSnapshot::new(lines, self.checksum)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
