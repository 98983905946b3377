use std::collections::HashSet;

use cronui_scheduler::ScheduleSpec;
use tracing::debug;

use crate::{
    classify::classify_line_with_id,
    error::{Result, TableError},
    fingerprint::fingerprint,
    types::{CronJob, Line, LineId},
};

/// Ordered lines of one crontab plus the fingerprint of the raw bytes they
/// were read from.
///
/// Never edited in place: the `with_*` / `without_*` helpers return a new
/// snapshot that keeps the original fingerprint, which is what a conditional
/// save compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    lines: Vec<Line>,
    fingerprint: String,
}

impl TableSnapshot {
    /// Assemble a snapshot from client-supplied lines.
    ///
    /// # Errors
    ///
    /// `DuplicateId` if two lines share an id.
    pub fn new(lines: Vec<Line>, fingerprint: impl Into<String>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if !seen.insert(line.id()) {
                return Err(TableError::DuplicateId {
                    id: line.id().to_string(),
                });
            }
        }
        Ok(Self {
            lines,
            fingerprint: fingerprint.into(),
        })
    }

    /// Snapshot of a table that does not exist yet.
    pub fn empty() -> Self {
        parse_table(b"")
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &CronJob> {
        self.lines.iter().filter_map(Line::as_job)
    }

    pub fn get(&self, id: &LineId) -> Option<&Line> {
        self.lines.iter().find(|line| line.id() == id)
    }

    /// Append a new job with a fresh id.
    pub fn with_job_added(&self, schedule: ScheduleSpec, command: &str) -> Result<Self> {
        let id = LineId::new();
        let command = non_empty_command(&id, command)?;
        let mut lines = self.lines.clone();
        lines.push(
            CronJob {
                id,
                schedule,
                command,
            }
            .into(),
        );
        Ok(self.derive(lines))
    }

    /// Replace the schedule and command of an existing job, keeping its id
    /// and position.
    pub fn with_job_updated(
        &self,
        id: &LineId,
        schedule: ScheduleSpec,
        command: &str,
    ) -> Result<Self> {
        let command = non_empty_command(id, command)?;
        let mut lines = self.lines.clone();
        let line = lines
            .iter_mut()
            .find(|line| line.id() == id)
            .ok_or_else(|| TableError::LineNotFound { id: id.to_string() })?;
        match line {
            Line::Job(job) => {
                job.schedule = schedule;
                job.command = command;
            }
            Line::Opaque(_) => return Err(TableError::NotAJob { id: id.to_string() }),
        }
        Ok(self.derive(lines))
    }

    /// Drop the line with `id`.
    pub fn without_line(&self, id: &LineId) -> Result<Self> {
        let position = self
            .lines
            .iter()
            .position(|line| line.id() == id)
            .ok_or_else(|| TableError::LineNotFound { id: id.to_string() })?;
        let mut lines = self.lines.clone();
        lines.remove(position);
        Ok(self.derive(lines))
    }

    fn derive(&self, lines: Vec<Line>) -> Self {
        Self {
            lines,
            fingerprint: self.fingerprint.clone(),
        }
    }
}

pub(crate) fn non_empty_command(id: &LineId, command: &str) -> Result<String> {
    let command = command.trim();
    if command.is_empty() {
        return Err(TableError::EmptyCommand);
    }
    single_line(id, command)?;
    Ok(command.to_string())
}

/// Reject text that would serialize as more than one physical line. A
/// trailing `\r` counts, since reading strips it before the `\n`.
pub(crate) fn single_line(id: &LineId, text: &str) -> Result<()> {
    if text.contains('\n') || text.ends_with('\r') {
        return Err(TableError::LineBreak { id: id.to_string() });
    }
    Ok(())
}

/// Parse raw crontab bytes into a snapshot fingerprinted with SHA-256.
pub fn parse_table(raw: &[u8]) -> TableSnapshot {
    parse_table_with(raw, fingerprint)
}

/// Parse raw crontab bytes, fingerprinting them with `fingerprint_fn`.
///
/// Never fails. Each physical line is classified independently and given a
/// fresh id. A trailing newline does not produce an extra empty line. The
/// fingerprint is always taken over the untouched input.
///
/// Invalid UTF-8 is replaced with U+FFFD rather than rejected, so a table
/// carrying such bytes (a Latin-1 comment, say) lists fine but is written
/// back with the replacement characters on the next save.
pub fn parse_table_with<F>(raw: &[u8], fingerprint_fn: F) -> TableSnapshot
where
    F: Fn(&[u8]) -> String,
{
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<Line> = text
        .lines()
        .map(|line| classify_line_with_id(LineId::new(), line))
        .collect();

    debug!(
        lines = lines.len(),
        jobs = lines.iter().filter(|l| l.is_job()).count(),
        "parsed crontab"
    );

    TableSnapshot {
        lines,
        fingerprint: fingerprint_fn(raw),
    }
}

/// Render a snapshot back into crontab bytes.
///
/// Every line is newline-terminated, as `crontab` requires; an empty
/// snapshot renders to no bytes at all.
pub fn serialize_table(snapshot: &TableSnapshot) -> Vec<u8> {
    let mut out = String::new();
    for line in &snapshot.lines {
        out.push_str(&line.render());
        out.push('\n');
    }
    out.into_bytes()
}
