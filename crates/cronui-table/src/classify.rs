use std::sync::LazyLock;

use regex::Regex;

use crate::types::{CronJob, Line, LineId, OpaqueLine};

/// Schedule prefix: a single `@macro` token or exactly five fields, then at
/// least one non-space character of command. The schedule alternative is
/// anchored and fixed-width, so cron-looking words inside the command stay
/// part of the command.
static JOB_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(@\S+|\S+\s+\S+\s+\S+\s+\S+\s+\S+)\s+(\S.*?)\s*$")
        .expect("constant regex pattern is valid")
});

/// Classify one physical line (without its terminator).
///
/// Never fails: anything that is not a valid schedule followed by a command
/// comes back as [`Line::Opaque`] holding the original text unmodified.
pub fn classify_line(text: &str) -> Line {
    classify_line_with_id(LineId::new(), text)
}

pub(crate) fn classify_line_with_id(id: LineId, text: &str) -> Line {
    if text.trim_start().starts_with('#') {
        return OpaqueLine::with_id(id, text).into();
    }

    let Some(caps) = JOB_LINE.captures(text) else {
        return OpaqueLine::with_id(id, text).into();
    };

    match cronui_scheduler::parse(&caps[1]) {
        Ok(schedule) => CronJob {
            id,
            schedule,
            command: caps[2].to_string(),
        }
        .into(),
        Err(_) => OpaqueLine::with_id(id, text).into(),
    }
}
