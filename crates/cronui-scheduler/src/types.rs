use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ScheduleError;

/// Named schedule shorthand understood by the system cron daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Macro {
    /// Run once after the daemon starts.
    Reboot,
    Yearly,
    Annually,
    Monthly,
    Weekly,
    Daily,
    Midnight,
    Hourly,
}

impl Macro {
    /// Canonical spelling, including the leading `@`.
    pub fn token(&self) -> &'static str {
        match self {
            Macro::Reboot => "@reboot",
            Macro::Yearly => "@yearly",
            Macro::Annually => "@annually",
            Macro::Monthly => "@monthly",
            Macro::Weekly => "@weekly",
            Macro::Daily => "@daily",
            Macro::Midnight => "@midnight",
            Macro::Hourly => "@hourly",
        }
    }

    /// The equivalent 5-field expression, or `None` for `@reboot`.
    pub fn expansion(&self) -> Option<&'static str> {
        match self {
            Macro::Reboot => None,
            Macro::Yearly | Macro::Annually => Some("0 0 1 1 *"),
            Macro::Monthly => Some("0 0 1 * *"),
            Macro::Weekly => Some("0 0 * * 0"),
            Macro::Daily | Macro::Midnight => Some("0 0 * * *"),
            Macro::Hourly => Some("0 * * * *"),
        }
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl std::str::FromStr for Macro {
    type Err = ScheduleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "@reboot" => Ok(Macro::Reboot),
            "@yearly" => Ok(Macro::Yearly),
            "@annually" => Ok(Macro::Annually),
            "@monthly" => Ok(Macro::Monthly),
            "@weekly" => Ok(Macro::Weekly),
            "@daily" => Ok(Macro::Daily),
            "@midnight" => Ok(Macro::Midnight),
            "@hourly" => Ok(Macro::Hourly),
            _ => Err(ScheduleError::InvalidSchedule(format!(
                "unknown macro: {s}"
            ))),
        }
    }
}

/// The set of values one cron field admits, as a bitmask over 0..=63.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldSet(u64);

impl FieldSet {
    pub const EMPTY: FieldSet = FieldSet(0);

    pub fn contains(&self, value: u32) -> bool {
        value < 64 && self.0 & (1u64 << value) != 0
    }

    pub(crate) fn insert(&mut self, value: u32) {
        self.0 |= 1u64 << value;
    }

    pub(crate) fn remove(&mut self, value: u32) {
        self.0 &= !(1u64 << value);
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Admitted values in ascending order.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        (0..64).filter(move |v| self.contains(*v))
    }
}

impl fmt::Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values()).finish()
    }
}

/// A compiled 5-field cron expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CronExpr {
    pub(crate) minute: FieldSet,
    pub(crate) hour: FieldSet,
    pub(crate) day_of_month: FieldSet,
    pub(crate) month: FieldSet,
    /// Sunday is always 0 here; a literal `7` is folded in at parse time.
    pub(crate) day_of_week: FieldSet,
    /// Day-of-month field began with `*`. When either day field is starred
    /// both must match; otherwise matching either one is enough.
    pub(crate) dom_star: bool,
    pub(crate) dow_star: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Compiled {
    Reboot,
    Times(CronExpr),
}

/// A validated schedule: either five cron fields or a macro token.
///
/// Immutable once constructed. Malformed input never produces a value; see
/// [`crate::schedule::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleSpec {
    /// Whitespace-normalised source text; this is what gets written back.
    pub(crate) text: String,
    pub(crate) macro_kind: Option<Macro>,
    pub(crate) compiled: Compiled,
}

impl ScheduleSpec {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The macro this schedule was written as, if any.
    pub fn macro_kind(&self) -> Option<Macro> {
        self.macro_kind
    }

    /// True for `@reboot`, which has no time-based occurrence.
    pub fn is_reboot(&self) -> bool {
        matches!(self.compiled, Compiled::Reboot)
    }

    /// The compiled time fields; `None` for `@reboot`.
    pub fn cron_expr(&self) -> Option<&CronExpr> {
        match &self.compiled {
            Compiled::Reboot => None,
            Compiled::Times(expr) => Some(expr),
        }
    }
}

impl fmt::Display for ScheduleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl std::str::FromStr for ScheduleSpec {
    type Err = ScheduleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        crate::schedule::parse(s)
    }
}

impl TryFrom<String> for ScheduleSpec {
    type Error = ScheduleError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        crate::schedule::parse(&s)
    }
}

impl From<ScheduleSpec> for String {
    fn from(spec: ScheduleSpec) -> Self {
        spec.text
    }
}

/// Result of evaluating a schedule against a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRun {
    /// Triggered when the cron daemon starts, not at a wall-clock time.
    Reboot,
    At(DateTime<Utc>),
}

impl NextRun {
    /// Wire sentinel for [`NextRun::Reboot`].
    pub const REBOOT_SENTINEL: &'static str = "reboot";

    pub fn at(&self) -> Option<DateTime<Utc>> {
        match self {
            NextRun::Reboot => None,
            NextRun::At(dt) => Some(*dt),
        }
    }
}

impl fmt::Display for NextRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextRun::Reboot => write!(f, "{}", Self::REBOOT_SENTINEL),
            NextRun::At(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

impl Serialize for NextRun {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
