//! `cronui-scheduler`: cron schedule parsing and next-occurrence evaluation.
//!
//! # Overview
//!
//! [`schedule::parse`] turns the schedule portion of a crontab line into a
//! validated [`ScheduleSpec`]; [`schedule::next_run`] computes when it fires
//! next. All times are UTC.
//!
//! # Schedule forms
//!
//! | Form        | Example        | Next run                                   |
//! |-------------|----------------|--------------------------------------------|
//! | 5 fields    | `0 5 * * 1-5`  | Earliest matching minute after `now`       |
//! | `@reboot`   | `@reboot`      | [`NextRun::Reboot`] sentinel               |
//! | Interval    | `@daily`       | As its 5-field expansion (`0 0 * * *`)     |

pub mod error;
pub mod schedule;
pub mod types;

pub use error::{Result, ScheduleError};
pub use schedule::{next_run, parse};
pub use types::{CronExpr, FieldSet, Macro, NextRun, ScheduleSpec};
