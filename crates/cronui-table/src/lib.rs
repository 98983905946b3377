//! `cronui-table`: lossless, order-preserving model of a user crontab.
//!
//! Raw bytes are split into lines and each line is classified as either a
//! [`CronJob`] (schedule + command) or an [`OpaqueLine`] (comments, blank
//! lines, environment assignments, anything malformed) that is written back
//! untouched. A [`TableSnapshot`] carries the fingerprint of the bytes it was
//! parsed from so a later write can detect external edits.

pub mod classify;
pub mod error;
pub mod fingerprint;
pub mod snapshot;
pub mod types;
pub mod wire;

pub use classify::classify_line;
pub use error::{Result, TableError};
pub use fingerprint::fingerprint;
pub use snapshot::{parse_table, parse_table_with, serialize_table, TableSnapshot};
pub use types::{CronJob, Line, LineId, OpaqueLine};
pub use wire::{WireLine, WireSnapshot};
