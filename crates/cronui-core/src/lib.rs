//! `cronui-core`: configuration and the client-facing error taxonomy shared
//! by the cronui crates.

pub mod config;
pub mod error;

pub use config::CronuiConfig;
pub use error::{CronuiError, Result};
