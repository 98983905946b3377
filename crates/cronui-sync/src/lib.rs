//! cronui-sync: keeps a client's view of the crontab and the real one in step.
//!
//! - [`TableGateway`]: raw read/write access to the external table.
//! - [`CrontabGateway`]: the production gateway, shelling out to `crontab`.
//! - [`InMemoryGateway`]: an in-process table for tests and local runs.
//! - [`Reconciler`]: `list` and fingerprint-checked `save`.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//! use cronui_sync::{CrontabGateway, Reconciler};
//!
//! #[tokio::main]
//! async fn main() -> cronui_sync::Result<()> {
//!     let gateway = CrontabGateway::new("crontab", Duration::from_secs(10));
//!     let reconciler = Reconciler::new(Arc::new(gateway));
//!
//!     let snapshot = reconciler.list().await?;
//!     let edited = snapshot
//!         .with_job_added("0 5 * * *".parse().unwrap(), "echo hi")
//!         .unwrap();
//!     reconciler.save(&edited).await?;
//!     Ok(())
//! }
//! ```

pub mod crontab;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod reconciler;

pub use crontab::CrontabGateway;
pub use error::{Result, SyncError};
pub use gateway::TableGateway;
pub use memory::InMemoryGateway;
pub use reconciler::{Phase, Reconciler};
