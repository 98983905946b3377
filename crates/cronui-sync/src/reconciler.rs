//! `Reconciler`: load, conditionally save and reload the external table.
//!
//! ```text
//! Loading -> { Loaded, LoadFailed }
//! Loaded -> Saving -> { SaveSucceeded, SaveConflict, SaveFailed }
//! ```
//!
//! The fingerprint comparison in [`Reconciler::save`] is the only concurrency
//! control. It is a coarse optimistic lock: any external change rejects the
//! save, even one that would merge cleanly. The check and the write are not
//! atomic, and the re-read after a successful write is not checked either, so
//! a third writer landing in either window goes unnoticed.

use std::{fmt, sync::Arc};

use cronui_table::{parse_table, serialize_table, TableSnapshot};
use tracing::{debug, error, info, warn};

use crate::{
    error::{Result, SyncError},
    gateway::TableGateway,
};

/// Where a `list` or `save` call currently is; used for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Loaded,
    LoadFailed,
    Saving,
    SaveSucceeded,
    SaveConflict,
    SaveFailed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Loading => "loading",
            Phase::Loaded => "loaded",
            Phase::LoadFailed => "load_failed",
            Phase::Saving => "saving",
            Phase::SaveSucceeded => "save_succeeded",
            Phase::SaveConflict => "save_conflict",
            Phase::SaveFailed => "save_failed",
        };
        write!(f, "{s}")
    }
}

/// Request-scoped orchestration over a shared [`TableGateway`].
///
/// Holds no state of its own beyond the gateway handle, so one instance can
/// serve concurrent requests.
#[derive(Clone)]
pub struct Reconciler {
    gateway: Arc<dyn TableGateway>,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self { gateway }
    }

    /// Read and parse the current table.
    ///
    /// A user without a table gets an empty snapshot fingerprinted over
    /// empty content.
    ///
    /// # Errors
    ///
    /// - `GatewayRead` / `Timeout`: the gateway could not be read.
    pub async fn list(&self) -> Result<TableSnapshot> {
        debug!(phase = %Phase::Loading, "reading crontab");
        match self.load().await {
            Ok(snapshot) => {
                debug!(phase = %Phase::Loaded, lines = snapshot.len(), "crontab loaded");
                Ok(snapshot)
            }
            Err(e) => {
                error!(phase = %Phase::LoadFailed, error = %e, "crontab read failed");
                Err(e)
            }
        }
    }

    /// Write `submitted` if the table is still the one it was loaded from,
    /// then return the table as it now exists.
    ///
    /// # Errors
    ///
    /// - `Conflict`: the table changed since `submitted` was loaded.
    /// - `GatewayRead`: the table could not be read, before or after the write.
    /// - `GatewayWrite`: the write failed; it is not retried.
    /// - `Timeout`: the gateway did not answer in time.
    pub async fn save(&self, submitted: &TableSnapshot) -> Result<TableSnapshot> {
        debug!(phase = %Phase::Saving, lines = submitted.len(), "saving crontab");

        let current = self.load().await.inspect_err(|e| {
            error!(phase = %Phase::SaveFailed, error = %e, "pre-save read failed");
        })?;

        if submitted.fingerprint() != current.fingerprint() {
            warn!(
                phase = %Phase::SaveConflict,
                expected = %submitted.fingerprint(),
                actual = %current.fingerprint(),
                "crontab changed since it was loaded"
            );
            return Err(SyncError::Conflict {
                expected: submitted.fingerprint().to_string(),
                actual: current.fingerprint().to_string(),
            });
        }

        let raw = serialize_table(submitted);
        self.gateway.write(&raw).await.inspect_err(|e| {
            error!(phase = %Phase::SaveFailed, error = %e, "crontab write failed");
        })?;

        let saved = self.load().await.inspect_err(|e| {
            error!(phase = %Phase::SaveFailed, error = %e, "post-save read failed");
        })?;
        info!(
            phase = %Phase::SaveSucceeded,
            lines = saved.len(),
            jobs = saved.jobs().count(),
            "crontab saved"
        );
        Ok(saved)
    }

    async fn load(&self) -> Result<TableSnapshot> {
        match self.gateway.read().await {
            Ok(raw) => Ok(parse_table(&raw)),
            Err(SyncError::NoTable) => Ok(TableSnapshot::empty()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryGateway;

    #[tokio::test]
    async fn missing_table_lists_as_empty() {
        let reconciler = Reconciler::new(Arc::new(InMemoryGateway::new()));
        let snapshot = reconciler.list().await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.fingerprint(), cronui_table::fingerprint(b""));
    }

    #[tokio::test]
    async fn read_failure_surfaces() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.set_read_failure(Some("permission denied"));
        let reconciler = Reconciler::new(gateway);
        let err = reconciler.list().await.unwrap_err();
        assert!(matches!(err, SyncError::GatewayRead(ref m) if m == "permission denied"));
    }

    #[tokio::test]
    async fn first_save_creates_table() {
        let gateway = Arc::new(InMemoryGateway::new());
        let reconciler = Reconciler::new(gateway.clone());

        let empty = reconciler.list().await.unwrap();
        let edited = empty
            .with_job_added("@reboot".parse().unwrap(), "start.sh")
            .unwrap();
        let saved = reconciler.save(&edited).await.unwrap();

        assert_eq!(saved.jobs().count(), 1);
        assert_eq!(gateway.table().unwrap(), b"@reboot start.sh\n");
    }

    #[test]
    fn phase_names() {
        assert_eq!(Phase::SaveConflict.to_string(), "save_conflict");
        assert_eq!(Phase::LoadFailed.to_string(), "load_failed");
    }
}
