//! In-process [`TableGateway`] for tests and local development.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{
    error::{Result, SyncError},
    gateway::TableGateway,
};

/// Rewrites bytes on write, the way an external tool might normalise them.
pub type Normalizer = fn(&[u8]) -> Vec<u8>;

#[derive(Default)]
struct MemoryState {
    /// `None` means no table has been installed.
    table: Option<Vec<u8>>,
    read_failure: Option<String>,
    write_failure: Option<String>,
    normalizer: Option<Normalizer>,
    writes: usize,
}

/// A table held in memory. Other handles to the same gateway can change it
/// behind the reconciler's back, which is how external edits are simulated.
#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<MemoryState>,
}

impl InMemoryGateway {
    /// Gateway with no table installed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(raw: impl Into<Vec<u8>>) -> Self {
        let gateway = Self::new();
        gateway.set_table(raw);
        gateway
    }

    /// Apply `normalizer` to every successful write.
    pub fn with_normalizer(self, normalizer: Normalizer) -> Self {
        self.lock().normalizer = Some(normalizer);
        self
    }

    /// Replace the table directly, as a third party would.
    pub fn set_table(&self, raw: impl Into<Vec<u8>>) {
        self.lock().table = Some(raw.into());
    }

    pub fn table(&self) -> Option<Vec<u8>> {
        self.lock().table.clone()
    }

    /// Make every read fail with `message` until cleared with `None`.
    pub fn set_read_failure(&self, message: Option<&str>) {
        self.lock().read_failure = message.map(str::to_string);
    }

    /// Make the next write fail with `message`.
    pub fn fail_next_write(&self, message: &str) {
        self.lock().write_failure = Some(message.to_string());
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TableGateway for InMemoryGateway {
    async fn read(&self) -> Result<Vec<u8>> {
        let state = self.lock();
        if let Some(message) = &state.read_failure {
            return Err(SyncError::GatewayRead(message.clone()));
        }
        state.table.clone().ok_or(SyncError::NoTable)
    }

    async fn write(&self, raw: &[u8]) -> Result<()> {
        let mut state = self.lock();
        if let Some(message) = state.write_failure.take() {
            return Err(SyncError::GatewayWrite(message));
        }
        let raw = match state.normalizer {
            Some(normalize) => normalize(raw),
            None => raw.to_vec(),
        };
        state.table = Some(raw);
        state.writes += 1;
        Ok(())
    }
}
