use async_trait::async_trait;

use crate::error::Result;

/// Access to the authoritative, externally owned crontab.
///
/// Implementations make no transactional promise beyond this: once `write`
/// returns `Ok`, a following `read` sees the written table (possibly
/// normalised by the external system).
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Raw table bytes.
    ///
    /// Returns `SyncError::NoTable` when the user has no table yet, and
    /// `SyncError::GatewayRead` (or `Timeout`) for every other failure.
    async fn read(&self) -> Result<Vec<u8>>;

    /// Replace the whole table with `raw`.
    ///
    /// Failures surface as `SyncError::GatewayWrite` (or `Timeout`); the
    /// external table is assumed unchanged by a failed write.
    async fn write(&self, raw: &[u8]) -> Result<()>;
}
