use sha2::{Digest, Sha256};

/// Hex SHA-256 of the raw table bytes.
///
/// Only used to notice that the table changed between a read and a write.
pub fn fingerprint(raw: &[u8]) -> String {
    hex::encode(Sha256::digest(raw))
}
