//! Checksum computation for snapshot headers and payloads

use crate::enums::ChecksumType;
use crate::error::{Result, SnapshotError};
use crc32fast::Hasher;
use tracing::warn;

/// Digest `data` with the given algorithm
///
/// CRC-32 digests are returned as four big-endian bytes.
///
/// # Errors
///
/// `UnsupportedChecksum` for algorithms this build cannot compute.
pub fn digest(kind: ChecksumType, data: &[u8]) -> Result<Vec<u8>> {
    match kind {
        ChecksumType::Crc32Ieee => {
            let mut hasher = Hasher::new();
            hasher.update(data);
            Ok(hasher.finalize().to_be_bytes().to_vec())
        }
        other => Err(SnapshotError::UnsupportedChecksum(other)),
    }
}

/// Compare a stored checksum against a freshly computed one
pub(crate) fn verify(
    what: &'static str,
    kind: ChecksumType,
    stored: Option<&[u8]>,
    data: &[u8],
) -> Result<()> {
    let expected = stored.ok_or(SnapshotError::MissingChecksum { what })?;
    let actual = digest(kind, data)?;
    if expected != actual.as_slice() {
        warn!(what, ?kind, len = data.len(), "Checksum mismatch");
        return Err(SnapshotError::ChecksumMismatch {
            what,
            expected: expected.to_vec(),
            actual,
        });
    }
    Ok(())
}
