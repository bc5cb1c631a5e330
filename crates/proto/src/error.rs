//! Snapshot header errors

use crate::enums::ChecksumType;
use snapwire_codec::{DecodeError, EncodeError};
use thiserror::Error;

/// Result type alias for snapshot header operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Snapshot header errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Header bytes could not be decoded
    #[error("Header decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Header could not be written into the supplied buffer
    #[error("Header encode failed: {0}")]
    Encode(#[from] EncodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoded header does not fit the fixed header block
    #[error("Header too large: {size} bytes, block holds {capacity}")]
    HeaderTooLarge {
        /// Encoded header size
        size: usize,
        /// Space available after the length prefix
        capacity: usize,
    },

    /// Header block length prefix points outside the block
    #[error("Invalid header block length {length} (block holds {capacity})")]
    InvalidBlockLength {
        /// Declared length
        length: u64,
        /// Space available after the length prefix
        capacity: usize,
    },

    /// Header block shorter than the fixed block size
    #[error("Header block too short: expected {expected} bytes, got {actual}")]
    TooShort {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Recomputed checksum differs from the stored one
    #[error("{what} checksum mismatch: expected {expected:02x?}, got {actual:02x?}")]
    ChecksumMismatch {
        /// Which checksum ("header" or "payload")
        what: &'static str,
        /// Stored checksum
        expected: Vec<u8>,
        /// Recomputed checksum
        actual: Vec<u8>,
    },

    /// Checksum field absent
    #[error("{what} checksum missing")]
    MissingChecksum {
        /// Which checksum ("header" or "payload")
        what: &'static str,
    },

    /// Checksum algorithm not available in this build
    #[error("Unsupported checksum type: {0:?}")]
    UnsupportedChecksum(ChecksumType),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_error_display() {
        let err = SnapshotError::HeaderTooLarge {
            size: 2000,
            capacity: 1016,
        };
        assert!(err.to_string().contains("2000"));
        assert!(err.to_string().contains("1016"));

        let err = SnapshotError::ChecksumMismatch {
            what: "payload",
            expected: vec![0xde, 0xad],
            actual: vec![0xbe, 0xef],
        };
        let msg = err.to_string();
        assert!(msg.contains("payload"));
        assert!(msg.contains("de"));
        assert!(msg.contains("ef"));
    }

    #[test]
    fn test_from_decode_error() {
        let err: SnapshotError = DecodeError::Overflow { offset: 3 }.into();
        assert!(matches!(err, SnapshotError::Decode(DecodeError::Overflow { offset: 3 })));
    }
}
