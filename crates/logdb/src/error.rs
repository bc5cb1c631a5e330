//! Log store errors

use crate::config::LogDbConfigError;
use snapwire_codec::DecodeError;
use std::io;
use thiserror::Error;

/// Result type alias for log store operations
pub type Result<T> = std::result::Result<T, LogDbError>;

/// Log store errors
#[derive(Debug, Error)]
pub enum LogDbError {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored value could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Stored data failed an integrity check
    #[error("Data corruption at offset {offset}: {detail}")]
    Corruption {
        /// Byte offset in the engine's file
        offset: u64,
        /// What was wrong
        detail: String,
    },

    /// Write batch too large for one log frame
    #[error("Write batch too large: {size} bytes")]
    BatchTooLarge {
        /// Encoded batch size
        size: usize,
    },

    /// A failed append could not be rolled back; the store accepts no more writes
    #[error("Store refuses writes: partial frame at offset {offset} could not be rolled back")]
    Poisoned {
        /// End of the last complete frame
        offset: u64,
    },

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Config(#[from] LogDbConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LogDbError::Corruption {
            offset: 4096,
            detail: "CRC mismatch".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("4096"));
        assert!(msg.contains("CRC mismatch"));

        let err: LogDbError = LogDbConfigError::NoDirectories.into();
        assert!(matches!(err, LogDbError::Config(LogDbConfigError::NoDirectories)));
    }

    #[test]
    fn test_from_decode_error() {
        let err: LogDbError = DecodeError::Overflow { offset: 1 }.into();
        assert!(err.to_string().contains("varint"));
    }
}
