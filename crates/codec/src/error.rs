//! Codec error types
//!
//! Every decode failure carries the byte offset at which it was detected so
//! callers can tell a short read apart from corruption in the middle of a
//! record. Decode errors are plain values: a failed decode never exposes a
//! partially populated message.

use crate::tag::WireType;
use thiserror::Error;

/// Result type alias for decode operations
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors raised while parsing a byte stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ended before a value completed
    ///
    /// Recoverable: the caller either needs more bytes or holds corrupt input.
    #[error("offset {offset}: truncated input, need {needed} more byte(s)")]
    Truncated {
        /// Offset where the incomplete value started
        offset: usize,
        /// Minimum number of additional bytes required
        needed: usize,
    },

    /// A varint ran past ten bytes or exceeded 64 bits
    #[error("offset {offset}: varint overflows 64 bits")]
    Overflow {
        /// Offset of the first byte of the varint
        offset: usize,
    },

    /// Tag carried a field number outside the valid range
    #[error("offset {offset}: illegal tag {tag} (field number {field_number})")]
    InvalidTag {
        /// Offset of the tag
        offset: usize,
        /// Raw tag value
        tag: u64,
        /// Field number extracted from the tag
        field_number: u64,
    },

    /// A known field arrived with a wire type different from its declaration
    #[error("offset {offset}: wrong wire type {actual:?} for field {message}.{field} (expected {expected:?})")]
    WireTypeMismatch {
        /// Offset of the tag
        offset: usize,
        /// Message being decoded
        message: &'static str,
        /// Field name
        field: &'static str,
        /// Declared wire type
        expected: WireType,
        /// Wire type found in the stream
        actual: WireType,
    },

    /// Length prefix is negative as a signed value or overflows the address space
    #[error("offset {offset}: invalid length {length}")]
    InvalidLength {
        /// Offset of the length prefix
        offset: usize,
        /// Declared length
        length: u64,
    },

    /// Wire type cannot be skipped (reserved value or unmatched end-group)
    #[error("offset {offset}: unknown wire type {wire_type}")]
    UnknownWireType {
        /// Offset of the tag
        offset: usize,
        /// Raw wire type bits
        wire_type: u8,
    },

    /// Text field did not hold valid UTF-8
    #[error("offset {offset}: field {message}.{field} is not valid UTF-8")]
    InvalidUtf8 {
        /// Offset of the field payload
        offset: usize,
        /// Message being decoded
        message: &'static str,
        /// Field name
        field: &'static str,
    },
}

impl DecodeError {
    /// Returns true for the "need more bytes" class of failure
    pub fn is_truncated(&self) -> bool {
        matches!(self, DecodeError::Truncated { .. })
    }

    /// Byte offset at which the error was detected
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::Truncated { offset, .. }
            | DecodeError::Overflow { offset }
            | DecodeError::InvalidTag { offset, .. }
            | DecodeError::WireTypeMismatch { offset, .. }
            | DecodeError::InvalidLength { offset, .. }
            | DecodeError::UnknownWireType { offset, .. }
            | DecodeError::InvalidUtf8 { offset, .. } => *offset,
        }
    }
}

/// Errors raised while writing into a caller-supplied buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Buffer is shorter than the encoded size of the message
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes available
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::Truncated {
            offset: 12,
            needed: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("3"));

        let err = DecodeError::WireTypeMismatch {
            offset: 0,
            message: "SnapshotHeader",
            field: "git_version",
            expected: WireType::LengthDelimited,
            actual: WireType::Varint,
        };
        let msg = err.to_string();
        assert!(msg.contains("SnapshotHeader.git_version"));
        assert!(msg.contains("Varint"));
    }

    #[test]
    fn test_decode_error_offset() {
        assert_eq!(DecodeError::Overflow { offset: 7 }.offset(), 7);
        assert_eq!(
            DecodeError::InvalidLength {
                offset: 4,
                length: u64::MAX
            }
            .offset(),
            4
        );
    }

    #[test]
    fn test_is_truncated() {
        assert!(DecodeError::Truncated {
            offset: 0,
            needed: 1
        }
        .is_truncated());
        assert!(!DecodeError::Overflow { offset: 0 }.is_truncated());
    }

    #[test]
    fn test_encode_error_display() {
        let err = EncodeError::BufferTooSmall {
            needed: 29,
            available: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("29"));
        assert!(msg.contains("10"));
    }
}
