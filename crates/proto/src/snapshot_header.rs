//! Snapshot header record
//!
//! Describes a point-in-time snapshot of replicated state: size accounting,
//! integrity checksums, format version and compression mode.
//!
//! ## Schema
//!
//! ```text
//! 1  session_size       varint
//! 2  data_store_size    varint
//! 3  unreliable_time    varint   (wall clock, not trusted for ordering)
//! 4  git_version        text
//! 5  header_checksum    bytes    (optional)
//! 6  payload_checksum   bytes    (optional)
//! 7  checksum_type      varint   (ChecksumType)
//! 8  version            varint
//! 9  compression_type   varint   (CompressionType)
//! ```
//!
//! Field numbers are permanent. New fields get new numbers; older readers
//! skip them.

use crate::checksum;
use crate::enums::{ChecksumType, CompressionType};
use crate::error::Result;
use snapwire_codec::{Field, FieldKind, Message};

/// Current snapshot format version
pub const SNAPSHOT_FORMAT_VERSION: u64 = 2;

/// Snapshot header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotHeader {
    /// Size of the session state section in bytes
    pub session_size: u64,
    /// Size of the data store section in bytes
    pub data_store_size: u64,
    /// Wall-clock time the snapshot was taken (seconds since epoch)
    pub unreliable_time: u64,
    /// Build version of the producer
    pub git_version: String,
    /// Checksum over the encoded header with this field absent
    pub header_checksum: Option<Vec<u8>>,
    /// Checksum over the snapshot payload
    pub payload_checksum: Option<Vec<u8>>,
    /// Algorithm for both checksums
    pub checksum_type: ChecksumType,
    /// Snapshot format version
    pub version: u64,
    /// Payload compression
    pub compression_type: CompressionType,
}

impl Message for SnapshotHeader {
    const NAME: &'static str = "SnapshotHeader";
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            number: 1,
            name: "session_size",
            kind: FieldKind::Varint {
                get: |m| m.session_size,
                set: |m, v| m.session_size = v,
            },
        },
        Field {
            number: 2,
            name: "data_store_size",
            kind: FieldKind::Varint {
                get: |m| m.data_store_size,
                set: |m, v| m.data_store_size = v,
            },
        },
        Field {
            number: 3,
            name: "unreliable_time",
            kind: FieldKind::Varint {
                get: |m| m.unreliable_time,
                set: |m, v| m.unreliable_time = v,
            },
        },
        Field {
            number: 4,
            name: "git_version",
            kind: FieldKind::Text {
                get: |m| m.git_version.as_str(),
                set: |m, v| m.git_version = v,
            },
        },
        Field {
            number: 5,
            name: "header_checksum",
            kind: FieldKind::Bytes {
                get: |m| m.header_checksum.as_deref(),
                set: |m, v| m.header_checksum = Some(v),
            },
        },
        Field {
            number: 6,
            name: "payload_checksum",
            kind: FieldKind::Bytes {
                get: |m| m.payload_checksum.as_deref(),
                set: |m, v| m.payload_checksum = Some(v),
            },
        },
        Field {
            number: 7,
            name: "checksum_type",
            kind: FieldKind::Varint {
                get: |m| m.checksum_type.as_u64(),
                set: |m, v| m.checksum_type = ChecksumType::from(v),
            },
        },
        Field {
            number: 8,
            name: "version",
            kind: FieldKind::Varint {
                get: |m| m.version,
                set: |m, v| m.version = v,
            },
        },
        Field {
            number: 9,
            name: "compression_type",
            kind: FieldKind::Varint {
                get: |m| m.compression_type.as_u64(),
                set: |m, v| m.compression_type = CompressionType::from(v),
            },
        },
    ];
}

impl SnapshotHeader {
    /// Create a header for the current format version
    pub fn new(session_size: u64, data_store_size: u64) -> Self {
        SnapshotHeader {
            session_size,
            data_store_size,
            version: SNAPSHOT_FORMAT_VERSION,
            ..Default::default()
        }
    }

    /// Set the wall-clock timestamp (builder pattern)
    pub fn with_unreliable_time(mut self, seconds: u64) -> Self {
        self.unreliable_time = seconds;
        self
    }

    /// Set the producer build version (builder pattern)
    pub fn with_git_version(mut self, version: impl Into<String>) -> Self {
        self.git_version = version.into();
        self
    }

    /// Set the payload compression (builder pattern)
    pub fn with_compression(mut self, compression: CompressionType) -> Self {
        self.compression_type = compression;
        self
    }

    /// Set the checksum algorithm (builder pattern)
    pub fn with_checksum_type(mut self, checksum_type: ChecksumType) -> Self {
        self.checksum_type = checksum_type;
        self
    }

    /// Bytes the header checksum covers: the encoding with `header_checksum` absent
    fn checksummed_bytes(&self) -> Vec<u8> {
        if self.header_checksum.is_none() {
            return self.encode();
        }
        let mut unsealed = self.clone();
        unsealed.header_checksum = None;
        unsealed.encode()
    }

    /// Fill in both checksums for `payload`
    ///
    /// The payload checksum is computed first because the header checksum
    /// covers it.
    pub fn seal(mut self, payload: &[u8]) -> Result<Self> {
        self.payload_checksum = Some(checksum::digest(self.checksum_type, payload)?);
        self.header_checksum = None;
        self.header_checksum = Some(checksum::digest(self.checksum_type, &self.encode())?);
        Ok(self)
    }

    /// Check the header checksum against the other fields
    pub fn verify_header(&self) -> Result<()> {
        checksum::verify(
            "header",
            self.checksum_type,
            self.header_checksum.as_deref(),
            &self.checksummed_bytes(),
        )
    }

    /// Check the payload checksum against `payload`
    pub fn verify_payload(&self, payload: &[u8]) -> Result<()> {
        checksum::verify(
            "payload",
            self.checksum_type,
            self.payload_checksum.as_deref(),
            payload,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
