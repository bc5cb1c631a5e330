//! Message schemas for snapshots and the replicated log
//!
//! Every message here is a field table over the generic record codec in
//! `snapwire-codec`; none carries hand-written encode/decode logic.
//!
//! - `SnapshotHeader`: size accounting, checksums, format version, compression
//! - `Entry` / `EntryBatch`: replicated log records as persisted by the log store
//! - Checksum sealing and verification for snapshot headers
//! - The fixed 1024-byte header block at the start of a snapshot file

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checksum; // CRC32 digests
pub mod entry; // Log entries and batches
pub mod enums; // Varint-carried enumerations
pub mod error; // SnapshotError
pub mod header_block; // Fixed-size header block framing
pub mod snapshot_header; // SnapshotHeader schema

pub use entry::{Entry, EntryBatch};
pub use enums::{ChecksumType, CompressionType, EntryType};
pub use error::{Result, SnapshotError};
pub use header_block::{HeaderBlock, HEADER_BLOCK_SIZE, HEADER_CAPACITY};
pub use snapshot_header::{SnapshotHeader, SNAPSHOT_FORMAT_VERSION};

// Callers need the trait in scope for encode/decode.
pub use snapwire_codec::Message;
