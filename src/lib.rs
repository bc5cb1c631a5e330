//! Snapwire - compact binary records for snapshots and replicated logs
//!
//! Snapwire encodes small structured records in a self-describing
//! tag-length-value format, readable by older and newer producers alike.
//!
//! # Quick Start
//!
//! ```
//! use snapwire::proto::{Message, SnapshotHeader};
//!
//! let header = SnapshotHeader::new(100, 4096).with_git_version("v1.2.3");
//! let bytes = header.encode();
//! assert_eq!(bytes.len(), header.encoded_len());
//! assert_eq!(SnapshotHeader::decode(&bytes).unwrap(), header);
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: varints, tags, the field-table record codec and the unknown-field skipper
//! - [`proto`]: `SnapshotHeader`, log `Entry` / `EntryBatch`, checksums, header block framing
//! - [`logdb`]: log store over a pluggable key-value engine

pub use snapwire_codec as codec;
pub use snapwire_logdb as logdb;
pub use snapwire_proto as proto;

pub use snapwire_codec::{DecodeError, Message};
pub use snapwire_proto::{SnapshotError, SnapshotHeader};
