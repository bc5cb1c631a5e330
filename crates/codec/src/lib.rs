//! Tag-length-value codec for fixed-schema records
//!
//! This crate holds the wire-level machinery shared by every message type:
//!
//! - Varint: base-128 unsigned integers and their encoded length
//! - Tags: `(field_number << 3) | wire_type` framing
//! - Fields: declarative field tables with per-kind encode/decode/size
//! - Messages: one generic record codec driven by the field table
//! - Skipping: forward-compatible handling of unknown fields
//!
//! ## Wire Format
//!
//! ```text
//! record := (tag value)*
//! tag    := varint((field_number << 3) | wire_type)
//! value  := varint                      (wire type 0)
//!         | varint(len) byte{len}       (wire type 2)
//! ```
//!
//! There is no record length prefix or checksum at this layer.
//!
//! The codec is stateless: every call is independent and may run concurrently
//! on disjoint buffers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buf; // Position-tracked reader and writer
pub mod error; // Decode and encode errors
pub mod field; // Field tables
pub mod message; // Generic record codec
pub mod skip; // Unknown-field skipper
pub mod tag; // Tag framing
pub mod varint; // Varint primitive

pub use buf::{Reader, Writer};
pub use error::{DecodeError, DecodeResult, EncodeError};
pub use field::{EncodeBody, Field, FieldKind};
pub use message::{decode_nested, Message};
pub use skip::skip_field;
pub use tag::{Tag, WireType, MAX_FIELD_NUMBER};
pub use varint::MAX_VARINT_LEN;
