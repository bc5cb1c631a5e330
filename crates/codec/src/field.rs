//! Declarative field tables
//!
//! A message describes its schema as a static slice of [`Field`]s. Each entry
//! pairs a permanent field number with plain function pointers that read the
//! value out of, and store it back into, the message struct. The record codec
//! walks the table, so no message type carries its own encode/decode loop.
//!
//! ```ignore
//! const FIELDS: &'static [Field<Self>] = &[
//!     Field {
//!         number: 1,
//!         name: "session_size",
//!         kind: FieldKind::Varint {
//!             get: |m| m.session_size,
//!             set: |m, v| m.session_size = v,
//!         },
//!     },
//! ];
//! ```

use crate::buf::{Reader, Writer};
use crate::error::{DecodeError, DecodeResult};
use crate::tag::{Tag, WireType};
use crate::varint;

/// Encoding seam for nested messages held in a repeated field
///
/// Implemented for every [`Message`](crate::Message); object safe so a field
/// table can hand out `&dyn EncodeBody` without knowing the element type.
pub trait EncodeBody {
    /// Length of the message body (without tag or length prefix)
    fn body_len(&self) -> usize;

    /// Write the message body
    fn write_body(&self, writer: &mut Writer<'_>);
}

/// One entry of a message's field table
pub struct Field<M> {
    /// Permanent field number; never reused or renumbered
    pub number: u32,
    /// Field name used in error messages
    pub name: &'static str,
    /// Value type and accessors
    pub kind: FieldKind<M>,
}

/// Value types a field can hold
pub enum FieldKind<M> {
    /// Unsigned integer or enumeration
    ///
    /// Always written; decodes to zero when missing from the stream.
    Varint {
        /// Read the value
        get: fn(&M) -> u64,
        /// Store a decoded value
        set: fn(&mut M, u64),
    },

    /// UTF-8 text, always written (possibly empty)
    Text {
        /// Read the value
        get: fn(&M) -> &str,
        /// Store a decoded value
        set: fn(&mut M, String),
    },

    /// Byte sequence with presence
    ///
    /// `get` returning `None` means the field is absent and nothing is
    /// written; `Some(&[])` writes a present-but-empty field.
    Bytes {
        /// Read the value
        get: fn(&M) -> Option<&[u8]>,
        /// Store a decoded value
        set: fn(&mut M, Vec<u8>),
    },

    /// Repeated nested message, one tag/length/body triple per element
    Messages {
        /// Number of elements
        count: fn(&M) -> usize,
        /// Element at an index
        get: fn(&M, usize) -> &dyn EncodeBody,
        /// Decode one element body and append it
        push: fn(&mut M, &[u8]) -> DecodeResult<()>,
    },
}

impl<M> FieldKind<M> {
    /// Wire type this kind is framed with
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldKind::Varint { .. } => WireType::Varint,
            FieldKind::Text { .. } | FieldKind::Bytes { .. } | FieldKind::Messages { .. } => {
                WireType::LengthDelimited
            }
        }
    }
}

/// Size of a length prefix plus body
#[inline]
fn length_delimited_len(len: usize) -> usize {
    varint::encoded_len(len as u64) + len
}

impl<M> Field<M> {
    /// Tag written before each value of this field
    pub fn tag(&self) -> Tag {
        Tag::new(self.number, self.kind.wire_type())
    }

    /// Bytes this field contributes to the encoding of `msg`
    ///
    /// Absent byte fields and empty repeated fields contribute nothing.
    pub fn encoded_len(&self, msg: &M) -> usize {
        let tag_len = self.tag().encoded_len();
        match &self.kind {
            FieldKind::Varint { get, .. } => tag_len + varint::encoded_len(get(msg)),
            FieldKind::Text { get, .. } => tag_len + length_delimited_len(get(msg).len()),
            FieldKind::Bytes { get, .. } => {
                get(msg).map_or(0, |bytes| tag_len + length_delimited_len(bytes.len()))
            }
            FieldKind::Messages { count, get, .. } => (0..count(msg))
                .map(|i| tag_len + length_delimited_len(get(msg, i).body_len()))
                .sum(),
        }
    }

    /// Write this field of `msg`
    pub fn write(&self, msg: &M, writer: &mut Writer<'_>) {
        let tag = self.tag();
        match &self.kind {
            FieldKind::Varint { get, .. } => {
                writer.put_tag(tag);
                writer.put_varint(get(msg));
            }
            FieldKind::Text { get, .. } => {
                writer.put_tag(tag);
                writer.put_length_delimited(get(msg).as_bytes());
            }
            FieldKind::Bytes { get, .. } => {
                if let Some(bytes) = get(msg) {
                    writer.put_tag(tag);
                    writer.put_length_delimited(bytes);
                }
            }
            FieldKind::Messages { count, get, .. } => {
                for i in 0..count(msg) {
                    let element = get(msg, i);
                    writer.put_tag(tag);
                    writer.put_varint(element.body_len() as u64);
                    element.write_body(writer);
                }
            }
        }
    }

    /// Decode the value following `tag` into `msg`
    ///
    /// A later occurrence of the same field overwrites the earlier one;
    /// repeated fields append.
    pub fn read(
        &self,
        message: &'static str,
        msg: &mut M,
        tag: Tag,
        tag_offset: usize,
        reader: &mut Reader<'_>,
    ) -> DecodeResult<()> {
        let expected = self.kind.wire_type();
        if tag.wire_type != expected {
            return Err(DecodeError::WireTypeMismatch {
                offset: tag_offset,
                message,
                field: self.name,
                expected,
                actual: tag.wire_type,
            });
        }
        match &self.kind {
            FieldKind::Varint { set, .. } => set(msg, reader.read_varint()?),
            FieldKind::Text { set, .. } => {
                let offset = reader.position();
                let bytes = reader.read_length_delimited()?;
                let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
                    offset,
                    message,
                    field: self.name,
                })?;
                set(msg, text.to_owned());
            }
            FieldKind::Bytes { set, .. } => set(msg, reader.read_length_delimited()?.to_vec()),
            FieldKind::Messages { push, .. } => push(msg, reader.read_length_delimited()?)?,
        }
        Ok(())
    }
}
