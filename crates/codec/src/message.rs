//! Record codec
//!
//! [`Message`] is implemented once per schema by supplying a name and a field
//! table; sizing, encoding and decoding come from the default methods here.
//!
//! ## Encoding
//!
//! `encoded_len` sums each field's contribution in table order. `encode`
//! allocates exactly that many bytes and writes the fields in the same order.
//! A disagreement between the two is a codec defect and panics.
//!
//! ## Decoding
//!
//! Tags are read until the input is exhausted. Fields may arrive in any order;
//! a repeated occurrence of a scalar field overwrites the earlier value.
//! Unknown field numbers are skipped. Decoding builds a fresh value and only
//! returns it once the whole input has been consumed.

use crate::buf::{Reader, Writer};
use crate::error::{DecodeResult, EncodeError};
use crate::field::{EncodeBody, Field};
use crate::skip::skip_field;
use tracing::trace;

/// A record with a fixed schema
pub trait Message: Default + Sized + 'static {
    /// Message name used in errors and logs
    const NAME: &'static str;

    /// Field table, in encoding order
    const FIELDS: &'static [Field<Self>];

    /// Exact number of bytes `encode` produces
    fn encoded_len(&self) -> usize {
        Self::FIELDS.iter().map(|f| f.encoded_len(self)).sum()
    }

    /// Encode into a freshly allocated buffer of exactly `encoded_len` bytes
    ///
    /// # Panics
    ///
    /// Panics with `EncodingSizeMismatch` if the bytes written differ from
    /// the computed size.
    fn encode(&self) -> Vec<u8> {
        let size = self.encoded_len();
        let mut buf = vec![0u8; size];
        let mut writer = Writer::new(&mut buf);
        self.write_fields(&mut writer);
        assert_encoded_size(Self::NAME, size, writer.position());
        buf
    }

    /// Encode into a caller-supplied buffer, returning the bytes written
    ///
    /// Lets callers reuse one buffer across many encodes.
    fn encode_to(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let size = self.encoded_len();
        if buf.len() < size {
            return Err(EncodeError::BufferTooSmall {
                needed: size,
                available: buf.len(),
            });
        }
        let mut writer = Writer::new(&mut buf[..size]);
        self.write_fields(&mut writer);
        assert_encoded_size(Self::NAME, size, writer.position());
        Ok(size)
    }

    /// Write every field in table order
    fn write_fields(&self, writer: &mut Writer<'_>) {
        for field in Self::FIELDS {
            field.write(self, writer);
        }
    }

    /// Decode a complete record
    ///
    /// On error no partially decoded value is returned.
    fn decode(buf: &[u8]) -> DecodeResult<Self> {
        let mut msg = Self::default();
        let mut reader = Reader::new(buf);
        while !reader.is_empty() {
            let tag_offset = reader.position();
            let tag = reader.read_tag()?;
            match Self::FIELDS.iter().find(|f| f.number == tag.field_number) {
                Some(field) => field.read(Self::NAME, &mut msg, tag, tag_offset, &mut reader)?,
                None => {
                    trace!(
                        target: "snapwire::codec",
                        message = Self::NAME,
                        field_number = tag.field_number,
                        wire_type = ?tag.wire_type,
                        offset = tag_offset,
                        "Skipping unknown field"
                    );
                    skip_field(&mut reader, tag, tag_offset)?;
                }
            }
        }
        Ok(msg)
    }
}

impl<T: Message> EncodeBody for T {
    fn body_len(&self) -> usize {
        self.encoded_len()
    }

    fn write_body(&self, writer: &mut Writer<'_>) {
        let start = writer.position();
        let size = self.encoded_len();
        self.write_fields(writer);
        assert_encoded_size(T::NAME, size, writer.position() - start);
    }
}

/// Fail hard when the size computation and the writer disagree
#[inline]
fn assert_encoded_size(message: &'static str, computed: usize, written: usize) {
    if computed != written {
        panic!(
            "EncodingSizeMismatch in {}: computed {} bytes, wrote {}",
            message, computed, written
        );
    }
}

/// Decode a nested message body, for use in `FieldKind::Messages::push`
pub fn decode_nested<T: Message>(body: &[u8], into: &mut Vec<T>) -> DecodeResult<()> {
    into.push(T::decode(body)?);
    Ok(())
}
