//! Position-tracked cursors over byte buffers
//!
//! `Writer` fills a pre-sized slice and never grows it. `Reader` validates
//! every length before slicing, using checked arithmetic so a hostile length
//! prefix cannot wrap around a bounds check.

use crate::error::{DecodeError, DecodeResult};
use crate::tag::Tag;
use crate::varint;

/// Append-only writer over a fixed buffer
///
/// Writes past the end of the buffer panic with `EncodingSizeMismatch`: the
/// buffer is sized from the message's computed length, so running out of
/// room means the size computation and the encoder disagree.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    /// Create a writer positioned at the start of `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        Writer { buf, pos: 0 }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left in the buffer
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn reserve(&self, needed: usize) {
        if needed > self.remaining() {
            panic!(
                "EncodingSizeMismatch: writing {} bytes at offset {} overruns a {}-byte buffer",
                needed,
                self.pos,
                self.buf.len()
            );
        }
    }

    /// Write a varint
    pub fn put_varint(&mut self, value: u64) {
        self.reserve(varint::encoded_len(value));
        self.pos += varint::encode(value, &mut self.buf[self.pos..]);
    }

    /// Write a tag
    pub fn put_tag(&mut self, tag: Tag) {
        self.put_varint(tag.value());
    }

    /// Write raw bytes
    pub fn put_slice(&mut self, data: &[u8]) {
        self.reserve(data.len());
        let end = self.pos + data.len();
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
    }

    /// Write a varint length prefix followed by `data`
    pub fn put_length_delimited(&mut self, data: &[u8]) {
        self.put_varint(data.len() as u64);
        self.put_slice(data);
    }
}

/// Bounds-checked reader over an input buffer
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    /// Current offset into the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Read one varint
    pub fn read_varint(&mut self) -> DecodeResult<u64> {
        let (value, consumed) = varint::decode_at(self.buf, self.pos)?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read and validate one tag
    pub fn read_tag(&mut self) -> DecodeResult<Tag> {
        let offset = self.pos;
        let raw = self.read_varint()?;
        Tag::from_raw(raw, offset)
    }

    /// Read a varint length prefix and return the bytes it covers
    ///
    /// # Errors
    ///
    /// - `InvalidLength` if the length is negative as a signed 64-bit value
    ///   or `offset + length` overflows
    /// - `Truncated` if the declared bytes run past the end of the buffer
    pub fn read_length_delimited(&mut self) -> DecodeResult<&'a [u8]> {
        let start = self.pos;
        let (length, consumed) = varint::decode_at(self.buf, start)?;
        if length > i64::MAX as u64 {
            return Err(DecodeError::InvalidLength {
                offset: start,
                length,
            });
        }
        let body = start + consumed;
        let end = usize::try_from(length)
            .ok()
            .and_then(|len| body.checked_add(len))
            .ok_or(DecodeError::InvalidLength {
                offset: start,
                length,
            })?;
        if end > self.buf.len() {
            return Err(DecodeError::Truncated {
                offset: body,
                needed: end - self.buf.len(),
            });
        }
        self.pos = end;
        Ok(&self.buf[body..end])
    }

    /// Consume exactly `n` bytes without interpreting them
    pub fn advance(&mut self, n: usize) -> DecodeResult<()> {
        let available = self.remaining();
        if n > available {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: n - available,
            });
        }
        self.pos += n;
        Ok(())
    }
}
