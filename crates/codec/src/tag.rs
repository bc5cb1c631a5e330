//! Field tags
//!
//! Every value in a record is preceded by a tag: the varint of
//! `(field_number << 3) | wire_type`. Field numbers up to 15 fit a one-byte tag.

use crate::error::{DecodeError, DecodeResult};
use crate::varint;

/// Largest field number a tag can carry
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

const WIRE_TYPE_BITS: u32 = 3;
const WIRE_TYPE_MASK: u64 = 0x7;

/// How a field's value is framed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint
    Varint = 0,
    /// Eight little-endian bytes
    Fixed64 = 1,
    /// Varint length followed by that many bytes
    LengthDelimited = 2,
    /// Legacy group opener
    StartGroup = 3,
    /// Legacy group terminator
    EndGroup = 4,
    /// Four little-endian bytes
    Fixed32 = 5,
}

impl WireType {
    /// Map the low three tag bits to a wire type
    pub fn from_bits(bits: u8) -> Option<WireType> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    /// Raw tag bits for this wire type
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// A decoded (field number, wire type) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Field number, `1..=MAX_FIELD_NUMBER`
    pub field_number: u32,
    /// Wire type of the value that follows
    pub wire_type: WireType,
}

impl Tag {
    /// Build a tag
    ///
    /// Field numbers are fixed by the schema tables, so an out-of-range
    /// number is a programming error.
    pub const fn new(field_number: u32, wire_type: WireType) -> Self {
        assert!(
            field_number >= 1 && field_number <= MAX_FIELD_NUMBER,
            "field number out of range"
        );
        Tag {
            field_number,
            wire_type,
        }
    }

    /// The raw varint value of this tag
    pub fn value(&self) -> u64 {
        (u64::from(self.field_number) << WIRE_TYPE_BITS) | u64::from(self.wire_type.bits())
    }

    /// Encoded size of the tag in bytes
    pub fn encoded_len(&self) -> usize {
        varint::encoded_len(self.value())
    }

    /// Split a raw tag value read at `offset`
    ///
    /// # Errors
    ///
    /// - `InvalidTag` when the field number is zero or above `MAX_FIELD_NUMBER`
    /// - `UnknownWireType` for the reserved wire types 6 and 7
    pub fn from_raw(raw: u64, offset: usize) -> DecodeResult<Tag> {
        let field_number = raw >> WIRE_TYPE_BITS;
        if field_number == 0 || field_number > u64::from(MAX_FIELD_NUMBER) {
            return Err(DecodeError::InvalidTag {
                offset,
                tag: raw,
                field_number,
            });
        }
        let bits = (raw & WIRE_TYPE_MASK) as u8;
        let wire_type = WireType::from_bits(bits).ok_or(DecodeError::UnknownWireType {
            offset,
            wire_type: bits,
        })?;
        Ok(Tag {
            field_number: field_number as u32,
            wire_type,
        })
    }
}
