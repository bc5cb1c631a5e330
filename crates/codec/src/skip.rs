//! Unknown-field skipping
//!
//! A decoder that meets a field number its schema does not know consumes
//! the value without interpreting it. Newer producers can then add fields
//! without breaking older consumers; the skipped data is dropped.

use crate::buf::Reader;
use crate::error::{DecodeError, DecodeResult};
use crate::tag::{Tag, WireType};

/// Skip the value following `tag`, which was read at `tag_offset`
///
/// # Errors
///
/// - `Truncated` if the value runs past the end of the buffer
/// - `InvalidLength` for a hostile length prefix
/// - `UnknownWireType` for an end-group with no open group
pub fn skip_field(reader: &mut Reader<'_>, tag: Tag, tag_offset: usize) -> DecodeResult<()> {
    match tag.wire_type {
        WireType::StartGroup => skip_group(reader, tag.field_number),
        WireType::EndGroup => Err(DecodeError::UnknownWireType {
            offset: tag_offset,
            wire_type: WireType::EndGroup.bits(),
        }),
        other => skip_value(reader, other),
    }
}

fn skip_value(reader: &mut Reader<'_>, wire_type: WireType) -> DecodeResult<()> {
    match wire_type {
        WireType::Varint => reader.read_varint().map(drop),
        WireType::Fixed64 => reader.advance(8),
        WireType::LengthDelimited => reader.read_length_delimited().map(drop),
        WireType::Fixed32 => reader.advance(4),
        // Groups are handled by the caller.
        WireType::StartGroup | WireType::EndGroup => unreachable!("group wire type in skip_value"),
    }
}

/// Skip to the end-group matching `field_number`
///
/// Nesting is tracked on the heap so deeply nested input cannot exhaust the
/// stack.
fn skip_group(reader: &mut Reader<'_>, field_number: u32) -> DecodeResult<()> {
    let mut open = vec![field_number];
    while let Some(&current) = open.last() {
        let offset = reader.position();
        let tag = reader.read_tag()?;
        match tag.wire_type {
            WireType::StartGroup => open.push(tag.field_number),
            WireType::EndGroup => {
                if tag.field_number != current {
                    return Err(DecodeError::UnknownWireType {
                        offset,
                        wire_type: WireType::EndGroup.bits(),
                    });
                }
                open.pop();
            }
            other => skip_value(reader, other)?,
        }
    }
    Ok(())
}
