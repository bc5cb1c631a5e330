//! Base-128 variable-length integers
//!
//! Unsigned 64-bit values are written in 7-bit little-endian groups. Every
//! byte except the last has its high bit set, so a varint terminates itself
//! and needs no separate length.
//!
//! ```text
//! 127  -> 7f
//! 128  -> 80 01
//! 300  -> ac 02
//! u64::MAX -> ff ff ff ff ff ff ff ff ff 01
//! ```

use crate::error::{DecodeError, DecodeResult};

/// Longest possible encoding of a u64
pub const MAX_VARINT_LEN: usize = 10;

/// Number of bytes `encode` would write for `value`
///
/// Never allocates.
#[inline]
pub fn encoded_len(value: u64) -> usize {
    // Bits needed (at least 1), rounded up to 7-bit groups.
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Encode `value` at the start of `buf`, returning the bytes written
///
/// # Panics
///
/// Panics if `buf` is shorter than `encoded_len(value)`. Callers size their
/// buffers from `encoded_len` first.
#[inline]
pub fn encode(mut value: u64, buf: &mut [u8]) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        buf[i] = (value as u8 & 0x7f) | 0x80;
        value >>= 7;
        i += 1;
    }
    buf[i] = value as u8;
    i + 1
}

/// Decode a varint from the start of `buf`
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
///
/// - `Truncated` if `buf` ends before a byte with the high bit clear
/// - `Overflow` if the encoding runs past ten bytes or sets bits above 2^63
pub fn decode(buf: &[u8]) -> DecodeResult<(u64, usize)> {
    decode_at(buf, 0)
}

/// Decode a varint starting at `offset`, reporting errors at absolute offsets
pub(crate) fn decode_at(buf: &[u8], offset: usize) -> DecodeResult<(u64, usize)> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let byte = match buf.get(offset + i) {
            Some(&b) => b,
            None => return Err(DecodeError::Truncated { offset, needed: 1 }),
        };
        // The tenth group holds only bit 63.
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(DecodeError::Overflow { offset });
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte < 0x80 {
            return Ok((value, i + 1));
        }
    }
    Err(DecodeError::Overflow { offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: u64) -> Vec<u8> {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let n = encode(value, &mut buf);
        assert_eq!(n, encoded_len(value), "encoded_len disagrees for {}", value);
        let (decoded, consumed) = decode(&buf[..n]).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, n);
        buf[..n].to_vec()
    }

    #[test]
    fn test_boundary_values() {
        assert_eq!(roundtrip(0), vec![0x00]);
        assert_eq!(roundtrip(127), vec![0x7f]);
        assert_eq!(roundtrip(128), vec![0x80, 0x01]);
        assert_eq!(roundtrip(300), vec![0xac, 0x02]);
        assert_eq!(roundtrip((1 << 56) - 1).len(), 8);
        assert_eq!(
            roundtrip(u64::MAX),
            vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn test_encoded_len_steps() {
        for groups in 1..MAX_VARINT_LEN {
            let max_for_groups = (1u64 << (7 * groups)) - 1;
            assert_eq!(encoded_len(max_for_groups), groups);
            assert_eq!(encoded_len(max_for_groups + 1), groups + 1);
        }
        assert_eq!(encoded_len(u64::MAX), MAX_VARINT_LEN);
    }

    #[test]
    fn test_decode_stops_at_terminator() {
        // Trailing bytes after the terminator are not consumed
        let (value, consumed) = decode(&[0x96, 0x01, 0xff, 0xff]).unwrap();
        assert_eq!(value, 150);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_decode_empty_is_truncated() {
        assert!(matches!(
            decode(&[]),
            Err(DecodeError::Truncated { offset: 0, .. })
        ));
    }

    #[test]
    fn test_decode_missing_terminator_is_truncated() {
        assert!(matches!(
            decode(&[0x80, 0x80, 0x80]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_eleven_bytes_overflows() {
        let mut buf = vec![0xff; 10];
        buf.push(0x01);
        assert!(matches!(decode(&buf), Err(DecodeError::Overflow { offset: 0 })));
    }

    #[test]
    fn test_decode_tenth_byte_above_one_overflows() {
        let mut buf = vec![0xff; 9];
        buf.push(0x02);
        assert!(matches!(decode(&buf), Err(DecodeError::Overflow { .. })));
    }

    #[test]
    fn test_decode_at_reports_absolute_offset() {
        let buf = [0x01, 0x02, 0x80];
        assert!(matches!(
            decode_at(&buf, 2),
            Err(DecodeError::Truncated { offset: 2, .. })
        ));
    }

    #[test]
    fn test_non_minimal_encoding_accepted() {
        // 0 written as two bytes still decodes
        let (value, consumed) = decode(&[0x80, 0x00]).unwrap();
        assert_eq!(value, 0);
        assert_eq!(consumed, 2);
    }
}
