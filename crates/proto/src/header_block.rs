//! Fixed-size snapshot header block
//!
//! Snapshot files reserve the first 1024 bytes for the header so the payload
//! always starts at a known offset.
//!
//! ## Block Layout
//!
//! ```text
//! +------------------+
//! | Length (8)       |  Encoded header length, little-endian
//! +------------------+
//! | Header (Length)  |  SnapshotHeader wire encoding
//! +------------------+
//! | Padding          |  Zeros up to HEADER_BLOCK_SIZE
//! +------------------+
//! ```

use crate::error::{Result, SnapshotError};
use crate::snapshot_header::SnapshotHeader;
use snapwire_codec::Message;
use std::io::{Read, Write};

/// Size of the header block at the start of a snapshot file
pub const HEADER_BLOCK_SIZE: usize = 1024;

const LENGTH_PREFIX_SIZE: usize = 8;

/// Bytes available for the encoded header
pub const HEADER_CAPACITY: usize = HEADER_BLOCK_SIZE - LENGTH_PREFIX_SIZE;

/// Header block codec
pub struct HeaderBlock;

impl HeaderBlock {
    /// Encode `header` into a full block
    pub fn encode(header: &SnapshotHeader) -> Result<Vec<u8>> {
        let size = header.encoded_len();
        if size > HEADER_CAPACITY {
            return Err(SnapshotError::HeaderTooLarge {
                size,
                capacity: HEADER_CAPACITY,
            });
        }
        let mut block = vec![0u8; HEADER_BLOCK_SIZE];
        block[..LENGTH_PREFIX_SIZE].copy_from_slice(&(size as u64).to_le_bytes());
        let body = &mut block[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + size];
        header.encode_to(body)?;
        Ok(block)
    }

    /// Decode the header from a block
    ///
    /// The length prefix is validated before any slicing.
    pub fn decode(block: &[u8]) -> Result<SnapshotHeader> {
        if block.len() < HEADER_BLOCK_SIZE {
            return Err(SnapshotError::TooShort {
                expected: HEADER_BLOCK_SIZE,
                actual: block.len(),
            });
        }
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        prefix.copy_from_slice(&block[..LENGTH_PREFIX_SIZE]);
        let length = u64::from_le_bytes(prefix);
        if length > HEADER_CAPACITY as u64 {
            return Err(SnapshotError::InvalidBlockLength {
                length,
                capacity: HEADER_CAPACITY,
            });
        }
        let end = LENGTH_PREFIX_SIZE + length as usize;
        Ok(SnapshotHeader::decode(&block[LENGTH_PREFIX_SIZE..end])?)
    }

    /// Write the header block for `header`
    pub fn write_to<W: Write>(header: &SnapshotHeader, writer: &mut W) -> Result<()> {
        let block = Self::encode(header)?;
        writer.write_all(&block)?;
        Ok(())
    }

    /// Read a header block and decode the header
    pub fn read_from<R: Read>(reader: &mut R) -> Result<SnapshotHeader> {
        let mut block = vec![0u8; HEADER_BLOCK_SIZE];
        reader.read_exact(&mut block)?;
        Self::decode(&block)
    }
}
