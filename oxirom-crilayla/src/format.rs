//! CRILAYLA container constants and header handling.
//!
//! A CRILAYLA stream has four parts:
//!
//! ```text
//! +-----------+------------+--------------------------+------------------+
//! | "CRILAYLA"| sizes      | backward bit stream      | raw header       |
//! | 8 bytes   | 2 x u32 LE | compressed_size bytes    | 0x100 bytes      |
//! +-----------+------------+--------------------------+------------------+
//! ```
//!
//! The first 0x100 bytes of the original input are never compressed; they
//! ride along verbatim at the end of the stream and are restored to the
//! front of the output. `uncompressed_size` counts only the compressed
//! portion, so the full output is `0x100 + uncompressed_size` bytes.

use oxirom_core::error::{OxiRomError, Result};

/// Stream signature.
pub const MAGIC: &[u8; 8] = b"CRILAYLA";
/// Size of the fixed header (signature plus the two size fields).
pub const HEADER_SIZE: usize = 0x10;
/// Size of the verbatim region taken from the front of the input.
pub const RAW_HEADER_SIZE: usize = 0x100;
/// Back-reference search range in offset codes.
pub const WINDOW_SIZE: usize = 0x2000;
/// Shortest encodable back-reference.
pub const MIN_MATCH: usize = 3;

/// Parsed CRILAYLA header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrilaylaHeader {
    /// Decompressed size of the compressed portion, excluding the raw header.
    pub uncompressed_size: u32,
    /// Size of the backward bit-stream payload.
    pub compressed_size: u32,
}

impl CrilaylaHeader {
    /// Parse and validate the fixed header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(OxiRomError::input_too_small(HEADER_SIZE, data.len()));
        }
        if &data[..8] != MAGIC {
            return Err(OxiRomError::invalid_magic(MAGIC.as_slice(), &data[..8]));
        }
        Ok(Self {
            uncompressed_size: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            compressed_size: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
        })
    }

    /// Append the 16-byte header to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&self.compressed_size.to_le_bytes());
    }

    /// Offset of the verbatim raw header within the stream.
    pub fn raw_header_offset(&self) -> usize {
        HEADER_SIZE + self.compressed_size as usize
    }

    /// Total output size including the restored raw header.
    pub fn output_size(&self) -> usize {
        RAW_HEADER_SIZE + self.uncompressed_size as usize
    }
}
