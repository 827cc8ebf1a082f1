//! Compression method tags and the framed container format.
//!
//! Framed streams start with a little-endian u32 header: the method tag in
//! the low byte and the decompressed length in the upper 24 bits. The
//! payload follows immediately with no padding.

use crate::huffman::{compress_huffman, decompress_huffman, HuffmanBits};
use crate::lzss::{
    compress_lz10, compress_lz11, decompress_lz10, decompress_lz11, DEFAULT_DISP_EXTRA,
    DEFAULT_MIN_DISPLACEMENT,
};
use crate::rle::{compress_rle, decompress_rle};
use oxirom_core::error::{OxiRomError, Result};

/// Largest decompressed length the 24-bit header field can express.
pub const MAX_DECOMPRESSED_SIZE: usize = 0xFF_FFFF;

/// Compression method identified by the header tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NitroMethod {
    /// 0x10: LZSS with 2-byte tokens.
    #[default]
    Lz10,
    /// 0x11: LZSS with variable-length tokens for long matches.
    Lz11,
    /// 0x24: Huffman over 4-bit symbols.
    Huff4,
    /// 0x28: Huffman over 8-bit symbols.
    Huff8,
    /// 0x30: Run-length coding.
    Rle,
    /// 0x40: LZSS variant (recognized, not implemented).
    Lz40,
    /// 0x60: LZSS variant (recognized, not implemented).
    Lz60,
}

impl NitroMethod {
    /// Parse a method from its header tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x10 => Some(Self::Lz10),
            0x11 => Some(Self::Lz11),
            0x24 => Some(Self::Huff4),
            0x28 => Some(Self::Huff8),
            0x30 => Some(Self::Rle),
            0x40 => Some(Self::Lz40),
            0x60 => Some(Self::Lz60),
            _ => None,
        }
    }

    /// Get the header tag byte.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Lz10 => 0x10,
            Self::Lz11 => 0x11,
            Self::Huff4 => 0x24,
            Self::Huff8 => 0x28,
            Self::Rle => 0x30,
            Self::Lz40 => 0x40,
            Self::Lz60 => 0x60,
        }
    }

    /// Get the method name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lz10 => "lz10",
            Self::Lz11 => "lz11",
            Self::Huff4 => "huff4",
            Self::Huff8 => "huff8",
            Self::Rle => "rle",
            Self::Lz40 => "lz40",
            Self::Lz60 => "lz60",
        }
    }

    /// Check whether a codec is available for this method.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Lz40 | Self::Lz60)
    }
}

impl std::fmt::Display for NitroMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Read the method and decompressed length from a framed stream without
/// touching the payload.
pub fn read_header(data: &[u8]) -> Result<(NitroMethod, usize)> {
    if data.len() < 4 {
        return Err(OxiRomError::input_too_small(4, data.len()));
    }
    let header = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let tag = (header & 0xFF) as u8;
    let method = NitroMethod::from_tag(tag)
        .ok_or_else(|| OxiRomError::invalid_header(format!("unknown method tag 0x{tag:02X}")))?;
    Ok((method, (header >> 8) as usize))
}

/// Build the 4-byte header for a framed stream.
pub fn write_header(method: NitroMethod, decompressed_size: usize) -> Result<[u8; 4]> {
    if decompressed_size > MAX_DECOMPRESSED_SIZE {
        return Err(OxiRomError::invalid_header(format!(
            "{decompressed_size} bytes exceed the 24-bit length field"
        )));
    }
    let header = u32::from(method.tag()) | ((decompressed_size as u32) << 8);
    Ok(header.to_le_bytes())
}

/// Compress `data` into a framed stream with the given method.
pub fn compress(data: &[u8], method: NitroMethod) -> Result<Vec<u8>> {
    let header = write_header(method, data.len())?;
    let payload = match method {
        NitroMethod::Lz10 => compress_lz10(data, DEFAULT_MIN_DISPLACEMENT),
        NitroMethod::Lz11 => compress_lz11(data, DEFAULT_MIN_DISPLACEMENT),
        NitroMethod::Huff4 => compress_huffman(data, HuffmanBits::Four, true)?,
        NitroMethod::Huff8 => compress_huffman(data, HuffmanBits::Eight, true)?,
        NitroMethod::Rle => compress_rle(data),
        NitroMethod::Lz40 | NitroMethod::Lz60 => {
            return Err(OxiRomError::unsupported_method(method.name()))
        }
    };

    let mut out = Vec::with_capacity(4 + payload.len());
    out.extend_from_slice(&header);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decompress a framed stream, dispatching on its header tag.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let (method, size) = read_header(data)?;
    let payload = &data[4..];
    match method {
        NitroMethod::Lz10 => decompress_lz10(payload, size, DEFAULT_DISP_EXTRA),
        NitroMethod::Lz11 => decompress_lz11(payload, size, DEFAULT_DISP_EXTRA),
        NitroMethod::Huff4 => decompress_huffman(payload, size, HuffmanBits::Four, true),
        NitroMethod::Huff8 => decompress_huffman(payload, size, HuffmanBits::Eight, true),
        NitroMethod::Rle => decompress_rle(payload, size),
        NitroMethod::Lz40 | NitroMethod::Lz60 => {
            Err(OxiRomError::unsupported_method(method.name()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_mapping() {
        assert_eq!(NitroMethod::from_tag(0x10), Some(NitroMethod::Lz10));
        assert_eq!(NitroMethod::from_tag(0x11), Some(NitroMethod::Lz11));
        assert_eq!(NitroMethod::from_tag(0x24), Some(NitroMethod::Huff4));
        assert_eq!(NitroMethod::from_tag(0x28), Some(NitroMethod::Huff8));
        assert_eq!(NitroMethod::from_tag(0x30), Some(NitroMethod::Rle));
        assert_eq!(NitroMethod::from_tag(0x12), None);
        for method in [
            NitroMethod::Lz10,
            NitroMethod::Lz11,
            NitroMethod::Huff4,
            NitroMethod::Huff8,
            NitroMethod::Rle,
            NitroMethod::Lz40,
            NitroMethod::Lz60,
        ] {
            assert_eq!(NitroMethod::from_tag(method.tag()), Some(method));
        }
    }

    #[test]
    fn test_header_layout() {
        let framed = compress(b"abcabcabc", NitroMethod::Lz10).unwrap();
        assert_eq!(framed[0], 0x10);
        assert_eq!(framed[1..4], [0x09, 0x00, 0x00]);
    }

    #[test]
    fn test_framed_roundtrip_all_methods() {
        let data = b"framed stream framed stream framed stream".to_vec();
        for method in [
            NitroMethod::Lz10,
            NitroMethod::Lz11,
            NitroMethod::Huff4,
            NitroMethod::Huff8,
            NitroMethod::Rle,
        ] {
            let framed = compress(&data, method).unwrap();
            assert_eq!(read_header(&framed).unwrap(), (method, data.len()));
            assert_eq!(decompress(&framed).unwrap(), data, "method {method}");
        }
    }

    #[test]
    fn test_header_length_cap() {
        assert_eq!(
            write_header(NitroMethod::Rle, MAX_DECOMPRESSED_SIZE).unwrap(),
            [0x30, 0xFF, 0xFF, 0xFF]
        );
        let err = write_header(NitroMethod::Rle, MAX_DECOMPRESSED_SIZE + 1).unwrap_err();
        assert!(matches!(err, OxiRomError::InvalidHeader { .. }));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = decompress(&[0x99, 0x01, 0x00, 0x00, 0xAA]).unwrap_err();
        assert!(matches!(err, OxiRomError::InvalidHeader { .. }));
    }

    #[test]
    fn test_recognized_but_unimplemented() {
        let err = decompress(&[0x40, 0x01, 0x00, 0x00, 0xAA]).unwrap_err();
        assert!(matches!(err, OxiRomError::UnsupportedMethod { .. }));
        let err = compress(b"x", NitroMethod::Lz60).unwrap_err();
        assert!(matches!(err, OxiRomError::UnsupportedMethod { .. }));
    }

    #[test]
    fn test_short_input_rejected() {
        let err = decompress(&[0x10, 0x00]).unwrap_err();
        assert!(matches!(err, OxiRomError::InputTooSmall { .. }));
    }
}
