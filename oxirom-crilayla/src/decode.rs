//! CRILAYLA decompression.
//!
//! The token stream is read backward, starting at the last byte before the
//! raw header and moving toward the fixed header, MSB-first within each
//! byte. Output is produced back-to-front as well: the last byte of the
//! output is decoded first. A set flag bit introduces a back-reference
//! (13-bit offset code, escalating variable-length length); a clear flag
//! bit is followed by a verbatim byte.

use crate::format::{CrilaylaHeader, HEADER_SIZE, MIN_MATCH, RAW_HEADER_SIZE};
use oxirom_core::bitstream::ReverseBitReader;
use oxirom_core::error::{OxiRomError, Result};

/// Bit widths of the escalating length levels after the implicit minimum.
const VLE_LEVELS: [u8; 4] = [2, 3, 5, 8];

/// Decompress a CRILAYLA stream, returning the raw header followed by the
/// decompressed data.
pub fn decompress_crilayla(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < HEADER_SIZE + RAW_HEADER_SIZE {
        return Err(OxiRomError::input_too_small(
            HEADER_SIZE + RAW_HEADER_SIZE,
            data.len(),
        ));
    }
    let header = CrilaylaHeader::parse(data)?;
    let raw_offset = header.raw_header_offset();
    if raw_offset + RAW_HEADER_SIZE > data.len() {
        return Err(OxiRomError::invalid_header(format!(
            "compressed size {} places the raw header past the input",
            header.compressed_size
        )));
    }

    let uncompressed_size = header.uncompressed_size as usize;
    let mut out = vec![0u8; header.output_size()];
    out[..RAW_HEADER_SIZE].copy_from_slice(&data[raw_offset..raw_offset + RAW_HEADER_SIZE]);
    if uncompressed_size == 0 {
        return Ok(out);
    }

    // The stream ends at the last byte before the trailing raw header,
    // regardless of the declared compressed size.
    let mut reader = ReverseBitReader::new(&data[HEADER_SIZE..data.len() - RAW_HEADER_SIZE]);
    let output_end = out.len() - 1;
    let mut produced = 0usize;

    while produced < uncompressed_size {
        if reader.read_bits(1)? == 1 {
            let offset_code = reader.read_bits(13)? as usize;
            let length = read_length(&mut reader)?;

            let write = output_end - produced;
            let mut source = write + offset_code + MIN_MATCH;
            if source > output_end {
                return Err(OxiRomError::invalid_displacement(
                    offset_code + MIN_MATCH,
                    produced,
                ));
            }
            let count = length.min(uncompressed_size - produced);
            for _ in 0..count {
                out[output_end - produced] = out[source];
                source -= 1;
                produced += 1;
            }
        } else {
            out[output_end - produced] = reader.read_bits(8)? as u8;
            produced += 1;
        }
    }

    Ok(out)
}

/// Decode a back-reference length: the escalating levels, then 8-bit
/// continuation groups while each group is all ones.
fn read_length(reader: &mut ReverseBitReader<'_>) -> Result<usize> {
    let mut length = MIN_MATCH;
    for bits in VLE_LEVELS {
        let level = reader.read_bits(bits)? as usize;
        length += level;
        if level != (1 << bits) - 1 {
            return Ok(length);
        }
    }
    loop {
        let level = reader.read_bits(8)? as usize;
        length += level;
        if level != 0xFF {
            return Ok(length);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MAGIC;

    fn build_stream(
        uncompressed_size: u32,
        payload: &[u8],
        raw_header: &[u8; RAW_HEADER_SIZE],
    ) -> Vec<u8> {
        let header = CrilaylaHeader {
            uncompressed_size,
            compressed_size: payload.len() as u32,
        };
        let mut stream = Vec::new();
        header.write_to(&mut stream);
        stream.extend_from_slice(payload);
        stream.extend_from_slice(raw_header);
        stream
    }

    #[test]
    fn test_single_literal() {
        // 9 bits read back-to-front: flag 0, then 0x41.
        let payload = [0x00, 0x00, 0x80, 0x20];
        let stream = build_stream(1, &payload, &[0xEE; RAW_HEADER_SIZE]);
        let out = decompress_crilayla(&stream).unwrap();
        assert_eq!(out.len(), RAW_HEADER_SIZE + 1);
        assert_eq!(&out[..RAW_HEADER_SIZE], &[0xEE; RAW_HEADER_SIZE]);
        assert_eq!(out[RAW_HEADER_SIZE], 0x41);
    }

    #[test]
    fn test_zero_size_returns_raw_header_only() {
        let stream = build_stream(0, &[0, 0, 0, 0], &[0x5A; RAW_HEADER_SIZE]);
        let out = decompress_crilayla(&stream).unwrap();
        assert_eq!(out, vec![0x5A; RAW_HEADER_SIZE]);
    }

    #[test]
    fn test_backreference_reaching_past_output_rejected() {
        // First token is a back-reference with nothing produced yet.
        let payload = [0x00, 0x80];
        let stream = build_stream(4, &payload, &[0u8; RAW_HEADER_SIZE]);
        let err = decompress_crilayla(&stream).unwrap_err();
        assert!(matches!(err, OxiRomError::InvalidDisplacement { .. }));
    }

    #[test]
    fn test_truncated_bit_stream() {
        // One literal's worth of bits but two bytes promised.
        let payload = [0x80, 0x20];
        let stream = build_stream(2, &payload, &[0u8; RAW_HEADER_SIZE]);
        let err = decompress_crilayla(&stream).unwrap_err();
        assert!(matches!(err, OxiRomError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_missing_magic() {
        let mut stream = build_stream(0, &[0, 0, 0, 0], &[0u8; RAW_HEADER_SIZE]);
        stream[0] = b'X';
        let err = decompress_crilayla(&stream).unwrap_err();
        assert!(matches!(err, OxiRomError::InvalidMagic { .. }));
    }

    #[test]
    fn test_compressed_size_past_input() {
        let mut stream = build_stream(1, &[0x00, 0x00, 0x80, 0x20], &[0u8; RAW_HEADER_SIZE]);
        stream[12] = 0xFF;
        stream[13] = 0xFF;
        let err = decompress_crilayla(&stream).unwrap_err();
        assert!(matches!(err, OxiRomError::InvalidHeader { .. }));
    }

    #[test]
    fn test_input_shorter_than_frame() {
        let err = decompress_crilayla(MAGIC.as_slice()).unwrap_err();
        assert!(matches!(err, OxiRomError::InputTooSmall { .. }));
    }
}
