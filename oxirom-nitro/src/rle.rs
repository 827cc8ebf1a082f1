//! Run-length coding (the 0x30 method of the NDS BIOS family).
//!
//! The stream is a sequence of flag-prefixed blocks:
//!
//! ```text
//! 1LLLLLLL vvvvvvvv            run:     byte v repeated L + 3 times
//! 0LLLLLLL b0 b1 .. bL         literal: L + 1 verbatim bytes
//! ```
//!
//! Runs span 3 to 130 bytes, literal blocks 1 to 128. Decompression stops
//! exactly at the advertised output size; a final block that promises more
//! is truncated rather than overrunning.

use oxirom_core::error::{OxiRomError, Result};

/// Shortest stretch of equal bytes worth a run block.
const MIN_RUN: usize = 3;
/// Longest run one block can carry.
const MAX_RUN: usize = MIN_RUN + 0x7F;
/// Longest literal block.
const MAX_LITERALS: usize = 0x80;

/// Compress `data` with run-length coding (no size header).
pub fn compress_rle(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 + 4);
    let mut literal_start = 0;
    let mut pos = 0;
    while pos < data.len() {
        let byte = data[pos];
        let mut run = 1;
        while run < MAX_RUN && pos + run < data.len() && data[pos + run] == byte {
            run += 1;
        }
        if run >= MIN_RUN {
            flush_literals(&mut out, &data[literal_start..pos]);
            out.push(0x80 | (run - MIN_RUN) as u8);
            out.push(byte);
            pos += run;
            literal_start = pos;
        } else {
            pos += 1;
        }
    }
    flush_literals(&mut out, &data[literal_start..]);
    out
}

fn flush_literals(out: &mut Vec<u8>, mut literals: &[u8]) {
    while !literals.is_empty() {
        let take = literals.len().min(MAX_LITERALS);
        out.push((take - 1) as u8);
        out.extend_from_slice(&literals[..take]);
        literals = &literals[take..];
    }
}

/// Decompress a run-length stream (no size header) into `decompressed_size`
/// bytes.
pub fn decompress_rle(data: &[u8], decompressed_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(decompressed_size);
    let mut pos = 0;
    while out.len() < decompressed_size {
        if pos >= data.len() {
            return Err(OxiRomError::unexpected_eof(1, 0));
        }
        let flag = data[pos];
        pos += 1;
        let remaining = decompressed_size - out.len();
        if flag & 0x80 != 0 {
            if pos >= data.len() {
                return Err(OxiRomError::unexpected_eof(1, 0));
            }
            let byte = data[pos];
            pos += 1;
            let length = ((flag & 0x7F) as usize + MIN_RUN).min(remaining);
            out.resize(out.len() + length, byte);
        } else {
            let length = ((flag & 0x7F) as usize + 1).min(remaining);
            if pos + length > data.len() {
                return Err(OxiRomError::unexpected_eof(length, data.len() - pos));
            }
            out.extend_from_slice(&data[pos..pos + length]);
            pos += length;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_block_layout() {
        assert_eq!(compress_rle(b"aaaa"), vec![0x81, b'a']);
    }

    #[test]
    fn test_literal_block_layout() {
        assert_eq!(compress_rle(b"abc"), vec![0x02, b'a', b'b', b'c']);
    }

    #[test]
    fn test_long_run_splits_at_cap() {
        let data = vec![0u8; 200];
        // 130-byte run, then the 70-byte remainder as a second run.
        assert_eq!(compress_rle(&data), vec![0xFF, 0x00, 0xC3, 0x00]);
    }

    #[test]
    fn test_literals_split_at_cap() {
        let data: Vec<u8> = (0..300u16).map(|i| (i % 251) as u8).collect();
        let compressed = compress_rle(&data);
        assert_eq!(compressed[0], 0x7F);
        assert_eq!(compressed[129], 0x7F);
        assert_eq!(compressed[258], 0x2B);
        assert_eq!(compressed.len(), 303);
        let out = decompress_rle(&compressed, data.len()).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_two_byte_repeat_stays_literal() {
        assert_eq!(compress_rle(b"aab"), vec![0x02, b'a', b'a', b'b']);
    }

    #[test]
    fn test_mixed_roundtrip() {
        let mut data = Vec::new();
        data.extend_from_slice(b"header");
        data.extend_from_slice(&[0xFF; 64]);
        data.extend_from_slice(b"trailer");
        data.extend_from_slice(&[0x00; 3]);
        let compressed = compress_rle(&data);
        assert!(compressed.len() < data.len());
        let out = decompress_rle(&compressed, data.len()).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_empty_input() {
        assert!(compress_rle(&[]).is_empty());
        assert!(decompress_rle(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn test_overlong_final_run_truncates() {
        // The run promises 7 bytes but only 3 are wanted.
        let out = decompress_rle(&[0x84, b'x'], 3).unwrap();
        assert_eq!(out, b"xxx");
    }

    #[test]
    fn test_truncated_stream() {
        let err = decompress_rle(&[0x81], 4).unwrap_err();
        assert!(matches!(err, OxiRomError::UnexpectedEof { .. }));
        let err = decompress_rle(&[0x03, b'a'], 4).unwrap_err();
        assert!(matches!(err, OxiRomError::UnexpectedEof { .. }));
    }
}
