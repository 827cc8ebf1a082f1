//! CRILAYLA compression.
//!
//! The input is walked backward from its last byte down to offset 0x100;
//! the first 0x100 bytes are spliced onto the end of the stream verbatim.
//! At each position the encoder searches up to 0x2000 offset codes ahead
//! (toward already-emitted data) for the longest match extending downward,
//! preferring the smallest offset on ties. Emitted bits are flushed into
//! bytes back-to-front, and the payload tail is zero-padded so its total
//! length is a multiple of four.

use crate::format::{CrilaylaHeader, MIN_MATCH, RAW_HEADER_SIZE, WINDOW_SIZE};
use oxirom_core::bitstream::ReverseBitWriter;
use oxirom_core::error::{OxiRomError, Result};

/// Compress `data` into a CRILAYLA stream.
///
/// The format needs at least 0x100 bytes of input for the verbatim raw
/// header; shorter inputs are rejected.
pub fn compress_crilayla(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < RAW_HEADER_SIZE {
        return Err(OxiRomError::input_too_small(RAW_HEADER_SIZE, data.len()));
    }
    if data.len() - RAW_HEADER_SIZE > u32::MAX as usize {
        return Err(OxiRomError::invalid_header(format!(
            "{} bytes exceed the 32-bit size field",
            data.len()
        )));
    }

    let mut writer = ReverseBitWriter::new();
    let mut n = data.len() - 1;
    while n >= RAW_HEADER_SIZE {
        let (length, offset_code) = best_match(data, n);
        if length < MIN_MATCH {
            // Flag bit 0 rides as the top bit of a 9-bit group.
            writer.write_bits(u16::from(data[n]), 9);
            n -= 1;
        } else {
            writer.write_bits(1, 1);
            writer.write_bits(offset_code as u16, 13);
            write_length(&mut writer, length);
            n -= length;
        }
    }

    let mut payload = writer.finish();
    // Two zero bytes end the stream, then padding brings the payload to a
    // multiple of four; the final byte is slack the decoder never reads.
    payload.push(0);
    payload.push(0);
    while (payload.len() + 1) % 4 != 0 {
        payload.push(0);
    }
    payload.push(0);
    payload.reverse();

    let header = CrilaylaHeader {
        uncompressed_size: (data.len() - RAW_HEADER_SIZE) as u32,
        compressed_size: payload.len() as u32,
    };
    let mut out = Vec::with_capacity(payload.len() + RAW_HEADER_SIZE + 0x10);
    header.write_to(&mut out);
    out.extend_from_slice(&payload);
    out.extend_from_slice(&data[..RAW_HEADER_SIZE]);
    Ok(out)
}

/// Find the longest downward match for position `n`.
///
/// Candidates sit 3 to 0x2002 bytes ahead of `n`; matches extend toward
/// lower addresses and may not reach below offset 0x100. Returns the match
/// length and offset code, `(0, 0)` when nothing usable exists.
fn best_match(data: &[u8], n: usize) -> (usize, usize) {
    let limit = (n + MIN_MATCH + WINDOW_SIZE).min(data.len());
    let max_length = n - RAW_HEADER_SIZE + 1;
    let mut best_length = 0;
    let mut best_code = 0;

    for candidate in n + MIN_MATCH..limit {
        let mut k = 0;
        while k < max_length && data[n - k] == data[candidate - k] {
            k += 1;
        }
        if k > best_length {
            best_length = k;
            best_code = candidate - n - MIN_MATCH;
            if best_length == max_length {
                break;
            }
        }
    }
    (best_length, best_code)
}

/// Emit a back-reference length as the escalating levels plus 8-bit
/// continuation groups.
fn write_length(writer: &mut ReverseBitWriter, length: usize) {
    let mut p = length;
    if p < 6 {
        writer.write_bits((p - 3) as u16, 2);
    } else if p < 13 {
        writer.write_bits(3, 2);
        writer.write_bits((p - 6) as u16, 3);
    } else if p < 44 {
        writer.write_bits(0x1F, 5);
        writer.write_bits((p - 13) as u16, 5);
    } else {
        writer.write_bits(0x3FF, 10);
        p -= 44;
        while p >= 0xFF {
            writer.write_bits(0xFF, 8);
            p -= 0xFF;
        }
        writer.write_bits(p as u16, 8);
    }
}
