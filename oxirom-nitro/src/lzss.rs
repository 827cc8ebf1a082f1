//! LZ10/LZ11 sliding-window compression.
//!
//! These are the two LZSS variants from the GBA/NDS BIOS family. Both work
//! on a 0x1000-byte window and group output into runs of eight blocks
//! preceded by a flag byte (bit 7 first; a set bit marks a back-reference
//! block, a clear bit a literal byte).
//!
//! # Token formats
//!
//! LZ10 packs every back-reference into two bytes:
//!
//! ```text
//! LLLL DDDD  DDDD DDDD      length = L + 3 (3..=0x12)
//!                           displacement = D + 1 (1..=0x1000)
//! ```
//!
//! LZ11 keeps the two-byte form for short matches and extends the length
//! field for longer ones, selected by the first nibble:
//!
//! ```text
//! 2..=0xF:  LLLL DDDD  DDDD DDDD                       length = L + 1
//! 0:        0000 LLLL  LLLL DDDD  DDDD DDDD            length = L + 0x11
//! 1:        0001 LLLL  LLLL LLLL  LLLL DDDD  DDDD DDDD length = L + 0x111
//! ```
//!
//! The displacement field is twelve bits in every form. Decoders add a
//! configurable `disp_extra` to the raw field (normally 1; binaries embed
//! streams that use 3).

use oxirom_core::error::{OxiRomError, Result};
use oxirom_core::history::copy_backref;
use oxirom_core::matching::find_longest_match;

/// Sliding window size shared by both formats.
pub const WINDOW_SIZE: usize = 0x1000;
/// Maximum match length an LZ10 token can carry.
pub const LZ10_MAX_MATCH: usize = 0x12;
/// Maximum match length an LZ11 token can carry.
pub const LZ11_MAX_MATCH: usize = 0x10110;
/// Default exclusive displacement floor for the compressors.
pub const DEFAULT_MIN_DISPLACEMENT: usize = 1;
/// Default additive displacement offset for the decompressors.
pub const DEFAULT_DISP_EXTRA: usize = 1;

/// Compress `data` as an LZ10 stream (no size header).
///
/// `min_displacement` is exclusive: emitted displacements are strictly
/// greater. The standard streams use 1.
pub fn compress_lz10(data: &[u8], min_displacement: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    // Token bytes for up to eight blocks, flag byte first. The flag byte
    // is only known once all eight blocks are decided.
    let mut group = Vec::with_capacity(1 + 8 * 2);
    group.push(0);
    let mut blocks: u8 = 0;

    let mut pos = 0;
    while pos < data.len() {
        if blocks == 8 {
            out.extend_from_slice(&group);
            group.clear();
            group.push(0);
            blocks = 0;
        }

        match find_longest_match(data, pos, WINDOW_SIZE, LZ10_MAX_MATCH, min_displacement) {
            Some(m) => {
                group[0] |= 1 << (7 - blocks);
                let disp = m.displacement - 1;
                group.push((((m.length - 3) << 4) & 0xF0) as u8 | ((disp >> 8) & 0x0F) as u8);
                group.push((disp & 0xFF) as u8);
                pos += m.length;
            }
            None => {
                group.push(data[pos]);
                pos += 1;
            }
        }
        blocks += 1;
    }

    if blocks > 0 {
        out.extend_from_slice(&group);
    }
    out
}

/// Compress `data` as an LZ11 stream (no size header).
///
/// `min_displacement` is exclusive, as in [`compress_lz10`].
pub fn compress_lz11(data: &[u8], min_displacement: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut group = Vec::with_capacity(1 + 8 * 4);
    group.push(0);
    let mut blocks: u8 = 0;

    let mut pos = 0;
    while pos < data.len() {
        if blocks == 8 {
            out.extend_from_slice(&group);
            group.clear();
            group.push(0);
            blocks = 0;
        }

        match find_longest_match(data, pos, WINDOW_SIZE, LZ11_MAX_MATCH, min_displacement) {
            Some(m) => {
                group[0] |= 1 << (7 - blocks);
                let disp = m.displacement - 1;
                if m.length > 0x110 {
                    let l = m.length - 0x111;
                    group.push(0x10 | ((l >> 12) & 0x0F) as u8);
                    group.push(((l >> 4) & 0xFF) as u8);
                    group.push(((l << 4) & 0xF0) as u8 | ((disp >> 8) & 0x0F) as u8);
                } else if m.length > 0x10 {
                    let l = m.length - 0x11;
                    group.push(((l >> 4) & 0x0F) as u8);
                    group.push(((l << 4) & 0xF0) as u8 | ((disp >> 8) & 0x0F) as u8);
                } else {
                    group.push((((m.length - 1) << 4) & 0xF0) as u8 | ((disp >> 8) & 0x0F) as u8);
                }
                group.push((disp & 0xFF) as u8);
                pos += m.length;
            }
            None => {
                group.push(data[pos]);
                pos += 1;
            }
        }
        blocks += 1;
    }

    if blocks > 0 {
        out.extend_from_slice(&group);
    }
    out
}

/// Decompress an LZ10 stream (no size header) into `decompressed_size` bytes.
///
/// A final back-reference that would overshoot `decompressed_size` is
/// truncated to it. Exhausting the input earlier, or decoding a
/// displacement that reaches before the start of the output, is an error.
pub fn decompress_lz10(
    data: &[u8],
    decompressed_size: usize,
    disp_extra: usize,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(decompressed_size);
    let mut pos = 0;
    let mut flags: u8 = 0;
    let mut mask: u8 = 1;

    while out.len() < decompressed_size {
        // Mask 1 means the previous flag byte is spent.
        if mask == 1 {
            if pos >= data.len() {
                return Err(OxiRomError::unexpected_eof(1, 0));
            }
            flags = data[pos];
            pos += 1;
            mask = 0x80;
        } else {
            mask >>= 1;
        }

        if flags & mask != 0 {
            if pos + 2 > data.len() {
                return Err(OxiRomError::unexpected_eof(2, data.len() - pos));
            }
            let b1 = data[pos] as usize;
            let b2 = data[pos + 1] as usize;
            pos += 2;

            let length = (b1 >> 4) + 3;
            let disp = (((b1 & 0x0F) << 8) | b2) + disp_extra;
            let capped = length.min(decompressed_size - out.len());
            copy_backref(&mut out, disp, capped)?;
        } else {
            if pos >= data.len() {
                return Err(OxiRomError::unexpected_eof(1, 0));
            }
            out.push(data[pos]);
            pos += 1;
        }
    }

    Ok(out)
}

/// Decompress an LZ11 stream (no size header) into `decompressed_size` bytes.
///
/// Error behavior matches [`decompress_lz10`].
pub fn decompress_lz11(
    data: &[u8],
    decompressed_size: usize,
    disp_extra: usize,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(decompressed_size);
    let mut pos = 0;

    'groups: while out.len() < decompressed_size {
        if pos >= data.len() {
            return Err(OxiRomError::unexpected_eof(1, 0));
        }
        let mut mask = data[pos];
        pos += 1;

        for _ in 0..8 {
            if mask & 0x80 == 0 {
                if pos >= data.len() {
                    return Err(OxiRomError::unexpected_eof(1, 0));
                }
                out.push(data[pos]);
                pos += 1;
            } else {
                if pos + 2 > data.len() {
                    return Err(OxiRomError::unexpected_eof(2, data.len() - pos));
                }
                let a = data[pos] as usize;
                let b = data[pos + 1] as usize;
                pos += 2;

                let (length, offset) = match a >> 4 {
                    0 => {
                        if pos >= data.len() {
                            return Err(OxiRomError::unexpected_eof(1, 0));
                        }
                        let c = data[pos] as usize;
                        pos += 1;
                        ((((a & 0x0F) << 4) | (b >> 4)) + 0x11, ((b & 0x0F) << 8) | c)
                    }
                    1 => {
                        if pos + 2 > data.len() {
                            return Err(OxiRomError::unexpected_eof(2, data.len() - pos));
                        }
                        let c = data[pos] as usize;
                        let d = data[pos + 1] as usize;
                        pos += 2;
                        (
                            (((a & 0x0F) << 12) | (b << 4) | (c >> 4)) + 0x111,
                            ((c & 0x0F) << 8) | d,
                        )
                    }
                    _ => ((a >> 4) + 1, ((a & 0x0F) << 8) | b),
                };

                let disp = offset + disp_extra;
                let capped = length.min(decompressed_size - out.len());
                copy_backref(&mut out, disp, capped)?;
            }

            if out.len() >= decompressed_size {
                break 'groups;
            }
            mask <<= 1;
        }
    }

    Ok(out)
}
