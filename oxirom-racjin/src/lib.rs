//! # OxiRom Racjin
//!
//! Sequence-cache codec for Racjin/Racdym game archives (PSX and PSP).
//!
//! The stream is a run of 9-bit tokens packed LSB-first into bytes, so
//! eight tokens cost nine bytes and the bit cursor realigns after every
//! group. A token with bit 8 set carries a literal byte. A token with
//! bit 8 clear picks one of 32 cached sequence starts and copies 1 to 8
//! bytes forward from there.
//!
//! The cache is what sets the format apart from plain LZ: both sides
//! keep a 256 x 32 table of past positions keyed by the byte value that
//! preceded each token. Every token records where it started, so a
//! reference reaches sequences that previously followed the same byte.
//! The stream has no length or end marker of its own; the caller's
//! expected output size terminates decoding.
//!
//! ## Example
//!
//! ```
//! use oxirom_racjin::{compress_racjin, decompress_racjin};
//!
//! let data = b"hit points restored! hit points restored!".to_vec();
//! let compressed = compress_racjin(&data);
//! let restored = decompress_racjin(&compressed, data.len()).unwrap();
//! assert_eq!(restored, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use oxirom_core::error::{OxiRomError, Result};

/// Cached sequence starts per context byte value.
const SEQUENCE_SLOTS: usize = 32;

/// Longest copy a reference token can express in its 3-bit length.
const MAX_MATCH: usize = 8;

/// Token bit marking a literal byte.
const LITERAL_FLAG: u16 = 0x100;

/// Bits per token.
const TOKEN_BITS: u32 = 9;

/// Ring of past sequence starts for every possible context byte.
///
/// The per-context counter is an 8-bit wrap, the ring slot is the
/// counter modulo 32 on both the compressor and decompressor side, so
/// the two tables stay identical token for token. The compressor's
/// search depth `min(counter, 32)` collapses to zero when the counter
/// wraps past 255, which matches how the original archives were
/// produced.
struct SequenceTable {
    starts: Vec<usize>,
    counts: [u8; 0x100],
}

impl SequenceTable {
    fn new() -> Self {
        Self {
            starts: vec![0; 0x100 * SEQUENCE_SLOTS],
            counts: [0; 0x100],
        }
    }

    /// Position cached in `slot` for `context`.
    fn start(&self, context: u8, slot: usize) -> usize {
        self.starts[usize::from(context) * SEQUENCE_SLOTS + slot]
    }

    /// Number of slots worth searching for `context`.
    fn depth(&self, context: u8) -> usize {
        usize::from(self.counts[usize::from(context)]).min(SEQUENCE_SLOTS)
    }

    /// Records the start of the token just coded under `context`.
    fn record(&mut self, context: u8, start: usize) {
        let count = &mut self.counts[usize::from(context)];
        let slot = usize::from(*count) % SEQUENCE_SLOTS;
        self.starts[usize::from(context) * SEQUENCE_SLOTS + slot] = start;
        *count = count.wrapping_add(1);
    }
}

/// Packs 9-bit tokens LSB-first, eight tokens per nine bytes.
struct TokenWriter {
    out: Vec<u8>,
    buffer: u32,
    bits: u32,
}

impl TokenWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            buffer: 0,
            bits: 0,
        }
    }

    fn push(&mut self, token: u16) {
        self.buffer |= u32::from(token) << self.bits;
        self.bits += TOKEN_BITS;
        while self.bits >= 8 {
            self.out.push((self.buffer & 0xFF) as u8);
            self.buffer >>= 8;
            self.bits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.out.push((self.buffer & 0xFF) as u8);
        }
        self.out
    }
}

/// Unpacks 9-bit tokens from the folded stream.
struct TokenReader<'a> {
    data: &'a [u8],
    pos: usize,
    buffer: u32,
    bits: u32,
}

impl<'a> TokenReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            buffer: 0,
            bits: 0,
        }
    }

    fn next(&mut self) -> Result<u16> {
        while self.bits < TOKEN_BITS {
            let byte = *self
                .data
                .get(self.pos)
                .ok_or_else(|| OxiRomError::unexpected_eof(1, 0))?;
            self.buffer |= u32::from(byte) << self.bits;
            self.pos += 1;
            self.bits += 8;
        }
        let token = (self.buffer & 0x1FF) as u16;
        self.buffer >>= TOKEN_BITS;
        self.bits -= TOKEN_BITS;
        Ok(token)
    }
}

/// Compresses `data` into a Racjin token stream.
///
/// Data with no usable repetition grows by one bit per byte, so the
/// output can be up to an eighth larger than the input plus one final
/// partial byte.
#[must_use]
pub fn compress_racjin(data: &[u8]) -> Vec<u8> {
    let mut writer = TokenWriter::with_capacity(data.len() + data.len() / 8 + 2);
    let mut table = SequenceTable::new();
    let mut last_byte = 0u8;
    let mut index = 0;

    while index < data.len() {
        let start = index;
        let (slot, length) = best_cached_match(data, index, last_byte, &table);
        let token = if length > 0 {
            index += length;
            (slot as u16) << 3 | (length as u16 - 1)
        } else {
            index += 1;
            LITERAL_FLAG | u16::from(data[start])
        };
        writer.push(token);
        table.record(last_byte, start);
        last_byte = data[index - 1];
    }
    writer.finish()
}

/// Scans the cached slots for `context` in slot order and returns the
/// first longest match at `index`, or a zero length when nothing
/// matches.
fn best_cached_match(
    data: &[u8],
    index: usize,
    context: u8,
    table: &SequenceTable,
) -> (usize, usize) {
    let limit = MAX_MATCH.min(data.len() - index);
    let mut best_slot = 0;
    let mut best_len = 0;
    for slot in 0..table.depth(context) {
        let start = table.start(context, slot);
        let mut len = 0;
        while len < limit && data[start + len] == data[index + len] {
            len += 1;
        }
        if len > best_len {
            best_slot = slot;
            best_len = len;
        }
    }
    (best_slot, best_len)
}

/// Decompresses `data` into exactly `expected_size` bytes.
///
/// The stream carries no length of its own, so the caller passes the
/// size recorded in the archive directory. A final reference copy that
/// would run past it is cut off at the boundary.
///
/// # Errors
///
/// Returns [`OxiRomError::UnexpectedEof`] when the input ends before
/// the output is full, and [`OxiRomError::InvalidDisplacement`] when a
/// reference token arrives before any output exists for it to copy
/// from.
pub fn decompress_racjin(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_size);
    let mut reader = TokenReader::new(data);
    let mut table = SequenceTable::new();
    let mut last_byte = 0u8;

    while out.len() < expected_size {
        let token = reader.next()?;
        let start = out.len();
        if token & LITERAL_FLAG != 0 {
            out.push((token & 0xFF) as u8);
        } else {
            let slot = usize::from(token >> 3) & (SEQUENCE_SLOTS - 1);
            let length = usize::from(token & 0x07) + 1;
            let mut from = table.start(last_byte, slot);
            if from >= out.len() {
                return Err(OxiRomError::invalid_displacement(from, out.len()));
            }
            // The copy may overlap its own output, so it goes byte by
            // byte.
            let copy = length.min(expected_size - out.len());
            for _ in 0..copy {
                let byte = out[from];
                out.push(byte);
                from += 1;
            }
        }
        if out.len() >= expected_size {
            break;
        }
        table.record(last_byte, start);
        last_byte = out[out.len() - 1];
    }
    Ok(out)
}
