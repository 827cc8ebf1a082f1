//! Bit-level I/O in the two orders the codec layer needs.
//!
//! The Huffman codec consumes its code stream as 32-bit little-endian words
//! read bit-by-bit from the most significant bit downward; [`BitReader`] and
//! [`BitWriter`] implement that word-based order.
//!
//! CRILAYLA packs its token stream backward: bytes are laid out from the end
//! of the compressed region toward the start, MSB-first within each byte.
//! [`ReverseBitReader`] consumes a slice from its last byte toward its first;
//! [`ReverseBitWriter`] produces bytes in emission order, leaving the
//! back-to-front layout to the caller.

use crate::error::{OxiRomError, Result};

/// Bit reader over 32-bit little-endian code words, MSB-first within each word.
#[derive(Debug)]
pub struct BitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Position of the next unread word.
    byte_pos: usize,
    /// Current word, already-consumed bits shifted out.
    word: u32,
    /// Number of valid bits left in `word`.
    bits_left: u8,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
}

impl<'a> BitReader<'a> {
    /// Create a new word-based bit reader.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            word: 0,
            bits_left: 0,
            total_bits_read: 0,
        }
    }

    /// Load the next 32-bit little-endian word.
    #[inline]
    fn refill(&mut self) -> Result<()> {
        if self.byte_pos + 4 > self.data.len() {
            return Err(OxiRomError::unexpected_eof(
                4,
                self.data.len() - self.byte_pos,
            ));
        }
        let bytes = [
            self.data[self.byte_pos],
            self.data[self.byte_pos + 1],
            self.data[self.byte_pos + 2],
            self.data[self.byte_pos + 3],
        ];
        self.word = u32::from_le_bytes(bytes);
        self.byte_pos += 4;
        self.bits_left = 32;
        Ok(())
    }

    /// Read the next bit (0 or 1).
    pub fn read_bit(&mut self) -> Result<u8> {
        if self.bits_left == 0 {
            self.refill()?;
        }
        let bit = (self.word >> 31) as u8;
        self.word <<= 1;
        self.bits_left -= 1;
        self.total_bits_read += 1;
        Ok(bit)
    }

    /// Get total bits read.
    pub fn bits_read(&self) -> u64 {
        self.total_bits_read
    }
}

/// Bit writer producing 32-bit little-endian code words, MSB-first within
/// each word. The final partial word is zero-padded toward the LSB side.
#[derive(Debug)]
pub struct BitWriter {
    /// Output buffer.
    output: Vec<u8>,
    /// Bit accumulator, newest bits at the low end.
    buffer: u64,
    /// Number of pending bits in `buffer`.
    bits_in_buffer: u8,
}

impl BitWriter {
    /// Create a new word-based bit writer.
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Write a single bit (only the lowest bit of `bit` is used).
    pub fn write_bit(&mut self, bit: u8) {
        self.write_bits((bit & 1) as u16, 1);
    }

    /// Write up to 16 bits, MSB-first.
    pub fn write_bits(&mut self, value: u16, count: u8) {
        debug_assert!((1..=16).contains(&count));
        let mask = (1u32 << count) - 1;
        self.buffer = (self.buffer << count) | (value as u32 & mask) as u64;
        self.bits_in_buffer += count;

        while self.bits_in_buffer >= 32 {
            let word = (self.buffer >> (self.bits_in_buffer - 32)) as u32;
            self.output.extend_from_slice(&word.to_le_bytes());
            self.bits_in_buffer -= 32;
        }
    }

    /// Number of bits written so far, including pending ones.
    pub fn bit_len(&self) -> u64 {
        (self.output.len() as u64) * 8 + self.bits_in_buffer as u64
    }

    /// Flush the final partial word (zero-padded) and return the output.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bits_in_buffer > 0 {
            let word = (self.buffer << (32 - self.bits_in_buffer)) as u32;
            self.output.extend_from_slice(&word.to_le_bytes());
            self.bits_in_buffer = 0;
        }
        self.output
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit reader consuming a slice from its last byte toward its first,
/// MSB-first within each byte.
#[derive(Debug)]
pub struct ReverseBitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Number of bytes not yet loaded; the next byte is `data[byte_pos - 1]`.
    byte_pos: usize,
    /// Current byte being consumed.
    pool: u8,
    /// Number of valid bits left in `pool`.
    bits_left: u8,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
}

impl<'a> ReverseBitReader<'a> {
    /// Create a reader starting at the end of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: data.len(),
            pool: 0,
            bits_left: 0,
            total_bits_read: 0,
        }
    }

    /// Read up to 16 bits, MSB-first.
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        debug_assert!((1..=16).contains(&count));
        let mut out: u16 = 0;
        let mut produced: u8 = 0;

        while produced < count {
            if self.bits_left == 0 {
                if self.byte_pos == 0 {
                    return Err(OxiRomError::unexpected_eof(1, 0));
                }
                self.byte_pos -= 1;
                self.pool = self.data[self.byte_pos];
                self.bits_left = 8;
            }
            let take = self.bits_left.min(count - produced);
            out <<= take;
            out |= ((self.pool as u16) >> (self.bits_left - take)) & ((1u16 << take) - 1);
            self.bits_left -= take;
            produced += take;
        }

        self.total_bits_read += count as u64;
        Ok(out)
    }

    /// Get total bits read.
    pub fn bits_read(&self) -> u64 {
        self.total_bits_read
    }
}

/// Bit writer for back-to-front byte streams.
///
/// Bytes come out in emission order; the caller reverses them to obtain the
/// final layout, where the first-emitted byte sits at the highest address.
/// The final partial byte keeps its bits at the MSB side, zero-padded below.
#[derive(Debug)]
pub struct ReverseBitWriter {
    /// Completed bytes in emission order.
    bytes: Vec<u8>,
    /// Bit accumulator, newest bits at the low end.
    buffer: u64,
    /// Number of pending bits in `buffer`.
    bits_in_buffer: u8,
}

impl ReverseBitWriter {
    /// Create a new reverse-stream bit writer.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Write up to 16 bits, MSB-first.
    pub fn write_bits(&mut self, value: u16, count: u8) {
        debug_assert!((1..=16).contains(&count));
        let mask = (1u32 << count) - 1;
        self.buffer = (self.buffer << count) | (value as u32 & mask) as u64;
        self.bits_in_buffer += count;

        while self.bits_in_buffer >= 8 {
            self.bytes.push((self.buffer >> (self.bits_in_buffer - 8)) as u8);
            self.bits_in_buffer -= 8;
        }
    }

    /// Number of bits written so far, including pending ones.
    pub fn bit_len(&self) -> u64 {
        (self.bytes.len() as u64) * 8 + self.bits_in_buffer as u64
    }

    /// Flush the final partial byte and return the bytes in emission order.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bits_in_buffer > 0 {
            self.bytes.push((self.buffer << (8 - self.bits_in_buffer)) as u8);
            self.bits_in_buffer = 0;
        }
        self.bytes
    }
}

impl Default for ReverseBitWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0b1100, 4);
        writer.write_bits(0xABCD, 16);
        writer.write_bits(0x3FFF, 14);

        let data = writer.finish();
        assert_eq!(data.len() % 4, 0);

        let mut reader = BitReader::new(&data);
        let mut read = |count: u8| -> u32 {
            let mut v = 0u32;
            for _ in 0..count {
                v = (v << 1) | reader.read_bit().unwrap() as u32;
            }
            v
        };
        assert_eq!(read(3), 0b101);
        assert_eq!(read(4), 0b1100);
        assert_eq!(read(16), 0xABCD);
        assert_eq!(read(14), 0x3FFF);
    }

    #[test]
    fn test_word_layout_is_little_endian() {
        let mut writer = BitWriter::new();
        // One full word: 0x80000001 viewed MSB-first.
        writer.write_bits(0x8000, 16);
        writer.write_bits(0x0001, 16);
        let data = writer.finish();
        assert_eq!(data, vec![0x01, 0x00, 0x00, 0x80]);
    }

    #[test]
    fn test_word_partial_padding() {
        let mut writer = BitWriter::new();
        writer.write_bit(1);
        let data = writer.finish();
        // Single 1 bit lands at bit 31 of a zero-padded word.
        assert_eq!(data, vec![0x00, 0x00, 0x00, 0x80]);
    }

    #[test]
    fn test_word_reader_eof() {
        let data = vec![0xFF, 0xFF]; // not a whole word
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_reverse_roundtrip() {
        let mut writer = ReverseBitWriter::new();
        writer.write_bits(1, 1);
        writer.write_bits(0x1ABC, 13);
        writer.write_bits(0b10, 2);
        writer.write_bits(0xFF, 8);

        let mut stream = writer.finish();
        stream.reverse();

        let mut reader = ReverseBitReader::new(&stream);
        assert_eq!(reader.read_bits(1).unwrap(), 1);
        assert_eq!(reader.read_bits(13).unwrap(), 0x1ABC);
        assert_eq!(reader.read_bits(2).unwrap(), 0b10);
        assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
    }

    #[test]
    fn test_reverse_reader_consumes_tail_first() {
        // 0xA5 = 1010_0101: the reader must see the last byte's bits first.
        let data = vec![0x00, 0xA5];
        let mut reader = ReverseBitReader::new(&data);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
        assert_eq!(reader.read_bits(4).unwrap(), 0b0101);
        assert_eq!(reader.read_bits(8).unwrap(), 0x00);
        assert!(reader.read_bits(1).is_err());
    }

    #[test]
    fn test_reverse_partial_byte_alignment() {
        let mut writer = ReverseBitWriter::new();
        writer.write_bits(0b101, 3);
        let bytes = writer.finish();
        // Three pending bits land at the MSB side of the last emitted byte.
        assert_eq!(bytes, vec![0b1010_0000]);
    }
}
