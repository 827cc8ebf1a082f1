//! # OxiRom Core
//!
//! Core components for the OxiRom codec library.
//!
//! This crate provides the fundamental building blocks shared by the codec
//! crates:
//!
//! - [`bitstream`]: Bit-level I/O in the two orders the formats use
//!   (32-bit little-endian code words and back-to-front byte streams)
//! - [`matching`]: Greedy longest-match search for LZSS-family compressors
//! - [`history`]: Overlap-safe back-reference copying for decoders
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiRom is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Consumers                                           │
//! │     Archive/container tools, the oxirom CLI             │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     LZ10/LZ11, Huffman, RLE (nitro), CRILAYLA, ARCH,    │
//! │     Racjin                                              │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Primitives (this crate)                             │
//! │     BitReader/BitWriter, match search, history copy     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every codec operation is a pure function over in-memory byte buffers:
//! no I/O, no shared state between calls, safe to run concurrently on
//! separate inputs.
//!
//! ## Example
//!
//! ```rust
//! use oxirom_core::bitstream::{BitReader, BitWriter};
//! use oxirom_core::matching::find_longest_match;
//!
//! // Pack bits into 32-bit little-endian code words
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b1011, 4);
//! let words = writer.finish();
//!
//! let mut reader = BitReader::new(&words);
//! assert_eq!(reader.read_bit().unwrap(), 1);
//! assert_eq!(reader.read_bit().unwrap(), 0);
//!
//! // Search a sliding window for the longest back-reference
//! let data = b"abcdabcdabcd";
//! let m = find_longest_match(data, 4, 0x1000, 0x12, 1).unwrap();
//! assert_eq!(m.displacement, 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod history;
pub mod matching;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter, ReverseBitReader, ReverseBitWriter};
pub use error::{OxiRomError, Result};
pub use history::copy_backref;
pub use matching::{Match, find_longest_match, MIN_MATCH};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter, ReverseBitReader, ReverseBitWriter};
    pub use crate::error::{OxiRomError, Result};
    pub use crate::history::copy_backref;
    pub use crate::matching::{Match, find_longest_match, MIN_MATCH};
}
