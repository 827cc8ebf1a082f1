//! # OxiRom Nitro
//!
//! Pure Rust implementation of the GBA/NDS BIOS compression family.
//!
//! These are the formats the handheld BIOS decompressors understand, used
//! throughout commercial ROMs for graphics, text archives, and overlay
//! binaries. This crate provides compression and decompression for:
//!
//! - **lz10** (tag 0x10): LZSS, 4KB window, 2-byte back-reference tokens
//! - **lz11** (tag 0x11): LZSS with variable-length tokens, matches to 0x10110 bytes
//! - **huff4** (tag 0x24): Huffman coding over 4-bit symbols
//! - **huff8** (tag 0x28): Huffman coding over 8-bit symbols
//! - **rle** (tag 0x30): run-length coding
//!
//! Framed streams carry a u32 header (tag byte plus 24-bit decompressed
//! length); the raw per-codec functions work headerless for callers that
//! track sizes themselves, such as overlay tables.
//!
//! ## Example
//!
//! ```rust
//! use oxirom_nitro::{compress, decompress, NitroMethod};
//!
//! let data = b"compress me compress me compress me".to_vec();
//! let framed = compress(&data, NitroMethod::Lz10).unwrap();
//! assert_eq!(framed[0], 0x10);
//! assert_eq!(decompress(&framed).unwrap(), data);
//! ```
//!
//! ## Headerless codecs
//!
//! ```rust
//! use oxirom_nitro::lzss::{compress_lz11, decompress_lz11};
//!
//! let data = vec![0x42; 600];
//! let compressed = compress_lz11(&data, 1);
//! let out = decompress_lz11(&compressed, data.len(), 1).unwrap();
//! assert_eq!(out, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod huffman;
pub mod lzss;
pub mod method;
pub mod rle;

// Re-exports
pub use huffman::{compress_huffman, decompress_huffman, HuffmanBits};
pub use lzss::{compress_lz10, compress_lz11, decompress_lz10, decompress_lz11};
pub use method::{
    compress, decompress, read_header, write_header, NitroMethod, MAX_DECOMPRESSED_SIZE,
};
pub use rle::{compress_rle, decompress_rle};
