//! # OxiRom CRILAYLA
//!
//! Pure Rust implementation of CRILAYLA compression, the scheme CRI
//! middleware uses for entries inside CPK archives.
//!
//! CRILAYLA is an LZSS variant with two unusual properties:
//!
//! - The bit stream runs **backward**: both input scanning and output
//!   production start at the end and move toward the beginning.
//! - The first 0x100 bytes of the original data are stored verbatim after
//!   the compressed payload and restored to the front of the output.
//!
//! Back-references use 13-bit offset codes (distances 3 to 0x2002) and an
//! escalating variable-length length code, so arbitrarily long matches fit
//! in a single token.
//!
//! ## Example
//!
//! ```rust
//! use oxirom_crilayla::{compress_crilayla, decompress_crilayla};
//!
//! let mut data = vec![0u8; 0x100];
//! data.extend_from_slice(&b"an entry from a cpk archive ".repeat(10));
//!
//! let compressed = compress_crilayla(&data).unwrap();
//! assert_eq!(&compressed[..8], b"CRILAYLA");
//! assert_eq!(decompress_crilayla(&compressed).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;
pub mod encode;
pub mod format;

// Re-exports
pub use decode::decompress_crilayla;
pub use encode::compress_crilayla;
pub use format::CrilaylaHeader;
