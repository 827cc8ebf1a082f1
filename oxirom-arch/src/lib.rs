//! # OxiRom ARCH
//!
//! Byte-pair substitution codec for ARCH archive subfiles.
//!
//! The compressor rewrites the most frequent adjacent byte pair as a
//! single byte value unused by the data, and repeats until no pair is
//! frequent enough or all substitute values are taken. Rewritten bytes
//! can join new pairs, so substitutions nest. Each block stores a
//! table describing all 256 byte values, a big-endian content length,
//! and the rewritten content; the decoder unfolds content bytes
//! through the table with an explicit stack.
//!
//! Properties of the format:
//!
//! - Compressed subfiles carry no size field of their own. The caller
//!   supplies the expected size from archive metadata, and the decoder
//!   treats it as authoritative.
//! - A block's content counter is 16 bits, so longer inputs split into
//!   independent blocks.
//! - Data without any frequent pair is stored literally rather than
//!   rejected.
//!
//! ## Example
//!
//! ```
//! use oxirom_arch::{compress_arch, decompress_arch};
//!
//! let data = b"the cat sat on the mat, the cat sat on the mat".to_vec();
//! let compressed = compress_arch(&data);
//! let restored = decompress_arch(&compressed, data.len()).unwrap();
//! assert_eq!(restored, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;
pub mod encode;

// Re-export main types and functions
pub use decode::decompress_arch;
pub use encode::compress_arch;

/// Most content bytes one block can declare in its 16-bit counter.
pub const BLOCK_CONTENT_LIMIT: usize = 0xFFFF;

/// A pair is only worth a table slot when it occurs this often.
pub const MIN_PAIR_FREQUENCY: usize = 4;

/// Table control bytes above this value skip slots instead of counting
/// entries.
pub(crate) const SKIP_BASE: usize = 0x7F;

/// Serialized table mapping every slot to itself: two maximal skips
/// whose trailing entries are literals.
pub(crate) const EMPTY_TABLE: [u8; 4] = [0xFE, 0x7F, 0xFE, 0xFF];

/// Expansion stack depth no well-formed table can reach. Substitutions
/// form a DAG at most 255 keys deep, so crossing this limit proves a
/// cycle.
pub(crate) const EXPANSION_STACK_LIMIT: usize = 0x200;
