//! Error types for OxiRom operations.
//!
//! This module provides a comprehensive error type that covers all possible
//! error conditions in codec operations: truncated or corrupted streams,
//! out-of-range back-references, malformed Huffman trees, and format
//! preconditions.

use std::io;
use thiserror::Error;

/// The main error type for OxiRom operations.
#[derive(Debug, Error)]
pub enum OxiRomError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic number in a stream header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Unsupported compression method.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method identifier.
        method: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: need {expected} more bytes, have {available}")]
    UnexpectedEof {
        /// Number of bytes that were expected.
        expected: usize,
        /// Number of bytes actually available.
        available: usize,
    },

    /// Invalid displacement in an LZSS-style back-reference.
    #[error("Invalid back-reference displacement: {displacement} with only {produced} bytes produced")]
    InvalidDisplacement {
        /// The decoded displacement value.
        displacement: usize,
        /// Number of output bytes produced so far.
        produced: usize,
    },

    /// Malformed or unserializable Huffman tree.
    #[error("Invalid Huffman tree: {message}")]
    InvalidHuffmanTree {
        /// Description of the structural problem.
        message: String,
    },

    /// Invalid stream header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Corrupted data mid-stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Input does not meet a format's minimum size precondition.
    #[error("Input too small: format requires at least {minimum} bytes, got {actual}")]
    InputTooSmall {
        /// Minimum input size the format supports.
        minimum: usize,
        /// Actual input size.
        actual: usize,
    },
}

/// Result type alias for OxiRom operations.
pub type Result<T> = std::result::Result<T, OxiRomError>;

impl OxiRomError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create an unexpected end-of-input error.
    pub fn unexpected_eof(expected: usize, available: usize) -> Self {
        Self::UnexpectedEof {
            expected,
            available,
        }
    }

    /// Create an invalid displacement error.
    pub fn invalid_displacement(displacement: usize, produced: usize) -> Self {
        Self::InvalidDisplacement {
            displacement,
            produced,
        }
    }

    /// Create an invalid Huffman tree error.
    pub fn invalid_huffman_tree(message: impl Into<String>) -> Self {
        Self::InvalidHuffmanTree {
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an input-too-small error.
    pub fn input_too_small(minimum: usize, actual: usize) -> Self {
        Self::InputTooSmall { minimum, actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiRomError::invalid_magic(vec![0x43, 0x52], vec![0x00, 0x00]);
        assert!(err.to_string().contains("Invalid magic"));

        let err = OxiRomError::invalid_displacement(4096, 32);
        assert!(err.to_string().contains("4096"));

        let err = OxiRomError::unsupported_method("LZ40");
        assert!(err.to_string().contains("LZ40"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: OxiRomError = io_err.into();
        assert!(matches!(err, OxiRomError::Io(_)));
    }
}
