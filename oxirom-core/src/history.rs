//! Back-reference copying into a growing output buffer.
//!
//! LZSS-family and CRILAYLA decoders copy match data out of the bytes they
//! have already produced. The copy must run byte-by-byte: when the
//! displacement is shorter than the length, later bytes of the copy read
//! bytes written earlier in the same copy, producing a repeating pattern.
//! A bulk non-overlapping copy would be wrong here.

use crate::error::{OxiRomError, Result};

/// Append `length` bytes copied from `displacement` bytes before the end of
/// `output`, extending `output` in place.
///
/// Fails when the displacement is zero or reaches before the start of the
/// produced output.
pub fn copy_backref(output: &mut Vec<u8>, displacement: usize, length: usize) -> Result<()> {
    if displacement == 0 || displacement > output.len() {
        return Err(OxiRomError::invalid_displacement(
            displacement,
            output.len(),
        ));
    }

    output.reserve(length);
    for _ in 0..length {
        let byte = output[output.len() - displacement];
        output.push(byte);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_copy() {
        let mut out = b"abcd".to_vec();
        copy_backref(&mut out, 4, 4).unwrap();
        assert_eq!(out, b"abcdabcd");
    }

    #[test]
    fn test_overlapping_copy_repeats() {
        let mut out = b"ab".to_vec();
        copy_backref(&mut out, 2, 6).unwrap();
        assert_eq!(out, b"abababab");
    }

    #[test]
    fn test_single_byte_run() {
        let mut out = vec![0x42];
        copy_backref(&mut out, 1, 5).unwrap();
        assert_eq!(out, vec![0x42; 6]);
    }

    #[test]
    fn test_displacement_out_of_range() {
        let mut out = b"ab".to_vec();
        let err = copy_backref(&mut out, 3, 1).unwrap_err();
        assert!(matches!(
            err,
            OxiRomError::InvalidDisplacement {
                displacement: 3,
                produced: 2
            }
        ));
        assert!(copy_backref(&mut out, 0, 1).is_err());
    }
}
