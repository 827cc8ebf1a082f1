//! Longest-match search shared by the LZSS-family compressors.
//!
//! # Algorithm
//!
//! Greedy exhaustive search: every allowed displacement is tried, largest
//! first, and a strictly longer candidate replaces the current best. Equal
//! lengths therefore resolve to the largest displacement. The comparison
//! walks forward past the current position into not-yet-consumed input,
//! which is what makes self-overlapping run matches (displacement shorter
//! than the match) come out at full length.

/// Minimum match length worth encoding as a back-reference.
pub const MIN_MATCH: usize = 3;

/// A back-reference candidate: `length` bytes starting `displacement` bytes
/// before the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Number of matching bytes.
    pub length: usize,
    /// Backward distance to the match start.
    pub displacement: usize,
}

/// Find the longest match for the bytes at `pos`.
///
/// Searches displacements in `(min_displacement, min(window, pos)]` and caps
/// candidate lengths at `max_length` and at the bytes remaining in `data`.
/// Displacements of `min_displacement` or below are never returned.
///
/// Returns `None` when no candidate reaches [`MIN_MATCH`].
pub fn find_longest_match(
    data: &[u8],
    pos: usize,
    window: usize,
    max_length: usize,
    min_displacement: usize,
) -> Option<Match> {
    let lookback = window.min(pos);
    let cap = max_length.min(data.len() - pos);
    if cap < MIN_MATCH || lookback <= min_displacement {
        return None;
    }

    let mut best = Match {
        length: 0,
        displacement: 0,
    };
    for displacement in (min_displacement + 1..=lookback).rev() {
        let start = pos - displacement;
        let mut length = 0;
        while length < cap && data[start + length] == data[pos + length] {
            length += 1;
        }
        if length > best.length {
            best = Match {
                length,
                displacement,
            };
            if length == cap {
                break;
            }
        }
    }

    (best.length >= MIN_MATCH).then_some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_in_unique_data() {
        let data = b"abcdefgh";
        assert_eq!(find_longest_match(data, 4, 0x1000, 0x12, 1), None);
    }

    #[test]
    fn test_repeating_pattern() {
        let data = b"abcdabcdabcd";
        let m = find_longest_match(data, 4, 0x1000, 0x12, 1).unwrap();
        assert_eq!(m.displacement, 4);
        // Overlap compare runs to the end of the buffer.
        assert_eq!(m.length, 8);
    }

    #[test]
    fn test_overlapping_run() {
        let data = b"aaaaaaaaaa";
        let m = find_longest_match(data, 2, 0x1000, 0x12, 1).unwrap();
        assert_eq!(m.displacement, 2);
        assert_eq!(m.length, 8);
    }

    #[test]
    fn test_tie_prefers_largest_displacement() {
        let data = b"abcXabcYabc";
        let m = find_longest_match(data, 8, 0x1000, 0x12, 1).unwrap();
        assert_eq!(m.length, 3);
        assert_eq!(m.displacement, 8);
    }

    #[test]
    fn test_length_cap() {
        let data = vec![0x55u8; 64];
        let m = find_longest_match(&data, 8, 0x1000, 0x12, 1).unwrap();
        assert_eq!(m.length, 0x12);
    }

    #[test]
    fn test_min_displacement_is_exclusive() {
        let data = b"ababababab";
        // Only displacement 2 matches this pattern; excluding it kills the match.
        assert!(find_longest_match(data, 2, 0x1000, 0x12, 1).is_some());
        assert_eq!(find_longest_match(data, 2, 0x1000, 0x12, 2), None);
    }

    #[test]
    fn test_window_limits_lookback() {
        let data = b"abcd____abcd";
        assert!(find_longest_match(data, 8, 8, 0x12, 1).is_some());
        assert_eq!(find_longest_match(data, 8, 4, 0x12, 1), None);
    }

    #[test]
    fn test_near_end_shrinks_cap() {
        let data = b"xyzxy";
        let m = find_longest_match(data, 3, 0x1000, 0x12, 1);
        // Only two bytes remain, below the minimum.
        assert_eq!(m, None);
    }
}
