//! ARCH byte-pair compressor.
//!
//! Each block rewrites the most frequent adjacent byte pair as a single
//! unused byte, repeating until no pair occurs often enough or the pool
//! of unused bytes runs dry. The block is then serialized as a
//! substitution table, a big-endian content length, and the rewritten
//! content:
//!
//! ```text
//! +-------------------+------------+------------------+
//! | substitution table| length u16 | rewritten content|
//! +-------------------+------------+------------------+
//! ```
//!
//! The table walks all 256 slots in index order using control bytes:
//! a byte above [`SKIP_BASE`] skips that many slots and is followed by
//! exactly one entry, while a byte of `n <= 0x7F` introduces `n + 1`
//! consecutive entries. An entry whose first byte equals its own slot
//! index is a literal; any other entry carries the two replacement
//! bytes for that slot.

use crate::{BLOCK_CONTENT_LIMIT, EMPTY_TABLE, MIN_PAIR_FREQUENCY, SKIP_BASE};

/// Largest number of table slots one skip byte can cover.
const MAX_SKIP: usize = 0x7F;

/// Largest number of entries one count byte can introduce.
const MAX_RUN: usize = 0x80;

/// Compresses `data` into the ARCH block format.
///
/// Input longer than a block's 16-bit content counter allows is split
/// into multiple self-contained blocks. Incompressible data degrades
/// to a literal table and untouched content rather than an error, so
/// this call cannot fail.
#[must_use]
pub fn compress_arch(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 + 0x10);
    if data.is_empty() {
        compress_block(data, &mut out);
        return out;
    }
    for chunk in data.chunks(BLOCK_CONTENT_LIMIT) {
        compress_block(chunk, &mut out);
    }
    out
}

/// Compresses one chunk as a single block appended to `out`.
fn compress_block(chunk: &[u8], out: &mut Vec<u8>) {
    let mut pool = unused_bytes(chunk);
    let mut content = chunk.to_vec();
    // Slot -> replaced pair, ordered by slot for serialization.
    let mut table: Vec<(u8, (u8, u8))> = Vec::new();

    while let Some(&key) = pool.last() {
        let Some((pair, count)) = most_common_pair(&content) else {
            break;
        };
        if count < MIN_PAIR_FREQUENCY {
            break;
        }
        pool.pop();
        table.push((key, pair));
        content = replace_pair(&content, pair, key);
    }

    table.sort_unstable_by_key(|&(key, _)| key);
    write_table(&table, out);
    out.push((content.len() >> 8) as u8);
    out.push((content.len() & 0xFF) as u8);
    out.extend_from_slice(&content);
}

/// Collects every byte value absent from `chunk`, ascending. Zero is
/// reserved and never handed out, and keys are consumed from the top
/// of the pool downward.
fn unused_bytes(chunk: &[u8]) -> Vec<u8> {
    let mut present = [false; 0x100];
    for &byte in chunk {
        present[usize::from(byte)] = true;
    }
    (1..=0xFF).filter(|&b| !present[usize::from(b)]).collect()
}

/// Counts every adjacent byte pair and returns the most frequent one
/// with its count. Ties resolve to the pair seen earliest in the
/// buffer, which keeps the output deterministic.
fn most_common_pair(content: &[u8]) -> Option<((u8, u8), usize)> {
    if content.len() < 2 {
        return None;
    }
    let mut counts = vec![0u32; 0x10000];
    let mut first_seen = vec![u32::MAX; 0x10000];
    for (i, window) in content.windows(2).enumerate() {
        let idx = usize::from(window[0]) << 8 | usize::from(window[1]);
        if counts[idx] == 0 {
            first_seen[idx] = i as u32;
        }
        counts[idx] += 1;
    }

    let mut best_idx = 0;
    let mut best_count = 0u32;
    let mut best_seen = u32::MAX;
    for idx in 0..0x10000 {
        let count = counts[idx];
        if count > best_count || (count == best_count && count > 0 && first_seen[idx] < best_seen)
        {
            best_idx = idx;
            best_count = count;
            best_seen = first_seen[idx];
        }
    }
    if best_count == 0 {
        return None;
    }
    Some((
        ((best_idx >> 8) as u8, (best_idx & 0xFF) as u8),
        best_count as usize,
    ))
}

/// Rewrites every left-to-right, non-overlapping occurrence of `pair`
/// as `key`. Occurrences created by earlier rewrites in the same pass
/// are picked up by later substitution rounds, not this one.
fn replace_pair(content: &[u8], pair: (u8, u8), key: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        if i + 1 < content.len() && content[i] == pair.0 && content[i + 1] == pair.1 {
            out.push(key);
            i += 2;
        } else {
            out.push(content[i]);
            i += 1;
        }
    }
    out
}

/// Serializes the substitution table covering all 256 slots.
fn write_table(table: &[(u8, (u8, u8))], out: &mut Vec<u8>) {
    if table.is_empty() {
        out.extend_from_slice(&EMPTY_TABLE);
        return;
    }

    let mut slot = 0usize;
    let mut i = 0;
    while i < table.len() {
        let key = usize::from(table[i].0);
        if key > slot {
            let mut gap = key - slot;
            // A skip byte lands on exactly one entry, so the chain has
            // to leave the final hop in 1..=MAX_SKIP to end on the key.
            while gap > MAX_SKIP {
                let hop = if gap == MAX_SKIP + 1 { MAX_SKIP - 1 } else { MAX_SKIP };
                out.push((hop + SKIP_BASE) as u8);
                out.push((slot + hop) as u8);
                slot += hop + 1;
                gap = key - slot;
            }
            out.push((gap + SKIP_BASE) as u8);
            let (_, (b0, b1)) = table[i];
            out.push(b0);
            out.push(b1);
            slot = key + 1;
            i += 1;
        } else {
            let mut run = 1;
            while i + run < table.len() && usize::from(table[i + run].0) == key + run {
                run += 1;
            }
            let run = run.min(MAX_RUN);
            out.push((run - 1) as u8);
            for &(_, (b0, b1)) in &table[i..i + run] {
                out.push(b0);
                out.push(b1);
            }
            slot = key + run;
            i += run;
        }
    }

    // Remaining slots hold their own index.
    while slot < 0x100 {
        let run = (0x100 - slot).min(MAX_RUN);
        out.push((run - 1) as u8);
        for index in slot..slot + run {
            out.push(index as u8);
        }
        slot += run;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_single_literal_block() {
        let compressed = compress_arch(&[]);
        assert_eq!(compressed, vec![0xFE, 0x7F, 0xFE, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn test_no_frequent_pair_stores_literals() {
        let data = b"abcdefgh";
        let compressed = compress_arch(data);

        let mut expected = vec![0xFE, 0x7F, 0xFE, 0xFF, 0x00, 0x08];
        expected.extend_from_slice(data);
        assert_eq!(compressed, expected);
    }

    #[test]
    fn test_single_substitution_layout() {
        // (a, b) occurs four times, (b, a) only three, so one key is
        // assigned from the top of the pool and the content shrinks to
        // four copies of it.
        let compressed = compress_arch(b"abababab");
        assert_eq!(
            compressed,
            vec![0xFE, 0x7F, 0xFE, 0x61, 0x62, 0x00, 0x04, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_cascading_substitutions_layout() {
        // "abcd" four times collapses pair by pair: ab -> FF, FFc -> FE,
        // FEd -> FD. The table stores the three keys with one skip chain
        // and one consecutive run.
        let compressed = compress_arch(b"abcdabcdabcdabcd");
        assert_eq!(
            compressed,
            vec![
                0xFE, 0x7F, // skip to slot 0x7F, literal entry
                0xFC, 0xFE, 0x64, // skip to slot 0xFD: pair (0xFE, 'd')
                0x01, 0xFF, 0x63, // run of two: slot 0xFE -> (0xFF, 'c')
                0x61, 0x62, // slot 0xFF -> ('a', 'b')
                0x00, 0x04, // four content bytes
                0xFD, 0xFD, 0xFD, 0xFD,
            ]
        );
    }

    #[test]
    fn test_frequency_threshold() {
        // Three occurrences of the best pair stay below the threshold.
        let data = b"xyxyxy";
        let compressed = compress_arch(data);

        let mut expected = vec![0xFE, 0x7F, 0xFE, 0xFF, 0x00, 0x06];
        expected.extend_from_slice(data);
        assert_eq!(compressed, expected);
    }

    #[test]
    fn test_tie_break_prefers_earliest_pair() {
        // (c, d) and (a, b) both occur four times; (c, d) appears first
        // in the buffer and must win the top key 0xFF, leaving 0xFE for
        // (a, b) in the next round.
        let compressed = compress_arch(b"cdcdcdcdababababx");
        assert_eq!(
            compressed,
            vec![
                0xFE, 0x7F, // skip to slot 0x7F, literal entry
                0xFD, 0x61, 0x62, // skip to slot 0xFE: pair ('a', 'b')
                0x00, 0x63, 0x64, // run of one: slot 0xFF -> ('c', 'd')
                0x00, 0x09, // nine content bytes
                0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFE, 0xFE, 0xFE, 0x78,
            ]
        );
    }

    #[test]
    fn test_oversized_input_splits_into_blocks() {
        let data = vec![0x41u8; BLOCK_CONTENT_LIMIT + 5];
        let compressed = compress_arch(&data);

        // Two blocks: the second one compresses five 'A's on its own.
        // The first block ends where the second table starts, and both
        // blocks decode independently in the decoder tests.
        assert!(compressed.len() > 6);
        assert!(compressed.len() < data.len());
    }

    #[test]
    fn test_long_identity_tail_splits_runs() {
        // Every byte from 0x7F up is present, so the assigned key sits
        // at 0x7E and 129 identity slots follow it. A count byte covers
        // at most 0x80 entries, so the tail needs two runs.
        let mut data: Vec<u8> = (0x7F..=0xFF).collect();
        data.extend_from_slice(b"abababab");
        let compressed = compress_arch(&data);

        // Skip to slot 0x7E carrying the ('a', 'b') pair.
        assert_eq!(&compressed[..3], &[0xFD, 0x61, 0x62]);
        // First tail run: 0x80 identity entries for 0x7F..=0xFE.
        assert_eq!(compressed[3], 0x7F);
        assert_eq!(compressed[4], 0x7F);
        assert_eq!(compressed[131], 0xFE);
        // Second tail run: one identity entry for 0xFF.
        assert_eq!(&compressed[132..134], &[0x00, 0xFF]);
        // 133 content bytes follow the big-endian counter.
        assert_eq!(&compressed[134..136], &[0x00, 0x85]);
        assert_eq!(compressed.len(), 136 + 133);
    }

    #[test]
    fn test_pool_excludes_present_bytes_and_zero() {
        let mut chunk = Vec::new();
        for b in 0x01..=0xFE {
            chunk.push(b);
        }
        let pool = unused_bytes(&chunk);
        assert_eq!(pool, vec![0xFF]);

        let all = unused_bytes(&[]);
        assert_eq!(all.len(), 0xFF);
        assert_eq!(all[0], 0x01);
        assert_eq!(*all.last().unwrap(), 0xFF);
    }
}
