//! Huffman coding with the bit-packed tree serialization of the GBA/NDS
//! BIOS family.
//!
//! # Stream layout
//!
//! ```text
//! +--------+--------+------------------+------------------------+
//! | size   | root   | node pairs       | 32-bit LE code words   |
//! | 1 byte | 1 byte | 2 bytes per pair | MSB-first within word  |
//! +--------+--------+------------------+------------------------+
//! ```
//!
//! The size byte holds the pair count; `(size + 1) * 2` is the total table
//! length including the size byte itself. Each internal node is one byte:
//! a 6-bit offset to its child pair plus flags 0x80/0x40 marking the
//! bit-0/bit-1 child as a leaf. Walking a code accumulates
//! `next += (node & 0x3F) * 2 + 2`; the bit-1 child sits one byte below the
//! bit-0 child.
//!
//! In 4-bit mode every input byte is split into two nibble symbols before
//! coding (`little_endian` selects which nibble comes first), and the
//! decoder repacks pairs of nibbles on the way out.

use oxirom_core::bitstream::{BitReader, BitWriter};
use oxirom_core::error::{OxiRomError, Result};
use std::collections::VecDeque;

/// Symbol width for the Huffman coder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanBits {
    /// 4-bit symbols: input bytes are split into nibbles.
    Four,
    /// 8-bit symbols.
    Eight,
}

impl HuffmanBits {
    /// Number of bits per symbol.
    pub fn bits(self) -> u8 {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    fn symbols_per_byte(self) -> usize {
        match self {
            Self::Four => 2,
            Self::Eight => 1,
        }
    }
}

/// Maximum child-pair offset an internal node byte can carry.
const MAX_PAIR_OFFSET: usize = 0x3F;

#[derive(Debug, Clone)]
struct Node {
    freq: usize,
    value: u8,
    /// `(bit-0 child, bit-1 child)` arena indices; `None` for leaves.
    children: Option<(usize, usize)>,
}

impl Node {
    fn leaf(value: u8, freq: usize) -> Self {
        Self {
            freq,
            value,
            children: None,
        }
    }
}

/// Compress `data` with Huffman coding (no size header).
///
/// Fails when the tree cannot be serialized: very wide trees (many symbols
/// with similar frequencies) can need child offsets beyond the 6-bit field.
pub fn compress_huffman(data: &[u8], bits: HuffmanBits, little_endian: bool) -> Result<Vec<u8>> {
    let symbols = expand_symbols(data, bits, little_endian);

    let mut freq = [0usize; 256];
    for &s in &symbols {
        freq[s as usize] += 1;
    }

    let mut arena: Vec<Node> = freq
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(value, &count)| Node::leaf(value as u8, count))
        .collect();
    if arena.is_empty() {
        arena.push(Node::leaf(0, 0));
    }
    if arena.len() == 1 {
        // The walker needs a real pair; pad with an unused sibling. The
        // value wraps so symbol 0xFF stays representable.
        let dummy = arena[0].value.wrapping_add(1);
        arena.push(Node::leaf(dummy, 0));
    }

    let root = build_tree(&mut arena);
    let table = serialize_tree(&arena, root)?;

    let mut codes: Vec<Vec<u8>> = vec![Vec::new(); 256];
    let mut path = Vec::new();
    assign_codes(&arena, root, &mut path, &mut codes);

    let mut writer = BitWriter::new();
    for &symbol in &symbols {
        for &bit in &codes[symbol as usize] {
            writer.write_bit(bit);
        }
    }

    let mut out = table;
    out.extend_from_slice(&writer.finish());
    Ok(out)
}

/// Decompress a Huffman stream (no size header) into `decompressed_size`
/// bytes.
pub fn decompress_huffman(
    data: &[u8],
    decompressed_size: usize,
    bits: HuffmanBits,
    little_endian: bool,
) -> Result<Vec<u8>> {
    let symbol_count = decompressed_size * bits.symbols_per_byte();
    if symbol_count == 0 {
        return Ok(Vec::new());
    }

    if data.is_empty() {
        return Err(OxiRomError::unexpected_eof(2, 0));
    }
    let table_len = (data[0] as usize + 1) * 2;
    if data.len() < table_len {
        return Err(OxiRomError::unexpected_eof(table_len, data.len()));
    }
    // Root byte plus the node pairs; the walker indexes from the root.
    let tree = &data[1..table_len];
    let mut reader = BitReader::new(&data[table_len..]);

    let mut symbols = Vec::with_capacity(symbol_count);
    let mut pos = tree[0];
    let mut next: usize = 0;
    while symbols.len() < symbol_count {
        let bit = reader.read_bit()?;
        next += ((pos & 0x3F) as usize) * 2 + 2;
        let child_index = next - bit as usize;
        if child_index >= tree.len() {
            return Err(OxiRomError::invalid_huffman_tree(format!(
                "node index {child_index} escapes a {}-byte table",
                tree.len()
            )));
        }
        let is_leaf = pos & (0x80 >> bit) != 0;
        pos = tree[child_index];
        if is_leaf {
            symbols.push(pos);
            pos = tree[0];
            next = 0;
        }
    }

    Ok(pack_symbols(&symbols, bits, little_endian))
}

fn expand_symbols(data: &[u8], bits: HuffmanBits, little_endian: bool) -> Vec<u8> {
    match bits {
        HuffmanBits::Eight => data.to_vec(),
        HuffmanBits::Four => {
            let mut symbols = Vec::with_capacity(data.len() * 2);
            for &byte in data {
                if little_endian {
                    symbols.push(byte & 0x0F);
                    symbols.push(byte >> 4);
                } else {
                    symbols.push(byte >> 4);
                    symbols.push(byte & 0x0F);
                }
            }
            symbols
        }
    }
}

fn pack_symbols(symbols: &[u8], bits: HuffmanBits, little_endian: bool) -> Vec<u8> {
    match bits {
        HuffmanBits::Eight => symbols.to_vec(),
        HuffmanBits::Four => symbols
            .chunks_exact(2)
            .map(|pair| {
                if little_endian {
                    (pair[1] << 4) | (pair[0] & 0x0F)
                } else {
                    (pair[0] << 4) | (pair[1] & 0x0F)
                }
            })
            .collect(),
    }
}

/// Merge the two lowest-frequency nodes until one root remains.
///
/// The worklist sort is stable, so equal frequencies resolve by insertion
/// order: symbol value order first, merged nodes after their inputs.
fn build_tree(arena: &mut Vec<Node>) -> usize {
    let mut work: Vec<usize> = (0..arena.len()).collect();
    while work.len() > 1 {
        work.sort_by_key(|&idx| arena[idx].freq);
        let first = work.remove(0);
        let second = work.remove(0);
        arena.push(Node {
            freq: arena[first].freq + arena[second].freq,
            value: 0,
            children: Some((first, second)),
        });
        work.push(arena.len() - 1);
    }
    work[0]
}

/// Lay the tree out as the flat byte array the walker consumes.
///
/// Pairs are placed breadth-first: each internal node's children take the
/// next free pair slot, and the node's byte records the distance from its
/// own pair to theirs in the 6-bit offset field.
fn serialize_tree(arena: &[Node], root: usize) -> Result<Vec<u8>> {
    let pair_count = arena.iter().filter(|n| n.children.is_some()).count();

    // Root byte first, then two bytes per pair.
    let mut flat = vec![0u8; 1 + pair_count * 2];
    // Pending internal nodes: (arena index, flat slot, pair-unit arrival).
    let mut queue = VecDeque::new();
    queue.push_back((root, 0usize, 0usize));
    let mut placed = 0usize;

    while let Some((node, slot, arrival)) = queue.pop_front() {
        let (child0, child1) = match arena[node].children {
            Some(pair) => pair,
            None => continue,
        };
        let offset = placed - arrival;
        if offset > MAX_PAIR_OFFSET {
            return Err(OxiRomError::invalid_huffman_tree(format!(
                "child offset {offset} exceeds the 6-bit field"
            )));
        }

        let mut descriptor = offset as u8;
        if arena[child0].children.is_none() {
            descriptor |= 0x80;
        }
        if arena[child1].children.is_none() {
            descriptor |= 0x40;
        }
        flat[slot] = descriptor;

        // Bit-1 child at the lower address, bit-0 child right above it.
        let base = 1 + placed * 2;
        for (child, child_slot) in [(child1, base), (child0, base + 1)] {
            if arena[child].children.is_none() {
                flat[child_slot] = arena[child].value;
            } else {
                queue.push_back((child, child_slot, placed + 1));
            }
        }
        placed += 1;
    }

    let mut table = Vec::with_capacity(1 + flat.len());
    table.push((pair_count & 0xFF) as u8);
    table.extend_from_slice(&flat);
    Ok(table)
}

fn assign_codes(arena: &[Node], node: usize, path: &mut Vec<u8>, codes: &mut [Vec<u8>]) {
    match arena[node].children {
        Some((child0, child1)) => {
            path.push(0);
            assign_codes(arena, child0, path, codes);
            path.pop();
            path.push(1);
            assign_codes(arena, child1, path, codes);
            path.pop();
        }
        None => codes[arena[node].value as usize] = path.clone(),
    }
}
