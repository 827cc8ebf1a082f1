//! ARCH byte-pair decompressor.
//!
//! Blocks are consumed back to back until the input runs out. Each
//! block carries a substitution table for all 256 byte values followed
//! by a big-endian content length and the rewritten content. Content
//! bytes expand through the table with an explicit stack: a slot that
//! maps to itself emits one output byte, any other slot pushes its two
//! replacement bytes for further expansion.

use oxirom_core::error::{OxiRomError, Result};

use crate::{EXPANSION_STACK_LIMIT, SKIP_BASE};

/// Decompresses ARCH `data` into exactly `expected_size` bytes.
///
/// The size comes from the caller's directory metadata and drives
/// decoding: blocks are consumed until the output is full, a final
/// block expanding past the size is cut off there, and input left over
/// afterwards is padding and stays untouched.
///
/// # Errors
///
/// Returns an error when the input ends before `expected_size` bytes
/// are produced, when a table control byte walks past the last slot,
/// or when a substitution cycle would expand forever.
pub fn decompress_arch(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_size);
    let mut pos = 0usize;
    // First expansion byte per slot; a slot mapping to itself is a
    // literal. Rebuilt for every block.
    let mut heads = [0u8; 0x100];
    // Second expansion byte per slot, only meaningful for non-literal
    // slots.
    let mut tails = [0u8; 0x100];

    while pos < data.len() && out.len() < expected_size {
        for (slot, head) in heads.iter_mut().enumerate() {
            *head = slot as u8;
        }
        read_table(data, &mut pos, &mut heads, &mut tails)?;

        if pos + 2 > data.len() {
            return Err(OxiRomError::unexpected_eof(2, data.len() - pos));
        }
        let count = usize::from(data[pos]) << 8 | usize::from(data[pos + 1]);
        pos += 2;
        if pos + count > data.len() {
            return Err(OxiRomError::unexpected_eof(count, data.len() - pos));
        }

        expand_block(&data[pos..pos + count], pos, &heads, &tails, expected_size, &mut out)?;
        pos += count;
    }

    if out.len() < expected_size {
        return Err(OxiRomError::unexpected_eof(expected_size, out.len()));
    }
    Ok(out)
}

/// Reads one substitution table, filling `heads` and `tails` for every
/// slot the stream describes.
fn read_table(
    data: &[u8],
    pos: &mut usize,
    heads: &mut [u8; 0x100],
    tails: &mut [u8; 0x100],
) -> Result<()> {
    let mut slot = 0usize;
    while slot != 0x100 {
        let control = read_byte(data, pos)?;
        let mut entries = usize::from(control) + 1;
        if usize::from(control) > SKIP_BASE {
            slot += usize::from(control) - SKIP_BASE;
            if slot > 0x100 {
                return Err(OxiRomError::corrupted(
                    *pos as u64,
                    "substitution table skip walks past the last slot",
                ));
            }
            if slot == 0x100 {
                break;
            }
            entries = 1;
        }
        for _ in 0..entries {
            if slot >= 0x100 {
                return Err(OxiRomError::corrupted(
                    *pos as u64,
                    "substitution table run walks past the last slot",
                ));
            }
            let first = read_byte(data, pos)?;
            heads[slot] = first;
            if usize::from(first) != slot {
                tails[slot] = read_byte(data, pos)?;
            }
            slot += 1;
        }
    }
    Ok(())
}

/// Expands one block's content bytes through the substitution table,
/// stopping as soon as the output is full. `base` is the content's
/// offset in the whole input, used for error reporting.
fn expand_block(
    content: &[u8],
    base: usize,
    heads: &[u8; 0x100],
    tails: &[u8; 0x100],
    expected_size: usize,
    out: &mut Vec<u8>,
) -> Result<()> {
    let mut stack: Vec<u8> = Vec::new();
    for (i, &token) in content.iter().enumerate() {
        if out.len() >= expected_size {
            return Ok(());
        }
        stack.push(token);
        while let Some(byte) = stack.pop() {
            let slot = usize::from(byte);
            if heads[slot] == byte {
                out.push(byte);
                if out.len() >= expected_size {
                    return Ok(());
                }
            } else {
                stack.push(tails[slot]);
                stack.push(heads[slot]);
                // Legitimate tables expand as a DAG no deeper than the
                // key count, so a stack this tall means a cycle.
                if stack.len() > EXPANSION_STACK_LIMIT {
                    return Err(OxiRomError::corrupted(
                        (base + i) as u64,
                        "substitution table contains a cycle",
                    ));
                }
            }
        }
    }
    Ok(())
}

fn read_byte(data: &[u8], pos: &mut usize) -> Result<u8> {
    let byte = *data
        .get(*pos)
        .ok_or_else(|| OxiRomError::unexpected_eof(1, 0))?;
    *pos += 1;
    Ok(byte)
}
