//! Lazily built permutation tables for up to eight items.
//!
//! Tables live in a process-wide cache, one slot per size. A slot is
//! generated by the first caller that asks for it; concurrent callers for the
//! same size block until that generation finishes and then share the result.

use std::slice::ChunksExact;
use std::sync::OnceLock;

use tracing::debug;

use crate::config::MAX_PERMUTATION_SIZE;
use crate::error::EnumerationError;

// Small cases are hand-enumerated in lexicographic order.
const SMALL_1: &[u8] = &[0];
const SMALL_2: &[u8] = &[0, 1, 1, 0];
const SMALL_3: &[u8] = &[
    0, 1, 2, //
    0, 2, 1, //
    1, 0, 2, //
    1, 2, 0, //
    2, 0, 1, //
    2, 1, 0,
];
const SMALL_4: &[u8] = &[
    0, 1, 2, 3, 0, 1, 3, 2, 0, 2, 1, 3, 0, 2, 3, 1, 0, 3, 1, 2, 0, 3, 2, 1, //
    1, 0, 2, 3, 1, 0, 3, 2, 1, 2, 0, 3, 1, 2, 3, 0, 1, 3, 0, 2, 1, 3, 2, 0, //
    2, 0, 1, 3, 2, 0, 3, 1, 2, 1, 0, 3, 2, 1, 3, 0, 2, 3, 0, 1, 2, 3, 1, 0, //
    3, 0, 1, 2, 3, 0, 2, 1, 3, 1, 0, 2, 3, 1, 2, 0, 3, 2, 0, 1, 3, 2, 1, 0,
];

static TABLES: [OnceLock<PermutationTable>; MAX_PERMUTATION_SIZE] =
    [const { OnceLock::new() }; MAX_PERMUTATION_SIZE];

/// All orderings of `0..size`, stored row-major: row `i`, column `j` is the
/// index placed at position `j` of permutation `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    size: usize,
    cells: Vec<u8>,
}

impl PermutationTable {
    /// Returns the cached table for `size` items, generating it on first use.
    pub fn get(size: usize) -> Result<&'static PermutationTable, EnumerationError> {
        let slot = size
            .checked_sub(1)
            .and_then(|index| TABLES.get(index))
            .ok_or(EnumerationError::SizeOutOfRange {
                size,
                max: MAX_PERMUTATION_SIZE,
            })?;

        Ok(slot.get_or_init(|| Self::generate(size)))
    }

    /// Number of items being permuted (row width).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of permutations.
    pub fn len(&self) -> usize {
        self.cells.len() / self.size
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(self.size)?;
        self.cells.get(start..start + self.size)
    }

    pub fn rows(&self) -> ChunksExact<'_, u8> {
        self.cells.chunks_exact(self.size)
    }

    fn generate(size: usize) -> Self {
        let cells = match size {
            1 => SMALL_1.to_vec(),
            2 => SMALL_2.to_vec(),
            3 => SMALL_3.to_vec(),
            4 => SMALL_4.to_vec(),
            _ => generate_packed(size),
        };
        let table = Self { size, cells };
        debug!(size, rows = table.len(), "generated permutation table");
        table
    }
}

/// Walks a packed counter where each `ceil(log2 size)`-bit group holds the
/// index at one position, position 0 in the most significant group. The walk
/// is bounded by the identity (smallest valid encoding) and its reverse
/// (largest); values with an out-of-range or repeated digit are skipped.
fn generate_packed(size: usize) -> Vec<u8> {
    let bits = bits_for(size);
    let mask = (1u32 << bits) - 1;
    let min = encode(0..size, bits);
    let max = encode((0..size).rev(), bits);

    let mut cells = Vec::with_capacity(factorial(size) * size);
    let mut row = [0u8; MAX_PERMUTATION_SIZE];

    'counter: for value in min..=max {
        let mut seen = 0u32;
        for (position, slot) in row.iter_mut().take(size).enumerate() {
            let shift = bits * (size - 1 - position) as u32;
            let digit = (value >> shift) & mask;
            if digit as usize >= size || seen & (1 << digit) != 0 {
                continue 'counter;
            }
            seen |= 1 << digit;
            *slot = digit as u8;
        }
        cells.extend_from_slice(&row[..size]);
    }

    cells
}

fn encode(digits: impl Iterator<Item = usize>, bits: u32) -> u32 {
    digits.fold(0u32, |acc, digit| (acc << bits) | digit as u32)
}

/// Smallest bit width able to hold `0..count`.
pub(crate) fn bits_for(count: usize) -> u32 {
    match count {
        0 | 1 => 1,
        _ => usize::BITS - (count - 1).leading_zeros(),
    }
}

fn factorial(n: usize) -> usize {
    (1..=n).product()
}
