//! Lazily built partition tables: every way to drop `n` elements into `m`
//! bins.
//!
//! Like permutation tables, each `(n, m)` slot is generated once per process
//! and shared read-only afterwards.

use std::slice::ChunksExact;
use std::sync::OnceLock;

use tracing::debug;

use crate::config::{MAX_PARTITION_BINS, MAX_PARTITION_ELEMENTS, PARTITION_ROW_CEILING};
use crate::error::EnumerationError;
use crate::permutations::bits_for;

static TABLES: [[OnceLock<PartitionTable>; MAX_PARTITION_BINS]; MAX_PARTITION_ELEMENTS] =
    [const { [const { OnceLock::new() }; MAX_PARTITION_BINS] }; MAX_PARTITION_ELEMENTS];

/// Row-major table: row `i`, column `j` is the bin of element `j` under
/// partition `i`. Rows are in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    elements: usize,
    bins: usize,
    cells: Vec<u8>,
}

impl PartitionTable {
    /// Returns the cached table for `elements` elements over `bins` bins,
    /// generating it on first use.
    pub fn get(elements: usize, bins: usize) -> Result<&'static PartitionTable, EnumerationError> {
        if elements == 0 || elements > MAX_PARTITION_ELEMENTS {
            return Err(EnumerationError::SizeOutOfRange {
                size: elements,
                max: MAX_PARTITION_ELEMENTS,
            });
        }
        if bins == 0 || bins > MAX_PARTITION_BINS {
            return Err(EnumerationError::BinsOutOfRange {
                bins,
                max: MAX_PARTITION_BINS,
            });
        }
        let rows = Self::expected_rows(elements, bins)?;

        let slot = TABLES
            .get(elements - 1)
            .and_then(|by_bins| by_bins.get(bins - 1))
            .ok_or(EnumerationError::SizeOutOfRange {
                size: elements,
                max: MAX_PARTITION_ELEMENTS,
            })?;

        Ok(slot.get_or_init(|| Self::generate(elements, bins, rows)))
    }

    /// `bins ^ elements`, provided it stays within the row ceiling.
    ///
    /// Works for any element count so callers can size a search before
    /// asking for a table.
    pub fn expected_rows(elements: usize, bins: usize) -> Result<usize, EnumerationError> {
        let rows = u32::try_from(elements)
            .ok()
            .and_then(|exponent| (bins as u64).checked_pow(exponent));

        match rows {
            Some(rows) if rows <= PARTITION_ROW_CEILING => Ok(rows as usize),
            rows => Err(EnumerationError::CapacityExceeded {
                rows,
                ceiling: PARTITION_ROW_CEILING,
            }),
        }
    }

    pub fn elements(&self) -> usize {
        self.elements
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn len(&self) -> usize {
        self.cells.len() / self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(self.elements)?;
        self.cells.get(start..start + self.elements)
    }

    pub fn rows(&self) -> ChunksExact<'_, u8> {
        self.cells.chunks_exact(self.elements)
    }

    /// Counts `0 .. 2^(elements * bits)` where each `bits`-wide group is one
    /// element's bin, element 0 in the most significant group. Values with a
    /// group above `bins - 1` are not base-`bins` strings and are skipped.
    fn generate(elements: usize, bins: usize, rows: usize) -> Self {
        let bits = bits_for(bins);
        let mask = (1u64 << bits) - 1;
        let end = 1u64 << (bits as usize * elements);

        let mut cells = Vec::with_capacity(rows * elements);
        let mut row = [0u8; MAX_PARTITION_ELEMENTS];

        'counter: for value in 0..end {
            for (element, slot) in row.iter_mut().take(elements).enumerate() {
                let shift = bits as usize * (elements - 1 - element);
                let bin = (value >> shift) & mask;
                if bin as usize >= bins {
                    continue 'counter;
                }
                *slot = bin as u8;
            }
            cells.extend_from_slice(&row[..elements]);
        }

        let table = Self {
            elements,
            bins,
            cells,
        };
        debug!(elements, bins, rows = table.len(), "generated partition table");
        table
    }
}
