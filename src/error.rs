//! Closed error sets for the dispatch core.
//!
//! None of these are fatal: every variant means "no usable result" and the
//! caller falls back to a smaller search or leaves orders for the next tick.

use thiserror::Error;

/// Reasons a permutation or partition table is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnumerationError {
    #[error("element count {size} is outside 1..={max}")]
    SizeOutOfRange { size: usize, max: usize },
    #[error("bin count {bins} is outside 1..={max}")]
    BinsOutOfRange { bins: usize, max: usize },
    /// The table would hold more rows than the ceiling allows. `rows` is
    /// `None` when the count itself overflows.
    #[error("table with {rows:?} rows exceeds the ceiling of {ceiling}")]
    CapacityExceeded { rows: Option<u64>, ceiling: u64 },
}

/// Reasons the cluster selector declined to pick a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("clustering needs at least 2 orders, got {count}")]
    TooFewOrders { count: usize },
    #[error("cluster limit must be positive")]
    NonPositiveLimit,
    #[error("cluster radius must be positive, got {radius}")]
    NonPositiveRadius { radius: i32 },
    #[error("distance matrix has {rows} rows (or a ragged row) for {orders} orders")]
    MatrixMismatch { orders: usize, rows: usize },
}
