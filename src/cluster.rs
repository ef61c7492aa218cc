//! Spatial-temporal pre-filter that trims an oversized order set down to its
//! densest neighborhood before exhaustive route search.

use std::borrow::Borrow;

use crate::error::ClusterError;
use crate::model::{Order, TimeWindow};

/// Picks the densest cluster of mutually compatible orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderClusterSelector {
    /// Maximum number of orders returned.
    pub limit: usize,
    /// Distance in meters within which two orders count as neighbors for
    /// the density estimate.
    pub radius: i32,
    /// Seconds added to both ends of the candidate center's window when
    /// testing window overlap.
    pub window_slack: i32,
}

impl OrderClusterSelector {
    pub fn new(limit: usize, radius: i32, window_slack: i32) -> Self {
        Self {
            limit,
            radius,
            window_slack,
        }
    }

    /// Returns indices into `orders` of the selected cluster, closest to the
    /// cluster center first. The center itself is always first.
    ///
    /// `distances` must be a square matrix over `orders` in meters.
    ///
    /// The center is the order with the most neighbors (within `radius` and
    /// window-compatible), ties going to the smaller summed neighbor
    /// distance and then to the earlier order. Its cluster is every order
    /// whose window is compatible with the center's, regardless of radius,
    /// cut down to the `limit` closest.
    pub fn select<O: Borrow<Order>>(
        &self,
        orders: &[O],
        distances: &[Vec<i32>],
    ) -> Result<Vec<usize>, ClusterError> {
        let count = orders.len();
        if count < 2 {
            return Err(ClusterError::TooFewOrders { count });
        }
        if self.limit == 0 {
            return Err(ClusterError::NonPositiveLimit);
        }
        if self.radius <= 0 {
            return Err(ClusterError::NonPositiveRadius {
                radius: self.radius,
            });
        }
        if distances.len() != count || distances.iter().any(|row| row.len() != count) {
            return Err(ClusterError::MatrixMismatch {
                orders: count,
                rows: distances.len(),
            });
        }

        let windows: Vec<TimeWindow> = orders.iter().map(|order| order.borrow().window).collect();

        let mut center = 0;
        let mut best_count = 0;
        let mut best_sum = i64::MAX;
        for (index, (row, window)) in distances.iter().zip(&windows).enumerate() {
            let (neighbors, sum) = row
                .iter()
                .zip(&windows)
                .filter(|(distance, other)| {
                    **distance <= self.radius
                        && window.overlaps_with_slack(other, self.window_slack)
                })
                .fold((0usize, 0i64), |(neighbors, sum), (distance, _)| {
                    (neighbors + 1, sum + i64::from(*distance))
                });

            if neighbors > best_count || (neighbors == best_count && sum < best_sum) {
                center = index;
                best_count = neighbors;
                best_sum = sum;
            }
        }

        let center_window = windows[center];
        let center_row = &distances[center];

        let mut cluster: Vec<usize> = (0..count)
            .filter(|&index| center_window.overlaps_with_slack(&windows[index], self.window_slack))
            .collect();
        // Center first even when another order shares its location; the
        // sort is stable so equal distances keep input order.
        cluster.sort_by_key(|&index| (index != center, center_row[index]));
        cluster.truncate(self.limit);

        Ok(cluster)
    }
}
