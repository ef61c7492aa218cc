//! Reference route builder backed by the enumeration tables.
//!
//! Candidate order groups come from the partition table (every bin of every
//! row is a group), and each group is sequenced by trying every ordering
//! from the permutation table and keeping the shortest feasible one.

use std::collections::BTreeSet;

use tracing::warn;

use crate::config::{
    MAX_PARTITION_BINS, MAX_PARTITION_ELEMENTS, MAX_PERMUTATION_ORDERS, MAX_PERMUTATION_SIZE,
    VehicleProfile,
};
use crate::error::EnumerationError;
use crate::model::{CandidateRoute, Order, OrderStatus};
use crate::partitions::PartitionTable;
use crate::permutations::PermutationTable;
use crate::traits::{DistanceMatrixProvider, RouteBuilder, ShopSite};

#[derive(Debug, Clone)]
pub struct EnumeratingRouteBuilder<M> {
    distances: M,
    /// Bin count requested from the partition table. Lowered automatically
    /// when the table would exceed the row ceiling.
    partition_level: usize,
}

/// Best feasible ordering found for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schedule {
    /// Indices into the eligible order list, in delivery sequence.
    sequence: Vec<usize>,
    distance: i32,
    duration: i32,
}

impl<M: DistanceMatrixProvider> EnumeratingRouteBuilder<M> {
    pub fn new(distances: M, partition_level: usize) -> Self {
        Self {
            distances,
            partition_level,
        }
    }
}

impl<M: DistanceMatrixProvider> RouteBuilder for EnumeratingRouteBuilder<M> {
    fn build_routes(
        &self,
        shop: &ShopSite,
        orders: &[&Order],
        vehicle: &VehicleProfile,
    ) -> Vec<CandidateRoute> {
        if orders.len() > MAX_PERMUTATION_ORDERS {
            warn!(
                orders = orders.len(),
                max = MAX_PERMUTATION_ORDERS,
                "order set too large for exhaustive search"
            );
            return Vec::new();
        }

        let eligible: Vec<&Order> = orders
            .iter()
            .copied()
            .filter(|order| order.accepts_vehicle(vehicle.id))
            .collect();
        if eligible.is_empty() {
            return Vec::new();
        }
        if eligible.len() > MAX_PARTITION_ELEMENTS {
            warn!(
                orders = eligible.len(),
                max = MAX_PARTITION_ELEMENTS,
                "too many orders to enumerate routes"
            );
            return Vec::new();
        }
        if vehicle.speed_kmh <= 0.0 {
            warn!(vehicle_type = vehicle.id, "vehicle profile has no speed");
            return Vec::new();
        }

        // Node 0 is the shop, node i + 1 is eligible order i.
        let mut locations = Vec::with_capacity(eligible.len() + 1);
        locations.push(shop.location);
        locations.extend(eligible.iter().map(|order| order.location));
        let matrix = self.distances.matrix_for(&locations);
        if matrix.len() != locations.len()
            || matrix.iter().any(|row| row.len() != locations.len())
        {
            warn!(
                locations = locations.len(),
                rows = matrix.len(),
                "distance matrix has the wrong shape"
            );
            return Vec::new();
        }

        let max_group = vehicle.max_orders.min(MAX_PERMUTATION_SIZE);
        candidate_groups(eligible.len(), self.partition_level, max_group)
            .into_iter()
            .filter_map(|group| {
                let members: Vec<usize> = (0..eligible.len())
                    .filter(|i| group & (1 << i) != 0)
                    .collect();
                let weight: f64 = members.iter().map(|&i| eligible[i].weight).sum();
                if weight > vehicle.max_weight {
                    return None;
                }
                let schedule = best_schedule(&members, &eligible, &matrix, shop, vehicle)?;
                Some(to_route(&schedule, &eligible, weight, vehicle))
            })
            .collect()
    }
}

/// Distinct non-empty order groups (bitmasks over `elements`) of at most
/// `max_size` members, ascending.
fn candidate_groups(elements: usize, level: usize, max_size: usize) -> Vec<u16> {
    let mut bins = level.clamp(1, MAX_PARTITION_BINS).min(elements);
    let table = loop {
        match PartitionTable::get(elements, bins) {
            Ok(table) => break table,
            Err(EnumerationError::CapacityExceeded { .. }) if bins > 1 => bins -= 1,
            Err(err) => {
                warn!(elements, bins, error = %err, "no partition table for route groups");
                return Vec::new();
            }
        }
    };

    let mut groups = BTreeSet::new();
    let mut masks = [0u16; MAX_PARTITION_BINS];
    for row in table.rows() {
        masks.fill(0);
        for (element, &bin) in row.iter().enumerate() {
            masks[bin as usize] |= 1 << element;
        }
        for &mask in &masks[..bins] {
            if mask != 0 && mask.count_ones() as usize <= max_size {
                groups.insert(mask);
            }
        }
    }
    groups.into_iter().collect()
}

/// Shortest feasible ordering of `members`; ties go to the shorter duration
/// and then to the earlier permutation.
fn best_schedule(
    members: &[usize],
    orders: &[&Order],
    matrix: &[Vec<i32>],
    shop: &ShopSite,
    vehicle: &VehicleProfile,
) -> Option<Schedule> {
    let table = PermutationTable::get(members.len()).ok()?;
    let mut best: Option<Schedule> = None;

    for permutation in table.rows() {
        let Some((distance, duration)) =
            simulate(permutation, members, orders, matrix, shop, vehicle)
        else {
            continue;
        };
        let improves = best
            .as_ref()
            .is_none_or(|current| (distance, duration) < (current.distance, current.duration));
        if improves {
            best = Some(Schedule {
                sequence: permutation.iter().map(|&slot| members[slot as usize]).collect(),
                distance,
                duration,
            });
        }
    }

    best
}

/// Drives the route from the shop: waits for early windows, fails on late
/// arrival or when a distance or duration limit is broken. Returns total
/// distance and duration.
fn simulate(
    permutation: &[u8],
    members: &[usize],
    orders: &[&Order],
    matrix: &[Vec<i32>],
    shop: &ShopSite,
    vehicle: &VehicleProfile,
) -> Option<(i32, i32)> {
    let mut time = shop.departure;
    let mut distance: i32 = 0;
    let mut previous = 0;

    for &slot in permutation {
        let element = members[slot as usize];
        let node = element + 1;
        let leg = matrix[previous][node];

        // Unroutable legs carry i32::MAX and must fail here, not overflow.
        distance = distance
            .checked_add(leg)
            .filter(|total| *total <= vehicle.max_distance)?;
        time = time.checked_add(travel_seconds(leg, vehicle.speed_kmh))?;

        let window = orders[element].window;
        if time < window.from {
            time = window.from;
        }
        if time > window.to {
            return None;
        }
        previous = node;
    }

    let duration = time
        .checked_sub(shop.departure)
        .filter(|secs| *secs <= vehicle.max_route_secs)?;
    Some((distance, duration))
}

fn travel_seconds(meters: i32, speed_kmh: f64) -> i32 {
    (f64::from(meters) / 1000.0 / speed_kmh * 3600.0).round() as i32
}

fn to_route(
    schedule: &Schedule,
    orders: &[&Order],
    weight: f64,
    vehicle: &VehicleProfile,
) -> CandidateRoute {
    let sequence: Vec<&Order> = schedule.sequence.iter().map(|&i| orders[i]).collect();

    CandidateRoute {
        orders: sequence.iter().map(|order| order.id).collect(),
        vehicle_type: vehicle.id,
        weight,
        cost: vehicle.fixed_cost + vehicle.cost_per_km * f64::from(schedule.distance) / 1000.0,
        distance: schedule.distance,
        duration: schedule.duration,
        priority: sequence.iter().map(|order| order.priority).max().unwrap_or_default(),
        receipted: sequence.iter().any(|order| order.status == OrderStatus::Receipted),
        courier: None,
    }
}
