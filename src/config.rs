//! Dispatch configuration and fixed enumeration ceilings.

use serde::{Deserialize, Serialize};

use crate::model::VehicleTypeId;

/// Largest n for which permutation tables are built.
pub const MAX_PERMUTATION_SIZE: usize = 8;

/// Largest element count for partition tables.
pub const MAX_PARTITION_ELEMENTS: usize = 10;

/// Largest bin count for partition tables.
pub const MAX_PARTITION_BINS: usize = 8;

/// Row ceiling for a single partition table (6^8).
pub const PARTITION_ROW_CEILING: u64 = 1_679_616;

/// Largest order set searched exhaustively by permutation.
pub const MAX_PERMUTATION_ORDERS: usize = 15;

/// Largest order set handed to cover / partition search.
pub const MAX_COVER_ORDERS: usize = 10;

/// Capacity, speed and cost profile of one vehicle type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleProfile {
    pub id: VehicleTypeId,
    pub is_taxi: bool,
    /// Maximum load in kilograms.
    pub max_weight: f64,
    /// Maximum route length in meters.
    pub max_distance: i32,
    /// Maximum route duration in seconds.
    pub max_route_secs: i32,
    pub max_orders: usize,
    pub speed_kmh: f64,
    pub fixed_cost: f64,
    pub cost_per_km: f64,
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self {
            id: 0,
            is_taxi: false,
            max_weight: 10.0,
            max_distance: 10_000,
            max_route_secs: 2 * 3600,
            max_orders: 3,
            speed_kmh: 15.0,
            fixed_cost: 0.0,
            cost_per_km: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Radius in meters used by the cluster pre-filter density count.
    pub cluster_radius: i32,
    /// Seconds added to both ends of a delivery window when testing overlap.
    pub window_slack: i32,
    /// Orders above this count are clustered down before route building.
    pub max_cover_orders: usize,
    /// Bin count requested from the partition table when grouping orders.
    pub partition_level: usize,
    pub vehicles: Vec<VehicleProfile>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            cluster_radius: 3_000,
            window_slack: 15 * 60,
            max_cover_orders: MAX_COVER_ORDERS,
            partition_level: 3,
            vehicles: Vec::new(),
        }
    }
}

impl DispatchOptions {
    pub fn vehicle(&self, id: VehicleTypeId) -> Option<&VehicleProfile> {
        self.vehicles.iter().find(|profile| profile.id == id)
    }
}
