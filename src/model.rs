//! Dispatch domain data: orders, couriers and candidate routes.
//!
//! All values here are snapshots handed in by the dispatch service. The
//! core reads them and never changes order status.

use serde::{Deserialize, Serialize};

pub type OrderId = i64;
pub type ShopId = i64;
pub type CourierId = i64;
pub type VehicleTypeId = i32;

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Received at the shop, not yet packed.
    Receipted,
    /// Packed and ready to ship.
    Assembled,
    Cancelled,
    Completed,
}

/// Delivery window in seconds from midnight, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: i32,
    pub to: i32,
}

impl TimeWindow {
    pub fn new(from: i32, to: i32) -> Self {
        Self { from, to }
    }

    /// Whether `other` overlaps this window once this window is widened by
    /// `slack` seconds on both ends.
    pub fn overlaps_with_slack(&self, other: &TimeWindow, slack: i32) -> bool {
        other.from <= self.to.saturating_add(slack) && other.to >= self.from.saturating_sub(slack)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub shop_id: ShopId,
    pub status: OrderStatus,
    /// Weight in kilograms.
    pub weight: f64,
    /// Delivery point (lat, lng).
    pub location: (f64, f64),
    pub window: TimeWindow,
    /// Higher priority wins ties.
    pub priority: i32,
    /// Vehicle types allowed to carry this order.
    pub vehicle_types: Vec<VehicleTypeId>,
    pub completed: bool,
}

impl Order {
    /// Orders still waiting for dispatch: not completed and either
    /// receipted or assembled.
    pub fn is_active(&self) -> bool {
        !self.completed && matches!(self.status, OrderStatus::Receipted | OrderStatus::Assembled)
    }

    pub fn accepts_vehicle(&self, vehicle_type: VehicleTypeId) -> bool {
        self.vehicle_types.contains(&vehicle_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Courier {
    pub id: CourierId,
    pub vehicle_type: VehicleTypeId,
    pub is_taxi: bool,
    /// Orders already delivered this shift; the least loaded courier is
    /// issued first.
    pub order_count: u32,
    /// Owning shop, `0` for taxis.
    pub shop_id: ShopId,
}

/// A feasible, costed delivery route produced by a route builder.
///
/// DeliveryCover only writes `receipted` and `courier`; everything else is
/// owned by the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoute {
    /// Orders in delivery sequence.
    pub orders: Vec<OrderId>,
    pub vehicle_type: VehicleTypeId,
    pub weight: f64,
    pub cost: f64,
    /// Route length in meters.
    pub distance: i32,
    /// Route duration in seconds, from departure to the last drop-off.
    pub duration: i32,
    /// Highest priority among the route's orders.
    pub priority: i32,
    /// At least one order is still receipted; the route is advisory only.
    pub receipted: bool,
    pub courier: Option<CourierId>,
}

impl CandidateRoute {
    pub fn new(orders: Vec<OrderId>, vehicle_type: VehicleTypeId) -> Self {
        Self {
            orders,
            vehicle_type,
            weight: 0.0,
            cost: 0.0,
            distance: 0,
            duration: 0,
            priority: 0,
            receipted: false,
            courier: None,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
