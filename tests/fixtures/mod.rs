//! Test fixtures for courier-dispatch.
//!
//! Provides:
//! - Real Las Vegas Strip delivery points (from OpenStreetMap)
//! - Builders for orders, couriers and vehicle profiles

#![allow(dead_code)]

pub mod strip_locations;

pub use strip_locations::*;

use courier_dispatch::config::VehicleProfile;
use courier_dispatch::model::{Courier, Order, OrderId, OrderStatus, TimeWindow, VehicleTypeId};

pub const BIKE: VehicleTypeId = 1;
pub const CAR: VehicleTypeId = 2;
pub const TAXI: VehicleTypeId = 9;

pub fn hours(h: i32) -> i32 {
    h * 3600
}

pub fn minutes(m: i32) -> i32 {
    m * 60
}

/// Builder for test orders with sensible defaults: assembled, 1 kg, at the
/// shop, deliverable all day by bike or car.
#[derive(Clone, Debug)]
pub struct TestOrder {
    order: Order,
}

impl TestOrder {
    pub fn new(id: OrderId) -> Self {
        Self {
            order: Order {
                id,
                shop_id: 1,
                status: OrderStatus::Assembled,
                weight: 1.0,
                location: SHOP.coords(),
                window: TimeWindow::new(0, hours(24)),
                priority: 0,
                vehicle_types: vec![BIKE, CAR, TAXI],
                completed: false,
            },
        }
    }

    pub fn receipted(mut self) -> Self {
        self.order.status = OrderStatus::Receipted;
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.order.status = status;
        self
    }

    pub fn completed(mut self) -> Self {
        self.order.completed = true;
        self
    }

    pub fn weight(mut self, kg: f64) -> Self {
        self.order.weight = kg;
        self
    }

    pub fn at(mut self, location: &Location) -> Self {
        self.order.location = location.coords();
        self
    }

    pub fn window(mut self, from: i32, to: i32) -> Self {
        self.order.window = TimeWindow::new(from, to);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.order.priority = priority;
        self
    }

    pub fn vehicles(mut self, vehicle_types: &[VehicleTypeId]) -> Self {
        self.order.vehicle_types = vehicle_types.to_vec();
        self
    }

    pub fn build(self) -> Order {
        self.order
    }
}

pub fn courier(id: i64, vehicle_type: VehicleTypeId) -> Courier {
    Courier {
        id,
        vehicle_type,
        is_taxi: false,
        order_count: 0,
        shop_id: 1,
    }
}

pub fn loaded_courier(id: i64, vehicle_type: VehicleTypeId, order_count: u32) -> Courier {
    Courier {
        order_count,
        ..courier(id, vehicle_type)
    }
}

pub fn taxi(id: i64) -> Courier {
    Courier {
        id,
        vehicle_type: TAXI,
        is_taxi: true,
        order_count: 0,
        shop_id: 0,
    }
}

pub fn bike_profile() -> VehicleProfile {
    VehicleProfile {
        id: BIKE,
        is_taxi: false,
        max_weight: 8.0,
        max_distance: 6_000,
        max_route_secs: hours(1),
        max_orders: 3,
        speed_kmh: 15.0,
        fixed_cost: 50.0,
        cost_per_km: 10.0,
    }
}

pub fn car_profile() -> VehicleProfile {
    VehicleProfile {
        id: CAR,
        is_taxi: false,
        max_weight: 40.0,
        max_distance: 30_000,
        max_route_secs: hours(2),
        max_orders: 4,
        speed_kmh: 30.0,
        fixed_cost: 120.0,
        cost_per_km: 15.0,
    }
}

pub fn taxi_profile() -> VehicleProfile {
    VehicleProfile {
        id: TAXI,
        is_taxi: true,
        max_weight: 20.0,
        max_distance: 30_000,
        max_route_secs: hours(2),
        max_orders: 1,
        speed_kmh: 30.0,
        fixed_cost: 300.0,
        cost_per_km: 30.0,
    }
}
