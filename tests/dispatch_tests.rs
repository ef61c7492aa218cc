//! End-to-end dispatch tests using real Las Vegas Strip locations.
//!
//! Runs the full tick: pre-filter, enumerating route builder over haversine
//! distances, delivery cover and rejection classification.

mod fixtures;

use courier_dispatch::config::DispatchOptions;
use courier_dispatch::dispatch::{
    RejectionReason, ShopDispatch, ShopSnapshot, dispatch_shop, dispatch_shops,
};
use courier_dispatch::haversine::HaversineMatrix;
use courier_dispatch::model::{Courier, Order, OrderId, OrderStatus};
use courier_dispatch::route_builder::EnumeratingRouteBuilder;
use courier_dispatch::traits::DistanceMatrixProvider;

use fixtures::*;

// ============================================================================
// Test Infrastructure
// ============================================================================

fn shop(shop_id: i64, orders: Vec<Order>, couriers: Vec<Courier>) -> ShopSnapshot {
    ShopSnapshot {
        shop_id,
        location: SHOP.coords(),
        departure: hours(10),
        orders,
        couriers,
    }
}

fn options_with(vehicles: Vec<courier_dispatch::config::VehicleProfile>) -> DispatchOptions {
    DispatchOptions {
        vehicles,
        ..DispatchOptions::default()
    }
}

fn run(snapshot: &ShopSnapshot, options: &DispatchOptions) -> ShopDispatch {
    let builder = EnumeratingRouteBuilder::new(HaversineMatrix::default(), options.partition_level);
    dispatch_shop(snapshot, &builder, &HaversineMatrix::default(), options)
}

fn near_orders(count: usize) -> Vec<Order> {
    (0..count)
        .map(|i| {
            TestOrder::new(i as OrderId + 1)
                .at(&NEAR_STRIP[i % NEAR_STRIP.len()])
                .build()
        })
        .collect()
}

fn rejected_with(result: &ShopDispatch, reason: RejectionReason) -> Vec<OrderId> {
    result
        .rejections
        .iter()
        .filter(|rejection| rejection.reason == reason)
        .map(|rejection| rejection.order_id)
        .collect()
}

fn shipped(result: &ShopDispatch) -> Vec<OrderId> {
    let mut ids: Vec<OrderId> = result
        .shipments
        .iter()
        .flat_map(|shipment| shipment.order_ids.iter().copied())
        .collect();
    ids.sort_unstable();
    ids
}

// ============================================================================
// Single Shop
// ============================================================================

#[test]
fn test_every_ready_order_shipped_with_enough_couriers() {
    let snapshot = shop(
        1,
        near_orders(3),
        vec![courier(1, BIKE), courier(2, BIKE), courier(3, BIKE)],
    );

    let result = run(&snapshot, &options_with(vec![bike_profile()]));

    assert_eq!(shipped(&result), vec![1, 2, 3]);
    assert!(result.rejections.is_empty());
    assert!(result.deferred.is_empty());
    for shipment in &result.shipments {
        assert_eq!(shipment.vehicle_type, BIKE);
        assert!(shipment.distance > 0 && shipment.distance <= bike_profile().max_distance);
        assert!(shipment.cost >= bike_profile().fixed_cost);
    }
}

#[test]
fn test_courier_shortage_is_reported() {
    let snapshot = shop(1, near_orders(3), vec![courier(1, BIKE)]);

    let result = run(&snapshot, &options_with(vec![bike_profile()]));

    assert_eq!(result.shipments.len(), 1);
    assert_eq!(result.shipments[0].courier_id, 1);
    assert_eq!(rejected_with(&result, RejectionReason::NoCourier).len(), 2);
}

#[test]
fn test_far_order_has_no_feasible_bike_route() {
    let orders = vec![
        TestOrder::new(1).at(&NEAR_STRIP[0]).build(),
        TestOrder::new(2).at(&FAR_AWAY[0]).build(),
    ];
    let snapshot = shop(1, orders, vec![courier(1, BIKE), courier(2, BIKE)]);

    let result = run(&snapshot, &options_with(vec![bike_profile()]));

    assert_eq!(shipped(&result), vec![1]);
    assert_eq!(rejected_with(&result, RejectionReason::NoFeasibleRoute), vec![2]);
}

#[test]
fn test_car_reaches_far_order() {
    let orders = vec![TestOrder::new(1).at(&FAR_AWAY[0]).build()];
    let snapshot = shop(1, orders, vec![courier(1, BIKE), courier(5, CAR)]);

    let result = run(&snapshot, &options_with(vec![bike_profile(), car_profile()]));

    assert_eq!(result.shipments.len(), 1);
    assert_eq!(result.shipments[0].courier_id, 5);
    assert_eq!(result.shipments[0].vehicle_type, CAR);
}

#[test]
fn test_missed_window_is_infeasible() {
    let orders = vec![TestOrder::new(1)
        .at(&NEAR_STRIP[1])
        .window(hours(8), hours(9))
        .build()];
    let snapshot = shop(1, orders, vec![courier(1, BIKE)]);

    let result = run(&snapshot, &options_with(vec![bike_profile()]));

    assert!(result.shipments.is_empty());
    assert_eq!(rejected_with(&result, RejectionReason::NoFeasibleRoute), vec![1]);
}

#[test]
fn test_receipted_orders_are_recommended_or_not_ready() {
    let orders = vec![
        TestOrder::new(1).at(&NEAR_STRIP[0]).receipted().build(),
        TestOrder::new(2).at(&FAR_AWAY[1]).receipted().build(),
    ];
    let snapshot = shop(1, orders, vec![courier(1, BIKE)]);

    let result = run(&snapshot, &options_with(vec![bike_profile()]));

    assert!(result.shipments.is_empty());
    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].orders, vec![1]);
    assert_eq!(rejected_with(&result, RejectionReason::NotReady), vec![2]);
}

#[test]
fn test_inactive_orders_are_ignored() {
    let orders = vec![
        TestOrder::new(1).at(&NEAR_STRIP[0]).build(),
        TestOrder::new(2).at(&NEAR_STRIP[1]).completed().build(),
        TestOrder::new(3).at(&NEAR_STRIP[2]).status(OrderStatus::Cancelled).build(),
    ];
    let snapshot = shop(1, orders, vec![courier(1, BIKE)]);

    let result = run(&snapshot, &options_with(vec![bike_profile()]));

    assert_eq!(shipped(&result), vec![1]);
    assert!(result.rejections.is_empty());
}

/// Haversine distances, except that one location cannot be reached by road.
struct IslandMatrix {
    island: (f64, f64),
}

impl DistanceMatrixProvider for IslandMatrix {
    fn matrix_for(&self, locations: &[(f64, f64)]) -> Vec<Vec<i32>> {
        let mut matrix = HaversineMatrix::default().matrix_for(locations);
        for (i, from) in locations.iter().enumerate() {
            for (j, to) in locations.iter().enumerate() {
                if i != j && (*from == self.island || *to == self.island) {
                    matrix[i][j] = i32::MAX;
                }
            }
        }
        matrix
    }
}

#[test]
fn test_unroutable_order_is_rejected_without_failing_the_shop() {
    let island = FAR_AWAY[2].coords();
    let orders = vec![
        TestOrder::new(1).at(&NEAR_STRIP[0]).build(),
        TestOrder::new(2).at(&FAR_AWAY[2]).build(),
    ];
    let snapshot = shop(1, orders, vec![courier(1, CAR), courier(2, CAR)]);
    let options = options_with(vec![car_profile()]);
    let builder = EnumeratingRouteBuilder::new(IslandMatrix { island }, options.partition_level);

    let result = dispatch_shop(&snapshot, &builder, &IslandMatrix { island }, &options);

    assert_eq!(shipped(&result), vec![1]);
    assert_eq!(
        rejected_with(&result, RejectionReason::NoFeasibleRoute),
        vec![2]
    );
}

#[test]
fn test_shop_without_orders_is_quiet() {
    let snapshot = shop(4, Vec::new(), vec![courier(1, BIKE)]);
    let result = run(&snapshot, &options_with(vec![bike_profile()]));

    assert_eq!(result.shop_id, 4);
    assert!(result.shipments.is_empty());
    assert!(result.rejections.is_empty());
}

// ============================================================================
// Pre-filter
// ============================================================================

#[test]
fn test_oversized_order_set_is_clustered() {
    let snapshot = shop(1, near_orders(12), vec![taxi(90)]);
    let options = DispatchOptions {
        max_cover_orders: 4,
        ..options_with(vec![taxi_profile()])
    };

    let result = run(&snapshot, &options);

    assert_eq!(result.shipments.len(), 4);
    assert!(result.shipments.iter().all(|shipment| shipment.courier_id == 90));
    assert_eq!(result.deferred.len(), 8);
    assert!(result.rejections.is_empty());

    let mut accounted = shipped(&result);
    accounted.extend(&result.deferred);
    accounted.sort_unstable();
    assert_eq!(accounted, (1..=12).collect::<Vec<_>>());
}

// ============================================================================
// Many Shops
// ============================================================================

#[test]
fn test_shops_dispatched_in_parallel_keep_order() {
    let shops: Vec<ShopSnapshot> = (1..=6)
        .map(|shop_id| {
            let couriers = vec![courier(shop_id * 10, BIKE), courier(shop_id * 10 + 1, BIKE)];
            shop(shop_id, near_orders(2), couriers)
        })
        .collect();
    let options = options_with(vec![bike_profile()]);
    let builder = EnumeratingRouteBuilder::new(HaversineMatrix::default(), options.partition_level);

    let results = dispatch_shops(&shops, &builder, &HaversineMatrix::default(), &options);

    assert_eq!(results.len(), 6);
    for (snapshot, result) in shops.iter().zip(&results) {
        assert_eq!(result.shop_id, snapshot.shop_id);
        assert_eq!(shipped(result), vec![1, 2]);
        assert!(result
            .shipments
            .iter()
            .all(|shipment| snapshot.couriers.iter().any(|c| c.id == shipment.courier_id)));
    }
}

#[test]
fn test_loads_applied_after_dispatch() {
    let mut couriers = vec![courier(1, BIKE), loaded_courier(2, BIKE, 5)];
    let snapshot = shop(1, near_orders(2), couriers.clone());

    let result = run(&snapshot, &options_with(vec![bike_profile()]));
    result.apply_loads(&mut couriers);

    let total: u32 = couriers.iter().map(|c| c.order_count).sum();
    assert_eq!(total, 5 + 2);
}
