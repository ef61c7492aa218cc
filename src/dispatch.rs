//! Per-shop dispatch tick: pre-filter, route building, cover, and the
//! shipments and rejections handed back to the dispatch service.

use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cluster::OrderClusterSelector;
use crate::config::{DispatchOptions, MAX_COVER_ORDERS};
use crate::cover::DeliveryCover;
use crate::model::{
    CandidateRoute, Courier, CourierId, Order, OrderId, OrderStatus, ShopId, VehicleTypeId,
};
use crate::traits::{DistanceMatrixProvider, RouteBuilder, ShopSite};

/// Everything known about one shop at the start of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopSnapshot {
    pub shop_id: ShopId,
    pub location: (f64, f64),
    /// Seconds from midnight at which dispatched couriers leave.
    pub departure: i32,
    pub orders: Vec<Order>,
    pub couriers: Vec<Courier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// Still receipted and not covered by any recommendation.
    NotReady,
    /// No candidate route contained the order.
    NoFeasibleRoute,
    /// Routes existed but none could be given a courier.
    NoCourier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub order_id: OrderId,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub courier_id: CourierId,
    pub vehicle_type: VehicleTypeId,
    pub order_ids: Vec<OrderId>,
    pub cost: f64,
    pub distance: i32,
    pub duration: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopDispatch {
    pub shop_id: ShopId,
    pub shipments: Vec<Shipment>,
    pub recommendations: Vec<CandidateRoute>,
    pub rejections: Vec<Rejection>,
    /// Active orders left out by the cluster pre-filter; they wait for the
    /// next tick.
    pub deferred: Vec<OrderId>,
}

impl ShopDispatch {
    /// Adds each shipment's order count to its courier's load.
    pub fn apply_loads(&self, couriers: &mut [Courier]) {
        let mut loads: HashMap<CourierId, u32> = HashMap::new();
        for shipment in &self.shipments {
            *loads.entry(shipment.courier_id).or_default() += shipment.order_ids.len() as u32;
        }
        for courier in couriers.iter_mut() {
            if let Some(load) = loads.get(&courier.id) {
                courier.order_count += load;
            }
        }
    }
}

/// Runs one dispatch tick for a single shop.
pub fn dispatch_shop<B, M>(
    shop: &ShopSnapshot,
    builder: &B,
    distances: &M,
    options: &DispatchOptions,
) -> ShopDispatch
where
    B: RouteBuilder,
    M: DistanceMatrixProvider,
{
    let active: Vec<&Order> = shop.orders.iter().filter(|order| order.is_active()).collect();
    if active.is_empty() {
        return ShopDispatch {
            shop_id: shop.shop_id,
            ..ShopDispatch::default()
        };
    }

    let (selected, deferred) = preselect(shop.shop_id, active, distances, options);

    let site = ShopSite {
        location: shop.location,
        departure: shop.departure,
    };
    let routes: Vec<CandidateRoute> = options
        .vehicles
        .iter()
        .flat_map(|vehicle| builder.build_routes(&site, &selected, vehicle))
        .collect();
    let routed: BTreeSet<OrderId> = routes
        .iter()
        .flat_map(|route| route.orders.iter().copied())
        .collect();

    let outcome = DeliveryCover::build(routes, &selected, &shop.couriers);

    let status: HashMap<OrderId, OrderStatus> = selected
        .iter()
        .map(|order| (order.id, order.status))
        .collect();
    let rejections: Vec<Rejection> = outcome
        .rejected
        .iter()
        .map(|&order_id| {
            let reason = if status.get(&order_id) == Some(&OrderStatus::Receipted) {
                RejectionReason::NotReady
            } else if !routed.contains(&order_id) {
                RejectionReason::NoFeasibleRoute
            } else {
                RejectionReason::NoCourier
            };
            Rejection { order_id, reason }
        })
        .collect();

    let shipments: Vec<Shipment> = outcome
        .cover
        .into_iter()
        .filter_map(|route| {
            Some(Shipment {
                courier_id: route.courier?,
                vehicle_type: route.vehicle_type,
                order_ids: route.orders,
                cost: route.cost,
                distance: route.distance,
                duration: route.duration,
            })
        })
        .collect();

    info!(
        shop_id = shop.shop_id,
        shipments = shipments.len(),
        recommendations = outcome.recommendations.len(),
        rejections = rejections.len(),
        deferred = deferred.len(),
        "shop dispatched"
    );

    ShopDispatch {
        shop_id: shop.shop_id,
        shipments,
        recommendations: outcome.recommendations,
        rejections,
        deferred,
    }
}

/// Runs [`dispatch_shop`] for every shop in parallel. Results keep the input
/// order.
pub fn dispatch_shops<B, M>(
    shops: &[ShopSnapshot],
    builder: &B,
    distances: &M,
    options: &DispatchOptions,
) -> Vec<ShopDispatch>
where
    B: RouteBuilder + Sync,
    M: DistanceMatrixProvider + Sync,
{
    shops
        .par_iter()
        .map(|shop| dispatch_shop(shop, builder, distances, options))
        .collect()
}

/// Cuts the active orders down to what route building can enumerate.
/// Returns the selected orders and the ids deferred to a later tick.
fn preselect<'a, M: DistanceMatrixProvider>(
    shop_id: ShopId,
    active: Vec<&'a Order>,
    distances: &M,
    options: &DispatchOptions,
) -> (Vec<&'a Order>, Vec<OrderId>) {
    let limit = options.max_cover_orders.clamp(1, MAX_COVER_ORDERS);
    if active.len() <= limit {
        return (active, Vec::new());
    }

    let locations: Vec<(f64, f64)> = active.iter().map(|order| order.location).collect();
    let matrix = distances.matrix_for(&locations);
    let selector = OrderClusterSelector::new(limit, options.cluster_radius, options.window_slack);

    let picked: Vec<usize> = match selector.select(&active, &matrix) {
        Ok(picked) => picked,
        Err(err) => {
            warn!(
                shop_id,
                error = %err,
                "cluster pre-filter failed, falling back to priority order"
            );
            let mut ranked: Vec<usize> = (0..active.len()).collect();
            ranked.sort_by_key(|&i| (std::cmp::Reverse(active[i].priority), active[i].id));
            ranked.truncate(limit);
            ranked
        }
    };

    let mut keep = vec![false; active.len()];
    for &i in &picked {
        keep[i] = true;
    }
    let mut deferred: Vec<OrderId> = active
        .iter()
        .zip(&keep)
        .filter(|(_, kept)| !**kept)
        .map(|(order, _)| order.id)
        .collect();
    deferred.sort_unstable();

    let selected = picked.into_iter().map(|i| active[i]).collect();
    (selected, deferred)
}
