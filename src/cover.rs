//! Two-phase greedy delivery cover.
//!
//! Phase 1 picks advisory routes for orders still being assembled, phase 2
//! commits routes of ready orders to real couriers. Both phases walk the same
//! priority-sorted route list and share one [`ClaimSet`], so an order lands in
//! at most one accepted route per call. Claims never outlive a call.

use std::borrow::Borrow;

use tracing::{debug, warn};

use crate::courier_repository::CourierRepository;
use crate::model::{CandidateRoute, Courier, Order, OrderId, OrderStatus};

/// Result of one cover run for one shop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverOutcome {
    /// Advisory routes that contain at least one receipted order.
    pub recommendations: Vec<CandidateRoute>,
    /// Committed routes, each with `courier` set.
    pub cover: Vec<CandidateRoute>,
    /// Orders claimed by neither phase, ascending by id.
    pub rejected: Vec<OrderId>,
}

impl CoverOutcome {
    /// Order ids carried by recommendations and committed routes.
    pub fn claimed_orders(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.recommendations
            .iter()
            .chain(&self.cover)
            .flat_map(|route| route.orders.iter().copied())
    }
}

/// Orders taken by accepted routes, keyed by position in the shop's sorted
/// order index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    claimed: Vec<bool>,
    count: usize,
}

impl ClaimSet {
    pub fn new(orders: usize) -> Self {
        Self {
            claimed: vec![false; orders],
            count: 0,
        }
    }

    pub fn is_claimed(&self, position: usize) -> bool {
        self.claimed.get(position).copied().unwrap_or(false)
    }

    /// Whether none of `positions` is claimed yet.
    pub fn is_free(&self, positions: &[usize]) -> bool {
        positions.iter().all(|&position| !self.is_claimed(position))
    }

    pub fn claim(&mut self, positions: &[usize]) {
        for &position in positions {
            if let Some(slot) = self.claimed.get_mut(position) {
                if !*slot {
                    *slot = true;
                    self.count += 1;
                }
            }
        }
    }

    /// Number of claimed orders.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Recommended,
    Committed,
}

#[derive(Debug)]
struct IndexedRoute {
    route: CandidateRoute,
    /// Positions of the route's orders in the order index.
    members: Vec<usize>,
    assembled: usize,
    verdict: Option<Verdict>,
}

pub struct DeliveryCover;

impl DeliveryCover {
    /// Selects recommendations and a committed cover from `candidate_routes`.
    ///
    /// Routes are ranked by priority (descending) and then by order count
    /// (ascending); routes equal on both keep their input order. Routes that
    /// are empty, repeat an order, or reference an order that is not an
    /// active member of `shop_orders` are dropped with a warning.
    ///
    /// Never fails: an empty cover or all orders rejected are ordinary
    /// outcomes.
    pub fn build<O: Borrow<Order>>(
        candidate_routes: Vec<CandidateRoute>,
        shop_orders: &[O],
        shop_couriers: &[Courier],
    ) -> CoverOutcome {
        let mut orders: Vec<&Order> = shop_orders.iter().map(Borrow::borrow).collect();
        orders.sort_by_key(|order| order.id);
        orders.dedup_by_key(|order| order.id);

        if orders.is_empty() {
            return CoverOutcome::default();
        }

        let mut touched = vec![false; orders.len()];
        let mut routes: Vec<IndexedRoute> = candidate_routes
            .into_iter()
            .filter_map(|route| index_route(route, &orders))
            .collect();

        let mut any_receipted = false;
        for indexed in &routes {
            for &position in &indexed.members {
                touched[position] = true;
            }
            any_receipted |= indexed.route.receipted;
        }
        let touched_count = touched.iter().filter(|&&hit| hit).count();

        routes.sort_by(|a, b| {
            b.route
                .priority
                .cmp(&a.route.priority)
                .then(a.members.len().cmp(&b.members.len()))
        });

        let mut claims = ClaimSet::new(orders.len());

        if any_receipted {
            recommend(&mut routes, &mut claims, touched_count);
        }

        let assembled_total = orders
            .iter()
            .filter(|order| order.status == OrderStatus::Assembled)
            .count();
        if assembled_total > 0 {
            let mut couriers = CourierRepository::create(shop_couriers);
            if couriers.is_empty() {
                debug!(assembled = assembled_total, "no couriers on shift, nothing to commit");
            } else {
                commit(&mut routes, &mut claims, &orders, assembled_total, &mut couriers);
            }
        }

        let mut outcome = CoverOutcome::default();
        for indexed in routes {
            match indexed.verdict {
                Some(Verdict::Recommended) => outcome.recommendations.push(indexed.route),
                Some(Verdict::Committed) => outcome.cover.push(indexed.route),
                None => {}
            }
        }
        outcome.rejected = orders
            .iter()
            .enumerate()
            .filter(|(position, _)| !claims.is_claimed(*position))
            .map(|(_, order)| order.id)
            .collect();

        debug!(
            orders = orders.len(),
            recommendations = outcome.recommendations.len(),
            cover = outcome.cover.len(),
            rejected = outcome.rejected.len(),
            "delivery cover built"
        );

        outcome
    }
}

/// Resolves a route's orders against the order index and derives its
/// `receipted` flag and priority. Returns `None` for malformed routes.
fn index_route(mut route: CandidateRoute, orders: &[&Order]) -> Option<IndexedRoute> {
    if route.orders.is_empty() {
        warn!(vehicle_type = route.vehicle_type, "dropping route without orders");
        return None;
    }

    let mut members = Vec::with_capacity(route.orders.len());
    let mut receipted = false;
    let mut assembled = 0;
    let mut priority = i32::MIN;

    for &order_id in &route.orders {
        let Ok(position) = orders.binary_search_by_key(&order_id, |order| order.id) else {
            warn!(order_id, "dropping route that references an unknown order");
            return None;
        };
        let order = orders[position];
        if !order.is_active() {
            warn!(
                order_id,
                status = ?order.status,
                "dropping route that references an inactive order"
            );
            return None;
        }
        if members.contains(&position) {
            warn!(order_id, "dropping route that visits an order twice");
            return None;
        }

        members.push(position);
        receipted |= order.status == OrderStatus::Receipted;
        if order.status == OrderStatus::Assembled {
            assembled += 1;
        }
        priority = priority.max(order.priority);
    }

    route.receipted = receipted;
    route.priority = priority;
    route.courier = None;

    Some(IndexedRoute {
        route,
        members,
        assembled,
        verdict: None,
    })
}

fn recommend(routes: &mut [IndexedRoute], claims: &mut ClaimSet, touched_count: usize) {
    for indexed in routes.iter_mut() {
        if claims.len() >= touched_count {
            break;
        }
        if !indexed.route.receipted || !claims.is_free(&indexed.members) {
            continue;
        }
        claims.claim(&indexed.members);
        indexed.verdict = Some(Verdict::Recommended);
    }
}

fn commit(
    routes: &mut [IndexedRoute],
    claims: &mut ClaimSet,
    orders: &[&Order],
    assembled_total: usize,
    couriers: &mut CourierRepository,
) {
    // Assembled orders already represented by a recommendation count as
    // handled.
    let mut assembled_claimed = orders
        .iter()
        .enumerate()
        .filter(|(position, order)| {
            order.status == OrderStatus::Assembled && claims.is_claimed(*position)
        })
        .count();

    for indexed in routes.iter_mut() {
        if assembled_claimed >= assembled_total {
            break;
        }
        if indexed.route.receipted || !claims.is_free(&indexed.members) {
            continue;
        }

        let Some(courier) = couriers.get_next(indexed.route.vehicle_type) else {
            debug!(
                vehicle_type = indexed.route.vehicle_type,
                orders = ?indexed.route.orders,
                "no courier left for route"
            );
            continue;
        };

        indexed.route.courier = Some(courier.id);
        claims.claim(&indexed.members);
        assembled_claimed += indexed.assembled;
        indexed.verdict = Some(Verdict::Committed);
    }
}
