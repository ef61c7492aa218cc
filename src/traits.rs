//! Boundary traits for the collaborators the dispatch core consumes.
//!
//! Route building and distance lookup live outside the core; the dispatch
//! service plugs concrete implementations in through these traits.

use crate::config::VehicleProfile;
use crate::model::{CandidateRoute, Order};

/// Provides a pairwise distance matrix for a set of locations.
///
/// The matrix is indexed by the provided location order, in meters, with a
/// zero diagonal. An empty matrix means the provider had no answer.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[(f64, f64)]) -> Vec<Vec<i32>>;
}

/// Turns an order subset into feasible, costed candidate routes for one
/// vehicle type.
///
/// Implementations must only return routes that already satisfy the
/// vehicle's weight, distance, duration and order-count limits; the cover
/// never re-checks them.
pub trait RouteBuilder {
    fn build_routes(
        &self,
        shop: &ShopSite,
        orders: &[&Order],
        vehicle: &VehicleProfile,
    ) -> Vec<CandidateRoute>;
}

/// Where and when routes of a shop start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShopSite {
    /// Shop location (lat, lng).
    pub location: (f64, f64),
    /// Departure time in seconds from midnight.
    pub departure: i32,
}
