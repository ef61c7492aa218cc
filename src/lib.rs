//! courier-dispatch core
//!
//! Per-shop, per-tick assignment of ready orders to couriers: cached
//! enumeration tables, order clustering, courier allocation and the
//! two-phase delivery cover.

pub mod config;
pub mod error;
pub mod model;
pub mod traits;
pub mod permutations;
pub mod partitions;
pub mod cluster;
pub mod courier_repository;
pub mod cover;
pub mod route_builder;
pub mod dispatch;
pub mod osrm;
pub mod haversine;
