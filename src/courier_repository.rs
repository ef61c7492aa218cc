//! Per-invocation courier allocation.
//!
//! Couriers live in a single arena sorted by vehicle type and load; each
//! vehicle type maps to an index range with a cursor. Taxi types collapse to
//! one unlimited entry that is handed out forever.

use std::collections::BTreeMap;

use crate::model::{Courier, VehicleTypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pool {
    /// Taxi supply, assumed unbounded. `index` is the representative.
    Unlimited { index: usize },
    /// Ordinary couriers at `first..end`; `next` is the cursor.
    Limited { first: usize, next: usize, end: usize },
}

#[derive(Debug, Clone, Default)]
pub struct CourierRepository {
    couriers: Vec<Courier>,
    pools: BTreeMap<VehicleTypeId, Pool>,
}

impl CourierRepository {
    /// Builds the repository from a shop's courier snapshot. Never fails; an
    /// empty snapshot gives an empty repository.
    pub fn create(couriers: &[Courier]) -> Self {
        let mut arena = couriers.to_vec();
        arena.sort_by_key(|courier| (courier.vehicle_type, courier.order_count, courier.id));

        let mut pools = BTreeMap::new();
        let mut first = 0;
        for group in arena.chunk_by(|a, b| a.vehicle_type == b.vehicle_type) {
            let vehicle_type = group[0].vehicle_type;
            let end = first + group.len();
            let pool = match group.iter().position(|courier| courier.is_taxi) {
                Some(offset) => Pool::Unlimited {
                    index: first + offset,
                },
                None => Pool::Limited {
                    first,
                    next: first,
                    end,
                },
            };
            pools.insert(vehicle_type, pool);
            first = end;
        }

        Self {
            couriers: arena,
            pools,
        }
    }

    /// Issues the least-loaded courier of `vehicle_type` not yet issued.
    ///
    /// Taxi types always answer with the same courier and never run out.
    pub fn get_next(&mut self, vehicle_type: VehicleTypeId) -> Option<&Courier> {
        let index = match self.pools.get_mut(&vehicle_type)? {
            Pool::Unlimited { index } => *index,
            Pool::Limited { next, end, .. } => {
                if *next >= *end {
                    return None;
                }
                *next += 1;
                *next - 1
            }
        };
        self.couriers.get(index)
    }

    /// Whether the next `get_next(vehicle_type)` would succeed.
    pub fn has_available(&self, vehicle_type: VehicleTypeId) -> bool {
        match self.pools.get(&vehicle_type) {
            Some(Pool::Unlimited { .. }) => true,
            Some(Pool::Limited { next, end, .. }) => next < end,
            None => false,
        }
    }

    /// A representative courier of `vehicle_type`, for cost estimation.
    /// Does not advance the cursor and ignores exhaustion.
    pub fn peek_first(&self, vehicle_type: VehicleTypeId) -> Option<&Courier> {
        let index = match self.pools.get(&vehicle_type)? {
            Pool::Unlimited { index } => *index,
            Pool::Limited { first, .. } => *first,
        };
        self.couriers.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
