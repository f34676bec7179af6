//! Free-seat index over the fleet.
//!
//! Every car sits in exactly one bucket keyed by its current free-seat count.
//! Lookups walk the buckets from the requested party size upwards, so the
//! answer is always the tightest fit available:
//!
//! 1. a car whose free seats equal the party size,
//! 2. otherwise the smallest free-seat count that still fits,
//! 3. within a bucket, the lowest car id.

use std::collections::{BTreeMap, BTreeSet};

use crate::pooling::types::CarId;

/// Mapping `free seats -> cars with exactly that many free seats`.
#[derive(Debug, Clone, Default)]
pub struct CapacityIndex {
    buckets: BTreeMap<u8, BTreeSet<CarId>>,
}

impl CapacityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `car` to the bucket for `free` seats.
    pub fn insert(&mut self, car: CarId, free: u8) {
        self.buckets.entry(free).or_default().insert(car);
    }

    /// Remove `car` from the bucket for `free` seats, dropping the bucket once
    /// it is empty. Returns whether the car was there.
    pub fn remove(&mut self, car: CarId, free: u8) -> bool {
        let Some(bucket) = self.buckets.get_mut(&free) else {
            return false;
        };
        let removed = bucket.remove(&car);
        if bucket.is_empty() {
            self.buckets.remove(&free);
        }
        removed
    }

    /// Move `car` from the `from` bucket to the `to` bucket.
    pub fn relocate(&mut self, car: CarId, from: u8, to: u8) {
        if from == to {
            return;
        }
        self.remove(car, from);
        self.insert(car, to);
    }

    /// Find a car with at least `people` free seats.
    pub fn find_at_least(&self, people: u8) -> Option<CarId> {
        self.buckets
            .range(people..)
            .find_map(|(_, cars)| cars.first().copied())
    }

    /// Iterate `(free seats, car)` over every indexed car.
    pub fn iter(&self) -> impl Iterator<Item = (u8, CarId)> + '_ {
        self.buckets
            .iter()
            .flat_map(|(free, cars)| cars.iter().map(move |car| (*free, *car)))
    }

    /// Number of indexed cars.
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    /// Free seats summed over the whole fleet.
    pub fn free_seats(&self) -> usize {
        self.buckets
            .iter()
            .map(|(free, cars)| usize::from(*free) * cars.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
