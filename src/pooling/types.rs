//! Pooling domain types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Smallest car the fleet accepts.
pub const MIN_SEATS: u8 = 4;
/// Largest car the fleet accepts.
pub const MAX_SEATS: u8 = 6;
/// Smallest party that can request a journey.
pub const MIN_PEOPLE: u8 = 1;
/// Largest party that can request a journey.
pub const MAX_PEOPLE: u8 = 6;

/// Car identifier for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(pub u64);

/// Group identifier for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A car in the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Car {
    pub id: CarId,
    /// Seats the car was registered with.
    pub seats: u8,
    /// Seats not occupied by any riding group.
    pub free: u8,
}

impl Car {
    pub fn new(id: CarId, seats: u8) -> Self {
        Self { id, seats, free: seats }
    }
}

/// Where a group currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    /// Held in the waiting queue.
    Waiting,
    /// Occupying seats in the given car.
    Riding(CarId),
}

/// A party that asked for a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub people: u8,
    pub state: GroupState,
}

/// A car submitted as part of a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarSpec {
    pub id: CarId,
    pub seats: u8,
}

/// Outcome of a journey request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Journey {
    /// The group got a car straight away.
    Seated(CarId),
    /// No car had room; the group waits in arrival order.
    Queued,
}

/// Outcome of a dropoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dropoff {
    /// The group was riding; its seats went back to `car` and `promoted`
    /// waiting groups were moved onto it.
    Completed { car: CarId, promoted: usize },
    /// The group was still waiting and simply left the queue.
    Cancelled,
}

/// Outcome of a locate query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Riding in `car`, which has `seats` seats in total.
    Riding { car: CarId, seats: u8 },
    Waiting,
}

/// Aggregate view of the pool, used for logging and gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub cars: usize,
    pub free_seats: usize,
    pub riding: usize,
    pub waiting: usize,
}

/// Errors that can occur during pooling operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolingError {
    /// A car with this id is already part of the fleet.
    #[error("car {0} already exists")]
    DuplicateCar(CarId),

    /// A group with this id already requested a journey.
    #[error("group {0} already exists")]
    DuplicateGroup(GroupId),

    /// No group with this id is known.
    #[error("group {0} not found")]
    GroupNotFound(GroupId),

    /// Identifiers must be positive.
    #[error("id must be different from 0")]
    InvalidId,

    /// Seats outside the accepted range.
    #[error("seats must be between 4 and 6, got {0}")]
    InvalidSeats(u8),

    /// Party size outside the accepted range.
    #[error("number of people must be between 1 and 6, got {0}")]
    InvalidPeople(u8),
}

/// Result type for pooling operations.
pub type PoolingResult<T> = Result<T, PoolingError>;
