//! Allocation engine: seats groups in cars and promotes waiting groups.

use crate::pooling::capacity::CapacityIndex;
use crate::pooling::queue::WaitingQueue;
use crate::pooling::registry::Registry;
use crate::pooling::types::{
    Car, CarId, CarSpec, Dropoff, Group, GroupId, GroupState, Journey, Location, PoolStats,
    PoolingError, PoolingResult, MAX_PEOPLE, MAX_SEATS, MIN_PEOPLE, MIN_SEATS,
};

/// Owns the registry, the capacity index and the waiting queue.
///
/// Every method is one transaction over the three structures. Callers that
/// share an engine serialize access through [`SharedEngine`](super::SharedEngine).
#[derive(Debug, Clone, Default)]
pub struct PoolingEngine {
    registry: Registry,
    capacity: CapacityIndex,
    waiting: WaitingQueue,
}

impl PoolingEngine {
    /// Create an engine with no cars and no groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every car, group and queued group.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.capacity.clear();
        self.waiting.clear();
    }

    /// Add a single car with all seats free.
    pub fn add_car(&mut self, id: CarId, seats: u8) -> PoolingResult<()> {
        if id.0 == 0 {
            return Err(PoolingError::InvalidId);
        }
        if !(MIN_SEATS..=MAX_SEATS).contains(&seats) {
            return Err(PoolingError::InvalidSeats(seats));
        }
        if self.registry.contains_car(id) {
            return Err(PoolingError::DuplicateCar(id));
        }

        self.registry.insert_car(Car::new(id, seats));
        self.capacity.insert(id, seats);
        Ok(())
    }

    /// Replace the whole fleet, dropping every known group.
    ///
    /// Either all cars are accepted or the engine is left empty.
    pub fn replace_fleet<I>(&mut self, cars: I) -> PoolingResult<usize>
    where
        I: IntoIterator<Item = CarSpec>,
    {
        self.reset();
        for car in cars {
            if let Err(e) = self.add_car(car.id, car.seats) {
                self.reset();
                tracing::warn!(error = %e, "Fleet rejected");
                return Err(e);
            }
        }

        let count = self.registry.car_count();
        tracing::info!(cars = count, "Fleet replaced");
        Ok(count)
    }

    /// Register a group and seat it if some car has room, otherwise queue it.
    pub fn request_journey(&mut self, id: GroupId, people: u8) -> PoolingResult<Journey> {
        if id.0 == 0 {
            return Err(PoolingError::InvalidId);
        }
        if !(MIN_PEOPLE..=MAX_PEOPLE).contains(&people) {
            return Err(PoolingError::InvalidPeople(people));
        }
        if self.registry.contains_group(id) {
            return Err(PoolingError::DuplicateGroup(id));
        }

        self.registry.insert_group(Group {
            id,
            people,
            state: GroupState::Waiting,
        });

        match self.capacity.find_at_least(people) {
            Some(car) => {
                self.seat(id, people, car);
                tracing::debug!(group = %id, people, car = %car, "Group seated");
                Ok(Journey::Seated(car))
            }
            None => {
                self.waiting.push(id);
                tracing::debug!(group = %id, people, waiting = self.waiting.len(), "Group queued");
                Ok(Journey::Queued)
            }
        }
    }

    /// Remove a group. A riding group frees its seats, which are then
    /// offered to the waiting queue in arrival order.
    pub fn dropoff(&mut self, id: GroupId) -> PoolingResult<Dropoff> {
        let group = self
            .registry
            .remove_group(id)
            .ok_or(PoolingError::GroupNotFound(id))?;

        let car_id = match group.state {
            GroupState::Waiting => {
                self.waiting.remove(id);
                tracing::debug!(group = %id, "Waiting group left the queue");
                return Ok(Dropoff::Cancelled);
            }
            GroupState::Riding(car_id) => car_id,
        };

        let Some(car) = self.registry.car_mut(car_id) else {
            // Groups only ride cars of the current fleet.
            return Err(PoolingError::GroupNotFound(id));
        };
        let old_free = car.free;
        car.free += group.people;
        let new_free = car.free;
        self.capacity.relocate(car_id, old_free, new_free);

        let promoted = self.promote(car_id, new_free);
        tracing::debug!(group = %id, car = %car_id, free = new_free, promoted, "Group dropped off");
        Ok(Dropoff::Completed {
            car: car_id,
            promoted,
        })
    }

    /// Where a group currently is.
    pub fn locate(&self, id: GroupId) -> PoolingResult<Location> {
        let group = self
            .registry
            .group(id)
            .ok_or(PoolingError::GroupNotFound(id))?;

        match group.state {
            GroupState::Waiting => Ok(Location::Waiting),
            GroupState::Riding(car) => {
                let seats = self
                    .registry
                    .car(car)
                    .map(|c| c.seats)
                    .ok_or(PoolingError::GroupNotFound(id))?;
                Ok(Location::Riding { car, seats })
            }
        }
    }

    /// Counts for logging and gauges.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            cars: self.registry.car_count(),
            free_seats: self.capacity.free_seats(),
            riding: self.registry.group_count() - self.waiting.len(),
            waiting: self.waiting.len(),
        }
    }

    /// Waiting groups in arrival order.
    pub fn waiting(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.waiting.iter()
    }

    /// Offer `free` seats on `car` to the queue: one pass in arrival order,
    /// seating every group that still fits and skipping the ones that don't.
    fn promote(&mut self, car: CarId, free: u8) -> usize {
        let mut remaining = free;
        let mut promoted = Vec::new();

        for id in self.waiting.iter() {
            if remaining == 0 {
                break;
            }
            let Some(group) = self.registry.group(id) else {
                continue;
            };
            if group.people <= remaining {
                remaining -= group.people;
                promoted.push((id, group.people));
            }
        }

        for &(id, people) in &promoted {
            self.seat(id, people, car);
            tracing::debug!(group = %id, people, car = %car, "Waiting group promoted");
        }

        let ids: Vec<GroupId> = promoted.iter().map(|(id, _)| *id).collect();
        self.waiting.remove_all(&ids);
        ids.len()
    }

    /// Put `group` into `car`, which the caller knows has room.
    fn seat(&mut self, group: GroupId, people: u8, car: CarId) {
        if let Some(c) = self.registry.car_mut(car) {
            let old_free = c.free;
            c.free -= people;
            let new_free = c.free;
            self.capacity.relocate(car, old_free, new_free);
        }
        if let Some(g) = self.registry.group_mut(group) {
            g.state = GroupState::Riding(car);
        }
    }

    /// Cross-check the registry, index and queue against each other.
    ///
    /// Returns a description of the first inconsistency found.
    #[doc(hidden)]
    pub fn check_invariants(&self) -> Result<(), String> {
        for car in self.registry.cars() {
            let occupied: u32 = self
                .registry
                .riders(car.id)
                .map(|g| u32::from(g.people))
                .sum();
            if u32::from(car.free) + occupied != u32::from(car.seats) {
                return Err(format!(
                    "car {} has {} free + {} occupied != {} seats",
                    car.id, car.free, occupied, car.seats
                ));
            }
        }

        if self.capacity.len() != self.registry.car_count() {
            return Err(format!(
                "index holds {} cars, registry {}",
                self.capacity.len(),
                self.registry.car_count()
            ));
        }
        for (free, id) in self.capacity.iter() {
            match self.registry.car(id) {
                Some(car) if car.free == free => {}
                Some(car) => {
                    return Err(format!(
                        "car {id} indexed under {free} but has {} free",
                        car.free
                    ))
                }
                None => return Err(format!("index references unknown car {id}")),
            }
        }

        let mut seen = std::collections::HashSet::new();
        for id in self.waiting.iter() {
            if !seen.insert(id) {
                return Err(format!("group {id} queued twice"));
            }
            match self.registry.group(id) {
                Some(g) if g.state == GroupState::Waiting => {}
                _ => return Err(format!("queued group {id} is not waiting")),
            }
        }
        for group in self.registry.groups() {
            match group.state {
                GroupState::Waiting if !self.waiting.contains(group.id) => {
                    return Err(format!("waiting group {} missing from queue", group.id));
                }
                GroupState::Riding(car) if !self.registry.contains_car(car) => {
                    return Err(format!("group {} rides unknown car {car}", group.id));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet(cars: &[(u64, u8)]) -> PoolingEngine {
        let mut engine = PoolingEngine::new();
        engine
            .replace_fleet(cars.iter().map(|(id, seats)| CarSpec {
                id: CarId(*id),
                seats: *seats,
            }))
            .unwrap();
        engine
    }

    #[test]
    fn test_group_seated_in_exact_car() {
        let mut engine = fleet(&[(3, 5)]);
        assert_eq!(
            engine.request_journey(GroupId(7), 5),
            Ok(Journey::Seated(CarId(3)))
        );
        assert_eq!(
            engine.locate(GroupId(7)),
            Ok(Location::Riding {
                car: CarId(3),
                seats: 5
            })
        );
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_group_queued_without_fleet() {
        let mut engine = PoolingEngine::new();
        assert_eq!(engine.request_journey(GroupId(7), 3), Ok(Journey::Queued));
        assert_eq!(engine.locate(GroupId(7)), Ok(Location::Waiting));
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_dropoff_promotes_waiting_group() {
        let mut engine = fleet(&[(3, 5)]);
        engine.request_journey(GroupId(7), 5).unwrap();
        assert_eq!(engine.request_journey(GroupId(4), 4), Ok(Journey::Queued));

        assert_eq!(
            engine.dropoff(GroupId(7)),
            Ok(Dropoff::Completed {
                car: CarId(3),
                promoted: 1
            })
        );
        assert_eq!(
            engine.locate(GroupId(4)),
            Ok(Location::Riding {
                car: CarId(3),
                seats: 5
            })
        );
        assert_eq!(engine.locate(GroupId(7)), Err(PoolingError::GroupNotFound(GroupId(7))));
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_only_first_fitting_group_promoted() {
        let mut engine = fleet(&[(3, 5)]);
        engine.request_journey(GroupId(7), 4).unwrap();
        engine.request_journey(GroupId(4), 4).unwrap();
        engine.request_journey(GroupId(5), 4).unwrap();

        engine.dropoff(GroupId(7)).unwrap();

        assert!(matches!(engine.locate(GroupId(4)), Ok(Location::Riding { .. })));
        assert_eq!(engine.locate(GroupId(5)), Ok(Location::Waiting));
        assert_eq!(engine.waiting().collect::<Vec<_>>(), vec![GroupId(5)]);
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_promotion_skips_oversized_groups() {
        let mut engine = fleet(&[(1, 6)]);
        engine.request_journey(GroupId(1), 6).unwrap();
        // Queue: 5, 2, 6, 3, 1
        for (id, people) in [(10, 5), (11, 2), (12, 6), (13, 3), (14, 1)] {
            assert_eq!(engine.request_journey(GroupId(id), people), Ok(Journey::Queued));
        }

        engine.dropoff(GroupId(1)).unwrap();

        // 5 fits (1 left), 2 and 6 and 3 don't, 1 fits.
        assert!(matches!(engine.locate(GroupId(10)), Ok(Location::Riding { .. })));
        assert!(matches!(engine.locate(GroupId(14)), Ok(Location::Riding { .. })));
        assert_eq!(
            engine.waiting().collect::<Vec<_>>(),
            vec![GroupId(11), GroupId(12), GroupId(13)]
        );
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_promotion_seats_adjacent_groups() {
        let mut engine = fleet(&[(1, 6)]);
        engine.request_journey(GroupId(1), 6).unwrap();
        for (id, people) in [(2, 2), (3, 2), (4, 2)] {
            engine.request_journey(GroupId(id), people).unwrap();
        }

        assert_eq!(
            engine.dropoff(GroupId(1)),
            Ok(Dropoff::Completed {
                car: CarId(1),
                promoted: 3
            })
        );
        assert_eq!(engine.stats().waiting, 0);
        assert_eq!(engine.stats().free_seats, 0);
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_promotion_uses_the_freed_car_only() {
        let mut engine = fleet(&[(1, 4), (2, 4)]);
        engine.request_journey(GroupId(1), 4).unwrap();
        engine.request_journey(GroupId(2), 2).unwrap();
        engine.request_journey(GroupId(3), 4).unwrap();

        // Car 2 has 2 free seats; the queued group of 4 still waits.
        assert_eq!(engine.stats().waiting, 1);

        engine.dropoff(GroupId(2)).unwrap();
        assert_eq!(
            engine.locate(GroupId(3)),
            Ok(Location::Riding {
                car: CarId(2),
                seats: 4
            })
        );
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_dropoff_waiting_group() {
        let mut engine = PoolingEngine::new();
        engine.request_journey(GroupId(1), 2).unwrap();
        engine.request_journey(GroupId(2), 2).unwrap();
        engine.request_journey(GroupId(3), 2).unwrap();

        assert_eq!(engine.dropoff(GroupId(2)), Ok(Dropoff::Cancelled));
        assert_eq!(
            engine.waiting().collect::<Vec<_>>(),
            vec![GroupId(1), GroupId(3)]
        );
        assert_eq!(
            engine.dropoff(GroupId(2)),
            Err(PoolingError::GroupNotFound(GroupId(2)))
        );
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let mut engine = fleet(&[(1, 4)]);
        engine.request_journey(GroupId(1), 2).unwrap();
        assert_eq!(
            engine.request_journey(GroupId(1), 2),
            Err(PoolingError::DuplicateGroup(GroupId(1)))
        );
        assert_eq!(engine.stats().riding, 1);
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_duplicate_car_leaves_empty_fleet() {
        let mut engine = fleet(&[(1, 4)]);
        engine.request_journey(GroupId(9), 2).unwrap();

        let result = engine.replace_fleet([
            CarSpec { id: CarId(4), seats: 5 },
            CarSpec { id: CarId(4), seats: 6 },
        ]);

        assert_eq!(result, Err(PoolingError::DuplicateCar(CarId(4))));
        assert_eq!(engine.stats(), PoolStats::default());
        assert_eq!(
            engine.locate(GroupId(9)),
            Err(PoolingError::GroupNotFound(GroupId(9)))
        );
        engine.check_invariants().unwrap();
    }

    #[test]
    fn test_add_car_duplicate() {
        let mut engine = PoolingEngine::new();
        engine.add_car(CarId(4), 5).unwrap();
        assert_eq!(
            engine.add_car(CarId(4), 6),
            Err(PoolingError::DuplicateCar(CarId(4)))
        );
        assert_eq!(engine.stats().free_seats, 5);
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut engine = fleet(&[(1, 4)]);
        engine.request_journey(GroupId(1), 4).unwrap();
        engine.request_journey(GroupId(2), 4).unwrap();

        engine.reset();

        for id in [1, 2] {
            assert_eq!(
                engine.locate(GroupId(id)),
                Err(PoolingError::GroupNotFound(GroupId(id)))
            );
        }
        assert_eq!(engine.stats(), PoolStats::default());
    }

    #[test]
    fn test_out_of_range_input_rejected() {
        let mut engine = PoolingEngine::new();
        assert_eq!(engine.add_car(CarId(1), 3), Err(PoolingError::InvalidSeats(3)));
        assert_eq!(engine.add_car(CarId(1), 7), Err(PoolingError::InvalidSeats(7)));
        assert_eq!(engine.add_car(CarId(0), 4), Err(PoolingError::InvalidId));
        assert_eq!(
            engine.request_journey(GroupId(1), 0),
            Err(PoolingError::InvalidPeople(0))
        );
        assert_eq!(
            engine.request_journey(GroupId(1), 7),
            Err(PoolingError::InvalidPeople(7))
        );
        assert_eq!(engine.request_journey(GroupId(0), 1), Err(PoolingError::InvalidId));
        assert_eq!(engine.stats(), PoolStats::default());
    }

    #[test]
    fn test_tightest_car_chosen() {
        let mut engine = fleet(&[(1, 6), (2, 4), (3, 5)]);
        assert_eq!(
            engine.request_journey(GroupId(1), 3),
            Ok(Journey::Seated(CarId(2)))
        );
        // Car 2 now has 1 free; a pair goes to the 5-seater.
        assert_eq!(
            engine.request_journey(GroupId(2), 2),
            Ok(Journey::Seated(CarId(3)))
        );
        engine.check_invariants().unwrap();
    }
}
