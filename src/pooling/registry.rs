//! Owner of every car and group record.

use std::collections::HashMap;

use crate::pooling::types::{Car, CarId, Group, GroupId, GroupState};

/// Car and group records keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    cars: HashMap<CarId, Car>,
    groups: HashMap<GroupId, Group>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.get(&id)
    }

    pub fn car_mut(&mut self, id: CarId) -> Option<&mut Car> {
        self.cars.get_mut(&id)
    }

    pub fn contains_car(&self, id: CarId) -> bool {
        self.cars.contains_key(&id)
    }

    /// Register a car. The caller has already checked the id is free.
    pub fn insert_car(&mut self, car: Car) {
        self.cars.insert(car.id, car);
    }

    pub fn cars(&self) -> impl Iterator<Item = &Car> {
        self.cars.values()
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(&id)
    }

    pub fn contains_group(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    /// Register a group. The caller has already checked the id is free.
    pub fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    pub fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        self.groups.remove(&id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups currently riding in `car`.
    pub fn riders(&self, car: CarId) -> impl Iterator<Item = &Group> {
        self.groups
            .values()
            .filter(move |g| g.state == GroupState::Riding(car))
    }

    pub fn clear(&mut self) {
        self.cars.clear();
        self.groups.clear();
    }
}
