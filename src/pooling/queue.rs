//! Arrival-ordered queue of groups waiting for a car.

use std::collections::{HashSet, VecDeque};

use crate::pooling::types::GroupId;

#[derive(Debug, Clone, Default)]
pub struct WaitingQueue {
    groups: VecDeque<GroupId>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly arrived group.
    pub fn push(&mut self, group: GroupId) {
        debug_assert!(!self.groups.contains(&group), "group {group} queued twice");
        self.groups.push_back(group);
    }

    /// Remove one group, keeping the order of the rest.
    pub fn remove(&mut self, group: GroupId) -> bool {
        match self.groups.iter().position(|g| *g == group) {
            Some(pos) => {
                self.groups.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remove every group in `promoted` in a single pass.
    pub fn remove_all(&mut self, promoted: &[GroupId]) {
        if promoted.is_empty() {
            return;
        }
        let promoted: HashSet<GroupId> = promoted.iter().copied().collect();
        self.groups.retain(|g| !promoted.contains(g));
    }

    /// Walk the queue in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.groups.iter().copied()
    }

    pub fn contains(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
