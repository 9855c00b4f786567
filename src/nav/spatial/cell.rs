use serde::{Deserialize, Serialize};

use crate::nav::math::Aabb;

/// One bucket of a [`CellSpacePartitioning`](super::CellSpacePartitioning).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell<T> {
    pub aabb: Aabb,
    pub entries: Vec<T>,
}

impl<T: PartialEq> Cell<T> {
    pub fn new(aabb: Aabb) -> Self {
        Self { aabb, entries: Vec::new() }
    }

    pub fn add(&mut self, entry: T) {
        self.entries.push(entry);
    }

    /// Remove the first matching entry. Returns whether one was found.
    pub fn remove(&mut self, entry: &T) -> bool {
        match self.entries.iter().position(|e| e == entry) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn make_empty(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn intersects(&self, aabb: &Aabb) -> bool {
        self.aabb.intersects(aabb)
    }
}
