use bevy::prelude::*;

/// Ask for a path for `entity`. Answered by inserting a [`NavPath`].
#[derive(Event, Message, Debug, Clone)]
pub struct PathRequest {
    pub entity: Entity,
    pub from: Vec3,
    pub to: Vec3,
}

/// Smoothed waypoints an entity is following.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NavPath {
    pub waypoints: Vec<Vec3>,
    pub current_index: usize,
}

impl NavPath {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints, current_index: 0 }
    }

    pub fn current(&self) -> Option<Vec3> {
        self.waypoints.get(self.current_index).copied()
    }

    /// Step to the next waypoint. Returns `false` once the path is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.current_index < self.waypoints.len() {
            self.current_index += 1;
        }
        self.current_index < self.waypoints.len()
    }

    /// Waypoints from the current one to the end.
    pub fn remaining(&self) -> &[Vec3] {
        self.waypoints.get(self.current_index..).unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.current_index >= self.waypoints.len()
    }
}
