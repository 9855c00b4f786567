//! Uniform grid bucketing for region and entity lookups.
//!
//! The grid covers a box centred at the origin. Entries may sit in several
//! cells (polygons spanning cell borders); queries can therefore return
//! duplicates.

mod cell;


pub use cell::Cell;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::SpatialIndexConfig;
use super::math::Aabb;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CellSpacePartitioning<T> {
    cells: Vec<Cell<T>>,
    width: f32,
    height: f32,
    depth: f32,
    cells_x: usize,
    cells_y: usize,
    cells_z: usize,
    aabb: Aabb,
}

impl<T: Clone + PartialEq> CellSpacePartitioning<T> {
    pub fn new(width: f32, height: f32, depth: f32, cells_x: usize, cells_y: usize, cells_z: usize) -> Self {
        if cells_x == 0 || cells_y == 0 || cells_z == 0 {
            warn!(
                "[SPATIAL] Cell counts ({}, {}, {}) must be positive, clamping to 1",
                cells_x, cells_y, cells_z
            );
        }
        let (cells_x, cells_y, cells_z) = (cells_x.max(1), cells_y.max(1), cells_z.max(1));

        let half = Vec3::new(width, height, depth) * 0.5;
        let cell_size = Vec3::new(
            width / cells_x as f32,
            height / cells_y as f32,
            depth / cells_z as f32,
        );

        let mut cells = Vec::with_capacity(cells_x * cells_y * cells_z);
        for i in 0..cells_x {
            let x = i as f32 * cell_size.x - half.x;
            for j in 0..cells_y {
                let y = j as f32 * cell_size.y - half.y;
                for k in 0..cells_z {
                    let z = k as f32 * cell_size.z - half.z;
                    let min = Vec3::new(x, y, z);
                    cells.push(Cell::new(Aabb::new(min, min + cell_size)));
                }
            }
        }

        Self {
            cells,
            width,
            height,
            depth,
            cells_x,
            cells_y,
            cells_z,
            aabb: Aabb::new(-half, half),
        }
    }

    pub fn from_config(config: &SpatialIndexConfig) -> Self {
        Self::new(
            config.width,
            config.height,
            config.depth,
            config.cells_x,
            config.cells_y,
            config.cells_z,
        )
    }

    pub fn cells(&self) -> &[Cell<T>] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell<T>> {
        self.cells.get(index)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Add an entry to the cell at `index`. Out of range indices are ignored.
    pub fn add(&mut self, entry: T, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.add(entry);
        }
    }

    pub fn remove(&mut self, entry: &T, index: usize) -> bool {
        self.cells.get_mut(index).is_some_and(|cell| cell.remove(entry))
    }

    /// Move an entry into the cell covering `position`.
    ///
    /// `current` is the cell the entry is registered in, if any. Returns the
    /// new cell index, which callers keep for the next update.
    pub fn update_entry(&mut self, entry: T, position: Vec3, current: Option<usize>) -> usize {
        let index = self.index_for_position(position);

        if current != Some(index) {
            if let Some(previous) = current {
                self.remove(&entry, previous);
            }
            self.add(entry, index);
        }

        index
    }

    /// Register an entry in every cell overlapped by the bounds of `contour`.
    pub fn add_polygon(&mut self, entry: T, contour: &[Vec3]) {
        let aabb = Aabb::from_points(contour);
        for cell in &mut self.cells {
            if cell.intersects(&aabb) {
                cell.add(entry.clone());
            }
        }
    }

    /// Collect the entries of every non-empty cell touching the sphere's bounds.
    ///
    /// `result` is cleared first.
    pub fn query(&self, position: Vec3, radius: f32, result: &mut Vec<T>) {
        result.clear();
        let aabb = Aabb::from_center_and_radius(position, radius);

        for cell in &self.cells {
            if !cell.is_empty() && cell.intersects(&aabb) {
                result.extend(cell.entries.iter().cloned());
            }
        }
    }

    /// Flat index of the cell covering `position`. Positions outside the grid
    /// are clamped onto its border.
    pub fn index_for_position(&self, position: Vec3) -> usize {
        let clamped = position.max(self.aabb.min).min(self.aabb.max);

        let x = axis_index(clamped.x - self.aabb.min.x, self.width, self.cells_x);
        let y = axis_index(clamped.y - self.aabb.min.y, self.height, self.cells_y);
        let z = axis_index(clamped.z - self.aabb.min.z, self.depth, self.cells_z);

        x * self.cells_y * self.cells_z + y * self.cells_z + z
    }

    pub fn make_empty(&mut self) {
        for cell in &mut self.cells {
            cell.make_empty();
        }
    }
}

fn axis_index(offset: f32, extent: f32, cells: usize) -> usize {
    if extent <= 0.0 || !offset.is_finite() {
        return 0;
    }

    let index = ((cells as f32 * offset) / extent).floor().abs() as usize;
    // A point on the far boundary lands one past the last cell.
    index.min(cells - 1)
}
