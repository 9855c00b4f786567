use bevy::prelude::*;

use super::math::area;

/// Gate between two adjacent regions, seen from the region the path leaves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortalEdge {
    pub left: Vec3,
    pub right: Vec3,
}

/// Ordered portal edges of one path query, smoothed by the funnel algorithm.
///
/// The first portal holds the start point twice, the last one the end point.
#[derive(Clone, Debug, Default)]
pub struct Corridor {
    portal_edges: Vec<PortalEdge>,
}

impl Corridor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, left: Vec3, right: Vec3) -> &mut Self {
        self.portal_edges.push(PortalEdge { left, right });
        self
    }

    pub fn portal_edges(&self) -> &[PortalEdge] {
        &self.portal_edges
    }

    pub fn len(&self) -> usize {
        self.portal_edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portal_edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.portal_edges.clear();
    }

    /// Shortest polyline through all portals.
    pub fn generate(&self) -> Vec<Vec3> {
        let portals = &self.portal_edges;
        let mut path = Vec::new();
        let Some(first) = portals.first() else {
            return path;
        };

        let mut left_index = 0;
        let mut right_index = 0;

        let mut portal_apex = first.left;
        let mut portal_left = first.left;
        let mut portal_right = first.right;

        path.push(portal_apex);

        let mut i = 1;
        while i < portals.len() {
            let PortalEdge { left, right } = portals[i];

            if area(portal_apex, portal_right, right) <= 0.0 {
                if portal_apex == portal_right || area(portal_apex, portal_left, right) > 0.0 {
                    portal_right = right;
                    right_index = i;
                } else {
                    // Right crossed over left: left becomes the new apex.
                    path.push(portal_left);
                    portal_apex = portal_left;
                    portal_right = portal_apex;
                    right_index = left_index;
                    i = left_index + 1;
                    continue;
                }
            }

            if area(portal_apex, portal_left, left) >= 0.0 {
                if portal_apex == portal_left || area(portal_apex, portal_right, left) < 0.0 {
                    portal_left = left;
                    left_index = i;
                } else {
                    path.push(portal_right);
                    portal_apex = portal_right;
                    portal_left = portal_apex;
                    left_index = right_index;
                    i = right_index + 1;
                    continue;
                }
            }

            i += 1;
        }

        if let Some(last) = portals.last() {
            if path.last() != Some(&last.left) {
                path.push(last.left);
            }
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    #[test]
    fn test_empty_corridor_yields_no_points() {
        assert!(Corridor::new().generate().is_empty());
    }

    #[test]
    fn test_straight_corridor_is_start_and_end() {
        let start = p(0.5, 0.5);
        let end = p(1.8, 1.5);
        let mut corridor = Corridor::new();
        corridor.push(start, start).push(p(1.0, 1.0), p(2.0, 1.0)).push(end, end);

        assert_eq!(corridor.generate(), vec![start, end]);
    }

    #[test]
    fn test_bend_passes_through_portal_corner() {
        let start = p(0.5, 0.5);
        let end = p(1.2, 1.8);
        let mut corridor = Corridor::new();
        corridor.push(start, start).push(p(1.0, 1.0), p(2.0, 1.0)).push(end, end);

        assert_eq!(corridor.generate(), vec![start, p(1.0, 1.0), end]);
    }

    #[test]
    fn test_double_bend_restarts_from_each_new_apex() {
        let start = p(0.5, 0.5);
        let end = p(0.5, 2.5);
        let mut corridor = Corridor::new();
        corridor
            .push(start, start)
            .push(p(1.0, 1.0), p(2.0, 1.0))
            .push(p(1.0, 2.0), p(1.0, 3.0))
            .push(end, end);

        assert_eq!(corridor.generate(), vec![start, p(1.0, 1.0), p(1.0, 2.0), end]);
    }

    #[test]
    fn test_single_portal_corridor() {
        let start = p(1.0, 1.0);
        let mut corridor = Corridor::new();
        corridor.push(start, start);

        assert_eq!(corridor.generate(), vec![start]);
    }
}
