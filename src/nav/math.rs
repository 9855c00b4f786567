//! Geometry helpers layered on top of `bevy::math::Vec3`.
//!
//! The navigation mesh lives in the XZ plane with +Y as the up axis. All
//! orientation tests (`area`, `left_on`) project onto that plane.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Twice the signed area of the triangle `(a, b, c)` projected onto the XZ plane.
///
/// Positive when `a -> b -> c` turns counter-clockwise seen from above.
#[inline]
pub fn area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (c.x - a.x) * (b.z - a.z) - (b.x - a.x) * (c.z - a.z)
}

/// `c` lies left of or on the directed line `a -> b`.
#[inline]
pub fn left_on(a: Vec3, b: Vec3, c: Vec3) -> bool {
    area(a, b, c) >= 0.0
}

/// Total euclidean length of a polyline.
pub fn path_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

/// Infinite plane in Hessian normal form: `normal · p + constant = 0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self { normal: Vec3::Y, constant: 0.0 }
    }
}

impl Plane {
    pub fn from_normal_and_coplanar_point(normal: Vec3, point: Vec3) -> Self {
        Self { normal, constant: -point.dot(normal) }
    }

    /// Plane through three points. For a triangle that is counter-clockwise
    /// seen from above the normal points along +Y.
    ///
    /// Collinear points produce a zero normal, so every distance is zero.
    pub fn from_coplanar_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (c - b).cross(a - b).normalize_or_zero();
        Self::from_normal_and_coplanar_point(normal, a)
    }

    #[inline]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

/// Axis-aligned bounding box. Touching boxes count as intersecting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An inverted box that any `expand` call will snap onto.
    pub const EMPTY: Self = Self { min: Vec3::INFINITY, max: Vec3::NEG_INFINITY };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::EMPTY;
        for &point in points {
            aabb.expand(point);
        }
        aabb
    }

    /// Box enclosing a sphere.
    pub fn from_center_and_radius(center: Vec3, radius: f32) -> Self {
        Self { min: center - Vec3::splat(radius), max: center + Vec3::splat(radius) }
    }

    pub fn expand(&mut self, point: Vec3) -> &mut Self {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
        self
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y
            || other.max.z < self.min.z
            || other.min.z > self.max.z)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Finite segment between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub from: Vec3,
    pub to: Vec3,
}

impl LineSegment {
    pub fn new(from: Vec3, to: Vec3) -> Self {
        Self { from, to }
    }

    pub fn delta(&self) -> Vec3 {
        self.to - self.from
    }

    pub fn length(&self) -> f32 {
        self.from.distance(self.to)
    }

    pub fn center(&self) -> Vec3 {
        (self.from + self.to) * 0.5
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.from + self.delta() * t
    }

    /// Parameter of the point on the supporting line closest to `point`.
    ///
    /// With `clamp_to_segment` the result is restricted to `[0, 1]`.
    /// Degenerate segments report `0`.
    pub fn closest_point_to_point_parameter(&self, point: Vec3, clamp_to_segment: bool) -> f32 {
        let delta = self.delta();
        let length_squared = delta.length_squared();
        if length_squared == 0.0 {
            return 0.0;
        }

        let t = delta.dot(point - self.from) / length_squared;
        if clamp_to_segment {
            t.clamp(0.0, 1.0)
        } else {
            t
        }
    }

    pub fn closest_point_to_point(&self, point: Vec3) -> Vec3 {
        self.at(self.closest_point_to_point_parameter(point, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_sign_follows_counter_clockwise_from_above() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 1.0);
        let c = Vec3::new(1.0, 0.0, 1.0);

        assert!(area(a, b, c) > 0.0);
        assert!(area(c, b, a) < 0.0);
        assert_eq!(area(a, b, b), 0.0);
        assert!(left_on(a, b, c));
    }

    #[test]
    fn test_plane_from_counter_clockwise_triangle_points_up() {
        let plane = Plane::from_coplanar_points(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 2.0, 1.0),
            Vec3::new(1.0, 2.0, 1.0),
        );

        assert!((plane.normal - Vec3::Y).length() < 1e-6);
        assert!(plane.distance_to_point(Vec3::new(5.0, 2.0, -3.0)).abs() < 1e-6);
        assert!((plane.distance_to_point(Vec3::new(0.0, 3.5, 0.0)) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_aabb_touching_boxes_intersect() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_segment_parameter_unclamped_extends_past_endpoints() {
        let segment = LineSegment::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));

        assert_eq!(segment.closest_point_to_point_parameter(Vec3::new(3.0, 1.0, 0.0), false), 1.5);
        assert_eq!(segment.closest_point_to_point_parameter(Vec3::new(3.0, 1.0, 0.0), true), 1.0);
        assert_eq!(segment.closest_point_to_point(Vec3::new(1.0, 5.0, 0.0)), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_path_length_sums_segments() {
        let points = [Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 4.0)];
        assert_eq!(path_length(&points), 7.0);
        assert_eq!(path_length(&points[..1]), 0.0);
    }
}
