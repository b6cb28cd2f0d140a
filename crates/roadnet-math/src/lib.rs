#![warn(missing_docs)]

//! Math types for the roadnet kernel.
//!
//! Thin wrappers around nalgebra for road geometry: points and vectors in
//! world space, the horizontal bounding box used by the spatial index, and
//! tolerance constants. World space is Z-up; topology is resolved in the
//! XY plane while elevation rides along on every point.

mod bbox;

pub use bbox::Aabb2;

use nalgebra::{Vector2, Vector3};

/// A point in 3D world space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D world space.
pub type Vec3 = Vector3<f64>;

/// A point in the horizontal plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the horizontal plane.
pub type Vec2 = Vector2<f64>;

/// The world vertical axis.
pub fn up() -> Vec3 {
    Vec3::z()
}

/// Drop the vertical component of a point.
pub fn flatten(p: &Point3) -> Point2 {
    Point2::new(p.x, p.y)
}

/// Horizontal distance between two world points.
pub fn distance_2d(a: &Point3, b: &Point3) -> f64 {
    (flatten(a) - flatten(b)).norm()
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in world units.
    pub linear: f64,
    /// Threshold below which a denominator or vector length counts as zero.
    pub parallel: f64,
}

impl Tolerance {
    /// Default tolerances (1e-4 linear, 1e-8 for parallel tests).
    pub const DEFAULT: Self = Self {
        linear: 1e-4,
        parallel: 1e-8,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if two points coincide once projected onto the horizontal plane.
    pub fn points_equal_2d(&self, a: &Point3, b: &Point3) -> bool {
        distance_2d(a, b) < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if a denominator is too small to divide by.
    pub fn is_parallel(&self, denom: f64) -> bool {
        denom.abs() < self.parallel
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
