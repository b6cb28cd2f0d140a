//! Axis-aligned bounding box in the horizontal plane.
//!
//! Curves are indexed by the XY footprint of their 3D bounds; the vertical
//! axis is dropped.

use crate::{Point2, Point3, Vec2};

/// Axis-aligned bounding box in 2D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl Aabb2 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Square box of half-extent `radius` centered on the footprint of `center`.
    pub fn around(center: &Point3, radius: f64) -> Self {
        Self {
            min: Point2::new(center.x - radius, center.y - radius),
            max: Point2::new(center.x + radius, center.y + radius),
        }
    }

    /// Footprint of a set of world points.
    pub fn from_points3<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(&Point2::new(p.x, p.y));
        }
        aabb
    }

    /// True if nothing has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Expand this AABB to include another box.
    pub fn include_box(&mut self, other: &Aabb2) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb2) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Test if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb2) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Test if a point lies inside this box (boundary inclusive).
    pub fn contains_point(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.max.x += tol;
        self.max.y += tol;
    }

    /// Center of the box.
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Square box sharing this box's center, grown by `padding` (a fraction
    /// of the larger extent) and with equal X/Y extents.
    pub fn padded_square(&self, padding: f64) -> Self {
        let size = self.size();
        let half = 0.5 * size.x.max(size.y) * (1.0 + padding);
        // A single point still needs a non-zero box to subdivide.
        let half = if half > 0.0 { half } else { 1.0 };
        let c = self.center();
        Self {
            min: Point2::new(c.x - half, c.y - half),
            max: Point2::new(c.x + half, c.y + half),
        }
    }

    /// The four quadrants of this box.
    ///
    /// Index bit 0 selects the +X half, bit 1 the +Y half.
    pub fn quadrants(&self) -> [Aabb2; 4] {
        let c = self.center();
        std::array::from_fn(|i| {
            let (min_x, max_x) = if i & 1 == 0 {
                (self.min.x, c.x)
            } else {
                (c.x, self.max.x)
            };
            let (min_y, max_y) = if i & 2 == 0 {
                (self.min.y, c.y)
            } else {
                (c.y, self.max.y)
            };
            Aabb2::new(Point2::new(min_x, min_y), Point2::new(max_x, max_y))
        })
    }
}

impl Default for Aabb2 {
    fn default() -> Self {
        Self::empty()
    }
}
