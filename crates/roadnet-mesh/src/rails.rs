//! Per-curve rail accumulator.

use roadnet_curve::sample::{points_within_range, Rails};
use roadnet_curve::{Curve, CurveEnd};
use roadnet_math::Point3;

/// Resolved left/right boundary at one end of a curve's road surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    /// Boundary point on the left rail.
    pub left: Point3,
    /// Boundary point on the right rail.
    pub right: Point3,
}

/// Sampled centerline of one curve, its offset rails, and the boundaries
/// that cut the rails down to the drivable segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RailPair<K> {
    /// Owning curve.
    pub curve: K,
    /// Centerline samples.
    pub centerline: Vec<Point3>,
    /// Offset rails, index-aligned with `centerline`.
    pub rails: Rails,
    start: Option<Boundary>,
    end: Option<Boundary>,
}

impl<K> RailPair<K> {
    /// Rails with no boundaries resolved yet.
    pub fn new(curve: K, centerline: Vec<Point3>, rails: Rails) -> Self {
        Self {
            curve,
            centerline,
            rails,
            start: None,
            end: None,
        }
    }

    /// Record the boundary at one end. The first boundary for an end wins.
    pub fn resolve(&mut self, end: CurveEnd, boundary: Boundary) -> bool {
        let slot = match end {
            CurveEnd::Start => &mut self.start,
            CurveEnd::End => &mut self.end,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(boundary);
        true
    }

    /// Boundary at one end, if resolved.
    pub fn boundary(&self, end: CurveEnd) -> Option<Boundary> {
        match end {
            CurveEnd::Start => self.start,
            CurveEnd::End => self.end,
        }
    }

    /// Left and right rails clamped between the two resolved boundaries.
    ///
    /// `None` until both ends are resolved.
    pub fn segment(&self, curve: &dyn Curve) -> Option<(Vec<Point3>, Vec<Point3>)> {
        let (a, b) = (self.start?, self.end?);
        let left = points_within_range(
            curve,
            &self.rails.left,
            curve.closest_key(&a.left),
            curve.closest_key(&b.left),
            &a.left,
            &b.left,
        );
        let right = points_within_range(
            curve,
            &self.rails.right,
            curve.closest_key(&a.right),
            curve.closest_key(&b.right),
            &a.right,
            &b.right,
        );
        Some((left, right))
    }
}
