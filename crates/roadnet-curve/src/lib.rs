#![warn(missing_docs)]

//! Road centerline curves for the roadnet kernel.
//!
//! A [`Curve`] is an ordered run of control points with an arc-length
//! parameterization. Positions along it are addressed either by distance
//! from the start or by *input key*: `0.0` at the first control point,
//! `n - 1` at the last, with the fractional part interpolating within a
//! span. The [`sample`] module turns curves into the discrete point runs
//! every other subsystem consumes.

mod catmull_rom;
mod error;
mod polyline;
pub mod sample;

pub use catmull_rom::CatmullRomCurve;
pub use error::{CurveError, Result};
pub use polyline::PolylineCurve;

use roadnet_math::{Aabb2, Point3, Vec3};
use serde::{Deserialize, Serialize};

/// The kind of a curve (for match-based dispatch and serialization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Straight spans between control points.
    Polyline,
    /// Smooth Catmull-Rom spline through the control points.
    CatmullRom,
}

/// One of the two ends of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveEnd {
    /// The first control point.
    Start,
    /// The last control point.
    End,
}

/// A road centerline.
///
/// Implementations hold at least two control points at all times.
pub trait Curve: Send + Sync + std::fmt::Debug {
    /// The control points, in order.
    fn control_points(&self) -> &[Point3];

    /// Total arc length.
    fn length(&self) -> f64;

    /// Position at an input key (clamped to the key range).
    fn point_at_key(&self, key: f64) -> Point3;

    /// Arc length from the start to an input key.
    fn distance_at_key(&self, key: f64) -> f64;

    /// Position at an arc length from the start (clamped to `[0, length]`).
    fn point_at_distance(&self, distance: f64) -> Point3;

    /// Unnormalized derivative with respect to the input key.
    fn tangent_at_key(&self, key: f64) -> Vec3;

    /// Input key of the point on the curve closest to `point`.
    fn closest_key(&self, point: &Point3) -> f64;

    /// Horizontal footprint of the whole curve.
    fn bounds(&self) -> Aabb2;

    /// The kind of this curve.
    fn curve_type(&self) -> CurveKind;

    /// Insert a control point so that it becomes index `index`.
    fn insert_control_point(&mut self, index: usize, point: Point3) -> Result<()>;

    /// Move an existing control point.
    fn set_control_point(&mut self, index: usize, point: Point3) -> Result<()>;

    /// Clone this curve into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Curve>;

    /// Largest valid input key.
    fn max_key(&self) -> f64 {
        self.control_points().len().saturating_sub(1) as f64
    }

    /// First control point.
    fn start(&self) -> Point3 {
        self.control_points()[0]
    }

    /// Last control point.
    fn end(&self) -> Point3 {
        let pts = self.control_points();
        pts[pts.len() - 1]
    }

    /// Control point at one end.
    fn endpoint(&self, end: CurveEnd) -> Point3 {
        match end {
            CurveEnd::Start => self.start(),
            CurveEnd::End => self.end(),
        }
    }

    /// The end whose control point is nearer `point` (start on ties).
    fn nearest_end(&self, point: &Point3) -> CurveEnd {
        if (self.end() - point).norm_squared() < (self.start() - point).norm_squared() {
            CurveEnd::End
        } else {
            CurveEnd::Start
        }
    }

    /// Closest point on the curve to `point`.
    fn closest_point(&self, point: &Point3) -> Point3 {
        self.point_at_key(self.closest_key(point))
    }

    /// Tangent at the point on the curve closest to `point`.
    fn tangent_closest_to(&self, point: &Point3) -> Vec3 {
        self.tangent_at_key(self.closest_key(point))
    }

    /// Distance from `point` to the curve.
    fn distance_to(&self, point: &Point3) -> f64 {
        (self.closest_point(point) - point).norm()
    }
}

impl Clone for Box<dyn Curve> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Reject control point runs no curve can be built from.
pub(crate) fn check_points(points: &[Point3]) -> Result<()> {
    if points.len() < 2 {
        return Err(CurveError::TooFewPoints(points.len()));
    }
    if let Some(i) = points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        return Err(CurveError::NonFinite(i));
    }
    Ok(())
}

/// Split an input key into a span index and the fraction within it.
pub(crate) fn split_key(key: f64, point_count: usize) -> (usize, f64) {
    let max = point_count.saturating_sub(1) as f64;
    let k = if key.is_nan() { 0.0 } else { key.clamp(0.0, max) };
    let span = (k.floor() as usize).min(point_count.saturating_sub(2));
    (span, k - span as f64)
}
