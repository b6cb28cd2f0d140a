//! Curve made of straight spans between control points.

use roadnet_math::{Aabb2, Point3, Vec3};

use crate::{check_points, split_key, Curve, CurveError, CurveKind, Result};

/// A polyline centerline with an exact arc-length table.
#[derive(Debug, Clone)]
pub struct PolylineCurve {
    points: Vec<Point3>,
    /// Arc length at each control point; `cumulative[0] == 0`.
    cumulative: Vec<f64>,
}

impl PolylineCurve {
    /// Build a polyline through `points` (at least two).
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        check_points(&points)?;
        let mut curve = Self {
            points,
            cumulative: Vec::new(),
        };
        curve.rebuild();
        Ok(curve)
    }

    fn rebuild(&mut self) {
        self.cumulative.clear();
        self.cumulative.reserve(self.points.len());
        let mut total = 0.0;
        self.cumulative.push(total);
        for w in self.points.windows(2) {
            total += (w[1] - w[0]).norm();
            self.cumulative.push(total);
        }
    }
}

impl Curve for PolylineCurve {
    fn control_points(&self) -> &[Point3] {
        &self.points
    }

    fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    fn point_at_key(&self, key: f64) -> Point3 {
        let (i, t) = split_key(key, self.points.len());
        let a = self.points[i];
        let b = self.points[i + 1];
        a + (b - a) * t
    }

    fn distance_at_key(&self, key: f64) -> f64 {
        let (i, t) = split_key(key, self.points.len());
        let span = self.cumulative[i + 1] - self.cumulative[i];
        self.cumulative[i] + span * t
    }

    fn point_at_distance(&self, distance: f64) -> Point3 {
        let n = self.points.len();
        if distance.is_nan() || distance <= 0.0 {
            return self.points[0];
        }
        if distance >= self.length() {
            return self.points[n - 1];
        }
        let upper = self.cumulative.partition_point(|&c| c <= distance);
        let i = upper.saturating_sub(1).min(n - 2);
        let span = self.cumulative[i + 1] - self.cumulative[i];
        if span <= 0.0 {
            return self.points[i];
        }
        let t = (distance - self.cumulative[i]) / span;
        self.points[i] + (self.points[i + 1] - self.points[i]) * t
    }

    fn tangent_at_key(&self, key: f64) -> Vec3 {
        let (i, _) = split_key(key, self.points.len());
        let d = self.points[i + 1] - self.points[i];
        if d.norm_squared() > 0.0 {
            return d;
        }
        // Coincident control points: borrow the direction of a neighbouring span.
        self.points
            .windows(2)
            .skip(i)
            .chain(self.points.windows(2).take(i).rev())
            .map(|w| w[1] - w[0])
            .find(|v| v.norm_squared() > 0.0)
            .unwrap_or_else(Vec3::zeros)
    }

    fn closest_key(&self, point: &Point3) -> f64 {
        let mut best_key = 0.0;
        let mut best_dist = f64::INFINITY;
        for (i, w) in self.points.windows(2).enumerate() {
            let d = w[1] - w[0];
            let len_sq = d.norm_squared();
            let t = if len_sq > 0.0 {
                ((point - w[0]).dot(&d) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let dist = (w[0] + d * t - point).norm_squared();
            if dist < best_dist {
                best_dist = dist;
                best_key = i as f64 + t;
            }
        }
        best_key
    }

    fn bounds(&self) -> Aabb2 {
        Aabb2::from_points3(&self.points)
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::Polyline
    }

    fn insert_control_point(&mut self, index: usize, point: Point3) -> Result<()> {
        if index > self.points.len() {
            return Err(CurveError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        self.points.insert(index, point);
        if let Err(e) = check_points(&self.points) {
            self.points.remove(index);
            return Err(e);
        }
        self.rebuild();
        Ok(())
    }

    fn set_control_point(&mut self, index: usize, point: Point3) -> Result<()> {
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(CurveError::IndexOutOfRange { index, len })?;
        let old = std::mem::replace(slot, point);
        if let Err(e) = check_points(&self.points) {
            self.points[index] = old;
            return Err(e);
        }
        self.rebuild();
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Curve> {
        Box::new(self.clone())
    }
}
