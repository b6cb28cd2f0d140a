//! Smooth curve interpolating its control points.
//!
//! Each span is a cubic Hermite segment with Catmull-Rom tangents
//! (`(P[i+1] - P[i-1]) / 2` inside, one-sided differences at the ends).
//! Arc length is tabulated by chord summation at a fixed number of steps
//! per span and inverted by interpolation.

use roadnet_math::{Aabb2, Point3, Vec3};

use crate::{check_points, split_key, Curve, CurveError, CurveKind, Result};

/// Table steps per span.
const STEPS_PER_SPAN: usize = 16;

/// Refinement iterations for closest-point search.
const CLOSEST_ITERATIONS: usize = 40;

#[derive(Debug, Clone, Copy)]
struct Station {
    key: f64,
    distance: f64,
    point: Point3,
}

/// A Catmull-Rom centerline.
#[derive(Debug, Clone)]
pub struct CatmullRomCurve {
    points: Vec<Point3>,
    tangents: Vec<Vec3>,
    stations: Vec<Station>,
}

impl CatmullRomCurve {
    /// Build a smooth curve through `points` (at least two).
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        check_points(&points)?;
        let mut curve = Self {
            points,
            tangents: Vec::new(),
            stations: Vec::new(),
        };
        curve.rebuild();
        Ok(curve)
    }

    fn rebuild(&mut self) {
        let n = self.points.len();
        let pts = &self.points;
        self.tangents = (0..n)
            .map(|i| {
                if i == 0 {
                    pts[1] - pts[0]
                } else if i == n - 1 {
                    pts[n - 1] - pts[n - 2]
                } else {
                    (pts[i + 1] - pts[i - 1]) * 0.5
                }
            })
            .collect();

        let total = (n - 1) * STEPS_PER_SPAN;
        self.stations.clear();
        self.stations.reserve(total + 1);
        let mut distance = 0.0;
        let mut prev = self.points[0];
        for j in 0..=total {
            let key = j as f64 / STEPS_PER_SPAN as f64;
            let point = self.evaluate(key);
            distance += (point - prev).norm();
            prev = point;
            self.stations.push(Station {
                key,
                distance,
                point,
            });
        }
    }

    fn evaluate(&self, key: f64) -> Point3 {
        let (i, t) = split_key(key, self.points.len());
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;
        let p0 = self.points[i].coords;
        let p1 = self.points[i + 1].coords;
        Point3::from(p0 * h00 + self.tangents[i] * h10 + p1 * h01 + self.tangents[i + 1] * h11)
    }

    fn derivative(&self, key: f64) -> Vec3 {
        let (i, t) = split_key(key, self.points.len());
        let t2 = t * t;
        let d00 = 6.0 * t2 - 6.0 * t;
        let d10 = 3.0 * t2 - 4.0 * t + 1.0;
        let d01 = -6.0 * t2 + 6.0 * t;
        let d11 = 3.0 * t2 - 2.0 * t;
        let p0 = self.points[i].coords;
        let p1 = self.points[i + 1].coords;
        p0 * d00 + self.tangents[i] * d10 + p1 * d01 + self.tangents[i + 1] * d11
    }

    fn key_at_distance(&self, distance: f64) -> f64 {
        let last = self.stations.len() - 1;
        let upper = self.stations.partition_point(|s| s.distance <= distance);
        let j = upper.saturating_sub(1).min(last.saturating_sub(1));
        let a = self.stations[j];
        let b = self.stations[j + 1];
        let span = b.distance - a.distance;
        if span <= 0.0 {
            return a.key;
        }
        let t = ((distance - a.distance) / span).clamp(0.0, 1.0);
        a.key + (b.key - a.key) * t
    }
}

impl Curve for CatmullRomCurve {
    fn control_points(&self) -> &[Point3] {
        &self.points
    }

    fn length(&self) -> f64 {
        self.stations.last().map_or(0.0, |s| s.distance)
    }

    fn point_at_key(&self, key: f64) -> Point3 {
        self.evaluate(key)
    }

    fn distance_at_key(&self, key: f64) -> f64 {
        let max = self.max_key();
        let k = if key.is_nan() { 0.0 } else { key.clamp(0.0, max) };
        let pos = k * STEPS_PER_SPAN as f64;
        let j = (pos.floor() as usize).min(self.stations.len() - 2);
        let t = pos - j as f64;
        let a = self.stations[j].distance;
        let b = self.stations[j + 1].distance;
        a + (b - a) * t
    }

    fn point_at_distance(&self, distance: f64) -> Point3 {
        if distance.is_nan() || distance <= 0.0 {
            return self.points[0];
        }
        if distance >= self.length() {
            return self.points[self.points.len() - 1];
        }
        self.evaluate(self.key_at_distance(distance))
    }

    fn tangent_at_key(&self, key: f64) -> Vec3 {
        let d = self.derivative(key);
        if d.norm_squared() > 0.0 {
            return d;
        }
        // Cusp at a doubled control point: use the chord through the neighbourhood.
        let step = 1.0 / STEPS_PER_SPAN as f64;
        self.evaluate(key + step) - self.evaluate(key - step)
    }

    fn closest_key(&self, point: &Point3) -> f64 {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (j, s) in self.stations.iter().enumerate() {
            let d = (s.point - point).norm_squared();
            if d < best_dist {
                best_dist = d;
                best = j;
            }
        }

        let last = self.stations.len() - 1;
        let mut lo = self.stations[best.saturating_sub(1)].key;
        let mut hi = self.stations[(best + 1).min(last)].key;
        let dist = |k: f64| (self.evaluate(k) - point).norm_squared();
        for _ in 0..CLOSEST_ITERATIONS {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            if dist(m1) < dist(m2) {
                hi = m2;
            } else {
                lo = m1;
            }
        }
        let refined = 0.5 * (lo + hi);
        if dist(refined) <= best_dist {
            refined
        } else {
            self.stations[best].key
        }
    }

    fn bounds(&self) -> Aabb2 {
        let mut b = Aabb2::from_points3(self.stations.iter().map(|s| &s.point));
        b.include_box(&Aabb2::from_points3(&self.points));
        b
    }

    fn curve_type(&self) -> CurveKind {
        CurveKind::CatmullRom
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn arc() -> CatmullRomCurve {
        // Quarter circle of radius 100 through five points.
        let pts = (0..5)
            .map(|i| {
                let a = (i as f64) * PI / 8.0;
                Point3::new(100.0 * a.cos(), 100.0 * a.sin(), 0.0)
            })
            .collect();
        CatmullRomCurve::new(pts).unwrap()
    }

    #[test]
    fn test_interpolates_control_points() {
        let c = arc();
        for (i, p) in c.control_points().iter().enumerate() {
            let q = c.point_at_key(i as f64);
            assert_relative_eq!((q - p).norm(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_length_close_to_arc() {
        let c = arc();
        let expected = 100.0 * PI / 2.0;
        assert!((c.length() - expected).abs() < 1.5, "length {}", c.length());
    }

    #[test]
    fn test_straight_line_is_exact() {
        let c = CatmullRomCurve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
        ])
        .unwrap();
        assert_relative_eq!(c.length(), 100.0, epsilon = 1e-9);
        let p = c.point_at_distance(30.0);
        assert_relative_eq!(p.x, 30.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn test_distance_round_trip() {
        let c = arc();
        for d in [0.0, 10.0, 77.0, 120.0] {
            let p = c.point_at_distance(d);
            let k = c.closest_key(&p);
            assert!((c.distance_at_key(k) - d).abs() < 0.5, "d = {d}");
        }
    }

    #[test]
    fn test_end_points_exact() {
        let c = arc();
        assert_eq!(c.point_at_distance(c.length()), c.end());
        assert_eq!(c.point_at_distance(0.0), c.start());
    }

    #[test]
    fn test_closest_key_off_curve() {
        let c = arc();
        // Radially outward from the midpoint of the arc.
        let a = PI / 4.0;
        let probe = Point3::new(150.0 * a.cos(), 150.0 * a.sin(), 0.0);
        let k = c.closest_key(&probe);
        assert!((k - 2.0).abs() < 0.05, "key {k}");
    }

    #[test]
    fn test_tangent_follows_curve() {
        let c = arc();
        let t0 = c.tangent_at_key(0.0).normalize();
        assert!(t0.y > 0.9);
        let t_end = c.tangent_at_key(c.max_key()).normalize();
        assert!(t_end.x < -0.9);
    }

    #[test]
    fn test_bounds_cover_curve() {
        let c = arc();
        let b = c.bounds();
        assert!(b.max.x >= 100.0 - 1e-9);
        assert!(b.max.y >= 100.0 - 1e-9);
    }

    #[test]
    fn test_edit_rebuilds_table() {
        let mut c = CatmullRomCurve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
        ])
        .unwrap();
        c.set_control_point(1, Point3::new(200.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(c.length(), 200.0, epsilon = 1e-9);
        c.insert_control_point(1, Point3::new(100.0, 0.0, 0.0)).unwrap();
        assert_eq!(c.control_points().len(), 3);
        assert_relative_eq!(c.distance_at_key(1.0), 100.0, epsilon = 1e-6);
    }
}
