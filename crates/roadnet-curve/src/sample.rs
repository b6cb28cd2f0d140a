//! Discretization of curves into point runs.
//!
//! Every function here is total: bad input (non-positive step or width,
//! empty point sets) yields an empty result or `None`, never a panic.

use roadnet_math::{up, Point3, Tolerance, Vec3};
use tracing::warn;

use crate::Curve;

/// Left and right offset rails of a sampled centerline.
///
/// Parallel arrays: `left[i]` and `right[i]` are the offsets of the i-th
/// centerline sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rails {
    /// Points offset to the left of the direction of travel.
    pub left: Vec<Point3>,
    /// Points offset to the right of the direction of travel.
    pub right: Vec<Point3>,
}

impl Rails {
    /// Number of samples per rail.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True if the rails hold no samples.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Which end of a distance ranking to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    /// Smallest distance.
    Nearest,
    /// Largest distance.
    Farthest,
}

/// Append the exact endpoint, replacing a last sample that already lands on it.
fn push_end(points: &mut Vec<Point3>, end: Point3) {
    match points.last_mut() {
        Some(last) if Tolerance::DEFAULT.points_equal(last, &end) => *last = end,
        _ => points.push(end),
    }
}

/// Most whole steps a single sampling call will take.
const MAX_SAMPLES: f64 = 1_000_000.0;

/// Number of whole `step`s in `span`, or `None` past [`MAX_SAMPLES`].
fn sample_count(span: f64, step: f64) -> Option<usize> {
    let steps = (span / step).floor();
    if steps.is_nan() || steps > MAX_SAMPLES {
        warn!(span, step, "sample step too small for span, skipping");
        return None;
    }
    Some(steps.max(0.0) as usize)
}

/// Points every `step` units of arc length from the start, plus the end.
///
/// The last interval may be shorter than `step`. The last point is exactly
/// the curve's last control point.
pub fn sample(curve: &dyn Curve, step: f64) -> Vec<Point3> {
    let length = curve.length();
    if step.is_nan() || step <= 0.0 || length.is_nan() || length <= 0.0 {
        return Vec::new();
    }
    let Some(count) = sample_count(length, step) else {
        return Vec::new();
    };
    let mut points = Vec::with_capacity(count + 2);
    for i in 0..=count {
        let d = i as f64 * step;
        if d > length {
            break;
        }
        points.push(curve.point_at_distance(d));
    }
    push_end(&mut points, curve.point_at_distance(length));
    points
}

/// Points every `step` units along the curve from the projection of `a`
/// to the projection of `b`.
///
/// Both projections are included, and the result runs from `a` towards `b`
/// whichever way the curve is parameterized.
pub fn sample_between(curve: &dyn Curve, step: f64, a: &Point3, b: &Point3) -> Vec<Point3> {
    if step.is_nan() || step <= 0.0 {
        return Vec::new();
    }
    let mut key_a = curve.closest_key(a);
    let mut key_b = curve.closest_key(b);
    let reversed = key_a > key_b;
    if reversed {
        std::mem::swap(&mut key_a, &mut key_b);
    }
    let start = curve.distance_at_key(key_a);
    let end = curve.distance_at_key(key_b);

    let Some(count) = sample_count(end - start, step) else {
        return Vec::new();
    };
    let mut points = Vec::with_capacity(count + 2);
    for i in 0..=count {
        let d = start + i as f64 * step;
        if d > end {
            break;
        }
        points.push(curve.point_at_distance(d));
    }
    push_end(&mut points, curve.point_at_distance(end));
    if reversed {
        points.reverse();
    }
    points
}

/// Points every `step` units along the straight line from `start` to `end`,
/// with `end` always last.
pub fn sample_line(start: &Point3, end: &Point3, step: f64) -> Vec<Point3> {
    if step.is_nan() || step <= 0.0 {
        return Vec::new();
    }
    let delta = end - start;
    let total = delta.norm();
    if Tolerance::DEFAULT.is_zero(total) {
        return vec![*end];
    }
    let Some(count) = sample_count(total, step) else {
        return Vec::new();
    };
    let mut points: Vec<Point3> = (0..=count)
        .map(|i| start + delta * ((i as f64 * step) / total))
        .collect();
    push_end(&mut points, *end);
    points
}

/// Unit vector to the right of the curve's direction at the point closest
/// to `point`, or `None` where the tangent has no horizontal extent.
fn right_vector(curve: &dyn Curve, point: &Point3) -> Option<Vec3> {
    let right = curve.tangent_closest_to(point).cross(&up());
    let len = right.norm();
    if Tolerance::DEFAULT.is_parallel(len) {
        return None;
    }
    Some(right / len)
}

/// Left and right offsets of a single point by half of `width`.
pub fn offset_point(curve: &dyn Curve, point: &Point3, width: f64) -> Option<(Point3, Point3)> {
    if width.is_nan() || width <= 0.0 {
        return None;
    }
    let r = right_vector(curve, point)? * (width * 0.5);
    Some((point - r, point + r))
}

/// Offset every point by half of `width` to either side of the curve.
///
/// A point whose tangent is degenerate borrows the side vector of the
/// nearest preceding (or, failing that, following) well-defined point, so
/// the rails stay index-aligned with `points`. Returns `None` if no point
/// has a usable tangent.
pub fn offset_points(curve: &dyn Curve, points: &[Point3], width: f64) -> Option<Rails> {
    if width.is_nan() || width <= 0.0 || points.is_empty() {
        return None;
    }
    let mut sides: Vec<Option<Vec3>> = points.iter().map(|p| right_vector(curve, p)).collect();
    let Some(first_valid) = sides.iter().flatten().next().copied() else {
        warn!(count = points.len(), "no usable tangent, skipping offset");
        return None;
    };

    let mut carry = first_valid;
    for side in sides.iter_mut() {
        match side {
            Some(v) => carry = *v,
            None => *side = Some(carry),
        }
    }

    let half = width * 0.5;
    let mut rails = Rails {
        left: Vec::with_capacity(points.len()),
        right: Vec::with_capacity(points.len()),
    };
    for (p, side) in points.iter().zip(sides) {
        let r = side.unwrap_or(first_valid) * half;
        rails.left.push(p - r);
        rails.right.push(p + r);
    }
    Some(rails)
}

/// Clamp a point run to the curve span between `key_a` and `key_b`.
///
/// Points whose input key falls at or before the span start collapse to the
/// matching location, points at or past the span end collapse to the other,
/// and points strictly inside pass through. The key pair may be given in
/// either order; the locations follow their keys.
pub fn points_within_range(
    curve: &dyn Curve,
    points: &[Point3],
    key_a: f64,
    key_b: f64,
    loc_a: &Point3,
    loc_b: &Point3,
) -> Vec<Point3> {
    let (lo, hi, loc_lo, loc_hi) = if key_a > key_b {
        (key_b, key_a, loc_b, loc_a)
    } else {
        (key_a, key_b, loc_a, loc_b)
    };
    points
        .iter()
        .map(|p| {
            let k = curve.closest_key(p);
            if k <= lo {
                *loc_lo
            } else if k >= hi {
                *loc_hi
            } else {
                *p
            }
        })
        .collect()
}

/// The point nearest to or farthest from `reference`; first wins on ties.
pub fn nearest_or_farthest(
    points: &[Point3],
    reference: &Point3,
    mode: Extremum,
) -> Option<Point3> {
    let mut best: Option<(f64, Point3)> = None;
    for p in points {
        let d = (p - reference).norm_squared();
        let better = match (best, mode) {
            (None, _) => true,
            (Some((b, _)), Extremum::Nearest) => d < b,
            (Some((b, _)), Extremum::Farthest) => d > b,
        };
        if better {
            best = Some((d, *p));
        }
    }
    best.map(|(_, p)| p)
}

/// Sort points clockwise about their centroid (descending `atan2` angle).
///
/// Fewer than three points have no meaningful order and are left as is.
pub fn order_clockwise(points: &mut [Point3]) {
    if points.len() < 3 {
        warn!(count = points.len(), "need at least 3 points to order");
        return;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    let (cx, cy) = (sx / n, sy / n);
    let angle = |p: &Point3| (p.y - cy).atan2(p.x - cx);
    points.sort_by(|a, b| angle(b).total_cmp(&angle(a)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatmullRomCurve, PolylineCurve};
    use approx::assert_relative_eq;

    fn assert_coords(actual: impl IntoIterator<Item = f64>, expected: &[f64]) {
        let actual: Vec<f64> = actual.into_iter().collect();
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, *e, epsilon = 1e-9);
        }
    }

    fn straight(len: f64) -> PolylineCurve {
        PolylineCurve::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(len, 0.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_sample_includes_irregular_end() {
        let c = straight(250.0);
        let pts = sample(&c, 100.0);
        assert_coords(pts.iter().map(|p| p.x), &[0.0, 100.0, 200.0, 250.0]);
    }

    #[test]
    fn test_sample_exact_multiple_has_no_duplicate_end() {
        let c = straight(300.0);
        let pts = sample(&c, 100.0);
        assert_eq!(pts.len(), 4);
        assert_eq!(*pts.last().unwrap(), Point3::new(300.0, 0.0, 0.0));
    }

    #[test]
    fn test_sample_rejects_bad_step() {
        let c = straight(300.0);
        assert!(sample(&c, 0.0).is_empty());
        assert!(sample(&c, -1.0).is_empty());
        assert!(sample(&c, f64::NAN).is_empty());
    }

    #[test]
    fn test_tiny_step_is_rejected() {
        let c = straight(1000.0);
        assert!(sample(&c, 1e-300).is_empty());
        let (a, b) = (Point3::new(0.0, 0.0, 0.0), Point3::new(1000.0, 0.0, 0.0));
        assert!(sample_between(&c, 1e-300, &a, &b).is_empty());
        assert!(sample_line(&a, &b, 1e-300).is_empty());
        // A fine but bounded step still samples.
        assert_eq!(sample(&c, 0.0078125).len(), 128_001);
    }

    #[test]
    fn test_sample_zero_length_curve() {
        let c = PolylineCurve::new(vec![Point3::origin(), Point3::origin()]).unwrap();
        assert!(sample(&c, 10.0).is_empty());
    }

    #[test]
    fn test_sample_spacing_on_smooth_curve() {
        let c = CatmullRomCurve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(300.0, 200.0, 0.0),
            Point3::new(600.0, 0.0, 20.0),
        ])
        .unwrap();
        let step = 50.0;
        let pts = sample(&c, step);
        assert_eq!(pts[0], c.start());
        assert_eq!(*pts.last().unwrap(), c.end());
        for w in pts.windows(2) {
            // Chords never exceed the arc length between samples.
            assert!((w[1] - w[0]).norm() <= step * 1.01);
        }
    }

    #[test]
    fn test_sample_between_follows_caller_direction() {
        let c = straight(1000.0);
        let a = Point3::new(850.0, 30.0, 0.0);
        let b = Point3::new(100.0, -30.0, 0.0);
        let pts = sample_between(&c, 200.0, &a, &b);
        assert_coords(pts.iter().map(|p| p.x), &[850.0, 700.0, 500.0, 300.0, 100.0]);

        let fwd = sample_between(&c, 200.0, &b, &a);
        assert_coords(fwd.iter().map(|p| p.x), &[100.0, 300.0, 500.0, 700.0, 850.0]);
    }

    #[test]
    fn test_sample_between_same_point() {
        let c = straight(1000.0);
        let p = Point3::new(400.0, 0.0, 0.0);
        let pts = sample_between(&c, 100.0, &p, &p);
        assert_eq!(pts.len(), 1);
        assert_relative_eq!(pts[0].x, 400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sample_line() {
        let pts = sample_line(&Point3::origin(), &Point3::new(0.0, 250.0, 0.0), 100.0);
        assert_coords(pts.iter().map(|p| p.y), &[0.0, 100.0, 200.0, 250.0]);
        let p = Point3::new(1.0, 1.0, 1.0);
        assert_eq!(sample_line(&p, &p, 100.0), vec![p]);
        assert!(sample_line(&p, &Point3::origin(), 0.0).is_empty());
    }

    #[test]
    fn test_offset_points_sides() {
        let c = straight(200.0);
        let pts = sample(&c, 100.0);
        let rails = offset_points(&c, &pts, 20.0).unwrap();
        assert_eq!(rails.len(), pts.len());
        // Travelling +X with Z up, the right-hand side is -Y.
        for (l, r) in rails.left.iter().zip(&rails.right) {
            assert_relative_eq!(l.y, 10.0);
            assert_relative_eq!(r.y, -10.0);
        }
    }

    #[test]
    fn test_offset_rejects_bad_width() {
        let c = straight(200.0);
        let pts = sample(&c, 100.0);
        assert!(offset_points(&c, &pts, 0.0).is_none());
        assert!(offset_point(&c, &pts[0], -5.0).is_none());
    }

    #[test]
    fn test_offset_vertical_curve_fails() {
        let c = PolylineCurve::new(vec![Point3::origin(), Point3::new(0.0, 0.0, 100.0)]).unwrap();
        let pts = sample(&c, 50.0);
        assert!(offset_points(&c, &pts, 10.0).is_none());
        assert!(offset_point(&c, &pts[1], 10.0).is_none());
    }

    #[test]
    fn test_offset_borrows_neighbour_side_for_vertical_span() {
        let c = PolylineCurve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 100.0),
        ])
        .unwrap();
        let pts = vec![Point3::new(50.0, 0.0, 0.0), Point3::new(100.0, 0.0, 60.0)];
        let rails = offset_points(&c, &pts, 10.0).unwrap();
        assert_relative_eq!(rails.right[1].y, -5.0);
        assert_relative_eq!(rails.right[1].z, 60.0);
    }

    #[test]
    fn test_points_within_range_clamps() {
        let c = straight(1000.0);
        let pts = sample(&c, 100.0);
        let loc_a = Point3::new(250.0, 0.0, 0.0);
        let loc_b = Point3::new(720.0, 0.0, 0.0);
        let key_a = c.closest_key(&loc_a);
        let key_b = c.closest_key(&loc_b);
        let clamped = points_within_range(&c, &pts, key_b, key_a, &loc_b, &loc_a);
        assert_eq!(clamped.len(), pts.len());
        assert_eq!(clamped[0], loc_a);
        assert_eq!(clamped[2], loc_a);
        assert_eq!(clamped[3], pts[3]);
        assert_eq!(clamped[7], pts[7]);
        assert_eq!(clamped[8], loc_b);
        assert_eq!(*clamped.last().unwrap(), loc_b);

        let again = points_within_range(&c, &clamped, key_a, key_b, &loc_a, &loc_b);
        assert_eq!(again, clamped);
    }

    #[test]
    fn test_nearest_or_farthest_ties_first_wins() {
        let pts = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(0.0, -3.0, 0.0),
        ];
        let o = Point3::origin();
        assert_eq!(nearest_or_farthest(&pts, &o, Extremum::Nearest), Some(pts[0]));
        assert_eq!(nearest_or_farthest(&pts, &o, Extremum::Farthest), Some(pts[2]));
        assert_eq!(nearest_or_farthest(&[], &o, Extremum::Nearest), None);
    }

    #[test]
    fn test_order_clockwise() {
        let mut pts = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        order_clockwise(&mut pts);
        assert_eq!(
            pts,
            vec![
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, -1.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_order_clockwise_is_permutation_with_decreasing_angle() {
        let mut pts: Vec<Point3> = [3.0, 0.5, 5.0, 1.7, 4.2, 2.9]
            .iter()
            .map(|a: &f64| Point3::new(10.0 + a.cos(), 20.0 + a.sin(), 0.0))
            .collect();
        let original = pts.clone();
        order_clockwise(&mut pts);
        for p in &original {
            assert!(pts.contains(p));
        }
        let n = pts.len() as f64;
        let cx = pts.iter().map(|p| p.x).sum::<f64>() / n;
        let cy = pts.iter().map(|p| p.y).sum::<f64>() / n;
        let angles: Vec<f64> = pts.iter().map(|p| (p.y - cy).atan2(p.x - cx)).collect();
        for w in angles.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn test_order_clockwise_leaves_pairs_alone() {
        let mut pts = vec![Point3::new(0.0, -1.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        let before = pts.clone();
        order_clockwise(&mut pts);
        assert_eq!(pts, before);
    }
}
