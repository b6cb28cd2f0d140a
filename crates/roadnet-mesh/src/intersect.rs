//! Segment and rail intersection in the horizontal plane.

use roadnet_curve::sample::{nearest_or_farthest, Extremum};
use roadnet_math::{flatten, Aabb2, Point2, Point3, Tolerance};

/// Intersection point of segments `a1-a2` and `b1-b2`.
///
/// Endpoints count as hits. Parallel and collinear segments never intersect.
pub fn segment_intersection_2d(
    a1: &Point2,
    a2: &Point2,
    b1: &Point2,
    b2: &Point2,
) -> Option<Point2> {
    let s1 = a2 - a1;
    let s2 = b2 - b1;
    let denom = -s2.x * s1.y + s1.x * s2.y;
    if Tolerance::DEFAULT.is_parallel(denom) {
        return None;
    }
    let dx = a1.x - b1.x;
    let dy = a1.y - b1.y;
    let s = (-s1.y * dx + s1.x * dy) / denom;
    let t = (s2.x * dy - s2.y * dx) / denom;
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(a1 + s1 * t)
    } else {
        None
    }
}

/// Every crossing between two polylines, in segment order.
///
/// Elevation of a hit is the mean of the two segment start elevations.
pub fn polyline_intersections(a: &[Point3], b: &[Point3]) -> Vec<Point3> {
    let mut hits = Vec::new();
    if a.len() < 2 || b.len() < 2 {
        return hits;
    }
    if !Aabb2::from_points3(a).overlaps(&Aabb2::from_points3(b)) {
        return hits;
    }
    for wa in a.windows(2) {
        let (a1, a2) = (flatten(&wa[0]), flatten(&wa[1]));
        for wb in b.windows(2) {
            let (b1, b2) = (flatten(&wb[0]), flatten(&wb[1]));
            if let Some(p) = segment_intersection_2d(&a1, &a2, &b1, &b2) {
                hits.push(Point3::new(p.x, p.y, 0.5 * (wa[0].z + wb[0].z)));
            }
        }
    }
    hits
}

/// The crossing of two rails farthest from `reference`, if they cross.
pub fn rail_intersection(a: &[Point3], b: &[Point3], reference: &Point3) -> Option<Point3> {
    nearest_or_farthest(&polyline_intersections(a, b), reference, Extremum::Farthest)
}
