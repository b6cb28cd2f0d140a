//! Turning a node route into a drawable path.
//!
//! [`RoadNetwork::find_path`] only yields graph node locations. A route
//! follows the curves between consecutive nodes, snaps its two ends onto
//! the curves nearest the requested start and target, and joins those
//! requested points with straight runs.

use roadnet_curve::sample::{sample_between, sample_line};
use roadnet_math::{up, Point3, Tolerance, Vec3};
use tracing::debug;

use crate::{CurveId, NetworkCost, RoadNetwork};

/// Routing options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Shift the path into the right-hand lane.
    pub right_offset: bool,
}

impl RoadNetwork {
    /// Dense path from `start` to `target` along the road network.
    ///
    /// The first point is `start` and the last is `target`. Returns an
    /// empty path when no route exists.
    pub fn route(&self, start: &Point3, target: &Point3, options: RouteOptions) -> Vec<Point3> {
        let (Some(a), Some(b)) = (self.nearest_node(start), self.nearest_node(target)) else {
            debug!("no graph nodes to route between");
            return Vec::new();
        };
        let ids = self.graph.find_path(a, b, &NetworkCost { network: self });
        if ids.is_empty() {
            debug!(?start, ?target, "no route found");
            return Vec::new();
        }
        let mut nodes = self.graph.locations(&ids);
        let (start_curve, end_curve) = self.snap_route_ends(&mut nodes, start, target);

        let mut path = self.follow_curves(&nodes, start_curve, end_curve);
        if path.is_empty() {
            debug!(?start, ?target, "route has no curve to follow");
            return path;
        }
        if options.right_offset {
            let distance = self.settings.mesh.road_width * self.settings.lane_offset;
            path = offset_right(&path, distance);
        }

        let step = self.settings.path_sample_step;
        let mut joined = sample_line(start, &path[0], step);
        extend_path(&mut joined, path.iter().copied());
        if let Some(last) = path.last() {
            extend_path(&mut joined, sample_line(last, target, step));
        }
        joined
    }

    /// Move the route's first and last nodes onto the curves nearest the
    /// requested points, returning those curves.
    fn snap_route_ends(
        &self,
        nodes: &mut Vec<Point3>,
        start: &Point3,
        target: &Point3,
    ) -> (Option<CurveId>, Option<CurveId>) {
        if nodes.is_empty() {
            return (None, None);
        }
        let (first_curve, last_curve) = match nodes.len() {
            0 | 1 => (None, None),
            n => (
                self.find_curve_between(&nodes[0], &nodes[1]),
                self.find_curve_between(&nodes[n - 2], &nodes[n - 1]),
            ),
        };
        let near_start = self.find_nearest_curve(start);
        let near_target = self.find_nearest_curve(target);
        let project = |id: CurveId, p: &Point3| self.find_nearest_point_on_curve(id, p);

        // Both ends on one curve: ride that curve only.
        if let (Some(s), Some(t)) = (near_start, near_target) {
            if s == t {
                if let (Some(from), Some(to)) = (project(s, start), project(s, target)) {
                    *nodes = vec![from, to];
                    return (Some(s), Some(s));
                }
            }
        }

        let mut start_curve = None;
        if let Some(id) = near_start {
            if let Some(snapped) = project(id, start) {
                if first_curve == Some(id) {
                    nodes[0] = snapped;
                } else {
                    nodes.insert(0, snapped);
                }
                start_curve = Some(id);
            }
        }

        let mut end_curve = None;
        if let Some(id) = near_target {
            if let Some(snapped) = project(id, target) {
                let len = nodes.len();
                match nodes.last_mut() {
                    Some(last) if last_curve == Some(id) && len > 1 => *last = snapped,
                    _ => nodes.push(snapped),
                }
                end_curve = Some(id);
            }
        }
        (start_curve, end_curve)
    }

    /// Sample along the curve joining each consecutive pair of nodes.
    fn follow_curves(
        &self,
        nodes: &[Point3],
        start_curve: Option<CurveId>,
        end_curve: Option<CurveId>,
    ) -> Vec<Point3> {
        let mut path = Vec::new();
        if nodes.len() < 2 {
            return path;
        }
        let last = nodes.len() - 2;
        for (i, pair) in nodes.windows(2).enumerate() {
            let (a, b) = (&pair[0], &pair[1]);
            let preset = if i == 0 {
                start_curve
            } else if i == last {
                end_curve
            } else {
                None
            };
            let id = preset
                .or_else(|| self.find_curve_between(a, b))
                .or_else(|| self.find_nearest_curve(&(a + (b - a) * 0.5)));
            match id.and_then(|id| self.curve(id)) {
                Some(curve) => {
                    let step = self.settings.path_sample_step;
                    extend_path(&mut path, sample_between(curve, step, a, b));
                }
                None => debug!(?a, ?b, "no curve between route nodes"),
            }
        }
        path
    }
}

/// Append `points`, dropping a first point that repeats the path's last.
fn extend_path(path: &mut Vec<Point3>, points: impl IntoIterator<Item = Point3>) {
    let mut points = points.into_iter().peekable();
    if let (Some(last), Some(first)) = (path.last(), points.peek()) {
        if Tolerance::DEFAULT.points_equal(last, first) {
            points.next();
        }
    }
    path.extend(points);
}

fn safe_normal(v: Vec3) -> Vec3 {
    let len = v.norm();
    if Tolerance::DEFAULT.is_parallel(len) {
        Vec3::zeros()
    } else {
        v / len
    }
}

/// Shift every point `distance` to the right of the local direction of
/// travel, averaging the incoming and outgoing directions at interior points.
fn offset_right(path: &[Point3], distance: f64) -> Vec<Point3> {
    let n = path.len();
    if n < 2 {
        return path.to_vec();
    }
    (0..n)
        .map(|i| {
            let outgoing = (i + 1 < n).then(|| safe_normal(path[i + 1] - path[i]));
            let incoming = (i > 0).then(|| safe_normal(path[i] - path[i - 1]));
            let forward = match (incoming, outgoing) {
                (Some(a), Some(b)) => safe_normal(a + b),
                (Some(d), None) | (None, Some(d)) => d,
                (None, None) => Vec3::zeros(),
            };
            path[i] + safe_normal(forward.cross(&up())) * distance
        })
        .collect()
}
