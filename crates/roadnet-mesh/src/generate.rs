//! Whole-network surface generation.

use std::collections::HashMap;
use std::hash::Hash;

use rayon::prelude::*;
use roadnet_curve::sample::{
    nearest_or_farthest, offset_point, offset_points, sample, Extremum,
};
use roadnet_curve::Curve;
use roadnet_math::{Point3, Tolerance};
use tracing::{debug, warn};

use crate::intersect::rail_intersection;
use crate::rails::{Boundary, RailPair};
use crate::surface::{quad_strip, triangle_fan};
use crate::topology::{find_clusters, find_free_endpoints, IntersectionCluster};
use crate::{MeshSettings, RoadMesh, RoadMeshKind};

fn push_unique(points: &mut Vec<Point3>, p: Point3) {
    if !points.iter().any(|q| Tolerance::DEFAULT.points_equal(q, &p)) {
        points.push(p);
    }
}

/// Sample and offset every curve. `None` where a curve yields no rails.
pub fn build_rails<K: Copy + Send + Sync>(
    curves: &[(K, &dyn Curve)],
    settings: &MeshSettings,
) -> Vec<Option<RailPair<K>>> {
    curves
        .par_iter()
        .map(|(key, curve)| {
            let centerline = sample(*curve, settings.sample_step);
            let rails = offset_points(*curve, &centerline, settings.road_width)?;
            Some(RailPair::new(*key, centerline, rails))
        })
        .collect()
}

/// Boundary for one side: the farthest crossing with another curve's rails,
/// or the rail end nearest the junction when nothing crosses.
fn side_boundary(hits: &[Point3], rail: &[Point3], center: &Point3) -> Option<Point3> {
    if !hits.is_empty() {
        return nearest_or_farthest(hits, center, Extremum::Farthest);
    }
    let ends = [*rail.first()?, *rail.last()?];
    nearest_or_farthest(&ends, center, Extremum::Nearest)
}

/// Resolve the boundaries of every member curve at one junction.
///
/// Records each member's boundary at the end touching the junction and
/// returns the junction rim points.
pub fn resolve_junction<K: Copy + Eq + Hash>(
    cluster: &IntersectionCluster<K>,
    curves: &[(K, &dyn Curve)],
    rails: &mut [Option<RailPair<K>>],
    index: &HashMap<K, usize>,
) -> Vec<Point3> {
    let members: Vec<usize> = cluster
        .curves
        .iter()
        .filter_map(|k| index.get(k).copied())
        .filter(|&i| rails[i].is_some())
        .collect();

    let mut rim = Vec::new();
    let mut resolved = Vec::with_capacity(members.len());
    for &i in &members {
        let Some(a) = rails[i].as_ref() else { continue };
        let mut left_hits = Vec::new();
        let mut right_hits = Vec::new();
        for &j in &members {
            if j == i {
                continue;
            }
            let Some(b) = rails[j].as_ref() else { continue };
            let (left, right) = (&a.rails.left, &a.rails.right);
            for (ra, rb) in [(left, &b.rails.left), (left, &b.rails.right)] {
                if let Some(p) = rail_intersection(ra, rb, &cluster.point) {
                    push_unique(&mut left_hits, p);
                }
            }
            for (ra, rb) in [(right, &b.rails.left), (right, &b.rails.right)] {
                if let Some(p) = rail_intersection(ra, rb, &cluster.point) {
                    push_unique(&mut right_hits, p);
                }
            }
        }

        let left = side_boundary(&left_hits, &a.rails.left, &cluster.point);
        let right = side_boundary(&right_hits, &a.rails.right, &cluster.point);
        let (Some(left), Some(right)) = (left, right) else {
            continue;
        };
        push_unique(&mut rim, left);
        push_unique(&mut rim, right);
        let end = curves[i].1.nearest_end(&cluster.point);
        resolved.push((i, end, Boundary { left, right }));
    }

    for (i, end, boundary) in resolved {
        if let Some(pair) = rails[i].as_mut() {
            pair.resolve(end, boundary);
        }
    }
    rim
}

/// Generate road surface meshes for a set of curves.
///
/// Emits one fan per junction, then one quad strip per curve whose two ends
/// were resolved, in input order. Pieces that cannot be built, or that lose
/// every triangle to degeneracy, are skipped with a diagnostic.
pub fn generate_road_mesh<K: Copy + Eq + Hash + Send + Sync>(
    curves: &[(K, &dyn Curve)],
    settings: &MeshSettings,
) -> Vec<RoadMesh<K>> {
    if let Err(e) = settings.validate() {
        warn!(error = %e, "skipping mesh generation");
        return Vec::new();
    }
    let index: HashMap<K, usize> = curves
        .iter()
        .enumerate()
        .map(|(i, (k, _))| (*k, i))
        .collect();
    let mut rails = build_rails(curves, settings);

    let clusters = find_clusters(curves, settings.junction_tolerance);
    let free = find_free_endpoints(curves, &clusters, settings.free_endpoint_tolerance);
    debug!(
        curves = curves.len(),
        junctions = clusters.len(),
        free_endpoints = free.len(),
        "resolved network topology"
    );

    let mut meshes = Vec::new();
    for cluster in &clusters {
        let rim = resolve_junction(cluster, curves, &mut rails, &index);
        match triangle_fan(&cluster.point, &rim, settings) {
            Some(mesh) if mesh.num_triangles() > 0 => meshes.push(RoadMesh {
                kind: RoadMeshKind::Junction {
                    center: cluster.point,
                },
                mesh,
            }),
            Some(_) => warn!(
                x = cluster.point.x,
                y = cluster.point.y,
                "junction fan is empty"
            ),
            None => {}
        }
    }

    for endpoint in &free {
        let Some(&i) = index.get(&endpoint.curve) else { continue };
        let Some(pair) = rails[i].as_mut() else { continue };
        let offset = offset_point(curves[i].1, &endpoint.point, settings.road_width);
        if let Some((left, right)) = offset {
            pair.resolve(endpoint.end, Boundary { left, right });
        }
    }

    for (i, (key, curve)) in curves.iter().enumerate() {
        let Some(pair) = rails[i].as_ref() else {
            warn!(curve = i, "curve produced no rails");
            continue;
        };
        let Some((left, right)) = pair.segment(*curve) else {
            if (curve.start() - curve.end()).norm() <= settings.junction_tolerance {
                // Rail clamping keys points by closest input key, which is
                // ambiguous where a curve closes on itself.
                warn!(curve = i, "closed curve meets a junction, skipping segment");
            } else {
                warn!(curve = i, "curve has unresolved ends, skipping segment");
            }
            continue;
        };
        match quad_strip(&left, &right, settings) {
            Some(mesh) if mesh.num_triangles() > 0 => meshes.push(RoadMesh {
                kind: RoadMeshKind::Segment { curve: *key },
                mesh,
            }),
            Some(_) => warn!(curve = i, "segment strip is empty"),
            None => {}
        }
    }
    meshes
}
