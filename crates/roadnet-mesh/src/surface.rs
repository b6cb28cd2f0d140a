//! Quad strips along curves and triangle fans at junctions.
//!
//! All emitted triangles wind counter-clockwise seen from above, matching
//! the +Z normals. Degenerate candidates are dropped.

use roadnet_curve::sample::order_clockwise;
use roadnet_math::Point3;
use tracing::{error, warn};

use crate::mesh::{is_degenerate_triangle, TriangleMesh};
use crate::MeshSettings;

const UP: [f32; 3] = [0.0, 0.0, 1.0];

fn lifted(p: &Point3, settings: &MeshSettings) -> Point3 {
    Point3::new(p.x, p.y, p.z + settings.surface_offset)
}

/// Z component of `(b - o) x (c - o)`.
fn turn(o: &Point3, b: &Point3, c: &Point3) -> f64 {
    (b.x - o.x) * (c.y - o.y) - (b.y - o.y) * (c.x - o.x)
}

fn push_checked(mesh: &mut TriangleMesh, pts: &[Point3], tri: [usize; 3], epsilon: f64) {
    let [a, b, c] = tri;
    if !is_degenerate_triangle(&pts[a], &pts[b], &pts[c], epsilon) {
        mesh.push_triangle(a as u32, b as u32, c as u32);
    }
}

/// Ribbon between two rails.
///
/// Vertices alternate left and right per sample. U grows with the sample
/// index; V is 0 on the left rail and 1 on the right. Returns `None` for
/// rails of different lengths or with fewer than two samples.
pub fn quad_strip(
    left: &[Point3],
    right: &[Point3],
    settings: &MeshSettings,
) -> Option<TriangleMesh> {
    if left.len() != right.len() {
        error!(
            left = left.len(),
            right = right.len(),
            "rail lengths differ, cannot build quad strip"
        );
        return None;
    }
    if left.len() < 2 {
        warn!(samples = left.len(), "not enough samples for a quad strip");
        return None;
    }

    let mut verts = Vec::with_capacity(left.len() * 2);
    for (l, r) in left.iter().zip(right) {
        verts.push(lifted(l, settings));
        verts.push(lifted(r, settings));
    }

    let mut mesh = TriangleMesh::new();
    for (i, v) in verts.iter().enumerate() {
        let u = (i / 2) as f64 * settings.strip_uv_scale;
        let vv = if i % 2 == 0 { 0.0 } else { 1.0 };
        mesh.push_vertex(v, UP, [u as f32, vv]);
    }

    let eps = settings.degenerate_epsilon;
    for i in (0..verts.len() - 2).step_by(2) {
        push_checked(&mut mesh, &verts, [i, i + 1, i + 2], eps);
        push_checked(&mut mesh, &verts, [i + 1, i + 3, i + 2], eps);
    }
    Some(mesh)
}

/// Fan from `center` to a rim ordered clockwise around its centroid.
///
/// The hub is vertex 0 with UV `(0.5, 0.5)`; rim UVs are planar offsets
/// from the hub scaled by `fan_uv_scale`. Returns `None` for fewer than two
/// rim points.
pub fn triangle_fan(
    center: &Point3,
    rim: &[Point3],
    settings: &MeshSettings,
) -> Option<TriangleMesh> {
    if rim.len() < 2 {
        warn!(rim = rim.len(), "not enough rim points for a fan");
        return None;
    }
    let mut ordered = rim.to_vec();
    if ordered.len() >= 3 {
        order_clockwise(&mut ordered);
    }

    let mut verts = Vec::with_capacity(ordered.len() + 1);
    verts.push(lifted(center, settings));
    verts.extend(ordered.iter().map(|p| lifted(p, settings)));

    let mut mesh = TriangleMesh::new();
    let scale = settings.fan_uv_scale;
    for v in &verts {
        let u = (v.x - center.x) * scale + 0.5;
        let w = (v.y - center.y) * scale + 0.5;
        mesh.push_vertex(v, UP, [u as f32, w as f32]);
    }

    let n = ordered.len();
    // Two rim points bound a single wedge; wrapping would repeat it reversed.
    let wedges = if n == 2 { 1 } else { n };
    let eps = settings.degenerate_epsilon;
    for i in 1..=wedges {
        let next = i % n + 1;
        // A hub off the rim centroid can see a wedge from behind.
        let tri = if turn(&verts[0], &verts[next], &verts[i]) >= 0.0 {
            [0, next, i]
        } else {
            [0, i, next]
        };
        push_checked(&mut mesh, &verts, tri, eps);
    }
    Some(mesh)
}
