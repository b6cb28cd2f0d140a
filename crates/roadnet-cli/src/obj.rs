//! Wavefront OBJ export of road meshes.

use std::fmt::Write;

use roadnet::{CurveId, RoadMesh, RoadMeshKind};

/// Render meshes as one OBJ document, one object per mesh.
pub fn write_obj(meshes: &[RoadMesh<CurveId>]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# roadnet OBJ export")?;
    // OBJ indices are 1-based and global across objects.
    let mut base = 1u32;
    for (i, piece) in meshes.iter().enumerate() {
        let name = match piece.kind {
            RoadMeshKind::Segment { .. } => "segment",
            RoadMeshKind::Junction { .. } => "junction",
        };
        writeln!(out, "o {name}_{i}")?;
        let mesh = &piece.mesh;
        for v in mesh.vertices.chunks_exact(3) {
            writeln!(out, "v {} {} {}", v[0], v[1], v[2])?;
        }
        for uv in mesh.uvs.chunks_exact(2) {
            writeln!(out, "vt {} {}", uv[0], uv[1])?;
        }
        for n in mesh.normals.chunks_exact(3) {
            writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
        }
        for tri in mesh.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] + base, tri[1] + base, tri[2] + base);
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }
        base += mesh.num_vertices() as u32;
    }
    Ok(out)
}
