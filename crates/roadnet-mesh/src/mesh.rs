//! Triangle mesh container.

use roadnet_math::Point3;

/// Output triangle mesh for rendering and export.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
    /// Flat array of vertex normals: `[nx0, ny0, nz0, ...]` (f32). Same length as vertices.
    pub normals: Vec<f32>,
    /// Flat array of texture coordinates: `[u0, v0, u1, v1, ...]` (f32).
    pub uvs: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
        }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, p: &Point3, normal: [f32; 3], uv: [f32; 2]) -> u32 {
        let index = self.num_vertices() as u32;
        self.vertices
            .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        self.normals.extend_from_slice(&normal);
        self.uvs.extend_from_slice(&uv);
        index
    }

    /// Append a triangle by vertex indices.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Position of vertex `i`.
    pub fn vertex(&self, i: usize) -> Point3 {
        let v = &self.vertices[3 * i..3 * i + 3];
        Point3::new(v[0] as f64, v[1] as f64, v[2] as f64)
    }

    /// Corner positions of triangle `t`.
    pub fn triangle(&self, t: usize) -> [Point3; 3] {
        let idx = &self.indices[3 * t..3 * t + 3];
        [
            self.vertex(idx[0] as usize),
            self.vertex(idx[1] as usize),
            self.vertex(idx[2] as usize),
        ]
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices
            .extend(other.indices.iter().map(|&i| i + offset));
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// True if the triangle's doubled area is at or below `epsilon`.
pub fn is_degenerate_triangle(a: &Point3, b: &Point3, c: &Point3, epsilon: f64) -> bool {
    (b - a).cross(&(c - a)).norm() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read_back() {
        let mut m = TriangleMesh::new();
        let a = m.push_vertex(&Point3::new(0.0, 0.0, 0.0), [0.0, 0.0, 1.0], [0.0, 0.0]);
        let b = m.push_vertex(&Point3::new(1.0, 0.0, 0.0), [0.0, 0.0, 1.0], [1.0, 0.0]);
        let c = m.push_vertex(&Point3::new(0.0, 1.0, 0.0), [0.0, 0.0, 1.0], [0.0, 1.0]);
        m.push_triangle(a, b, c);
        assert_eq!(m.num_vertices(), 3);
        assert_eq!(m.num_triangles(), 1);
        assert_eq!(m.uvs.len(), 6);
        assert_eq!(m.triangle(0)[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = TriangleMesh::new();
        for i in 0..3 {
            a.push_vertex(&Point3::new(i as f64, 0.0, 0.0), [0.0, 0.0, 1.0], [0.0, 0.0]);
        }
        a.push_triangle(0, 1, 2);
        let b = a.clone();
        a.merge(&b);
        assert_eq!(a.num_vertices(), 6);
        assert_eq!(&a.indices[3..], &[3, 4, 5]);
        assert_eq!(a.uvs.len(), 12);
    }

    #[test]
    fn test_degenerate_triangle() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        assert!(is_degenerate_triangle(&a, &b, &Point3::new(2.0, 0.0, 0.0), 1e-2));
        assert!(is_degenerate_triangle(&a, &a, &b, 1e-2));
        assert!(!is_degenerate_triangle(&a, &b, &Point3::new(0.0, 1.0, 0.0), 1e-2));
    }
}
