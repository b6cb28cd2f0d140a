#![warn(missing_docs)]

//! Road surface generation for the roadnet kernel.
//!
//! Turns a set of curves into renderable road surfaces:
//!
//! 1. Classify curve endpoints into junctions ([`IntersectionCluster`]) and
//!    dead ends ([`FreeEndpoint`])
//! 2. Sample every curve and offset it into left/right rails
//! 3. At each junction, cut each member's rails where they cross the rails
//!    of the other members and emit a triangle fan over the cut points
//! 4. Clamp each curve's rails between its two cut points and emit a
//!    quad strip
//!
//! Degenerate triangles are never emitted.

mod error;
mod generate;
pub mod intersect;
mod mesh;
mod rails;
pub mod surface;
pub mod topology;

pub use error::{MeshError, Result};
pub use generate::{build_rails, generate_road_mesh, resolve_junction};
pub use mesh::{is_degenerate_triangle, TriangleMesh};
pub use rails::{Boundary, RailPair};
pub use topology::{find_clusters, find_free_endpoints, FreeEndpoint, IntersectionCluster};

use roadnet_math::Point3;
use serde::{Deserialize, Serialize};

/// Road surface parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// Full road width; rails sit half of it to either side.
    pub road_width: f64,
    /// Arc-length spacing of centerline samples.
    pub sample_step: f64,
    /// Endpoints closer than this meet at a junction.
    pub junction_tolerance: f64,
    /// Endpoints farther than this from every junction are dead ends.
    pub free_endpoint_tolerance: f64,
    /// Triangles whose edge cross product is no longer than this are dropped.
    pub degenerate_epsilon: f64,
    /// U advance per sample along a strip.
    pub strip_uv_scale: f64,
    /// UV units per world unit on junction fans.
    pub fan_uv_scale: f64,
    /// Height added to every emitted vertex.
    pub surface_offset: f64,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            road_width: 500.0,
            sample_step: 100.0,
            junction_tolerance: 10.0,
            free_endpoint_tolerance: 1.0,
            degenerate_epsilon: 1e-2,
            strip_uv_scale: 0.1,
            fan_uv_scale: 0.01,
            surface_offset: 1.0,
        }
    }
}

impl MeshSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.road_width.is_nan() || self.road_width <= 0.0 {
            return Err(MeshError::InvalidSettings(
                "road_width must be positive".into(),
            ));
        }
        if self.sample_step.is_nan() || self.sample_step <= 0.0 {
            return Err(MeshError::InvalidSettings(
                "sample_step must be positive".into(),
            ));
        }
        if [self.junction_tolerance, self.free_endpoint_tolerance]
            .iter()
            .any(|t| t.is_nan() || *t < 0.0)
        {
            return Err(MeshError::InvalidSettings(
                "tolerances must not be negative".into(),
            ));
        }
        if self.degenerate_epsilon.is_nan() || self.degenerate_epsilon < 0.0 {
            return Err(MeshError::InvalidSettings(
                "degenerate_epsilon must not be negative".into(),
            ));
        }
        if !self.strip_uv_scale.is_finite()
            || !self.fan_uv_scale.is_finite()
            || !self.surface_offset.is_finite()
        {
            return Err(MeshError::InvalidSettings(
                "uv scales and surface_offset must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// What a generated mesh covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoadMeshKind<K> {
    /// Road surface along one curve between its two boundaries.
    Segment {
        /// The curve.
        curve: K,
    },
    /// Junction surface around a cluster point.
    Junction {
        /// Representative point of the junction.
        center: Point3,
    },
}

/// A generated road surface piece.
#[derive(Debug, Clone)]
pub struct RoadMesh<K> {
    /// What this piece covers.
    pub kind: RoadMeshKind<K>,
    /// Triangles of the piece.
    pub mesh: TriangleMesh,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        assert!(MeshSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_settings() {
        let s = MeshSettings {
            sample_step: 0.0,
            ..MeshSettings::default()
        };
        assert!(s.validate().is_err());
        let s = MeshSettings {
            road_width: f64::NAN,
            ..MeshSettings::default()
        };
        assert!(s.validate().is_err());
        let s = MeshSettings {
            junction_tolerance: -1.0,
            ..MeshSettings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_tolerances() {
        let nan = [
            MeshSettings {
                junction_tolerance: f64::NAN,
                ..MeshSettings::default()
            },
            MeshSettings {
                free_endpoint_tolerance: f64::NAN,
                ..MeshSettings::default()
            },
            MeshSettings {
                degenerate_epsilon: f64::NAN,
                ..MeshSettings::default()
            },
            MeshSettings {
                fan_uv_scale: f64::INFINITY,
                ..MeshSettings::default()
            },
        ];
        for s in nan {
            assert!(s.validate().is_err(), "{s:?}");
        }
        let s = MeshSettings {
            junction_tolerance: 0.0,
            ..MeshSettings::default()
        };
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_settings_from_partial_json() {
        let s: MeshSettings = serde_json::from_str(r#"{"road_width": 800.0}"#).unwrap();
        assert_eq!(s.road_width, 800.0);
        assert_eq!(s.sample_step, 100.0);
    }
}
