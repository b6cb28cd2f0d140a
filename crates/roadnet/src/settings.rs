//! Network-wide tunables.

use roadnet_index::QuadtreeSettings;
use roadnet_mesh::MeshSettings;
use serde::{Deserialize, Serialize};

use crate::{NetworkError, Result};

/// Every tunable of a [`RoadNetwork`](crate::RoadNetwork).
///
/// Loads from TOML with missing keys taking their defaults:
///
/// ```
/// use roadnet::NetworkSettings;
///
/// let settings = NetworkSettings::from_toml_str(
///     r#"
///     search_radius = 1000.0
///
///     [mesh]
///     road_width = 300.0
///     "#,
/// )
/// .unwrap();
/// assert_eq!(settings.mesh.road_width, 300.0);
/// assert_eq!(settings.path_sample_step, 400.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Road surface generation.
    pub mesh: MeshSettings,
    /// Spatial index limits.
    pub index: QuadtreeSettings,
    /// Arc-length spacing of points on a routed path.
    pub path_sample_step: f64,
    /// Half extent of the box searched around a point for nearby curves.
    pub search_radius: f64,
    /// Curve endpoints closer than this share a graph node.
    pub node_tolerance: f64,
    /// Editing clicks farther than this from a curve are ignored.
    pub snap_threshold: f64,
    /// Right-hand lane offset as a fraction of the road width.
    pub lane_offset: f64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            mesh: MeshSettings::default(),
            index: QuadtreeSettings::default(),
            path_sample_step: 400.0,
            search_radius: 2500.0,
            node_tolerance: 10.0,
            snap_threshold: 500.0,
            lane_offset: 0.25,
        }
    }
}

impl NetworkSettings {
    /// Parse settings from a TOML document and validate them.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        self.mesh.validate()?;
        if self.path_sample_step.is_nan() || self.path_sample_step <= 0.0 {
            return Err(NetworkError::InvalidSettings(
                "path_sample_step must be positive".into(),
            ));
        }
        if self.search_radius.is_nan() || self.search_radius <= 0.0 {
            return Err(NetworkError::InvalidSettings(
                "search_radius must be positive".into(),
            ));
        }
        if [self.node_tolerance, self.snap_threshold]
            .iter()
            .any(|t| t.is_nan() || *t < 0.0)
        {
            return Err(NetworkError::InvalidSettings(
                "tolerances must not be negative".into(),
            ));
        }
        if !(0.0..=0.5).contains(&self.lane_offset) {
            return Err(NetworkError::InvalidSettings(
                "lane_offset must be between 0 and 0.5".into(),
            ));
        }
        if self.index.max_items_per_node == 0 {
            return Err(NetworkError::InvalidSettings(
                "index.max_items_per_node must be at least 1".into(),
            ));
        }
        if self.index.padding.is_nan() || self.index.padding < 0.0 {
            return Err(NetworkError::InvalidSettings(
                "index.padding must not be negative".into(),
            ));
        }
        Ok(())
    }
}
