//! JSON network documents.
//!
//! ```json
//! {
//!   "curves": [
//!     { "kind": "polyline", "points": [[0, 0, 0], [1000, 0, 0]] },
//!     { "kind": "catmull_rom", "points": [[1000, 0, 0], [1500, 400, 0], [2000, 0, 0]] }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use roadnet::{
    CatmullRomCurve, Curve, CurveKind, NetworkSettings, Point3, PolylineCurve, RoadNetwork,
};
use serde::{Deserialize, Serialize};

/// A road network as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDocument {
    /// Road centerlines.
    pub curves: Vec<CurveSpec>,
}

/// One road centerline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveSpec {
    /// Interpolation between control points.
    #[serde(default = "default_kind")]
    pub kind: CurveKind,
    /// Control points as `[x, y, z]`.
    pub points: Vec<[f64; 3]>,
}

fn default_kind() -> CurveKind {
    CurveKind::Polyline
}

impl CurveSpec {
    fn build(&self) -> roadnet::roadnet_curve::Result<Box<dyn Curve>> {
        let points: Vec<Point3> = self
            .points
            .iter()
            .map(|[x, y, z]| Point3::new(*x, *y, *z))
            .collect();
        let curve: Box<dyn Curve> = match self.kind {
            CurveKind::Polyline => Box::new(PolylineCurve::new(points)?),
            CurveKind::CatmullRom => Box::new(CatmullRomCurve::new(points)?),
        };
        Ok(curve)
    }
}

impl NetworkDocument {
    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid network document")
    }

    /// Build a network holding every curve of the document.
    pub fn to_network(&self, settings: NetworkSettings) -> Result<RoadNetwork> {
        let mut network = RoadNetwork::new(settings)?;
        for (i, spec) in self.curves.iter().enumerate() {
            let curve = spec.build().with_context(|| format!("curve {i}"))?;
            network.add_boxed_curve(curve);
        }
        network.rebuild_index();
        Ok(network)
    }
}
