#![warn(missing_docs)]

//! Road network kernel facade.
//!
//! Provides [`RoadNetwork`], which owns a set of road centerline curves and
//! keeps the derived structures in step with them: a quadtree over curve
//! footprints for spatial queries and a graph over curve endpoints for
//! routing. Road surfaces are generated on demand.
//!
//! # Example
//!
//! ```
//! use roadnet::{NetworkSettings, Point3, PolylineCurve, RoadNetwork};
//!
//! let mut network = RoadNetwork::new(NetworkSettings::default()).unwrap();
//! network.add_curve(PolylineCurve::new(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1000.0, 0.0, 0.0),
//! ]).unwrap());
//! network.add_curve(PolylineCurve::new(vec![
//!     Point3::new(1000.0, 0.0, 0.0),
//!     Point3::new(1000.0, 1000.0, 0.0),
//! ]).unwrap());
//!
//! let path = network.find_path(&Point3::new(0.0, 0.0, 0.0), &Point3::new(1000.0, 1000.0, 0.0));
//! assert_eq!(path.len(), 3);
//! assert!(!network.generate_road_mesh().is_empty());
//! ```

pub use roadnet_curve;
pub use roadnet_graph;
pub use roadnet_index;
pub use roadnet_math;
pub use roadnet_mesh;

pub use roadnet_curve::{CatmullRomCurve, Curve, CurveKind, PolylineCurve};
pub use roadnet_math::{Aabb2, Point3, Vec3};
pub use roadnet_mesh::{MeshSettings, RoadMesh, RoadMeshKind, TriangleMesh};

mod error;
mod routing;
mod settings;

pub use error::{NetworkError, Result};
pub use routing::RouteOptions;
pub use settings::NetworkSettings;

use roadnet_graph::{EdgeCost, NodeId, PathGraph};
use roadnet_index::{Quadtree, QuadtreeSettings};
use roadnet_math::flatten;
use roadnet_mesh::intersect::segment_intersection_2d;
use slotmap::SlotMap;
use tracing::debug;

slotmap::new_key_type! {
    /// Stable identifier of a curve in a [`RoadNetwork`].
    pub struct CurveId;
}

/// Distance within which a drawn line's end counts as touching a curve.
const ENDPOINT_CLEARANCE: f64 = 1.0;

/// A set of road curves with a spatial index and a routing graph.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    curves: SlotMap<CurveId, Box<dyn Curve>>,
    index: Quadtree<CurveId>,
    graph: PathGraph,
    settings: NetworkSettings,
}

impl Default for RoadNetwork {
    fn default() -> Self {
        let settings = NetworkSettings::default();
        Self {
            curves: SlotMap::with_key(),
            index: Quadtree::new(settings.index),
            graph: PathGraph::new(settings.node_tolerance),
            settings,
        }
    }
}

impl RoadNetwork {
    // =========================================================================
    // Construction and settings
    // =========================================================================

    /// Create an empty network.
    pub fn new(settings: NetworkSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            curves: SlotMap::with_key(),
            index: Quadtree::new(settings.index),
            graph: PathGraph::new(settings.node_tolerance),
            settings,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &NetworkSettings {
        &self.settings
    }

    /// Replace the settings, rebuilding the index and graph.
    pub fn set_settings(&mut self, settings: NetworkSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.rebuild_index();
        self.rebuild_graph();
        Ok(())
    }

    // =========================================================================
    // Curve store
    // =========================================================================

    /// Add a curve and return its id.
    pub fn add_curve(&mut self, curve: impl Curve + 'static) -> CurveId {
        self.add_boxed_curve(Box::new(curve))
    }

    /// Add an already boxed curve and return its id.
    pub fn add_boxed_curve(&mut self, curve: Box<dyn Curve>) -> CurveId {
        let bounds = curve.bounds();
        let (start, end) = (curve.start(), curve.end());
        let id = self.curves.insert(curve);
        self.index.insert(id, bounds);
        self.graph.add_curve(start, end);
        id
    }

    /// Replace the geometry of a stored curve.
    pub fn replace_curve(&mut self, id: CurveId, curve: Box<dyn Curve>) -> Result<()> {
        let slot = self
            .curves
            .get_mut(id)
            .ok_or(NetworkError::UnknownCurve(id))?;
        *slot = curve;
        self.curve_changed(id);
        Ok(())
    }

    /// Remove a curve, returning it.
    pub fn remove_curve(&mut self, id: CurveId) -> Result<Box<dyn Curve>> {
        let curve = self.curves.remove(id).ok_or(NetworkError::UnknownCurve(id))?;
        self.index.remove(id);
        self.rebuild_graph();
        Ok(curve)
    }

    /// The curve with this id.
    pub fn curve(&self, id: CurveId) -> Option<&dyn Curve> {
        self.curves.get(id).map(|c| c.as_ref())
    }

    /// Every stored curve with its id.
    pub fn curves(&self) -> impl Iterator<Item = (CurveId, &dyn Curve)> + '_ {
        self.curves.iter().map(|(id, c)| (id, c.as_ref()))
    }

    /// Check if a curve with this id is stored.
    pub fn contains(&self, id: CurveId) -> bool {
        self.curves.contains_key(id)
    }

    /// Number of stored curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// True if no curves are stored.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Insert a control point where `point` projects onto a curve.
    ///
    /// Returns the index of the new control point, the index of an existing
    /// control point the projection lands on, or `None` when the projection
    /// is farther than the snap threshold or falls on the curve's first or
    /// last control point.
    pub fn insert_point_on_curve(&mut self, id: CurveId, point: &Point3) -> Result<Option<usize>> {
        let curve = self
            .curves
            .get_mut(id)
            .ok_or(NetworkError::UnknownCurve(id))?;
        let key = curve.closest_key(point);
        let location = curve.point_at_key(key);
        if (location - point).norm() > self.settings.snap_threshold {
            return Ok(None);
        }
        if key <= 0.0 || key >= curve.max_key() {
            return Ok(None);
        }
        let span = key.floor();
        if key - span < 1e-9 {
            return Ok(Some(span as usize));
        }
        let index = span as usize + 1;
        curve.insert_control_point(index, location)?;
        self.curve_changed(id);
        Ok(Some(index))
    }

    /// Move one control point of a curve.
    pub fn move_control_point(
        &mut self,
        id: CurveId,
        index: usize,
        location: Point3,
    ) -> Result<()> {
        let curve = self
            .curves
            .get_mut(id)
            .ok_or(NetworkError::UnknownCurve(id))?;
        curve.set_control_point(index, location)?;
        self.curve_changed(id);
        Ok(())
    }

    fn curve_changed(&mut self, id: CurveId) {
        if let Some(curve) = self.curves.get(id) {
            self.index.update(id, curve.bounds());
        }
        self.rebuild_graph();
    }

    // =========================================================================
    // Derived structures
    // =========================================================================

    /// The spatial index over curve footprints.
    pub fn index(&self) -> &Quadtree<CurveId> {
        &self.index
    }

    /// The routing graph over curve endpoints.
    pub fn graph(&self) -> &PathGraph {
        &self.graph
    }

    /// Rebuild the spatial index over fixed `bounds` with explicit limits.
    ///
    /// Curves reaching outside `bounds` still grow the tree when inserted.
    pub fn build_spatial_index(&mut self, bounds: Aabb2, settings: QuadtreeSettings) {
        let mut index = Quadtree::with_bounds(bounds, settings);
        for (id, curve) in &self.curves {
            index.insert(id, curve.bounds());
        }
        self.index = index;
    }

    /// Rebuild the spatial index with bounds fitted to the current curves.
    pub fn rebuild_index(&mut self) {
        self.index = Quadtree::build(
            self.curves.iter().map(|(id, c)| (id, c.bounds())),
            self.settings.index,
        );
        debug!(
            curves = self.index.len(),
            nodes = self.index.node_count(),
            "rebuilt spatial index"
        );
    }

    /// Rebuild the routing graph from the current curves.
    pub fn rebuild_graph(&mut self) {
        self.graph = PathGraph::build(
            self.curves.values().map(|c| (c.start(), c.end())),
            self.settings.node_tolerance,
        );
    }

    // =========================================================================
    // Spatial queries
    // =========================================================================

    /// Curves whose footprint overlaps `area`.
    pub fn query_curves_in_area(&self, area: &Aabb2) -> Vec<CurveId> {
        self.index.query(area)
    }

    /// Curves whose footprint comes within `radius` of `point` on either axis.
    pub fn query_curves_near_point(&self, point: &Point3, radius: f64) -> Vec<CurveId> {
        self.index.query(&Aabb2::around(point, radius))
    }

    /// Curves near the box spanned by a line, grown by the search radius.
    pub fn query_curves_near_line(&self, start: &Point3, end: &Point3) -> Vec<CurveId> {
        let mut area = Aabb2::from_points3([start, end]);
        area.expand(self.settings.search_radius);
        self.index.query(&area)
    }

    /// The curve passing closest to `point` within the search radius.
    pub fn find_nearest_curve(&self, point: &Point3) -> Option<CurveId> {
        let mut best: Option<(f64, CurveId)> = None;
        for id in self.query_curves_near_point(point, self.settings.search_radius) {
            let Some(curve) = self.curve(id) else {
                continue;
            };
            let d = curve.distance_to(point);
            if best.map_or(true, |(b, _)| d < b) {
                best = Some((d, id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Closest point to `point` on one curve.
    pub fn find_nearest_point_on_curve(&self, id: CurveId, point: &Point3) -> Option<Point3> {
        self.curve(id).map(|c| c.closest_point(point))
    }

    /// A curve whose two endpoints lie within the node tolerance of `a` and `b`.
    pub fn find_curve_between(&self, a: &Point3, b: &Point3) -> Option<CurveId> {
        let radius = self.settings.search_radius;
        let mut candidates = self.query_curves_near_point(a, radius);
        for id in self.query_curves_near_point(b, radius) {
            if !candidates.contains(&id) {
                candidates.push(id);
            }
        }
        let tol = self.settings.node_tolerance;
        let touches = |curve: &dyn Curve, p: &Point3| {
            (curve.start() - p).norm() <= tol || (curve.end() - p).norm() <= tol
        };
        candidates.into_iter().find(|&id| {
            self.curve(id)
                .is_some_and(|curve| touches(curve, a) && touches(curve, b))
        })
    }

    /// Check if two distinct curves share an endpoint within `tolerance`.
    pub fn are_curves_connected(&self, a: CurveId, b: CurveId, tolerance: f64) -> bool {
        if a == b {
            return false;
        }
        let (Some(ca), Some(cb)) = (self.curve(a), self.curve(b)) else {
            return false;
        };
        [ca.start(), ca.end()].iter().any(|pa| {
            [cb.start(), cb.end()]
                .iter()
                .any(|pb| (pa - pb).norm() <= tolerance)
        })
    }

    /// Check if both points snap to control points of a single curve.
    pub fn points_on_same_curve(&self, a: &Point3, b: &Point3) -> bool {
        let snap = self.settings.snap_threshold;
        self.query_curves_near_point(a, self.settings.search_radius)
            .into_iter()
            .filter_map(|id| self.curve(id))
            .any(|curve| {
                let pts = curve.control_points();
                let near = |q: &Point3| pts.iter().any(|p| (p - q).norm() <= snap);
                near(a) && near(b)
            })
    }

    /// Check if a straight line crosses a curve's control polygon anywhere
    /// other than where one of its ends touches a control point.
    pub fn line_crosses_network(&self, start: &Point3, end: &Point3) -> bool {
        let (a1, a2) = (flatten(start), flatten(end));
        let touches = |p: &Point3, q: &Point3| (p - q).norm() <= ENDPOINT_CLEARANCE;
        for id in self.query_curves_near_line(start, end) {
            let Some(curve) = self.curve(id) else {
                continue;
            };
            for seg in curve.control_points().windows(2) {
                let (b1, b2) = (flatten(&seg[0]), flatten(&seg[1]));
                if segment_intersection_2d(&a1, &a2, &b1, &b2).is_none() {
                    continue;
                }
                let at_end = [start, end]
                    .iter()
                    .any(|p| touches(p, &seg[0]) || touches(p, &seg[1]));
                if !at_end {
                    return true;
                }
            }
        }
        false
    }

    // =========================================================================
    // Routing
    // =========================================================================

    /// Graph node for a world point.
    ///
    /// Maps the nearer endpoint of the nearest curve to its node, or falls
    /// back to the node nearest the point when no curve is in range.
    pub fn nearest_node(&self, point: &Point3) -> Option<NodeId> {
        match self.find_nearest_curve(point).and_then(|id| self.curve(id)) {
            Some(curve) => {
                let end = curve.endpoint(curve.nearest_end(point));
                self.graph.nearest_node(&end)
            }
            None => self.graph.nearest_node(point),
        }
    }

    /// Node locations of the cheapest route between the nodes nearest
    /// `start` and `end`, or an empty path if there is none.
    pub fn find_path(&self, start: &Point3, end: &Point3) -> Vec<Point3> {
        let (Some(a), Some(b)) = (self.nearest_node(start), self.nearest_node(end)) else {
            debug!("no graph nodes to route between");
            return Vec::new();
        };
        let nodes = self.graph.find_path(a, b, &NetworkCost { network: self });
        self.graph.locations(&nodes)
    }

    // =========================================================================
    // Meshing
    // =========================================================================

    /// Road surfaces for every curve and junction in the network.
    pub fn generate_road_mesh(&self) -> Vec<RoadMesh<CurveId>> {
        let curves: Vec<(CurveId, &dyn Curve)> = self.curves().collect();
        roadnet_mesh::generate_road_mesh(&curves, &self.settings.mesh)
    }
}

/// Along-curve distance between two node locations.
///
/// Falls back to straight-line distance when no curve joins them.
struct NetworkCost<'a> {
    network: &'a RoadNetwork,
}

impl EdgeCost for NetworkCost<'_> {
    fn cost(&self, from: &Point3, to: &Point3) -> f64 {
        let curve = self
            .network
            .find_curve_between(from, to)
            .and_then(|id| self.network.curve(id));
        match curve {
            Some(curve) => {
                let a = curve.distance_at_key(curve.closest_key(from));
                let b = curve.distance_at_key(curve.closest_key(to));
                (b - a).abs()
            }
            None => (to - from).norm(),
        }
    }
}
