#![warn(missing_docs)]

//! Routable graph over curve endpoints.
//!
//! Every curve contributes its two end locations as [`PathNode`]s, linked in
//! both directions. Nodes live in an arena and refer to each other by
//! [`NodeId`], so the graph has no reference cycles. Locations closer than
//! the graph tolerance collapse into one node, which is how curves meeting
//! at a junction become connected.
//!
//! Shortest paths come from [`astar`], with edge costs supplied by an
//! [`EdgeCost`] implementation.

mod astar;

pub use astar::{astar, EdgeCost, Euclidean};

use roadnet_math::Point3;

/// Index of a node in a [`PathGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position in the graph's node arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A deduplicated curve endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    /// World location of the endpoint.
    pub location: Point3,
    neighbors: Vec<NodeId>,
}

impl PathNode {
    fn new(location: Point3) -> Self {
        Self {
            location,
            neighbors: Vec::new(),
        }
    }

    /// Nodes reachable along one curve, in link order.
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }
}

/// Arena of endpoint nodes with undirected links.
#[derive(Debug, Clone)]
pub struct PathGraph {
    nodes: Vec<PathNode>,
    tolerance: f64,
}

impl PathGraph {
    /// Empty graph merging locations closer than `tolerance`.
    pub fn new(tolerance: f64) -> Self {
        Self {
            nodes: Vec::new(),
            tolerance,
        }
    }

    /// Build a graph from `(start, end)` endpoint pairs, one per curve.
    pub fn build(curves: impl IntoIterator<Item = (Point3, Point3)>, tolerance: f64) -> Self {
        let mut graph = Self::new(tolerance);
        for (start, end) in curves {
            graph.add_curve(start, end);
        }
        graph
    }

    /// Add one curve's endpoints and link them.
    pub fn add_curve(&mut self, start: Point3, end: Point3) -> (NodeId, NodeId) {
        let a = self.find_or_create(start);
        let b = self.find_or_create(end);
        self.link(a, b);
        (a, b)
    }

    /// Node within tolerance of `location`, created if absent.
    pub fn find_or_create(&mut self, location: Point3) -> NodeId {
        if let Some(id) = self.node_at(&location) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(PathNode::new(location));
        id
    }

    /// First node within tolerance of `location`.
    pub fn node_at(&self, location: &Point3) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| (n.location - location).norm() <= self.tolerance)
            .map(|i| NodeId(i as u32))
    }

    /// Node closest to `location` (first on ties).
    pub fn nearest_node(&self, location: &Point3) -> Option<NodeId> {
        let mut best: Option<(f64, usize)> = None;
        for (i, n) in self.nodes.iter().enumerate() {
            let d = (n.location - location).norm_squared();
            if best.map_or(true, |(b, _)| d < b) {
                best = Some((d, i));
            }
        }
        best.map(|(_, i)| NodeId(i as u32))
    }

    /// Link two distinct nodes in both directions.
    pub fn link(&mut self, a: NodeId, b: NodeId) {
        if a == b || a.index() >= self.nodes.len() || b.index() >= self.nodes.len() {
            return;
        }
        if !self.nodes[a.index()].neighbors.contains(&b) {
            self.nodes[a.index()].neighbors.push(b);
        }
        if !self.nodes[b.index()].neighbors.contains(&a) {
            self.nodes[b.index()].neighbors.push(a);
        }
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&PathNode> {
        self.nodes.get(id.index())
    }

    /// Location of a node.
    pub fn location(&self, id: NodeId) -> Option<Point3> {
        self.node(id).map(|n| n.location)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Locations along a node path.
    pub fn locations(&self, path: &[NodeId]) -> Vec<Point3> {
        path.iter().filter_map(|id| self.location(*id)).collect()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of undirected links.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.neighbors.len()).sum::<usize>() / 2
    }

    /// Merge tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Shortest node path from `start` to `goal`; empty if none.
    pub fn find_path(&self, start: NodeId, goal: NodeId, cost: &dyn EdgeCost) -> Vec<NodeId> {
        astar(self, start, goal, cost)
    }
}
