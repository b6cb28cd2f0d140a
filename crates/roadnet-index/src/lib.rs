#![warn(missing_docs)]

//! Quadtree spatial index for the roadnet kernel.
//!
//! Items are identified by a small copyable key (the caller's curve id) and
//! indexed by their horizontal bounding box. An item is stored in every leaf
//! its box overlaps, so an area query has no false negatives; results are
//! deduplicated and filtered against each item's own box.
//!
//! The root bounds are fixed between rebuilds. Inserting an item whose box
//! falls outside them rebuilds the whole tree around the union of all boxes,
//! padded and squared.

mod node;

pub use node::QuadtreeNode;

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use roadnet_math::Aabb2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Subdivision limits and rebuild padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeSettings {
    /// A leaf holding more items than this splits (unless at `max_depth`).
    pub max_items_per_node: usize,
    /// Depth of the deepest allowed node; the root is depth 0.
    pub max_depth: usize,
    /// Fraction of the larger extent added when bounds are recomputed.
    pub padding: f64,
}

impl Default for QuadtreeSettings {
    fn default() -> Self {
        Self {
            max_items_per_node: 5,
            max_depth: 5,
            padding: 0.3,
        }
    }
}

/// Bounded quadtree over keyed 2D boxes.
#[derive(Debug, Clone)]
pub struct Quadtree<K> {
    root: QuadtreeNode<K>,
    settings: QuadtreeSettings,
    items: HashMap<K, Aabb2>,
    /// Insertion order, for deterministic rebuilds.
    order: Vec<K>,
}

impl<K: Copy + Eq + Hash> Quadtree<K> {
    /// Create an empty tree. The first insert sizes the root.
    pub fn new(settings: QuadtreeSettings) -> Self {
        Self::with_bounds(Aabb2::empty(), settings)
    }

    /// Create an empty tree over fixed world bounds.
    pub fn with_bounds(bounds: Aabb2, settings: QuadtreeSettings) -> Self {
        Self {
            root: QuadtreeNode::new(bounds, 0),
            settings,
            items: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Build a tree sized to fit `entries`.
    pub fn build(
        entries: impl IntoIterator<Item = (K, Aabb2)>,
        settings: QuadtreeSettings,
    ) -> Self {
        let entries: Vec<(K, Aabb2)> = entries.into_iter().collect();
        let mut world = Aabb2::empty();
        for (_, b) in &entries {
            world.include_box(b);
        }
        let bounds = if world.is_empty() {
            world
        } else {
            world.padded_square(settings.padding)
        };
        let mut tree = Self::with_bounds(bounds, settings);
        for (key, b) in entries {
            tree.insert(key, b);
        }
        tree
    }

    /// Index `key` under `bounds`. Re-inserting a key updates it.
    pub fn insert(&mut self, key: K, bounds: Aabb2) {
        if self.items.contains_key(&key) {
            self.remove(key);
        }
        self.items.insert(key, bounds);
        self.order.push(key);
        if self.root.bounds().contains(&bounds) {
            self.root.insert(key, bounds, &self.settings);
        } else {
            self.rebuild();
        }
    }

    /// Drop `key` from every node holding it. Emptied children are kept.
    pub fn remove(&mut self, key: K) -> bool {
        let Some(bounds) = self.items.remove(&key) else {
            return false;
        };
        self.order.retain(|k| *k != key);
        self.root.remove(key, &bounds);
        true
    }

    /// Re-index `key` under new bounds.
    pub fn update(&mut self, key: K, bounds: Aabb2) {
        self.remove(key);
        self.insert(key, bounds);
    }

    /// Keys whose boxes overlap `area`, each once, in discovery order.
    pub fn query(&self, area: &Aabb2) -> Vec<K> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        self.root.query(area, &mut found, &mut seen);
        found
    }

    /// Discard every item and node, keeping the current root bounds.
    pub fn clear(&mut self) {
        self.root = QuadtreeNode::new(*self.root.bounds(), 0);
        self.items.clear();
        self.order.clear();
    }

    /// All indexed keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.order.iter().copied()
    }

    /// The box `key` was indexed under.
    pub fn bounds_of(&self, key: K) -> Option<Aabb2> {
        self.items.get(&key).copied()
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Root bounds.
    pub fn bounds(&self) -> Aabb2 {
        *self.root.bounds()
    }

    /// Subdivision settings.
    pub fn settings(&self) -> &QuadtreeSettings {
        &self.settings
    }

    /// The root node.
    pub fn root(&self) -> &QuadtreeNode<K> {
        &self.root
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Depth of the deepest node.
    pub fn depth(&self) -> usize {
        self.root.max_depth()
    }

    /// `(depth, bounds)` of every node, parents before children.
    pub fn node_bounds(&self) -> Vec<(usize, Aabb2)> {
        let mut out = Vec::with_capacity(self.node_count());
        self.root.collect_bounds(&mut out);
        out
    }

    fn rebuild(&mut self) {
        let mut world = Aabb2::empty();
        for key in &self.order {
            if let Some(b) = self.items.get(key) {
                world.include_box(b);
            }
        }
        world.include_box(self.root.bounds());
        let bounds = world.padded_square(self.settings.padding);
        debug!(
            items = self.order.len(),
            min_x = bounds.min.x,
            min_y = bounds.min.y,
            max_x = bounds.max.x,
            max_y = bounds.max.y,
            "rebuilding quadtree with expanded bounds"
        );
        self.root = QuadtreeNode::new(bounds, 0);
        for key in &self.order {
            if let Some(b) = self.items.get(key) {
                self.root.insert(*key, *b, &self.settings);
            }
        }
    }
}

impl<K: Copy + Eq + Hash> Default for Quadtree<K> {
    fn default() -> Self {
        Self::new(QuadtreeSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadnet_math::Point2;

    fn bx(x0: f64, y0: f64, x1: f64, y1: f64) -> Aabb2 {
        Aabb2::new(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    fn world() -> Quadtree<u32> {
        Quadtree::with_bounds(bx(0.0, 0.0, 100.0, 100.0), QuadtreeSettings::default())
    }

    fn sorted(mut v: Vec<u32>) -> Vec<u32> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_insert_and_query() {
        let mut t = world();
        t.insert(1, bx(10.0, 10.0, 20.0, 20.0));
        t.insert(2, bx(70.0, 70.0, 80.0, 80.0));
        assert_eq!(t.query(&bx(0.0, 0.0, 30.0, 30.0)), vec![1]);
        assert_eq!(t.query(&bx(60.0, 60.0, 100.0, 100.0)), vec![2]);
        assert!(t.query(&bx(40.0, 40.0, 50.0, 50.0)).is_empty());
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_subdivides_past_threshold() {
        let mut t = world();
        for i in 0..6 {
            let x = 5.0 + 15.0 * i as f64;
            t.insert(i, bx(x, 5.0, x + 1.0, 6.0));
        }
        assert!(!t.root().is_leaf());
        assert_eq!(t.node_count(), 5);
        assert_eq!(sorted(t.query(&bx(0.0, 0.0, 100.0, 100.0))), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut t = world();
        for i in 0..50 {
            t.insert(i, bx(1.0, 1.0, 2.0, 2.0));
        }
        assert!(t.depth() <= t.settings().max_depth);
        assert_eq!(t.query(&bx(0.0, 0.0, 3.0, 3.0)).len(), 50);
    }

    #[test]
    fn test_straddling_item_is_found_once_from_any_side() {
        let mut t = world();
        for i in 0..6 {
            t.insert(i, bx(1.0 + i as f64, 1.0, 2.0 + i as f64, 2.0));
        }
        // Spans all four quadrants of the root.
        t.insert(99, bx(40.0, 40.0, 60.0, 60.0));
        for area in [
            bx(0.0, 0.0, 45.0, 45.0),
            bx(55.0, 55.0, 100.0, 100.0),
            bx(55.0, 0.0, 100.0, 45.0),
            bx(0.0, 55.0, 45.0, 100.0),
        ] {
            assert_eq!(t.query(&area).iter().filter(|k| **k == 99).count(), 1);
        }
        let all = t.query(&bx(0.0, 0.0, 100.0, 100.0));
        assert_eq!(all.len(), 7);
    }

    #[test]
    fn test_rebuild_when_outside_bounds() {
        let mut t = world();
        t.insert(1, bx(10.0, 10.0, 20.0, 20.0));
        t.insert(2, bx(150.0, -50.0, 160.0, -40.0));
        let b = t.bounds();
        assert!(b.contains(&bx(150.0, -50.0, 160.0, -40.0)));
        assert!(b.contains(&bx(0.0, 0.0, 100.0, 100.0)));
        let size = b.size();
        assert!((size.x - size.y).abs() < 1e-9);
        assert_eq!(t.query(&bx(10.0, 10.0, 11.0, 11.0)), vec![1]);
        assert_eq!(t.query(&bx(155.0, -45.0, 156.0, -44.0)), vec![2]);
    }

    #[test]
    fn test_first_insert_sizes_empty_tree() {
        let mut t: Quadtree<u32> = Quadtree::default();
        t.insert(7, bx(-5.0, -5.0, 5.0, 5.0));
        assert!(t.bounds().contains(&bx(-5.0, -5.0, 5.0, 5.0)));
        assert_eq!(t.query(&bx(0.0, 0.0, 1.0, 1.0)), vec![7]);
    }

    #[test]
    fn test_insert_remove_restores_query() {
        let mut t = world();
        for i in 0..8 {
            let x = 10.0 * i as f64;
            t.insert(i, bx(x, x, x + 5.0, x + 5.0));
        }
        let area = bx(0.0, 0.0, 100.0, 100.0);
        let before = sorted(t.query(&area));
        t.insert(42, bx(30.0, 60.0, 35.0, 65.0));
        assert!(t.query(&area).contains(&42));
        assert!(t.remove(42));
        assert_eq!(sorted(t.query(&area)), before);
        assert!(!t.remove(42));
    }

    #[test]
    fn test_update_moves_item() {
        let mut t = world();
        t.insert(1, bx(10.0, 10.0, 20.0, 20.0));
        t.update(1, bx(80.0, 80.0, 90.0, 90.0));
        assert!(t.query(&bx(0.0, 0.0, 30.0, 30.0)).is_empty());
        assert_eq!(t.query(&bx(75.0, 75.0, 95.0, 95.0)), vec![1]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.keys().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_clear_keeps_bounds() {
        let mut t = world();
        for i in 0..10 {
            t.insert(i, bx(i as f64, 0.0, i as f64 + 1.0, 1.0));
        }
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.node_count(), 1);
        assert_eq!(t.bounds(), bx(0.0, 0.0, 100.0, 100.0));
        assert!(t.query(&bx(0.0, 0.0, 100.0, 100.0)).is_empty());
    }

    #[test]
    fn test_build_pads_and_squares() {
        let t = Quadtree::build(
            vec![(1u32, bx(0.0, 0.0, 100.0, 20.0)), (2, bx(50.0, 0.0, 60.0, 10.0))],
            QuadtreeSettings::default(),
        );
        let b = t.bounds();
        assert!((b.size().x - 130.0).abs() < 1e-9);
        assert!((b.size().y - 130.0).abs() < 1e-9);
        assert_eq!(sorted(t.query(&b)), vec![1, 2]);
    }

    #[test]
    fn test_node_bounds_lists_every_node() {
        let mut t = world();
        for i in 0..6 {
            t.insert(i, bx(1.0 + i as f64, 1.0, 2.0 + i as f64, 2.0));
        }
        let nodes = t.node_bounds();
        assert_eq!(nodes.len(), t.node_count());
        assert_eq!(nodes[0], (0, bx(0.0, 0.0, 100.0, 100.0)));
    }
}
