//! Quadtree nodes.

use std::collections::HashSet;
use std::hash::Hash;

use roadnet_math::Aabb2;

use crate::QuadtreeSettings;

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    bounds: Aabb2,
}

/// A node of the quadtree.
///
/// Items live only in leaves. A leaf is a node without children.
#[derive(Debug, Clone)]
pub struct QuadtreeNode<K> {
    bounds: Aabb2,
    depth: usize,
    entries: Vec<Entry<K>>,
    /// Quadrants indexed as in [`Aabb2::quadrants`].
    children: Option<Box<[QuadtreeNode<K>; 4]>>,
}

impl<K: Copy + Eq + Hash> QuadtreeNode<K> {
    pub(crate) fn new(bounds: Aabb2, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            entries: Vec::new(),
            children: None,
        }
    }

    /// Region covered by this node.
    pub fn bounds(&self) -> &Aabb2 {
        &self.bounds
    }

    /// Depth below the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Keys stored directly in this node.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    /// The four children, if subdivided.
    pub fn children(&self) -> Option<&[QuadtreeNode<K>; 4]> {
        self.children.as_deref()
    }

    pub(crate) fn insert(&mut self, key: K, bounds: Aabb2, settings: &QuadtreeSettings) {
        if !self.bounds.overlaps(&bounds) {
            return;
        }
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.insert(key, bounds, settings);
            }
            return;
        }
        self.entries.push(Entry { key, bounds });
        let full = self.entries.len() > settings.max_items_per_node.max(1);
        if full && self.depth < settings.max_depth {
            self.subdivide(settings);
        }
    }

    fn subdivide(&mut self, settings: &QuadtreeSettings) {
        let depth = self.depth + 1;
        let mut children = Box::new(self.bounds.quadrants().map(|b| QuadtreeNode::new(b, depth)));
        for entry in self.entries.drain(..) {
            for child in children.iter_mut() {
                child.insert(entry.key, entry.bounds, settings);
            }
        }
        self.children = Some(children);
    }

    pub(crate) fn remove(&mut self, key: K, bounds: &Aabb2) {
        if !self.bounds.overlaps(bounds) {
            return;
        }
        self.entries.retain(|e| e.key != key);
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.remove(key, bounds);
            }
        }
    }

    pub(crate) fn query(&self, area: &Aabb2, found: &mut Vec<K>, seen: &mut HashSet<K>) {
        if !self.bounds.overlaps(area) {
            return;
        }
        for e in &self.entries {
            if e.bounds.overlaps(area) && seen.insert(e.key) {
                found.push(e.key);
            }
        }
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query(area, found, seen);
            }
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flat_map(|c| c.iter())
            .map(|c| c.node_count())
            .sum::<usize>()
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.children
            .iter()
            .flat_map(|c| c.iter())
            .map(|c| c.max_depth())
            .max()
            .unwrap_or(self.depth)
    }

    pub(crate) fn collect_bounds(&self, out: &mut Vec<(usize, Aabb2)>) {
        out.push((self.depth, self.bounds));
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_bounds(out);
            }
        }
    }
}
