//! A* search over a [`PathGraph`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use roadnet_math::Point3;
use tracing::debug;

use crate::{NodeId, PathGraph};

/// Travel cost between node locations.
pub trait EdgeCost {
    /// Cost of moving along the link from `from` to `to`.
    fn cost(&self, from: &Point3, to: &Point3) -> f64;

    /// Estimated remaining cost from `from` to `goal`.
    fn estimate(&self, from: &Point3, goal: &Point3) -> f64 {
        self.cost(from, goal)
    }
}

/// Straight-line distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl EdgeCost for Euclidean {
    fn cost(&self, from: &Point3, to: &Point3) -> f64 {
        (to - from).norm()
    }
}

impl<F: Fn(&Point3, &Point3) -> f64> EdgeCost for F {
    fn cost(&self, from: &Point3, to: &Point3) -> f64 {
        self(from, to)
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
struct State {
    f: OrderedFloat<f64>,
    seq: u64,
    node: NodeId,
}

// Min-heap on `f`; equal scores pop in push order.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest node path from `start` to `goal`, both included.
///
/// Returns an empty path if either id is not in the graph or the goal is
/// unreachable. `cost.estimate` is used as the heuristic; the start node is
/// scored by straight-line distance.
pub fn astar(graph: &PathGraph, start: NodeId, goal: NodeId, cost: &dyn EdgeCost) -> Vec<NodeId> {
    let (Some(start_loc), Some(goal_loc)) = (graph.location(start), graph.location(goal)) else {
        debug!(?start, ?goal, "path endpoints not in graph");
        return Vec::new();
    };
    if start == goal {
        return vec![start];
    }

    let n = graph.len();
    let mut g_score = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<NodeId>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;

    g_score[start.index()] = 0.0;
    open.push(State {
        f: OrderedFloat(Euclidean.cost(&start_loc, &goal_loc)),
        seq,
        node: start,
    });

    while let Some(State { node, .. }) = open.pop() {
        if closed[node.index()] {
            continue;
        }
        if node == goal {
            return reconstruct(&came_from, goal);
        }
        closed[node.index()] = true;

        let here = graph.nodes()[node.index()].location;
        for &next in graph.nodes()[node.index()].neighbors() {
            if closed[next.index()] {
                continue;
            }
            let there = graph.nodes()[next.index()].location;
            let tentative = g_score[node.index()] + cost.cost(&here, &there);
            if tentative.is_nan() || tentative >= g_score[next.index()] {
                continue;
            }
            came_from[next.index()] = Some(node);
            g_score[next.index()] = tentative;
            seq += 1;
            open.push(State {
                f: OrderedFloat(tentative + cost.estimate(&there, &goal_loc)),
                seq,
                node: next,
            });
        }
    }

    debug!(?start, ?goal, "no path found");
    Vec::new()
}

fn reconstruct(came_from: &[Option<NodeId>], goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from[current.index()] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn test_simple_chain() {
        let g = PathGraph::build(
            vec![(p(0.0, 0.0), p(10.0, 0.0)), (p(10.0, 0.0), p(20.0, 0.0))],
            0.5,
        );
        let a = g.node_at(&p(0.0, 0.0)).unwrap();
        let b = g.node_at(&p(10.0, 0.0)).unwrap();
        let c = g.node_at(&p(20.0, 0.0)).unwrap();
        assert_eq!(astar(&g, a, c, &Euclidean), vec![a, b, c]);
        assert_eq!(astar(&g, c, a, &Euclidean), vec![c, b, a]);
    }

    #[test]
    fn test_disconnected_is_empty() {
        let g = PathGraph::build(
            vec![(p(0.0, 0.0), p(10.0, 0.0)), (p(50.0, 0.0), p(60.0, 0.0))],
            0.5,
        );
        assert!(astar(&g, NodeId(0), NodeId(3), &Euclidean).is_empty());
    }

    #[test]
    fn test_invalid_ids_are_empty() {
        let g = PathGraph::build(vec![(p(0.0, 0.0), p(10.0, 0.0))], 0.5);
        assert!(astar(&g, NodeId(0), NodeId(9), &Euclidean).is_empty());
        assert!(astar(&g, NodeId(9), NodeId(0), &Euclidean).is_empty());
    }

    #[test]
    fn test_start_is_goal() {
        let g = PathGraph::build(vec![(p(0.0, 0.0), p(10.0, 0.0))], 0.5);
        assert_eq!(astar(&g, NodeId(1), NodeId(1), &Euclidean), vec![NodeId(1)]);
    }

    #[test]
    fn test_prefers_cheaper_route() {
        // Two routes from s to t; the geometrically shorter one is expensive.
        let s = p(0.0, 0.0);
        let a = p(50.0, 10.0);
        let b = p(50.0, -80.0);
        let t = p(100.0, 0.0);
        let g = PathGraph::build(vec![(s, a), (a, t), (s, b), (b, t)], 0.5);
        let toll = |from: &Point3, to: &Point3| {
            let d = (to - from).norm();
            if from.y > 0.0 || to.y > 0.0 {
                d * 10.0
            } else {
                d
            }
        };
        let path = g.find_path(NodeId(0), g.node_at(&t).unwrap(), &toll);
        assert_eq!(g.locations(&path), vec![s, b, t]);

        let path = g.find_path(NodeId(0), g.node_at(&t).unwrap(), &Euclidean);
        assert_eq!(g.locations(&path), vec![s, a, t]);
    }

    #[test]
    fn test_equal_costs_follow_link_order() {
        let s = p(0.0, 0.0);
        let a = p(1.0, 1.0);
        let b = p(1.0, -1.0);
        let t = p(2.0, 0.0);
        let g = PathGraph::build(vec![(s, a), (a, t), (s, b), (b, t)], 0.1);
        let path = g.find_path(NodeId(0), g.node_at(&t).unwrap(), &Euclidean);
        assert_eq!(g.locations(&path), vec![s, a, t]);
    }

    #[test]
    fn test_nan_cost_edges_are_skipped() {
        let g = PathGraph::build(vec![(p(0.0, 0.0), p(10.0, 0.0))], 0.5);
        let broken = |_: &Point3, _: &Point3| f64::NAN;
        assert!(g.find_path(NodeId(0), NodeId(1), &broken).is_empty());
    }
}
