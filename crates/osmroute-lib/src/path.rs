use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{NodeIndex, RouteModel};

/// Estimate of the remaining cost from a node to the goal, in metres.
///
/// A* returns optimal routes only when the estimate never exceeds the true
/// remaining road distance and satisfies `h(u) <= length(u, v) + h(v)` for
/// every edge.
pub trait Heuristic {
    fn estimate(&self, model: &RouteModel, from: NodeIndex, goal: NodeIndex) -> f64;
}

/// Straight-line distance to the goal. Admissible and consistent because
/// every edge is itself a straight segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLine;

impl Heuristic for StraightLine {
    fn estimate(&self, model: &RouteModel, from: NodeIndex, goal: NodeIndex) -> f64 {
        model.distance_between(from, goal)
    }
}

/// No estimate at all, which reduces A* to Dijkstra's algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zero;

impl Heuristic for Zero {
    fn estimate(&self, _model: &RouteModel, _from: NodeIndex, _goal: NodeIndex) -> f64 {
        0.0
    }
}

/// Result of a single search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Path from start to goal (inclusive) and its length in metres.
    Found {
        path: Vec<NodeIndex>,
        distance: f64,
        expanded: usize,
    },
    /// The open set ran dry before the goal was closed.
    NoRoute { expanded: usize },
}

/// Per-node search state.
#[derive(Debug, Clone, Copy)]
struct NodeScratch {
    g: f64,
    h: f64,
    discovered: bool,
    visited: bool,
    parent: Option<NodeIndex>,
}

impl Default for NodeScratch {
    fn default() -> Self {
        Self {
            g: f64::INFINITY,
            h: 0.0,
            discovered: false,
            visited: false,
            parent: None,
        }
    }
}

/// Mutable search state kept apart from the read-only graph, allocated fresh
/// for every search.
#[derive(Debug)]
struct SearchScratch {
    nodes: Vec<NodeScratch>,
}

impl SearchScratch {
    fn new(len: usize) -> Self {
        Self {
            nodes: vec![NodeScratch::default(); len],
        }
    }

    fn get(&self, node: NodeIndex) -> NodeScratch {
        self.nodes[node]
    }

    fn record(&mut self, node: NodeIndex, g: f64, h: f64, parent: Option<NodeIndex>) {
        let entry = &mut self.nodes[node];
        entry.g = g;
        entry.h = h;
        entry.discovered = true;
        entry.parent = parent;
    }

    fn close(&mut self, node: NodeIndex) {
        self.nodes[node].visited = true;
    }
}

/// Run A* from `start` to `goal` guided by `heuristic`.
///
/// Nodes are closed when popped from the open set and never reopened. Stale
/// heap entries left behind by cost improvements are skipped on pop.
pub fn find_route_a_star<H: Heuristic + ?Sized>(
    model: &RouteModel,
    start: NodeIndex,
    goal: NodeIndex,
    heuristic: &H,
) -> Result<SearchOutcome> {
    for index in [start, goal] {
        if model.node(index).is_none() {
            return Err(Error::UnknownNode { index });
        }
    }

    let mut scratch = SearchScratch::new(model.len());
    let mut open = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut expanded = 0usize;

    let start_estimate = heuristic.estimate(model, start, goal);
    scratch.record(start, 0.0, start_estimate, None);
    open.push(OpenEntry::new(start, 0.0, start_estimate, sequence));

    while let Some(entry) = open.pop() {
        let current = entry.node;
        let state = scratch.get(current);
        if state.visited || entry.cost.0 > state.g {
            continue;
        }

        scratch.close(current);
        expanded += 1;

        if current == goal {
            let path = reconstruct_path(&scratch, start, goal);
            debug!(
                start,
                goal,
                expanded,
                hops = path.len().saturating_sub(1),
                distance = state.g,
                "search reached goal"
            );
            return Ok(SearchOutcome::Found {
                path,
                distance: state.g,
                expanded,
            });
        }

        for edge in model.neighbours(current) {
            let next = edge.target;
            let next_state = scratch.get(next);
            if next_state.visited {
                continue;
            }

            let tentative_g = state.g + edge.distance;
            if !next_state.discovered || tentative_g < next_state.g {
                let estimate = if next_state.discovered {
                    next_state.h
                } else {
                    heuristic.estimate(model, next, goal)
                };
                scratch.record(next, tentative_g, estimate, Some(current));
                sequence += 1;
                open.push(OpenEntry::new(next, tentative_g, estimate, sequence));
            }
        }
    }

    debug!(start, goal, expanded, "open set exhausted without reaching goal");
    Ok(SearchOutcome::NoRoute { expanded })
}

fn reconstruct_path(scratch: &SearchScratch, start: NodeIndex, goal: NodeIndex) -> Vec<NodeIndex> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start || path.len() > scratch.nodes.len() {
            break;
        }
        current = scratch.get(node).parent;
    }
    path.reverse();
    path
}

/// Sum of straight-line segment lengths along a path, in metres.
pub fn path_distance(model: &RouteModel, path: &[NodeIndex]) -> f64 {
    path.windows(2)
        .map(|pair| model.distance_between(pair[0], pair[1]))
        .sum()
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct OpenEntry {
    node: NodeIndex,
    cost: FloatOrd,
    heuristic: FloatOrd,
    estimate: FloatOrd,
    sequence: u64,
}

impl OpenEntry {
    fn new(node: NodeIndex, cost: f64, heuristic: f64, sequence: u64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            heuristic: FloatOrd(heuristic),
            estimate: FloatOrd(cost + heuristic),
            sequence,
        }
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap pops the lowest f first; ties prefer
        // the entry closer to the goal, then the earlier insertion.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.heuristic.cmp(&self.heuristic))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
