//! KD-tree spatial index for nearest-node queries on the normalized plane.
//!
//! The index is built once, after every node of the road graph is known, and
//! is read-only afterwards. Queries run in O(log n) on average instead of the
//! linear scan a plain node list would need.
//!
//! All distances returned here are in normalized-plane units; callers convert
//! to metres through the graph's [`Projection`](crate::projection::Projection).

use std::collections::HashMap;
use std::fmt;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::graph::{Node, NodeIndex};
use crate::projection::Position;

/// KD-tree bucket size. Road nodes along a straight street can share one
/// coordinate, and a bucket must hold every item that shares a split value.
const BUCKET_SIZE: usize = 256;

/// Precomputed spatial index over node positions.
///
/// The tree holds each distinct position once. Nodes that share a position
/// (duplicated OSM nodes, or nodes clamped onto the same plane edge) are
/// grouped into one slot, so no bucket ever fills with identical points.
pub struct SpatialIndex {
    /// Items are indices into `slots`.
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
    /// Node indices at each distinct position, ascending.
    slots: Vec<Vec<NodeIndex>>,
    len: usize,
}

impl SpatialIndex {
    /// Build an index over every node of the arena.
    pub fn build(nodes: &[Node]) -> Self {
        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        let mut slots: Vec<Vec<NodeIndex>> = Vec::new();
        let mut by_position: HashMap<(u64, u64), usize> = HashMap::new();

        for node in nodes {
            let key = position_key(node.position);
            match by_position.get(&key) {
                Some(&slot) => slots[slot].push(node.index),
                None => {
                    let slot = slots.len();
                    tree.add(&node.position.as_array(), slot);
                    slots.push(vec![node.index]);
                    by_position.insert(key, slot);
                }
            }
        }
        for members in &mut slots {
            members.sort_unstable();
        }

        debug!(
            node_count = nodes.len(),
            distinct_positions = slots.len(),
            "built spatial index"
        );

        Self {
            tree,
            slots,
            len: nodes.len(),
        }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Closest node to `point` with its distance, or `None` for an empty index.
    ///
    /// Among nodes sharing the closest position the lowest index wins.
    pub fn nearest(&self, point: Position) -> Option<(NodeIndex, f64)> {
        if self.is_empty() {
            return None;
        }

        let neighbour = self
            .tree
            .nearest_one::<SquaredEuclidean>(&point.as_array());
        let node = self.slots.get(neighbour.item)?.first()?;
        Some((*node, neighbour.distance.sqrt()))
    }

    /// Find the k nearest nodes to a point.
    ///
    /// Returns (NodeIndex, distance) pairs sorted by distance, ties by index.
    pub fn nearest_n(&self, point: Position, k: usize) -> Vec<(NodeIndex, f64)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        // Each slot holds at least one node, so k slots always cover k nodes.
        let results = self
            .tree
            .nearest_n::<SquaredEuclidean>(&point.as_array(), k);

        let mut neighbours = self.expand(
            results
                .into_iter()
                .map(|neighbour| (neighbour.item, neighbour.distance.sqrt())),
        );
        sort_neighbours(&mut neighbours);
        neighbours.truncate(k);
        neighbours
    }

    /// Find all nodes within a radius of a point.
    ///
    /// Returns (NodeIndex, distance) pairs sorted by distance, ties by index.
    pub fn within_radius(&self, point: Position, radius: f64) -> Vec<(NodeIndex, f64)> {
        if radius <= 0.0 || self.is_empty() {
            return Vec::new();
        }

        let results = self
            .tree
            .within::<SquaredEuclidean>(&point.as_array(), radius * radius);

        let mut neighbours = self.expand(
            results
                .into_iter()
                .map(|neighbour| (neighbour.item, neighbour.distance.sqrt()))
                .filter(|(_, distance)| *distance <= radius),
        );
        sort_neighbours(&mut neighbours);
        neighbours
    }

    /// Replace each slot hit with every node at that position.
    fn expand(&self, hits: impl Iterator<Item = (usize, f64)>) -> Vec<(NodeIndex, f64)> {
        hits.flat_map(|(slot, distance)| {
            self.slots
                .get(slot)
                .into_iter()
                .flatten()
                .map(move |&node| (node, distance))
        })
        .collect()
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.len)
            .field("distinct_positions", &self.slots.len())
            .finish_non_exhaustive()
    }
}

/// Bit pattern of a position; `+ 0.0` folds `-0.0` into `0.0`.
fn position_key(position: Position) -> (u64, u64) {
    ((position.x + 0.0).to_bits(), (position.y + 0.0).to_bits())
}

fn sort_neighbours(neighbours: &mut [(NodeIndex, f64)]) {
    neighbours.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
}
