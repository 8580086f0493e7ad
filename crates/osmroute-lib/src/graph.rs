//! Road graph built from parsed map data.
//!
//! [`GraphBuilder`] registers nodes on the normalized plane and turns routable
//! ways into directed edges weighted in metres. [`RouteModel`] is the frozen
//! result, with its spatial index for nearest-node lookups.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::osm::{parse_osm, OneWay, OsmData, OsmNodeId, OsmWayId, RoadClass, Way};
use crate::projection::{GeoBounds, GeoPoint, Position, Projection};
use crate::spatial::SpatialIndex;

/// Stable identity of a node within a built graph: its index in the node arena.
pub type NodeIndex = usize;

/// A navigable point of the road network.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub index: NodeIndex,
    pub osm_id: OsmNodeId,
    pub position: Position,
}

/// Directed connection to a neighbouring node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeIndex,
    /// Segment length in metres.
    pub distance: f64,
}

/// A routable way kept for display: the polyline of nodes it runs through.
#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    pub way_id: OsmWayId,
    pub road_class: RoadClass,
    pub oneway: OneWay,
    pub closed: bool,
    pub nodes: Vec<NodeIndex>,
}

/// Read-only road graph: node arena, adjacency, routable ways and the
/// spatial index used for nearest-node resolution.
#[derive(Debug)]
pub struct RouteModel {
    projection: Projection,
    nodes: Vec<Node>,
    adjacency: Vec<Vec<Edge>>,
    way_counts: Vec<u32>,
    roads: Vec<Road>,
    osm_to_index: HashMap<OsmNodeId, NodeIndex>,
    index: SpatialIndex,
}

impl RouteModel {
    /// All nodes, indexed by [`NodeIndex`].
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Report an empty graph as an explicit error so callers can abort early.
    pub fn ensure_routable(&self) -> Result<()> {
        if self.is_empty() {
            Err(Error::EmptyGraph)
        } else {
            Ok(())
        }
    }

    /// Return the outgoing edges of a node, sorted by target index.
    pub fn neighbours(&self, node: NodeIndex) -> &[Edge] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Routable ways, in source order.
    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn node_by_osm_id(&self, osm_id: OsmNodeId) -> Option<NodeIndex> {
        self.osm_to_index.get(&osm_id).copied()
    }

    /// A node referenced by two or more routable ways.
    pub fn is_intersection(&self, node: NodeIndex) -> bool {
        self.way_counts.get(node).is_some_and(|count| *count >= 2)
    }

    /// All intersection nodes, in index order.
    pub fn intersections(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len()).filter(|&node| self.is_intersection(node))
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Straight-line distance in metres between two nodes.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the node arena.
    pub fn distance_between(&self, from: NodeIndex, to: NodeIndex) -> f64 {
        let from = &self.nodes[from].position;
        let to = &self.nodes[to].position;
        self.projection.to_physical(from.distance_to(to))
    }

    /// Node closest to `(x, y)` in the normalized plane, using the spatial index.
    pub fn nearest_node(&self, x: f64, y: f64) -> Result<NodeIndex> {
        self.index
            .nearest(Position::new(x, y))
            .map(|(node, _)| node)
            .ok_or(Error::EmptyGraph)
    }

    /// Linear-scan reference for [`RouteModel::nearest_node`]; ties resolve to the lower index.
    pub fn nearest_node_linear(&self, x: f64, y: f64) -> Result<NodeIndex> {
        let query = Position::new(x, y);
        self.nodes
            .iter()
            .map(|node| (node.index, node.position.distance_to(&query)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
            .map(|(node, _)| node)
            .ok_or(Error::EmptyGraph)
    }
}

/// Incrementally assembles a [`RouteModel`].
///
/// Nodes are registered first, then ways are added; each consecutive pair of
/// a routable way's references becomes an edge (both directions unless the
/// way is one-way). The spatial index is only built in [`GraphBuilder::build`],
/// after every edge has been merged.
#[derive(Debug)]
pub struct GraphBuilder {
    projection: Projection,
    nodes: Vec<Node>,
    adjacency: Vec<Vec<Edge>>,
    way_counts: Vec<u32>,
    roads: Vec<Road>,
    osm_to_index: HashMap<OsmNodeId, NodeIndex>,
}

impl GraphBuilder {
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            nodes: Vec::new(),
            adjacency: Vec::new(),
            way_counts: Vec::new(),
            roads: Vec::new(),
            osm_to_index: HashMap::new(),
        }
    }

    /// Register a node at a normalized position. Registering an OSM id twice
    /// returns the existing index and keeps the first position.
    pub fn add_node(&mut self, osm_id: OsmNodeId, position: Position) -> NodeIndex {
        if let Some(&index) = self.osm_to_index.get(&osm_id) {
            return index;
        }

        let index = self.nodes.len();
        self.nodes.push(Node {
            index,
            osm_id,
            position,
        });
        self.adjacency.push(Vec::new());
        self.way_counts.push(0);
        self.osm_to_index.insert(osm_id, index);
        index
    }

    /// Register a node from geographic coordinates.
    pub fn add_geo_node(&mut self, osm_id: OsmNodeId, point: GeoPoint) -> NodeIndex {
        let position = self.projection.project(point);
        self.add_node(osm_id, position)
    }

    /// Add the segments of a way. Returns the number of roads it produced.
    ///
    /// Non-routable ways are discarded. References to unregistered nodes split
    /// the way; each remaining run of two or more nodes becomes a [`Road`].
    pub fn add_way(&mut self, way: &Way) -> usize {
        if !way.attributes.is_routable() {
            return 0;
        }
        let Some(road_class) = way.attributes.road_class else {
            return 0;
        };

        let mut runs: Vec<Vec<NodeIndex>> = vec![Vec::new()];
        for osm_id in &way.refs {
            match self.osm_to_index.get(osm_id) {
                Some(&index) => {
                    if let Some(run) = runs.last_mut() {
                        run.push(index);
                    }
                }
                None => {
                    debug!(way = way.id, node = osm_id, "way references unknown node");
                    runs.push(Vec::new());
                }
            }
        }
        runs.retain(|run| run.len() >= 2);

        let mut touched: Vec<NodeIndex> = runs.iter().flatten().copied().collect();
        touched.sort_unstable();
        touched.dedup();
        for node in touched {
            self.way_counts[node] += 1;
        }

        let produced = runs.len();
        for run in runs {
            for pair in run.windows(2) {
                self.connect(pair[0], pair[1], way.attributes.oneway);
            }
            self.roads.push(Road {
                way_id: way.id,
                road_class,
                oneway: way.attributes.oneway,
                closed: way.attributes.closed,
                nodes: run,
            });
        }
        produced
    }

    fn connect(&mut self, from: NodeIndex, to: NodeIndex, oneway: OneWay) {
        match oneway {
            OneWay::No => {
                self.insert_edge(from, to);
                self.insert_edge(to, from);
            }
            OneWay::Forward => self.insert_edge(from, to),
            OneWay::Backward => self.insert_edge(to, from),
        }
    }

    fn insert_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if from == to {
            return;
        }

        let length = self.nodes[from]
            .position
            .distance_to(&self.nodes[to].position);
        let distance = self.projection.to_physical(length);

        let edges = &mut self.adjacency[from];
        if let Some(existing) = edges.iter_mut().find(|edge| edge.target == to) {
            if distance < existing.distance {
                existing.distance = distance;
            }
            return;
        }
        edges.push(Edge {
            target: to,
            distance,
        });
    }

    /// Finish the graph and build its spatial index.
    pub fn build(mut self) -> RouteModel {
        for edges in &mut self.adjacency {
            edges.sort_by_key(|edge| edge.target);
        }

        let index = SpatialIndex::build(&self.nodes);
        let model = RouteModel {
            projection: self.projection,
            nodes: self.nodes,
            adjacency: self.adjacency,
            way_counts: self.way_counts,
            roads: self.roads,
            osm_to_index: self.osm_to_index,
            index,
        };

        info!(
            nodes = model.len(),
            edges = model.edge_count(),
            roads = model.roads.len(),
            intersections = model.intersections().count(),
            metric_scale = model.projection.metric_scale(),
            "built road graph"
        );
        model
    }
}

/// Build the road graph from a raw map buffer.
///
/// Never fails: an empty or unparseable buffer yields an empty graph, which
/// callers detect through [`RouteModel::ensure_routable`].
pub fn build_route_model(data: &[u8]) -> RouteModel {
    let osm = match parse_osm(data) {
        Ok(osm) => osm,
        Err(error) => {
            warn!(%error, bytes = data.len(), "failed to parse map data; using an empty graph");
            OsmData::default()
        }
    };
    build_from_osm(&osm)
}

/// Build the road graph from already parsed map data.
pub fn build_from_osm(osm: &OsmData) -> RouteModel {
    let referenced = osm
        .routable_ways()
        .flat_map(|way| way.refs.iter())
        .filter_map(|id| osm.nodes.get(id).copied());
    // Complete ways in an extract may reach past the declared bounds, so the
    // plane covers both.
    let bounds = match (osm.bounds, GeoBounds::from_points(referenced)) {
        (Some(declared), Some(nodes)) => Some(declared.union(nodes)),
        (declared, nodes) => declared.or(nodes),
    };
    let projection = bounds
        .map(Projection::from_bounds)
        .unwrap_or_else(Projection::unit);
    debug!(?bounds, metric_scale = projection.metric_scale(), "normalizing map");

    let mut builder = GraphBuilder::new(projection);
    let mut discarded = 0usize;
    for way in &osm.ways {
        if !way.attributes.is_routable() {
            discarded += 1;
            continue;
        }
        // Only nodes with a known neighbour on the way end up on a segment.
        let known = |position: usize| {
            way.refs
                .get(position)
                .is_some_and(|osm_id| osm.nodes.contains_key(osm_id))
        };
        for (position, osm_id) in way.refs.iter().enumerate() {
            let Some(point) = osm.nodes.get(osm_id) else {
                continue;
            };
            let linked = (position > 0 && known(position - 1)) || known(position + 1);
            if linked {
                builder.add_geo_node(*osm_id, *point);
            }
        }
        builder.add_way(way);
    }
    debug!(discarded, "discarded non-road ways");

    builder.build()
}

/// Read a map file and build its road graph.
pub fn load_route_model(path: &Path) -> Result<RouteModel> {
    let data = std::fs::read(path).map_err(|source| Error::MapRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = data.len(), "read map data");
    Ok(build_route_model(&data))
}
