//! Common test utilities and fixture helpers.
//!
//! This module provides the hand-written map fixture, small synthetic graphs
//! built directly in the normalized plane, and a deterministic pseudo-random
//! source for property-style tests.

use std::path::PathBuf;

use osmroute_lib::{
    load_route_model, GraphBuilder, Position, Projection, RoadClass, RouteModel, Way,
    WayAttributes,
};

/// Path to fixtures directory shared by the workspace.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// A 3x3 street grid spanning the full plane, plus a detached footway and
/// some non-road ways.
#[allow(dead_code)]
pub fn grid_town_path() -> PathBuf {
    fixtures_dir().join("grid_town.osm")
}

/// The same map as [`grid_town_path`], encoded as PBF.
#[allow(dead_code)]
pub fn grid_town_pbf_path() -> PathBuf {
    fixtures_dir().join("grid_town.osm.pbf")
}

#[allow(dead_code)]
pub fn grid_town() -> RouteModel {
    load_route_model(&grid_town_path()).expect("grid_town fixture loads")
}

/// Build a graph in the unit projection from `(osm_id, x, y)` nodes and
/// bidirectional two-node residential ways.
#[allow(dead_code)]
pub fn unit_graph(nodes: &[(i64, f64, f64)], segments: &[(i64, i64)]) -> RouteModel {
    let mut builder = GraphBuilder::new(Projection::unit());
    for &(osm_id, x, y) in nodes {
        builder.add_node(osm_id, Position::new(x, y));
    }
    for (way_id, &(from, to)) in (1..).zip(segments) {
        builder.add_way(&Way::new(
            way_id,
            vec![from, to],
            WayAttributes::road(RoadClass::Residential),
        ));
    }
    builder.build()
}

/// Deterministic linear congruential generator so property tests stay reproducible.
#[allow(dead_code)]
pub struct Lcg(u64);

#[allow(dead_code)]
impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / ((1u64 << 53) as f64)
    }

    /// Uniform value in `[0, bound)`.
    pub fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

/// Random graph in the unit projection: `nodes` points scattered over the
/// plane and `ways` two-node ways, some of them one-way.
#[allow(dead_code)]
pub fn random_graph(seed: u64, nodes: usize, ways: usize) -> RouteModel {
    let mut rng = Lcg::new(seed);
    let mut builder = GraphBuilder::new(Projection::unit());
    for osm_id in 0..nodes {
        let x = rng.next_f64() * 100.0;
        let y = rng.next_f64() * 100.0;
        builder.add_node(osm_id as i64, Position::new(x, y));
    }
    for way_id in 0..ways {
        let from = rng.below(nodes) as i64;
        let to = rng.below(nodes) as i64;
        let mut attributes = WayAttributes::road(RoadClass::Residential);
        if rng.below(4) == 0 {
            attributes = attributes.one_way();
        }
        builder.add_way(&Way::new(way_id as i64, vec![from, to], attributes));
    }
    builder.build()
}
