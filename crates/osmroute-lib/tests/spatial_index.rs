//! Integration tests for nearest-node resolution.
//!
//! These tests verify:
//! - Exact matches on node coordinates
//! - Agreement between the KD-tree and a linear scan
//! - k-nearest and radius queries
//! - Behaviour on an empty graph
//! - Nodes stacked on one position

mod common;

use osmroute_lib::{Error, GraphBuilder, Position, Projection};

#[test]
fn query_on_a_node_returns_that_node() {
    let model = common::grid_town();

    for node in model.nodes() {
        let found = model
            .nearest_node(node.position.x, node.position.y)
            .expect("graph is not empty");
        assert_eq!(found, node.index, "node {}", node.osm_id);
    }
}

#[test]
fn fixture_queries_snap_to_closest_intersection() {
    let model = common::grid_town();
    let resolve = |x, y| {
        let index = model.nearest_node(x, y).expect("graph is not empty");
        model.nodes()[index].osm_id
    };

    assert_eq!(resolve(65.0, 65.0), 5);
    assert_eq!(resolve(10.0, 10.0), 1);
    assert_eq!(resolve(90.0, 90.0), 9);
    assert_eq!(resolve(24.0, 79.0), 20);
}

#[test]
fn index_matches_linear_scan_on_random_points() {
    let model = common::random_graph(7, 500, 0);
    let mut rng = common::Lcg::new(99);

    for _ in 0..1_000 {
        let x = rng.next_f64() * 100.0;
        let y = rng.next_f64() * 100.0;
        let indexed = model.nearest_node(x, y).expect("graph is not empty");
        let linear = model.nearest_node_linear(x, y).expect("graph is not empty");

        let query = Position::new(x, y);
        let indexed_distance = model.nodes()[indexed].position.distance_to(&query);
        let linear_distance = model.nodes()[linear].position.distance_to(&query);
        assert!(
            (indexed_distance - linear_distance).abs() < 1e-12,
            "({x}, {y}): index found {indexed}, scan found {linear}"
        );
    }
}

#[test]
fn nearest_n_returns_sorted_neighbours() {
    let model = common::grid_town();
    let index = model.spatial_index();

    let neighbours = index.nearest_n(Position::new(50.0, 50.0), 5);
    assert_eq!(neighbours.len(), 5);
    assert_eq!(model.nodes()[neighbours[0].0].osm_id, 5);
    assert!(neighbours[0].1 < 1e-9);
    assert!(neighbours.windows(2).all(|pair| pair[0].1 <= pair[1].1));
}

#[test]
fn within_radius_filters_by_distance() {
    let model = common::grid_town();
    let index = model.spatial_index();

    let around_centre = index.within_radius(Position::new(50.0, 50.0), 50.5);
    let mut ids: Vec<i64> = around_centre
        .iter()
        .map(|(node, _)| model.nodes()[*node].osm_id)
        .collect();
    ids.sort_unstable();
    // Centre, its four grid neighbours and both footway nodes.
    assert_eq!(ids, vec![2, 4, 5, 6, 8, 20, 21]);
    assert!(around_centre.iter().all(|(_, distance)| *distance <= 50.5));

    assert!(index.within_radius(Position::new(50.0, 50.0), 0.0).is_empty());
}

#[test]
fn empty_graph_has_no_nearest_node() {
    let model = GraphBuilder::new(Projection::unit()).build();

    assert!(model.spatial_index().is_empty());
    assert!(matches!(model.nearest_node(50.0, 50.0), Err(Error::EmptyGraph)));
    assert!(matches!(
        model.nearest_node_linear(50.0, 50.0),
        Err(Error::EmptyGraph)
    ));
    assert!(model.spatial_index().nearest_n(Position::new(0.0, 0.0), 3).is_empty());
}

#[test]
fn many_nodes_at_one_position_are_all_indexed() {
    let mut builder = GraphBuilder::new(Projection::unit());
    for osm_id in 0..300 {
        builder.add_node(osm_id, Position::new(0.0, 0.0));
    }
    builder.add_node(1_000, Position::new(40.0, 30.0));
    let model = builder.build();
    let index = model.spatial_index();

    assert_eq!(index.len(), 301);
    assert_eq!(model.nearest_node(2.0, 1.0).expect("not empty"), 0);
    assert_eq!(model.nearest_node_linear(2.0, 1.0).expect("not empty"), 0);
    assert_eq!(model.nearest_node(39.0, 31.0).expect("not empty"), 300);

    let closest = index.nearest_n(Position::new(0.0, 0.0), 301);
    assert_eq!(closest.len(), 301);
    assert_eq!(closest[0].0, 0);
    assert_eq!(closest[300], (300, 50.0));

    let stacked = index.within_radius(Position::new(0.0, 0.0), 1.0);
    let stacked: Vec<usize> = stacked.into_iter().map(|(node, _)| node).collect();
    assert_eq!(stacked, (0..300).collect::<Vec<_>>());
}
