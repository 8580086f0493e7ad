mod common;

use osmroute_lib::{
    plan_route, Error, GraphBuilder, PlannerState, Position, Projection, RoadClass,
    RouteAlgorithm, RoutePlanner, RouteRequest, RouteSummary, Way, WayAttributes,
};

const A: (i64, f64, f64) = (1, 0.0, 0.0);
const B: (i64, f64, f64) = (2, 0.0, 10.0);
const C: (i64, f64, f64) = (3, 10.0, 10.0);

#[test]
fn diagonal_shortcut_is_preferred() {
    let model = common::unit_graph(&[A, B, C], &[(1, 2), (2, 3), (1, 3)]);
    let mut planner = RoutePlanner::new(&model, 0.0, 0.0, 10.0, 10.0);

    planner.a_star_search().expect("route exists");

    assert_eq!(planner.state(), PlannerState::Solved);
    assert_eq!(planner.path().expect("solved"), &[0, 2]);
    let distance = planner.distance().expect("solved");
    assert!((distance - 200f64.sqrt()).abs() < 1e-9);
}

#[test]
fn route_follows_roads_without_shortcut() {
    let model = common::unit_graph(&[A, B, C], &[(1, 2), (2, 3)]);
    let mut planner = RoutePlanner::new(&model, 0.0, 0.0, 10.0, 10.0);

    planner.a_star_search().expect("route exists");

    assert_eq!(planner.path().expect("solved"), &[0, 1, 2]);
    assert!((planner.distance().expect("solved") - 20.0).abs() < 1e-9);
}

#[test]
fn isolated_goal_reports_route_not_found() {
    let mut builder = GraphBuilder::new(Projection::unit());
    for (osm_id, x, y) in [A, B, C] {
        builder.add_node(osm_id, Position::new(x, y));
    }
    builder.add_node(4, Position::new(50.0, 50.0));
    let road = WayAttributes::road(RoadClass::Residential);
    builder.add_way(&Way::new(1, vec![1, 2, 3], road));
    let model = builder.build();

    let mut planner = RoutePlanner::new(&model, 0.0, 0.0, 50.0, 50.0);
    let error = planner.a_star_search().expect_err("goal is unreachable");

    assert!(matches!(error, Error::RouteNotFound { start: 1, goal: 4 }));
    assert_eq!(planner.state(), PlannerState::NoRoute);
    assert!(matches!(planner.path(), Err(Error::RouteNotReady)));
    assert!(matches!(planner.a_star_search(), Err(Error::SearchAlreadyRun)));
}

#[test]
fn same_start_and_goal_is_a_zero_length_route() {
    let model = common::unit_graph(&[A, B, C], &[(1, 2), (2, 3)]);
    let mut planner = RoutePlanner::new(&model, 1.0, 9.0, -3.0, 12.0);

    planner.a_star_search().expect("trivial route");

    assert_eq!(planner.path().expect("solved"), &[1]);
    assert_eq!(planner.distance().expect("solved"), 0.0);
}

#[test]
fn one_way_street_forces_a_detour() {
    let model = common::grid_town();
    let scale = model.projection().metric_scale();

    let plan = plan_route(&model, &RouteRequest::a_star((100.0, 100.0), (100.0, 0.0)))
        .expect("route exists");
    let ids: Vec<i64> = plan
        .steps
        .iter()
        .map(|&index| model.nodes()[index].osm_id)
        .collect();
    assert_eq!(ids, vec![9, 8, 5, 2, 3]);
    assert!((plan.distance - 200.0 * scale).abs() < 1e-2);

    let plan = plan_route(&model, &RouteRequest::a_star((100.0, 0.0), (100.0, 100.0)))
        .expect("route exists");
    assert_eq!(plan.hop_count(), 2);
    assert!((plan.distance - 100.0 * scale).abs() < 1e-2);
}

#[test]
fn detached_footway_has_no_route_to_the_grid() {
    let model = common::grid_town();

    let result = plan_route(&model, &RouteRequest::a_star((20.0, 80.0), (0.0, 0.0)));
    assert!(matches!(
        result,
        Err(Error::RouteNotFound { start: 20, goal: 1 })
    ));
}

#[test]
fn dijkstra_matches_a_star_distance() {
    let model = common::grid_town();
    let queries = [
        ((0.0, 0.0), (100.0, 100.0)),
        ((100.0, 100.0), (0.0, 0.0)),
        ((60.0, 10.0), (10.0, 95.0)),
        ((99.0, 51.0), (49.0, 1.0)),
    ];

    for (start, goal) in queries {
        let a_star = plan_route(&model, &RouteRequest::a_star(start, goal)).expect("a* route");
        let dijkstra = plan_route(
            &model,
            &RouteRequest::a_star(start, goal).with_algorithm(RouteAlgorithm::Dijkstra),
        )
        .expect("dijkstra route");

        assert_eq!(dijkstra.algorithm, RouteAlgorithm::Dijkstra);
        assert!(
            (a_star.distance - dijkstra.distance).abs() < 1e-6,
            "{start:?} -> {goal:?}"
        );
    }
}

#[test]
fn plan_route_rejects_empty_graph_before_searching() {
    let model = GraphBuilder::new(Projection::unit()).build();

    let result = plan_route(&model, &RouteRequest::a_star((10.0, 10.0), (90.0, 90.0)));
    assert!(matches!(result, Err(Error::EmptyGraph)));
}

#[test]
fn summary_reports_cumulative_distances() {
    let model = common::unit_graph(&[A, B, C], &[(1, 2), (2, 3)]);
    let plan = plan_route(&model, &RouteRequest::a_star((0.0, 0.0), (10.0, 10.0)))
        .expect("route exists");

    let summary = RouteSummary::from_plan(&model, &plan).expect("summary");
    assert_eq!(summary.hops, 2);
    assert_eq!(summary.start.osm_id, 1);
    assert_eq!(summary.goal.osm_id, 3);
    let cumulative: Vec<f64> = summary
        .steps
        .iter()
        .map(|step| step.cumulative_distance)
        .collect();
    assert_eq!(cumulative, vec![0.0, 10.0, 20.0]);

    let text = summary.render_text(false);
    assert!(text.starts_with("Route from node 1 (0.00,0.00) to node 3 (10.00,10.00)"));
    assert!(text.ends_with("Distance: 20.00 meters.\n"));
    assert!(!text.contains("  0. node"));

    let detailed = summary.render_text(true);
    assert!(detailed.contains("     1. node 2 at (0.00,10.00) +10.0m"));
}

#[test]
fn summary_serialises_to_json() {
    let model = common::grid_town();
    let plan = plan_route(
        &model,
        &RouteRequest::a_star((0.0, 0.0), (50.0, 50.0)).with_algorithm(RouteAlgorithm::Dijkstra),
    )
    .expect("route exists");
    let summary = RouteSummary::from_plan(&model, &plan).expect("summary");

    let value = serde_json::to_value(&summary).expect("serialises");
    assert_eq!(value["algorithm"], "dijkstra");
    assert_eq!(value["hops"], 2);
    assert_eq!(value["start"]["osm_id"], 1);
    assert_eq!(value["goal"]["osm_id"], 5);
    assert_eq!(value["steps"].as_array().map(Vec::len), Some(3));
}
