// Test utilities used across `osmroute-cli` tests.
// Kept under `#[cfg(test)]` so it is not part of the public crate API.
use osmroute_lib::{
    plan_route, GraphBuilder, Position, Projection, RoadClass, RouteModel, RouteRequest,
    RouteSummary, Way, WayAttributes,
};

/// Three nodes on a straight residential road, five units apart.
pub fn corridor() -> RouteModel {
    let mut builder = GraphBuilder::new(Projection::unit());
    builder.add_node(1, Position::new(0.0, 0.0));
    builder.add_node(2, Position::new(5.0, 0.0));
    builder.add_node(3, Position::new(10.0, 0.0));
    builder.add_way(&Way::new(
        1,
        vec![1, 2, 3],
        WayAttributes::road(RoadClass::Residential),
    ));
    builder.build()
}

/// Summary of the full corridor route, from node 1 to node 3.
pub fn corridor_summary() -> RouteSummary {
    let model = corridor();
    let plan = plan_route(&model, &RouteRequest::a_star((0.0, 0.0), (10.0, 0.0)))
        .expect("corridor is connected");
    RouteSummary::from_plan(&model, &plan).expect("plan has steps")
}
