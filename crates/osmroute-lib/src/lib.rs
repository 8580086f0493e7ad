//! OpenStreetMap route planner library entry points.
//!
//! This crate parses raw OpenStreetMap data into a weighted road graph,
//! indexes its nodes for nearest-point lookup, and runs A* searches between
//! two points of the normalized `[0, 100] x [0, 100]` plane. Higher-level
//! consumers (the CLI, renderers) should only depend on the functions exported
//! here instead of reimplementing behavior.
//!

pub mod error;
pub mod graph;
pub mod osm;
pub mod output;
pub mod path;
pub mod projection;
pub mod routing;
pub mod spatial;

pub use error::{Error, Result};
pub use graph::{
    build_from_osm, build_route_model, load_route_model, Edge, GraphBuilder, Node, NodeIndex,
    Road, RouteModel,
};
pub use osm::{parse_osm, OneWay, OsmData, OsmNodeId, OsmWayId, RoadClass, Way, WayAttributes};
pub use output::{RouteEndpoint, RouteStep, RouteSummary};
pub use path::{find_route_a_star, path_distance, Heuristic, SearchOutcome, StraightLine, Zero};
pub use projection::{GeoBounds, GeoPoint, Position, Projection, PLANE_EXTENT};
pub use routing::{
    plan_route, PlannerState, RouteAlgorithm, RoutePlan, RoutePlanner, RouteRequest,
};
pub use spatial::SpatialIndex;
