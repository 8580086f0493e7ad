//! Route planning between two points of the normalized plane.
//!
//! This module provides:
//! - [`RouteAlgorithm`] - Supported search algorithms (A*, Dijkstra)
//! - [`RouteRequest`] - Start and goal coordinates plus the algorithm to run
//! - [`RoutePlanner`] - Single-use search over a built [`RouteModel`]
//! - [`RoutePlan`] - Planned route result
//! - [`plan_route`] - Main entry point for computing routes
//!
//! # Example
//!
//! ```no_run
//! use osmroute_lib::{load_route_model, plan_route, RouteRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = load_route_model(std::path::Path::new("map.osm"))?;
//! let plan = plan_route(&model, &RouteRequest::a_star((10.0, 10.0), (90.0, 90.0)))?;
//! println!("Distance: {} meters.", plan.distance);
//! # Ok(())
//! # }
//! ```

mod planner;

pub use planner::{PlannerState, RoutePlanner};

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::graph::{NodeIndex, RouteModel};
use crate::projection::Position;

/// Supported routing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    /// A* guided by straight-line distance to the goal.
    #[default]
    #[serde(rename = "a-star")]
    AStar,
    /// Uninformed uniform-cost search.
    Dijkstra,
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::AStar => "a-star",
            RouteAlgorithm::Dijkstra => "dijkstra",
        };
        f.write_str(value)
    }
}

/// High-level route planning request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub start: Position,
    pub goal: Position,
    pub algorithm: RouteAlgorithm,
}

impl RouteRequest {
    /// Convenience constructor for an A* route between two `(x, y)` points.
    pub fn a_star(start: (f64, f64), goal: (f64, f64)) -> Self {
        Self {
            start: Position::new(start.0, start.1),
            goal: Position::new(goal.0, goal.1),
            algorithm: RouteAlgorithm::AStar,
        }
    }

    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub algorithm: RouteAlgorithm,
    pub start: NodeIndex,
    pub goal: NodeIndex,
    /// Nodes from start to goal, inclusive.
    pub steps: Vec<NodeIndex>,
    /// Total length in metres.
    pub distance: f64,
}

impl RoutePlan {
    /// Number of segments in the route.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Compute a route using the requested algorithm.
///
/// Fails with [`Error::EmptyGraph`](crate::Error::EmptyGraph) before searching when the model has no
/// nodes, and with [`Error::RouteNotFound`](crate::Error::RouteNotFound) when the endpoints are not connected.
pub fn plan_route(model: &RouteModel, request: &RouteRequest) -> Result<RoutePlan> {
    model.ensure_routable()?;

    let mut planner = RoutePlanner::new(
        model,
        request.start.x,
        request.start.y,
        request.goal.x,
        request.goal.y,
    )
    .with_algorithm(request.algorithm);
    planner.a_star_search()?;
    planner.into_plan()
}
