//! Single-use route planner.
//!
//! A [`RoutePlanner`] resolves its two query points to graph nodes on
//! construction and runs exactly one search. Its lifecycle is
//! `Constructed -> Solved | NoRoute`; a finished planner never searches
//! again, so a new query needs a new planner.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::{NodeIndex, RouteModel};
use crate::path::{find_route_a_star, SearchOutcome, StraightLine, Zero};

use super::{RouteAlgorithm, RoutePlan};

/// Lifecycle of a [`RoutePlanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    /// Endpoints resolved (or found unresolvable); no search has run yet.
    Constructed,
    /// The goal was reached; path and distance are available.
    Solved,
    /// The search ended without reaching the goal.
    NoRoute,
}

/// Finds the shortest road route between two points of the normalized plane.
#[derive(Debug)]
pub struct RoutePlanner<'a> {
    model: &'a RouteModel,
    algorithm: RouteAlgorithm,
    endpoints: Option<(NodeIndex, NodeIndex)>,
    state: PlannerState,
    path: Vec<NodeIndex>,
    distance: f64,
}

impl<'a> RoutePlanner<'a> {
    /// Create a planner and resolve both coordinates to their nearest nodes.
    ///
    /// On an empty graph the endpoints stay unresolved and
    /// [`RoutePlanner::a_star_search`] reports [`Error::EmptyGraph`].
    pub fn new(model: &'a RouteModel, start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Self {
        let endpoints = match (
            model.nearest_node(start_x, start_y),
            model.nearest_node(end_x, end_y),
        ) {
            (Ok(start), Ok(goal)) => {
                debug!(start, goal, "resolved route endpoints");
                Some((start, goal))
            }
            (Err(error), _) | (_, Err(error)) => {
                warn!(%error, "could not resolve route endpoints");
                None
            }
        };

        Self {
            model,
            algorithm: RouteAlgorithm::AStar,
            endpoints,
            state: PlannerState::Constructed,
            path: Vec::new(),
            distance: 0.0,
        }
    }

    /// Choose the search algorithm. Has no effect once a search has run.
    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn algorithm(&self) -> RouteAlgorithm {
        self.algorithm
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    /// Node resolved for the start coordinate.
    pub fn start_node(&self) -> Option<NodeIndex> {
        self.endpoints.map(|(start, _)| start)
    }

    /// Node resolved for the end coordinate.
    pub fn end_node(&self) -> Option<NodeIndex> {
        self.endpoints.map(|(_, goal)| goal)
    }

    /// Run the search to completion.
    ///
    /// A graph without nodes has nothing to search: the planner moves to
    /// [`PlannerState::NoRoute`] and the call returns [`Error::EmptyGraph`]
    /// rather than [`Error::RouteNotFound`], so callers can tell a missing map from
    /// disconnected endpoints. A second call returns [`Error::SearchAlreadyRun`].
    pub fn a_star_search(&mut self) -> Result<()> {
        if self.state != PlannerState::Constructed {
            return Err(Error::SearchAlreadyRun);
        }

        let Some((start, goal)) = self.endpoints else {
            self.state = PlannerState::NoRoute;
            return Err(Error::EmptyGraph);
        };

        let outcome = match self.algorithm {
            RouteAlgorithm::AStar => find_route_a_star(self.model, start, goal, &StraightLine),
            RouteAlgorithm::Dijkstra => find_route_a_star(self.model, start, goal, &Zero),
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => {
                self.state = PlannerState::NoRoute;
                return Err(error);
            }
        };

        match outcome {
            SearchOutcome::Found {
                path,
                distance,
                expanded,
            } => {
                info!(
                    algorithm = %self.algorithm,
                    hops = path.len().saturating_sub(1),
                    distance,
                    expanded,
                    "route found"
                );
                self.path = path;
                self.distance = distance;
                self.state = PlannerState::Solved;
                Ok(())
            }
            SearchOutcome::NoRoute { expanded } => {
                info!(algorithm = %self.algorithm, expanded, "no route between endpoints");
                self.state = PlannerState::NoRoute;
                Err(self.route_not_found(start, goal))
            }
        }
    }

    /// Nodes of the route from start to goal.
    pub fn path(&self) -> Result<&[NodeIndex]> {
        self.ensure_solved()?;
        Ok(&self.path)
    }

    /// Total route length in metres.
    pub fn distance(&self) -> Result<f64> {
        self.ensure_solved()?;
        Ok(self.distance)
    }

    /// Consume the planner and return its route.
    pub fn into_plan(self) -> Result<RoutePlan> {
        self.ensure_solved()?;
        let (start, goal) = self.endpoints.ok_or(Error::RouteNotReady)?;
        if self.path.is_empty() {
            return Err(Error::EmptyRoutePlan);
        }

        Ok(RoutePlan {
            algorithm: self.algorithm,
            start,
            goal,
            steps: self.path,
            distance: self.distance,
        })
    }

    fn ensure_solved(&self) -> Result<()> {
        match self.state {
            PlannerState::Solved => Ok(()),
            PlannerState::Constructed | PlannerState::NoRoute => Err(Error::RouteNotReady),
        }
    }

    fn route_not_found(&self, start: NodeIndex, goal: NodeIndex) -> Error {
        let osm_id = |index: NodeIndex| self.model.node(index).map_or(0, |node| node.osm_id);
        Error::RouteNotFound {
            start: osm_id(start),
            goal: osm_id(goal),
        }
    }
}
