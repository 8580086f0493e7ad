//! Route summaries for display.
//!
//! A solved plan is turned into endpoint and step records that serialize to
//! JSON or render as the plain text report.

use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{NodeIndex, RouteModel};
use crate::osm::OsmNodeId;
use crate::projection::Position;
use crate::routing::RoutePlan;
use crate::RouteAlgorithm;

/// Endpoint within a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteEndpoint {
    pub index: NodeIndex,
    pub osm_id: OsmNodeId,
    pub position: Position,
}

/// Node visited along a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    pub step: usize,
    pub index: NodeIndex,
    pub osm_id: OsmNodeId,
    pub position: Position,
    /// Distance travelled from the start, in metres.
    pub cumulative_distance: f64,
}

/// Structured representation of a planned route that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub algorithm: RouteAlgorithm,
    pub hops: usize,
    /// Total route length in metres.
    pub distance: f64,
    pub start: RouteEndpoint,
    pub goal: RouteEndpoint,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    /// Convert a [`RoutePlan`] into a summary with resolved node details.
    pub fn from_plan(model: &RouteModel, plan: &RoutePlan) -> Result<Self> {
        if plan.steps.is_empty() {
            return Err(Error::EmptyRoutePlan);
        }

        let mut cumulative = 0.0;
        let mut previous: Option<NodeIndex> = None;
        let mut steps = Vec::with_capacity(plan.steps.len());
        for (step, &index) in plan.steps.iter().enumerate() {
            let node = model.node(index).ok_or(Error::UnknownNode { index })?;
            if let Some(previous) = previous {
                cumulative += model.distance_between(previous, index);
            }
            previous = Some(index);
            steps.push(RouteStep {
                step,
                index,
                osm_id: node.osm_id,
                position: node.position,
                cumulative_distance: cumulative,
            });
        }

        let endpoint = |step: &RouteStep| RouteEndpoint {
            index: step.index,
            osm_id: step.osm_id,
            position: step.position,
        };
        let (Some(first), Some(last)) = (steps.first(), steps.last()) else {
            return Err(Error::EmptyRoutePlan);
        };
        let start = endpoint(first);
        let goal = endpoint(last);

        Ok(Self {
            algorithm: plan.algorithm,
            hops: plan.hop_count(),
            distance: plan.distance,
            start,
            goal,
            steps,
        })
    }

    /// Render the summary as plain text.
    pub fn render_text(&self, show_steps: bool) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route from node {} ({:.2},{:.2}) to node {} ({:.2},{:.2}) ({} segments; algorithm: {}):",
            self.start.osm_id,
            self.start.position.x,
            self.start.position.y,
            self.goal.osm_id,
            self.goal.position.x,
            self.goal.position.y,
            self.hops,
            self.algorithm
        );
        if show_steps {
            for step in &self.steps {
                let _ = writeln!(
                    buffer,
                    "  {:>4}. node {} at ({:.2},{:.2}) +{:.1}m",
                    step.step,
                    step.osm_id,
                    step.position.x,
                    step.position.y,
                    step.cumulative_distance
                );
            }
        }
        let _ = writeln!(buffer, "Distance: {:.2} meters.", self.distance);
        buffer
    }
}
