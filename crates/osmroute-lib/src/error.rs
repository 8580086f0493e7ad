//! Error types for map loading, graph building and route planning.

use std::path::PathBuf;

use thiserror::Error;

use crate::graph::NodeIndex;
use crate::osm::OsmNodeId;

/// Convenient result alias for the route planner library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The built graph holds no navigable nodes, so nothing can be resolved or searched.
    #[error("road graph is empty; the map data contained no routable ways")]
    EmptyGraph,

    /// Raised when the start and goal nodes lie in disconnected components.
    #[error("no route found between node {start} and node {goal}")]
    RouteNotFound { start: OsmNodeId, goal: OsmNodeId },

    /// Raised when a path or distance is requested before a successful search.
    #[error("route is not available; the search has not completed successfully")]
    RouteNotReady,

    /// Raised when a planner that already ran is asked to search again.
    #[error("search already ran on this planner; create a new planner to search again")]
    SearchAlreadyRun,

    /// Raised when a node index does not belong to the graph.
    #[error("unknown node index {index}")]
    UnknownNode { index: NodeIndex },

    /// Raised when a computed route plan lacks any nodes.
    #[error("route plan was empty")]
    EmptyRoutePlan,

    /// Raised when the raw map buffer is structurally invalid.
    #[error("invalid map data: {message}")]
    InvalidMapData { message: String },

    /// Raised when the map file could not be read.
    #[error("failed to read map data from {path}: {source}")]
    MapRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wrapper for XML reader errors.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// Wrapper for malformed XML attributes.
    #[error(transparent)]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// Wrapper for PBF decoding errors.
    #[error(transparent)]
    Pbf(#[from] osmpbf::Error),
}
