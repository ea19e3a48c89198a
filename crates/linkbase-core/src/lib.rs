//! Linkbase Core - Graph model, entity resolution and traversal
//!
//! This crate provides the node/edge types, the typed store trait, the
//! resolution layer that keeps node identity and edge uniqueness under
//! repeated writes, and the two read-only graph queries.

pub mod edge;
pub mod error;
pub mod graph;
pub mod limits;
pub mod node;
pub mod resolve;
pub mod traversal;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use edge::{Direction, Edge, EdgeId, NewEdge};
pub use error::{Error, Result};
pub use graph::{GraphCounts, GraphStore, Subgraph};
pub use limits::{normalize, ValidationError};
pub use node::{NewNode, Node, NodeId};
pub use resolve::{BatchReport, Resolver, WriteBatch};
pub use traversal::{
    GraphPath, Missing, Neighborhood, PathSet, QueryOutcome, TraversalEngine, TraversalStats,
    DEFAULT_NEIGHBORHOOD_DEPTH, DEFAULT_PATH_MAX_DEPTH,
};
pub use view::GraphView;
