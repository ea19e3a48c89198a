//! Graph containers and the entity store trait

use crate::edge::{Direction, Edge, EdgeId};
use crate::error::Result;
use crate::node::{Node, NodeId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A set of nodes and the edges between them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Subgraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_edges(mut self, edges: Vec<Edge>) -> Self {
        self.edges = edges;
        self
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }
}

/// Row counts of a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphCounts {
    pub nodes: u64,
    pub edges: u64,
}

/// Entity store: the closed set of typed operations the resolution layer
/// and the traversal engine are allowed to issue.
///
/// Names and edge labels handed to the store are already normalized.
/// Every write commits on return; a failed write leaves no partial row.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Prepare the store (schema, pragmas)
    async fn initialize(&self) -> Result<()>;

    /// Flush and release resources
    async fn close(&self) -> Result<()>;

    /// Health check
    async fn health_check(&self) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Node Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Look up a node by its normalized name
    async fn find_node_by_name(&self, name: &str) -> Result<Option<Node>>;

    /// Atomically get-or-create a node.
    ///
    /// An existing node keeps its id; its label is replaced with `label`
    /// when one is given and it differs from the stored label under
    /// normalization.
    async fn upsert_node(&self, name: &str, label: Option<&str>) -> Result<NodeId>;

    /// Fetch nodes by id. Unknown ids are skipped; order is unspecified.
    async fn nodes_by_ids(&self, ids: &[NodeId]) -> Result<Vec<Node>>;

    /// Every node, ordered by id
    async fn all_nodes(&self) -> Result<Vec<Node>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Edge Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Atomically insert an edge unless `(source, target, label)` exists,
    /// returning the id of the single matching row either way
    async fn upsert_edge(
        &self,
        source: NodeId,
        target: NodeId,
        label: Option<&str>,
    ) -> Result<EdgeId>;

    /// Edges incident to `node` in the given direction, ordered by id
    async fn edges_for_node(&self, node: NodeId, direction: Direction) -> Result<Vec<Edge>>;

    /// Every edge, ordered by id
    async fn all_edges(&self) -> Result<Vec<Edge>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Row counts
    async fn counts(&self) -> Result<GraphCounts>;

    /// Load the entire graph
    async fn load_graph(&self) -> Result<Subgraph> {
        let nodes = self.all_nodes().await?;
        let edges = self.all_edges().await?;
        Ok(Subgraph { nodes, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subgraph_builder() {
        let graph = Subgraph::new()
            .with_nodes(vec![Node::new(1, "a", None), Node::new(2, "b", None)])
            .with_edges(vec![Edge::new(9, 1, 2, None)]);

        assert_eq!(graph.node(NodeId(2)).map(|n| n.name.as_str()), Some("b"));
        assert!(graph.node_by_name("a").is_some());
        assert!(graph.node_by_name("c").is_none());
        assert!(graph.contains_edge(EdgeId(9)));
        assert!(!graph.contains_edge(EdgeId(1)));
    }
}
