//! Resolution layer: free-text mentions to canonical node and edge rows
//!
//! All normalization policy lives here. The store only ever sees
//! normalized names and normalized edge labels; node labels pass through
//! verbatim.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::edge::{EdgeId, NewEdge};
use crate::error::Result;
use crate::graph::{GraphStore, Subgraph};
use crate::limits::{
    normalize_edge_label, normalize_lookup_name, normalize_name, validate_node_label,
};
use crate::node::{NewNode, Node, NodeId};

/// Upserts nodes and edges through a shared store handle
pub struct Resolver<S: GraphStore + ?Sized> {
    store: Arc<S>,
}

impl<S: GraphStore + ?Sized> Clone for Resolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: GraphStore + ?Sized> Resolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Look up a node by any spelling of its name
    pub async fn find_node(&self, name: &str) -> Result<Option<Node>> {
        let name = normalize_lookup_name(name)?;
        self.store.find_node_by_name(&name).await
    }

    /// Resolve `name` to a node id, creating the node on first reference.
    ///
    /// Name variants that differ only in case or surrounding whitespace
    /// resolve to the same id. A supplied label replaces the stored one when
    /// the two differ under normalization.
    pub async fn get_or_create_node(&self, name: &str, label: Option<&str>) -> Result<NodeId> {
        let name = normalize_name(name)?;
        if let Some(label) = label {
            validate_node_label(label)?;
        }

        let id = self.store.upsert_node(&name, label).await?;
        tracing::debug!("Resolved node '{}' to {}", name, id);
        Ok(id)
    }

    /// Resolve both endpoints and ensure exactly one edge exists for
    /// `(source, target, normalized label)`, returning its id.
    pub async fn add_edge_if_not_exists(
        &self,
        source_name: &str,
        target_name: &str,
        label: Option<&str>,
    ) -> Result<EdgeId> {
        // Validate everything up front so a bad label cannot leave
        // freshly created endpoint nodes behind.
        let source = normalize_name(source_name)?;
        let target = normalize_name(target_name)?;
        let label = normalize_edge_label(label)?;

        let source_id = self.store.upsert_node(&source, None).await?;
        let target_id = self.store.upsert_node(&target, None).await?;

        let id = self
            .store
            .upsert_edge(source_id, target_id, label.as_deref())
            .await?;
        tracing::info!(
            "Edge {} -[{}]-> {} resolved to {}",
            source,
            label.as_deref().unwrap_or(""),
            target,
            id
        );
        Ok(id)
    }

    /// Apply a batch of writes in order: nodes first, then edges.
    /// Stops at the first failure; earlier writes stay committed.
    pub async fn apply(&self, batch: &WriteBatch) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for node in &batch.nodes {
            let id = self
                .get_or_create_node(&node.name, node.label.as_deref())
                .await?;
            report.node_ids.push(id);
        }

        for edge in &batch.edges {
            let id = self
                .add_edge_if_not_exists(&edge.source, &edge.target, edge.label.as_deref())
                .await?;
            report.edge_ids.push(id);
        }

        tracing::info!(
            "Applied batch: {} nodes, {} edges",
            report.node_ids.len(),
            report.edge_ids.len()
        );
        Ok(report)
    }
}

/// Name-addressed writes, also the import/export file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteBatch {
    #[serde(default)]
    pub nodes: Vec<NewNode>,
    #[serde(default)]
    pub edges: Vec<NewEdge>,
}

impl WriteBatch {
    /// Express a stored graph as writes that recreate it.
    /// Edges whose endpoints are missing from `graph.nodes` are skipped.
    pub fn from_subgraph(graph: &Subgraph) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|n| NewNode {
                name: n.name.clone(),
                label: n.label.clone(),
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .filter_map(|e| {
                let source = graph.node(e.source_id)?;
                let target = graph.node(e.target_id)?;
                Some(NewEdge {
                    source: source.name.clone(),
                    target: target.name.clone(),
                    label: e.label.clone(),
                })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Ids produced by [`Resolver::apply`], in batch order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub node_ids: Vec<NodeId>,
    pub edge_ids: Vec<EdgeId>,
}
