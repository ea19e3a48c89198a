//! Test-only store doubles

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::edge::{Direction, Edge, EdgeId};
use crate::error::{Error, Result};
use crate::graph::{GraphCounts, GraphStore};
use crate::node::{Node, NodeId};

/// Read-only fixed graph, or a store whose every call fails.
/// Counts calls so tests can assert that validation never reached it.
pub(crate) struct ScriptedStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedStore {
    pub(crate) fn failing() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Nodes get ids 1.. in `names` order; edges are `(id, source, target)`
    pub(crate) fn graph(names: &[&str], edges: &[(i64, i64, i64)]) -> Self {
        Self {
            nodes: names
                .iter()
                .enumerate()
                .map(|(i, name)| Node::new(i as i64 + 1, *name, None))
                .collect(),
            edges: edges
                .iter()
                .map(|(id, s, t)| Edge::new(*id, *s, *t, None))
                .collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Storage("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl GraphStore for ScriptedStore {
    async fn initialize(&self) -> Result<()> {
        self.enter()
    }

    async fn close(&self) -> Result<()> {
        self.enter()
    }

    async fn health_check(&self) -> Result<bool> {
        self.enter().map(|_| true)
    }

    async fn find_node_by_name(&self, name: &str) -> Result<Option<Node>> {
        self.enter()?;
        Ok(self.nodes.iter().find(|n| n.name == name).cloned())
    }

    async fn upsert_node(&self, _name: &str, _label: Option<&str>) -> Result<NodeId> {
        self.enter()?;
        Err(Error::NotCreated("scripted store is read-only".to_string()))
    }

    async fn nodes_by_ids(&self, ids: &[NodeId]) -> Result<Vec<Node>> {
        self.enter()?;
        Ok(self
            .nodes
            .iter()
            .filter(|n| ids.contains(&n.id))
            .cloned()
            .collect())
    }

    async fn all_nodes(&self) -> Result<Vec<Node>> {
        self.enter()?;
        Ok(self.nodes.clone())
    }

    async fn upsert_edge(
        &self,
        _source: NodeId,
        _target: NodeId,
        _label: Option<&str>,
    ) -> Result<EdgeId> {
        self.enter()?;
        Err(Error::NotCreated("scripted store is read-only".to_string()))
    }

    async fn edges_for_node(&self, node: NodeId, direction: Direction) -> Result<Vec<Edge>> {
        self.enter()?;
        Ok(self
            .edges
            .iter()
            .filter(|e| e.touches(node, direction))
            .cloned()
            .collect())
    }

    async fn all_edges(&self) -> Result<Vec<Edge>> {
        self.enter()?;
        Ok(self.edges.clone())
    }

    async fn counts(&self) -> Result<GraphCounts> {
        self.enter()?;
        Ok(GraphCounts {
            nodes: self.nodes.len() as u64,
            edges: self.edges.len() as u64,
        })
    }
}
