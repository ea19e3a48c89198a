//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use linkbase_core::limits::labels_match;
use linkbase_core::{Direction, Edge, EdgeId, GraphCounts, GraphStore, Node, NodeId, Result};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct MemoryState {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
    edges: Vec<Edge>,
    by_triple: HashMap<(NodeId, NodeId, Option<String>), EdgeId>,
    last_node_id: i64,
    last_edge_id: i64,
}

impl MemoryState {
    fn node(&self, id: NodeId) -> Option<&Node> {
        // Ids are handed out in increasing order and never removed.
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|idx| &mut self.nodes[idx])
    }
}

/// In-memory storage backend
///
/// Useful for testing and temporary storage. A single lock covers nodes and
/// edges, so each upsert is one atomic step.
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
        }
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.read().is_ok())
    }

    async fn find_node_by_name(&self, name: &str) -> Result<Option<Node>> {
        let state = self.read()?;
        Ok(state
            .by_name
            .get(name)
            .and_then(|id| state.node(*id))
            .cloned())
    }

    async fn upsert_node(&self, name: &str, label: Option<&str>) -> Result<NodeId> {
        let mut state = self.write()?;

        if let Some(id) = state.by_name.get(name).copied() {
            let node = state
                .node_mut(id)
                .ok_or_else(|| StorageError::MissingAfterWrite(format!("node '{}'", name)))?;
            if let Some(label) = label {
                if !labels_match(node.label.as_deref(), Some(label)) {
                    tracing::info!(
                        "Updated label of node '{}' from {:?} to {:?}",
                        name,
                        node.label,
                        label
                    );
                    node.label = Some(label.to_string());
                }
            }
            return Ok(id);
        }

        state.last_node_id += 1;
        let id = NodeId(state.last_node_id);
        state
            .nodes
            .push(Node::new(id, name, label.map(str::to_string)));
        state.by_name.insert(name.to_string(), id);
        tracing::info!("Created node '{}' with id {}", name, id);
        Ok(id)
    }

    async fn nodes_by_ids(&self, ids: &[NodeId]) -> Result<Vec<Node>> {
        let state = self.read()?;
        let mut nodes: Vec<Node> = ids.iter().filter_map(|id| state.node(*id)).cloned().collect();
        nodes.sort_by_key(|n| n.id);
        nodes.dedup_by_key(|n| n.id);
        Ok(nodes)
    }

    async fn all_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.read()?.nodes.clone())
    }

    async fn upsert_edge(
        &self,
        source: NodeId,
        target: NodeId,
        label: Option<&str>,
    ) -> Result<EdgeId> {
        let mut state = self.write()?;

        for endpoint in [source, target] {
            if state.node(endpoint).is_none() {
                return Err(StorageError::Database(format!(
                    "Edge endpoint {} does not exist",
                    endpoint
                ))
                .into());
            }
        }

        let key = (source, target, label.map(str::to_string));
        if let Some(id) = state.by_triple.get(&key) {
            return Ok(*id);
        }

        state.last_edge_id += 1;
        let id = EdgeId(state.last_edge_id);
        state
            .edges
            .push(Edge::new(id, source, target, label.map(str::to_string)));
        state.by_triple.insert(key, id);
        tracing::info!("Created edge {} -> {} ({:?}) with id {}", source, target, label, id);
        Ok(id)
    }

    async fn edges_for_node(&self, node: NodeId, direction: Direction) -> Result<Vec<Edge>> {
        let state = self.read()?;
        Ok(state
            .edges
            .iter()
            .filter(|e| e.touches(node, direction))
            .cloned()
            .collect())
    }

    async fn all_edges(&self) -> Result<Vec<Edge>> {
        Ok(self.read()?.edges.clone())
    }

    async fn counts(&self) -> Result<GraphCounts> {
        let state = self.read()?;
        Ok(GraphCounts {
            nodes: state.nodes.len() as u64,
            edges: state.edges.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        store.initialize().await.unwrap();

        let a = store.upsert_node("a", Some("Letter")).await.unwrap();
        let b = store.upsert_node("b", None).await.unwrap();
        assert_eq!(store.upsert_node("a", None).await.unwrap(), a);

        let ab = store.upsert_edge(a, b, Some("next")).await.unwrap();
        assert_eq!(store.upsert_edge(a, b, Some("next")).await.unwrap(), ab);
        assert_ne!(store.upsert_edge(a, b, None).await.unwrap(), ab);

        let counts = store.counts().await.unwrap();
        assert_eq!(counts, GraphCounts { nodes: 2, edges: 2 });

        let found = store.find_node_by_name("a").await.unwrap().unwrap();
        assert_eq!(found.label.as_deref(), Some("Letter"));
    }

    #[tokio::test]
    async fn test_memory_label_replaced_only_when_different() {
        let store = MemoryStore::new();
        store.upsert_node("nyc", Some("City")).await.unwrap();
        store.upsert_node("nyc", Some("city ")).await.unwrap();
        assert_eq!(
            store.find_node_by_name("nyc").await.unwrap().unwrap().label.as_deref(),
            Some("City")
        );

        store.upsert_node("nyc", Some("Location")).await.unwrap();
        assert_eq!(
            store.find_node_by_name("nyc").await.unwrap().unwrap().label.as_deref(),
            Some("Location")
        );
    }

    #[tokio::test]
    async fn test_memory_rejects_dangling_edge() {
        let store = MemoryStore::new();
        let a = store.upsert_node("a", None).await.unwrap();
        assert!(store.upsert_edge(a, NodeId(7), None).await.is_err());
        assert_eq!(store.counts().await.unwrap().edges, 0);
    }

    #[tokio::test]
    async fn test_memory_nodes_by_ids_skips_unknown() {
        let store = MemoryStore::new();
        let a = store.upsert_node("a", None).await.unwrap();
        let b = store.upsert_node("b", None).await.unwrap();

        let nodes = store.nodes_by_ids(&[b, NodeId(99), a, b]).await.unwrap();
        let ids: Vec<_> = nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
