//! Read-only graph queries: bounded neighborhoods and all simple paths

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::edge::{Direction, Edge, EdgeId};
use crate::error::{Error, Result};
use crate::graph::{GraphStore, Subgraph};
use crate::limits::normalize_lookup_name;
use crate::node::{Node, NodeId};

/// Neighborhood depth used when the caller gives none
pub const DEFAULT_NEIGHBORHOOD_DEPTH: u32 = 1;

/// Path length bound (in edges) used when the caller gives none
pub const DEFAULT_PATH_MAX_DEPTH: u32 = 5;

/// Result of a query that names entities.
///
/// `NotFound` means a named entity does not exist. An entity that exists
/// but has no neighbors or paths is `Found` with an empty edge list, and a
/// store failure is an `Err` on the surrounding `Result`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum QueryOutcome<T> {
    Found(T),
    NotFound(Missing),
}

impl<T> QueryOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound(_) => None,
        }
    }

    pub fn into_found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound(_) => None,
        }
    }

    pub fn missing(&self) -> Option<&Missing> {
        match self {
            Self::Found(_) => None,
            Self::NotFound(missing) => Some(missing),
        }
    }
}

/// Which named entity a query could not resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Missing {
    Center { name: String },
    Start { name: String },
    /// The start resolved; its id is still reported
    End { name: String, start_id: NodeId },
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Center { name } => write!(f, "Center node '{}' not found", name),
            Self::Start { name } => write!(f, "Start node '{}' not found", name),
            Self::End { name, .. } => write!(f, "End node '{}' not found", name),
        }
    }
}

/// Traversal statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalStats {
    pub nodes_visited: usize,
    pub edges_traversed: usize,
    pub max_depth_reached: u32,
    pub store_queries: usize,
}

/// Bounded-depth neighborhood of one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighborhood {
    pub center: Node,
    pub depth: u32,

    /// Nodes and edges in breadth-first discovery order, center first
    pub graph: Subgraph,

    pub stats: TraversalStats,
}

/// One simple directed path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPath {
    /// Node ids from start to end, `edges.len() + 1` entries
    pub nodes: Vec<NodeId>,
    pub edges: Vec<Edge>,
}

impl GraphPath {
    fn from_edges(start: NodeId, edges: Vec<Edge>) -> Self {
        let mut nodes = Vec::with_capacity(edges.len() + 1);
        nodes.push(start);
        nodes.extend(edges.iter().map(|e| e.target_id));
        Self { nodes, edges }
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Every simple path between two nodes up to a length bound
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSet {
    pub start: Node,
    pub end: Node,
    pub max_depth: u32,

    /// Discovered paths, shortest first
    pub paths: Vec<GraphPath>,

    /// Union of all path nodes and edges; holds start and end even when
    /// `paths` is empty
    pub graph: Subgraph,

    pub stats: TraversalStats,
}

impl PathSet {
    pub fn path_found(&self) -> bool {
        !self.paths.is_empty()
    }
}

/// Wall-clock bound for one query, checked before each store read
#[derive(Debug, Clone, Copy)]
struct Budget {
    started: Instant,
    limit: Option<Duration>,
}

impl Budget {
    fn start(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn check(&self) -> Result<()> {
        if let Some(limit) = self.limit {
            let elapsed = self.started.elapsed();
            if elapsed >= limit {
                return Err(Error::TimedOut { elapsed, limit });
            }
        }
        Ok(())
    }
}

/// One in-flight candidate path. Each candidate owns its visited set, so a
/// node may sit on many candidates but never twice on one.
struct PathState {
    at: NodeId,
    edges: Vec<Edge>,
    visited: HashSet<NodeId>,
}

/// Graph traversal engine over a shared store handle
pub struct TraversalEngine<S: GraphStore + ?Sized> {
    store: Arc<S>,
    timeout: Option<Duration>,
}

impl<S: GraphStore + ?Sized> Clone for TraversalEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            timeout: self.timeout,
        }
    }
}

impl<S: GraphStore + ?Sized> TraversalEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            timeout: None,
        }
    }

    /// Abort queries that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Breadth-first neighborhood of `center_name` out to `depth` hops,
    /// following edges in both directions.
    ///
    /// Edges found at a node below `depth` are kept even when their far end
    /// sits exactly at `depth`; nodes at `depth` are not expanded.
    ///
    /// Each visited node is a separate store read with no shared read
    /// transaction. A write committed while the call runs may be partly
    /// visible in the result; callers needing a stable snapshot must not
    /// write concurrently.
    pub async fn neighborhood(
        &self,
        center_name: &str,
        depth: u32,
    ) -> Result<QueryOutcome<Neighborhood>> {
        let budget = Budget::start(self.timeout);
        let name = normalize_lookup_name(center_name)?;
        let mut stats = TraversalStats::default();

        budget.check()?;
        stats.store_queries += 1;
        let Some(center) = self.store.find_node_by_name(&name).await? else {
            tracing::warn!("Center node '{}' not found", name);
            return Ok(QueryOutcome::NotFound(Missing::Center { name }));
        };

        tracing::debug!(
            "Neighborhood of {} ('{}') to depth {}",
            center.id,
            center.name,
            depth
        );

        let mut visited: HashSet<NodeId> = HashSet::from([center.id]);
        let mut node_order: Vec<NodeId> = vec![center.id];
        let mut edge_seen: HashSet<EdgeId> = HashSet::new();
        let mut edges: Vec<Edge> = Vec::new();
        let mut queue: VecDeque<(NodeId, u32)> = VecDeque::from([(center.id, 0)]);

        while let Some((current, current_depth)) = queue.pop_front() {
            stats.nodes_visited += 1;
            stats.max_depth_reached = stats.max_depth_reached.max(current_depth);

            if current_depth >= depth {
                continue;
            }

            budget.check()?;
            stats.store_queries += 1;
            let incident = self.store.edges_for_node(current, Direction::Both).await?;

            for edge in incident {
                stats.edges_traversed += 1;
                let next = edge.far_end(current);

                if visited.insert(next) {
                    node_order.push(next);
                    queue.push_back((next, current_depth + 1));
                }
                if edge_seen.insert(edge.id) {
                    edges.push(edge);
                }
            }
        }

        budget.check()?;
        stats.store_queries += 1;
        let nodes = self.fetch_in_order(&node_order, &[&center]).await?;

        tracing::info!(
            "Neighborhood of '{}' (depth {}): {} nodes, {} edges",
            center.name,
            depth,
            nodes.len(),
            edges.len()
        );

        Ok(QueryOutcome::Found(Neighborhood {
            center,
            depth,
            graph: Subgraph { nodes, edges },
            stats,
        }))
    }

    /// Enumerate every simple path from `start_name` to `end_name` of at
    /// most `max_depth` edges, following outgoing edges only.
    ///
    /// Outgoing edges are read once per node per call, but not under one
    /// read transaction; concurrent writes may be partly visible, as with
    /// [`Self::neighborhood`].
    ///
    /// The search is exhaustive within the bound. Its cost grows
    /// exponentially with `max_depth`; the bound is never lowered here, so
    /// callers needing a ceiling should also set a timeout.
    pub async fn all_paths(
        &self,
        start_name: &str,
        end_name: &str,
        max_depth: u32,
    ) -> Result<QueryOutcome<PathSet>> {
        let budget = Budget::start(self.timeout);
        let start_name = normalize_lookup_name(start_name)?;
        let end_name = normalize_lookup_name(end_name)?;
        let mut stats = TraversalStats::default();

        budget.check()?;
        stats.store_queries += 1;
        let Some(start) = self.store.find_node_by_name(&start_name).await? else {
            tracing::warn!("Start node '{}' not found", start_name);
            return Ok(QueryOutcome::NotFound(Missing::Start { name: start_name }));
        };

        budget.check()?;
        stats.store_queries += 1;
        let Some(end) = self.store.find_node_by_name(&end_name).await? else {
            tracing::warn!("End node '{}' not found", end_name);
            return Ok(QueryOutcome::NotFound(Missing::End {
                name: end_name,
                start_id: start.id,
            }));
        };

        tracing::debug!(
            "Finding paths from {} to {} (max_depth={})",
            start.id,
            end.id,
            max_depth
        );

        let mut paths: Vec<GraphPath> = Vec::new();
        let mut adjacency: HashMap<NodeId, Vec<Edge>> = HashMap::new();
        let mut queue: VecDeque<PathState> = VecDeque::from([PathState {
            at: start.id,
            edges: Vec::new(),
            visited: HashSet::from([start.id]),
        }]);

        while let Some(state) = queue.pop_front() {
            stats.nodes_visited += 1;
            stats.max_depth_reached = stats.max_depth_reached.max(state.edges.len() as u32);

            if state.edges.len() >= max_depth as usize {
                continue;
            }

            budget.check()?;
            if !adjacency.contains_key(&state.at) {
                stats.store_queries += 1;
                let outgoing = self
                    .store
                    .edges_for_node(state.at, Direction::Outgoing)
                    .await?;
                adjacency.insert(state.at, outgoing);
            }
            let outgoing = adjacency.get(&state.at).map(Vec::as_slice).unwrap_or_default();

            for edge in outgoing {
                stats.edges_traversed += 1;
                let next = edge.target_id;

                if state.visited.contains(&next) {
                    continue;
                }

                let mut path_edges = Vec::with_capacity(state.edges.len() + 1);
                path_edges.extend_from_slice(&state.edges);
                path_edges.push(edge.clone());

                if next == end.id {
                    paths.push(GraphPath::from_edges(start.id, path_edges));
                    continue;
                }

                let mut visited = state.visited.clone();
                visited.insert(next);
                queue.push_back(PathState {
                    at: next,
                    edges: path_edges,
                    visited,
                });
            }
        }

        let mut node_order: Vec<NodeId> = vec![start.id];
        let mut node_seen: HashSet<NodeId> = HashSet::from([start.id]);
        let mut edges: Vec<Edge> = Vec::new();
        let mut edge_seen: HashSet<EdgeId> = HashSet::new();

        for path in &paths {
            for id in &path.nodes {
                if node_seen.insert(*id) {
                    node_order.push(*id);
                }
            }
            for edge in &path.edges {
                if edge_seen.insert(edge.id) {
                    edges.push(edge.clone());
                }
            }
        }
        if node_seen.insert(end.id) {
            node_order.push(end.id);
        }

        let nodes = if node_order.len() > 2 {
            budget.check()?;
            stats.store_queries += 1;
            self.fetch_in_order(&node_order, &[&start, &end]).await?
        } else {
            node_order
                .iter()
                .map(|id| if *id == start.id { start.clone() } else { end.clone() })
                .collect()
        };

        tracing::info!(
            "Found {} paths from '{}' to '{}' (max_depth={})",
            paths.len(),
            start.name,
            end.name,
            max_depth
        );

        Ok(QueryOutcome::Found(PathSet {
            start,
            end,
            max_depth,
            paths,
            graph: Subgraph { nodes, edges },
            stats,
        }))
    }

    /// Fetch node rows for `order`, keeping that order. Rows already in hand
    /// are not re-read.
    async fn fetch_in_order(&self, order: &[NodeId], known: &[&Node]) -> Result<Vec<Node>> {
        let mut by_id: HashMap<NodeId, Node> =
            known.iter().map(|n| (n.id, (*n).clone())).collect();

        let wanted: Vec<NodeId> = order
            .iter()
            .copied()
            .filter(|id| !by_id.contains_key(id))
            .collect();
        if !wanted.is_empty() {
            for node in self.store.nodes_by_ids(&wanted).await? {
                by_id.insert(node.id, node);
            }
        }

        let mut nodes = Vec::with_capacity(order.len());
        for id in order {
            match by_id.remove(id) {
                Some(node) => nodes.push(node),
                None => tracing::warn!("Node {} referenced by an edge has no row", id),
            }
        }
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedStore;

    #[tokio::test]
    async fn test_store_failure_is_an_error_not_not_found() {
        let engine = TraversalEngine::new(Arc::new(ScriptedStore::failing()));

        let err = engine.neighborhood("a", 1).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        let err = engine.all_paths("a", "b", 3).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_blank_names_rejected() {
        let store = Arc::new(ScriptedStore::failing());
        let engine = TraversalEngine::new(store.clone());

        assert!(engine.neighborhood(" ", 1).await.unwrap_err().is_validation());
        assert!(engine.all_paths("a", "", 1).await.unwrap_err().is_validation());
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_timeout_trips_before_store() {
        let store = Arc::new(ScriptedStore::failing());
        let engine = TraversalEngine::new(store.clone()).with_timeout(Duration::ZERO);

        let err = engine.neighborhood("a", 1).await.unwrap_err();
        assert!(matches!(err, Error::TimedOut { .. }));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_cyclic_paths_stay_simple() {
        // a -> b -> a, b -> c, a -> c
        let store = Arc::new(
            ScriptedStore::graph(
                &["a", "b", "c"],
                &[(1, 1, 2), (2, 2, 1), (3, 2, 3), (4, 1, 3)],
            ),
        );
        let engine = TraversalEngine::new(store);

        let set = engine.all_paths("a", "c", 10).await.unwrap().into_found().unwrap();
        assert_eq!(set.paths.len(), 2);
        for path in &set.paths {
            let unique: HashSet<_> = path.nodes.iter().collect();
            assert_eq!(unique.len(), path.nodes.len());
        }
        assert_eq!(set.paths[0].len(), 1);
        assert_eq!(set.paths[1].len(), 2);
    }

    #[tokio::test]
    async fn test_same_start_and_end_has_no_paths() {
        let store = Arc::new(ScriptedStore::graph(&["a", "b"], &[(1, 1, 2), (2, 2, 1)]));
        let engine = TraversalEngine::new(store);

        let set = engine.all_paths("a", "A", 5).await.unwrap().into_found().unwrap();
        assert!(!set.path_found());
        assert_eq!(set.graph.nodes.len(), 1);
        assert!(set.graph.edges.is_empty());
    }

    #[tokio::test]
    async fn test_outgoing_edges_read_once_per_node() {
        // Diamond a -> {b, c} -> d -> e: d is reached on two candidates.
        let store = Arc::new(ScriptedStore::graph(
            &["a", "b", "c", "d", "e"],
            &[(1, 1, 2), (2, 1, 3), (3, 2, 4), (4, 3, 4), (5, 4, 5)],
        ));
        let engine = TraversalEngine::new(store);

        let set = engine.all_paths("a", "e", 5).await.unwrap().into_found().unwrap();
        assert_eq!(set.paths.len(), 2);
        // two name lookups + one adjacency read for each of a, b, c, d
        // + one node fetch
        assert_eq!(set.stats.store_queries, 2 + 4 + 1);
    }

    #[test]
    fn test_missing_display() {
        let missing = Missing::End {
            name: "usa".to_string(),
            start_id: NodeId(1),
        };
        assert_eq!(missing.to_string(), "End node 'usa' not found");
    }
}
