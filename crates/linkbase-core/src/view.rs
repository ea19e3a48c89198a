//! Renderer-facing output shape shared by every query

use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::graph::Subgraph;
use crate::node::{Node, NodeId};
use crate::traversal::{Missing, Neighborhood, PathSet, QueryOutcome};

/// Flat node/edge lists plus the ids a renderer highlights.
///
/// `error_message` carries a human-readable status for the not-found and
/// no-path cases; it is absent on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GraphView {
    /// Whole-graph view
    pub fn full(graph: Subgraph) -> Self {
        Self {
            nodes: graph.nodes,
            edges: graph.edges,
            ..Default::default()
        }
    }

    pub fn from_neighborhood(outcome: QueryOutcome<Neighborhood>) -> Self {
        match outcome {
            QueryOutcome::Found(hood) => Self {
                center_node_id: Some(hood.center.id),
                ..Self::full(hood.graph)
            },
            QueryOutcome::NotFound(missing) => Self::not_found(&missing),
        }
    }

    pub fn from_paths(outcome: QueryOutcome<PathSet>) -> Self {
        match outcome {
            QueryOutcome::Found(set) => {
                let error_message = (!set.path_found()).then(|| {
                    format!(
                        "No paths between '{}' and '{}' (max depth {})",
                        set.start.name, set.end.name, set.max_depth
                    )
                });
                Self {
                    start_node_id: Some(set.start.id),
                    end_node_id: Some(set.end.id),
                    error_message,
                    ..Self::full(set.graph)
                }
            }
            QueryOutcome::NotFound(missing) => Self::not_found(&missing),
        }
    }

    fn not_found(missing: &Missing) -> Self {
        let start_node_id = match missing {
            Missing::End { start_id, .. } => Some(*start_id),
            _ => None,
        };
        Self {
            start_node_id,
            error_message: Some(missing.to_string()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::TraversalStats;

    fn node(id: i64, name: &str) -> Node {
        Node::new(id, name, None)
    }

    #[test]
    fn test_neighborhood_view() {
        let hood = Neighborhood {
            center: node(2, "b"),
            depth: 1,
            graph: Subgraph::new()
                .with_nodes(vec![node(2, "b"), node(1, "a")])
                .with_edges(vec![Edge::new(1, 1, 2, None)]),
            stats: TraversalStats::default(),
        };
        let view = GraphView::from_neighborhood(QueryOutcome::Found(hood));
        assert_eq!(view.center_node_id, Some(NodeId(2)));
        assert_eq!(view.nodes.len(), 2);
        assert!(!view.is_error());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("start_node_id").is_none());
        assert!(json.get("error_message").is_none());
    }

    #[test]
    fn test_no_path_view_keeps_endpoints() {
        let set = PathSet {
            start: node(1, "a"),
            end: node(3, "c"),
            max_depth: 2,
            paths: vec![],
            graph: Subgraph::new().with_nodes(vec![node(1, "a"), node(3, "c")]),
            stats: TraversalStats::default(),
        };
        let view = GraphView::from_paths(QueryOutcome::Found(set));
        assert_eq!(view.nodes.len(), 2);
        assert!(view.edges.is_empty());
        assert_eq!(view.start_node_id, Some(NodeId(1)));
        assert_eq!(view.end_node_id, Some(NodeId(3)));
        assert_eq!(
            view.error_message.as_deref(),
            Some("No paths between 'a' and 'c' (max depth 2)")
        );
    }

    #[test]
    fn test_missing_end_reports_start() {
        let view = GraphView::from_paths(QueryOutcome::NotFound(Missing::End {
            name: "zed".to_string(),
            start_id: NodeId(4),
        }));
        assert!(view.nodes.is_empty());
        assert_eq!(view.start_node_id, Some(NodeId(4)));
        assert_eq!(view.end_node_id, None);
        assert!(view.is_error());
    }
}
