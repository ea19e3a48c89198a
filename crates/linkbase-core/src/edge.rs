//! Edge (relationship) types

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// Store-assigned edge identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub i64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EdgeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Which incident edges of a node to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
    #[default]
    Both,
}

/// A directed, optionally labeled edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source_id: NodeId,
    pub target_id: NodeId,

    /// Normalized label; `None` is its own value for uniqueness
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        source_id: impl Into<NodeId>,
        target_id: impl Into<NodeId>,
        label: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            label,
        }
    }

    /// The endpoint opposite `node`. For a self-loop this is `node` itself.
    pub fn far_end(&self, node: NodeId) -> NodeId {
        if self.source_id == node {
            self.target_id
        } else {
            self.source_id
        }
    }

    pub fn touches(&self, node: NodeId, direction: Direction) -> bool {
        match direction {
            Direction::Outgoing => self.source_id == node,
            Direction::Incoming => self.target_id == node,
            Direction::Both => self.source_id == node || self.target_id == node,
        }
    }
}

/// An edge write request, addressed by entity names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEdge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl NewEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
