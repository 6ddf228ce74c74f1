//! Render-ready graph output

use serde::{Deserialize, Serialize};
use ward_core::{EntityId, HealthSignals, ResourceType};

/// Position of a node within one build
///
/// Only meaningful together with the [`GraphView`] it came from; the same
/// entity may get a different index on the next build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderIndex(usize);

impl RenderIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RenderIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: EntityId,
    pub render_index: RenderIndex,

    /// Display name of the entity
    pub label: String,

    pub resource_type: ResourceType,
    pub signals: HealthSignals,
}

/// An edge to render, between two render indices of the same build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: RenderIndex,
    pub target: RenderIndex,
}

/// An entry of the model search control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOption {
    pub label: String,
    pub value: EntityId,
}

/// Result of one graph build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    /// Nodes in render-index order
    pub nodes: Vec<GraphNode>,

    pub edges: Vec<GraphEdge>,

    /// Search options in retained order (full-graph builds only)
    pub options: Vec<SearchOption>,
}

impl GraphView {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at a render index
    pub fn node_at(&self, index: RenderIndex) -> Option<&GraphNode> {
        self.nodes.get(index.get()).filter(|node| node.render_index == index)
    }

    /// Edges as entity id pairs, in emission order
    pub fn edge_ids(&self) -> Vec<(&EntityId, &EntityId)> {
        self.edges
            .iter()
            .filter_map(|edge| {
                let source = self.node_at(edge.source)?;
                let target = self.node_at(edge.target)?;
                Some((&source.id, &target.id))
            })
            .collect()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
