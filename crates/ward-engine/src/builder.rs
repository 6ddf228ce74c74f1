//! Per-build accumulator
//!
//! A [`GraphBuilder`] lives for exactly one build. It hands out render
//! indices, remembers which identities are already placed and collects edge
//! intents until [`GraphBuilder::finish`] wires them.

use std::collections::HashMap;
use ward_core::{EntityId, HealthSignals, PipelineEntity};
use crate::edges::{self, EdgePolicy, PendingEdge};
use crate::view::{GraphNode, GraphView, RenderIndex, SearchOption};

#[derive(Debug, Default)]
pub(crate) struct GraphBuilder {
    index: HashMap<EntityId, RenderIndex>,
    nodes: Vec<GraphNode>,
    pending: Vec<PendingEdge>,
    options: Vec<SearchOption>,
}

impl GraphBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether an identity already has a node in this build
    pub(crate) fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    /// Place a node at the next render index
    ///
    /// Callers check [`contains`](Self::contains) first; placing the same
    /// identity twice would orphan the earlier node.
    pub(crate) fn place(&mut self, id: EntityId, entity: &PipelineEntity, signals: HealthSignals) -> RenderIndex {
        debug_assert!(!self.contains(&id), "identity {id} placed twice");

        let render_index = RenderIndex::new(self.nodes.len());
        self.index.insert(id.clone(), render_index);
        self.nodes.push(GraphNode {
            id,
            render_index,
            label: entity.name.clone(),
            resource_type: entity.resource_type(),
            signals,
        });

        render_index
    }

    pub(crate) fn connect(&mut self, from: EntityId, to: EntityId) {
        self.pending.push(PendingEdge::new(from, to));
    }

    pub(crate) fn add_option(&mut self, label: impl Into<String>, value: EntityId) {
        self.options.push(SearchOption {
            label: label.into(),
            value,
        });
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Wire edges and produce the view
    pub(crate) fn finish(self, policy: EdgePolicy) -> GraphView {
        let edges = edges::synthesize(&self.pending, &self.index, policy);

        tracing::debug!(
            nodes = self.node_count(),
            pending = self.pending.len(),
            edges = edges.len(),
            "graph build finished"
        );

        GraphView {
            nodes: self.nodes,
            edges,
            options: self.options,
        }
    }
}
