//! Edge synthesis
//!
//! Builders record edges as entity id pairs while they traverse. Once the
//! retained node set is final, those intents are wired to render indices.
//! An intent whose endpoint was not retained is dropped without error, so
//! filtered-out neighbours never leave dangling edges behind.

use std::collections::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use ward_core::EntityId;
use crate::view::{GraphEdge, RenderIndex};

/// An edge recorded during traversal, not yet wired
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingEdge {
    pub from: EntityId,
    pub to: EntityId,
}

impl PendingEdge {
    pub fn new(from: EntityId, to: EntityId) -> Self {
        Self { from, to }
    }
}

/// What to do with repeated edges between the same two nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Emit every intent, duplicates included
    #[default]
    Preserve,

    /// Emit only the first edge of each (source, target) pair
    Dedup,
}

impl EdgePolicy {
    pub fn from_dedup_flag(dedup: bool) -> Self {
        if dedup {
            Self::Dedup
        } else {
            Self::Preserve
        }
    }
}

/// Wire pending edges to render indices, in pending order
pub fn synthesize(
    pending: &[PendingEdge],
    index: &HashMap<EntityId, RenderIndex>,
    policy: EdgePolicy,
) -> Vec<GraphEdge> {
    let mut edges = Vec::with_capacity(pending.len());
    let mut seen = HashSet::new();

    for intent in pending {
        let (Some(&source), Some(&target)) = (index.get(&intent.from), index.get(&intent.to)) else {
            tracing::trace!(from = %intent.from, to = %intent.to, "dropping edge with unretained endpoint");
            continue;
        };

        let edge = GraphEdge { source, target };

        if policy == EdgePolicy::Dedup && !seen.insert(edge) {
            continue;
        }

        edges.push(edge);
    }

    edges
}
