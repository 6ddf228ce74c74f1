//! Dependency graph (DAG) construction
//!
//! Builds the direct parent and child adjacency of every manifest node.

use std::collections::HashMap;
use crate::manifest::Manifest;

/// Node identifier (unique_id from manifest)
pub type NodeId = String;

/// Dependency graph with forward and reverse edges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    /// Forward edges: node -> list of nodes it depends on (parents)
    parents: HashMap<NodeId, Vec<NodeId>>,

    /// Reverse edges: node -> list of nodes that depend on it (children)
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl DependencyGraph {
    /// Build a dependency graph from a manifest
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut parents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        // Use parent_map and child_map from manifest if available
        if !manifest.parent_map.is_empty() && !manifest.child_map.is_empty() {
            parents = manifest.parent_map.clone();
            children = manifest.child_map.clone();
        } else {
            // Walk nodes in a fixed order so child lists come out the same
            // on every load
            let mut node_ids: Vec<&NodeId> = manifest.nodes.keys().collect();
            node_ids.sort();

            for node_id in node_ids {
                let deps = &manifest.nodes[node_id].depends_on.nodes;
                if deps.is_empty() {
                    continue;
                }

                parents.insert(node_id.clone(), deps.clone());

                for dep_id in deps {
                    children
                        .entry(dep_id.clone())
                        .or_default()
                        .push(node_id.clone());
                }
            }
        }

        Self { parents, children }
    }

    /// Get immediate parents (dependencies) of a node
    pub fn parents(&self, node_id: &str) -> &[NodeId] {
        self.parents
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Get immediate children (dependents) of a node
    pub fn children(&self, node_id: &str) -> &[NodeId] {
        self.children
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Split into the parent and child adjacency maps
    pub fn into_maps(self) -> (HashMap<NodeId, Vec<NodeId>>, HashMap<NodeId, Vec<NodeId>>) {
        (self.parents, self.children)
    }
}
