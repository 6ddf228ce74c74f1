//! Immutable pipeline snapshot consumed by graph builds

use std::collections::HashMap;
use crate::entity::PipelineEntity;
use crate::signals::SignalSources;

/// An entry of the fixed full-graph enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownNode {
    /// Human-facing label
    pub label: String,

    /// Raw reference key of the entity
    pub raw_ref: String,
}

impl KnownNode {
    pub fn new(label: impl Into<String>, raw_ref: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            raw_ref: raw_ref.into(),
        }
    }
}

/// Everything one graph build reads
///
/// Built once by the ingestion layer and only ever borrowed afterwards.
#[derive(Debug, Clone, Default)]
pub struct PipelineSnapshot {
    /// Models, seeds and other dbt nodes keyed by raw reference
    pub models: HashMap<String, PipelineEntity>,

    /// Sources keyed by raw reference
    pub sources: HashMap<String, PipelineEntity>,

    /// Label -> raw reference
    pub labels: HashMap<String, String>,

    /// Raw reference -> direct parents
    pub parents: HashMap<String, Vec<String>>,

    /// Raw reference -> direct children
    pub children: HashMap<String, Vec<String>>,

    /// Full-graph enumeration; its order is the rendering order
    pub known_nodes: Vec<KnownNode>,

    /// Monitoring data
    pub signals: SignalSources,
}

impl PipelineSnapshot {
    /// Look up an entity, preferring models over sources
    pub fn entity(&self, raw_ref: &str) -> Option<&PipelineEntity> {
        self.models.get(raw_ref).or_else(|| self.sources.get(raw_ref))
    }

    /// Resolve a label to its raw reference
    pub fn raw_ref(&self, label: &str) -> Option<&str> {
        self.labels.get(label).map(String::as_str)
    }

    /// Direct parents of a raw reference
    pub fn parents(&self, raw_ref: &str) -> &[String] {
        self.parents.get(raw_ref).map(Vec::as_slice).unwrap_or_default()
    }

    /// Direct children of a raw reference
    pub fn children(&self, raw_ref: &str) -> &[String] {
        self.children.get(raw_ref).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of entities in the universe
    pub fn entity_count(&self) -> usize {
        self.models.len() + self.sources.len()
    }
}
