//! Snapshot assembly
//!
//! Turns a parsed manifest and monitoring export into the immutable
//! [`PipelineSnapshot`] graph builds read from.

use std::path::Path;
use ward_core::{resolve_id, KnownNode, PipelineEntity, PipelineSnapshot};
use crate::dag::DependencyGraph;
use crate::manifest::{Manifest, ManifestError};
use crate::monitoring::{MonitoringData, MonitoringError};

/// Builds pipeline snapshots from dbt artifacts
pub struct SnapshotLoader;

impl SnapshotLoader {
    /// Assemble a snapshot from already-parsed artifacts
    ///
    /// Every entity is labelled with its entity id. The full-graph
    /// enumeration holds supported entities ordered by raw reference, which
    /// keeps layouts reproducible between loads.
    pub fn build(manifest: &Manifest, monitoring: MonitoringData) -> PipelineSnapshot {
        let models = manifest.node_entities();
        let sources = manifest.source_entities();

        let mut universe: Vec<&PipelineEntity> = models.values().chain(sources.values()).collect();
        universe.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));

        let mut snapshot = PipelineSnapshot::default();

        for entity in universe {
            let label = resolve_id(entity).to_string();

            if entity.resource_type().is_supported() {
                snapshot
                    .known_nodes
                    .push(KnownNode::new(label.clone(), entity.unique_id.clone()));
            }

            // First raw reference wins when two entities share an identity
            snapshot
                .labels
                .entry(label)
                .or_insert_with(|| entity.unique_id.clone());
        }

        let (parents, children) = DependencyGraph::from_manifest(manifest).into_maps();

        tracing::debug!(
            models = models.len(),
            sources = sources.len(),
            known = snapshot.known_nodes.len(),
            "assembled pipeline snapshot"
        );

        snapshot.models = models;
        snapshot.sources = sources;
        snapshot.parents = parents;
        snapshot.children = children;
        snapshot.signals = monitoring.into_signal_sources();
        snapshot
    }

    /// Load artifacts from disk and assemble a snapshot
    ///
    /// A missing monitoring file is not an error; the snapshot then carries
    /// no health signals.
    pub fn from_paths(manifest_path: &Path, monitoring_path: Option<&Path>) -> Result<PipelineSnapshot, LoadError> {
        let manifest = Manifest::from_file(manifest_path)?;

        let monitoring = match monitoring_path {
            Some(path) if path.exists() => MonitoringData::from_file(path)?,
            Some(path) => {
                tracing::warn!(path = %path.display(), "monitoring data not found, building without health signals");
                MonitoringData::default()
            }
            None => MonitoringData::default(),
        };

        Ok(Self::build(&manifest, monitoring))
    }
}

/// Snapshot loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Monitoring(#[from] MonitoringError),
}
