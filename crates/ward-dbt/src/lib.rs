//! dbt artifact parsing and snapshot assembly
//!
//! This crate handles:
//! - Parsing manifest.json (dbt-generated artifacts)
//! - Building direct parent/child adjacency (DAG)
//! - Parsing monitoring exports into health-signal sources
//! - Assembling the pipeline snapshot graph builds consume

pub mod manifest;
pub mod dag;
pub mod monitoring;
pub mod snapshot;

pub use manifest::{Manifest, ManifestError, ManifestNode, ManifestSource, NodeConfig, DependsOn, ManifestMetadata};
pub use dag::{DependencyGraph, NodeId};
pub use monitoring::{MonitoringData, MonitoringError, TestResult};
pub use snapshot::{LoadError, SnapshotLoader};
