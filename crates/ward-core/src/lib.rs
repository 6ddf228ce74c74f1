//! Ward Core
//!
//! Domain model shared by ingestion and graph builds: pipeline entities,
//! their stable identity, health signals, filter criteria and configuration.

pub mod entity;
pub mod identity;
pub mod signals;
pub mod filter;
pub mod snapshot;
pub mod config;

pub use entity::{EntityConfig, EntityKind, PipelineEntity, ResourceType, UnknownResourceType};
pub use identity::{resolve_id, EntityId};
pub use signals::{Anomaly, HealthSignals, SchemaChange, SignalSources};
pub use filter::{AlertFilter, FilterCriteria, UnknownAlertFilter};
pub use snapshot::{KnownNode, PipelineSnapshot};
pub use config::{Config, ConfigError, GraphSettings, PathSettings};
