//! Pipeline entities (models, sources, seeds)
//!
//! Every entity shares one identity-bearing attribute set; the kind tag
//! carries whatever differs between resource types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource type of a pipeline entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A dbt model
    Model,

    /// A declared source table
    Source,

    /// A CSV seed
    Seed,

    /// Anything else dbt puts in the graph (tests, snapshots, analyses, ...)
    Other,
}

impl ResourceType {
    /// Resource types the graph renders
    pub const SUPPORTED: [ResourceType; 3] = [Self::Model, Self::Source, Self::Seed];

    /// Get the resource type as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Source => "source",
            Self::Seed => "seed",
            Self::Other => "other",
        }
    }

    /// Whether nodes of this type can appear in a rendered graph
    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accepts the renderable types only
impl std::str::FromStr for ResourceType {
    type Err = UnknownResourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(Self::Model),
            "source" => Ok(Self::Source),
            "seed" => Ok(Self::Seed),
            other => Err(UnknownResourceType(other.to_string())),
        }
    }
}

/// Returned when a resource type name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown resource type '{0}' (expected model, source or seed)")]
pub struct UnknownResourceType(pub String);

/// Kind-specific part of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resource_type", rename_all = "lowercase")]
pub enum EntityKind {
    /// A model with its ordered upstream references
    Model { depends_on: Vec<String> },

    /// A source; sources never depend on anything
    Source,

    /// A seed (dbt allows seeds to carry dependencies on macros only,
    /// but node references are kept if present)
    Seed { depends_on: Vec<String> },

    /// Any other dbt node, keeping the raw resource type
    Other {
        raw_type: String,
        depends_on: Vec<String>,
    },
}

/// Open key-value configuration attached to an entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityConfig(pub Map<String, Value>);

impl EntityConfig {
    /// Get a raw config value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` is present and truthy
    ///
    /// Truthiness: `true`, non-zero numbers, non-empty strings, and any
    /// array or object. `null`, `false`, `0` and `""` are falsy.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).map(is_truthy).unwrap_or(false)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A model, source or seed in the transformation graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEntity {
    /// Raw reference key (dbt unique_id, e.g. "model.jaffle_shop.orders")
    pub unique_id: String,

    /// Entity name
    pub name: String,

    /// Package (namespace) the entity belongs to
    pub package_name: String,

    /// Schema or dataset the entity materializes into
    pub schema: String,

    /// Entity configuration
    #[serde(default)]
    pub config: EntityConfig,

    /// Kind tag and kind-specific data
    #[serde(flatten)]
    pub kind: EntityKind,
}

impl PipelineEntity {
    /// Resource type of this entity
    pub fn resource_type(&self) -> ResourceType {
        match self.kind {
            EntityKind::Model { .. } => ResourceType::Model,
            EntityKind::Source => ResourceType::Source,
            EntityKind::Seed { .. } => ResourceType::Seed,
            EntityKind::Other { .. } => ResourceType::Other,
        }
    }

    /// Ordered upstream references (empty for sources)
    pub fn upstream_refs(&self) -> &[String] {
        match &self.kind {
            EntityKind::Model { depends_on }
            | EntityKind::Seed { depends_on }
            | EntityKind::Other { depends_on, .. } => depends_on,
            EntityKind::Source => &[],
        }
    }

    /// Whether the given monitoring flag is set in the entity config
    pub fn is_monitored(&self, key: &str) -> bool {
        self.config.flag(key)
    }
}
