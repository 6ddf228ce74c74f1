//! dbt manifest.json parsing
//!
//! Parses dbt-generated manifest.json to extract models, seeds, sources and
//! their dependencies, and converts them into pipeline entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use ward_core::{EntityConfig, EntityKind, PipelineEntity};

/// dbt manifest.json structure (subset of fields we care about)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Metadata about the manifest
    pub metadata: ManifestMetadata,

    /// Model, seed, test and snapshot nodes
    pub nodes: HashMap<String, ManifestNode>,

    /// Source definitions
    #[serde(default)]
    pub sources: HashMap<String, ManifestSource>,

    /// Parent map (node -> list of parent nodes)
    #[serde(default)]
    pub parent_map: HashMap<String, Vec<String>>,

    /// Child map (node -> list of child nodes)
    #[serde(default)]
    pub child_map: HashMap<String, Vec<String>>,
}

impl Manifest {
    /// Load manifest from file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ManifestError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_str(&contents)
    }

    /// Parse manifest from JSON string
    pub fn from_str(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json)
            .map_err(|e| ManifestError::ParseError(e.to_string()))
    }

    /// Get a specific node by unique_id
    pub fn get_node(&self, unique_id: &str) -> Option<&ManifestNode> {
        self.nodes.get(unique_id)
    }

    /// Get a specific source by unique_id
    pub fn get_source(&self, unique_id: &str) -> Option<&ManifestSource> {
        self.sources.get(unique_id)
    }

    /// Convert every node into an entity, keyed by unique_id
    pub fn node_entities(&self) -> HashMap<String, PipelineEntity> {
        self.nodes
            .iter()
            .map(|(id, node)| (id.clone(), node.to_entity()))
            .collect()
    }

    /// Convert every source into an entity, keyed by unique_id
    pub fn source_entities(&self) -> HashMap<String, PipelineEntity> {
        self.sources
            .iter()
            .map(|(id, source)| (id.clone(), source.to_entity()))
            .collect()
    }
}

/// Manifest metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub dbt_schema_version: String,
    pub dbt_version: String,
    pub generated_at: String,
    #[serde(default)]
    pub invocation_id: Option<String>,
}

/// A node in the manifest (model, seed, test, snapshot, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    /// Unique identifier (e.g., "model.my_project.users")
    pub unique_id: String,

    /// Node name (e.g., "users")
    pub name: String,

    /// Resource type (model, seed, test, snapshot, etc.)
    pub resource_type: String,

    /// Package name
    pub package_name: String,

    /// Database name
    #[serde(default)]
    pub database: Option<String>,

    /// Schema name
    #[serde(default)]
    pub schema: Option<String>,

    /// Node configuration
    #[serde(default)]
    pub config: NodeConfig,

    /// Dependencies
    #[serde(default)]
    pub depends_on: DependsOn,
}

impl ManifestNode {
    /// Convert into a pipeline entity
    pub fn to_entity(&self) -> PipelineEntity {
        let depends_on = self.depends_on.nodes.clone();

        let kind = match self.resource_type.as_str() {
            "model" => EntityKind::Model { depends_on },
            "seed" => EntityKind::Seed { depends_on },
            "source" => EntityKind::Source,
            other => EntityKind::Other {
                raw_type: other.to_string(),
                depends_on,
            },
        };

        PipelineEntity {
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            package_name: self.package_name.clone(),
            schema: self.schema.clone().unwrap_or_default(),
            config: self.config.to_entity_config(),
            kind,
        }
    }
}

/// Node configuration (from dbt_project.yml or model config)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Whether the node is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Materialization type
    #[serde(default)]
    pub materialized: Option<String>,

    /// Remaining keys, including project-specific flags like `re_data_monitored`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            materialized: None,
            extra: Map::new(),
        }
    }
}

impl NodeConfig {
    /// Flatten into the open entity config map
    pub fn to_entity_config(&self) -> EntityConfig {
        let mut map = self.extra.clone();
        map.insert("enabled".to_string(), Value::Bool(self.enabled));
        if let Some(materialized) = &self.materialized {
            map.insert("materialized".to_string(), Value::String(materialized.clone()));
        }
        EntityConfig(map)
    }
}

fn default_true() -> bool {
    true
}

/// Dependencies structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependsOn {
    /// List of node unique_ids this node depends on
    #[serde(default)]
    pub nodes: Vec<String>,
}

/// A source in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestSource {
    /// Unique identifier (e.g., "source.my_project.raw.users")
    pub unique_id: String,

    /// Source name (e.g., "raw")
    pub source_name: String,

    /// Table name (e.g., "users")
    pub name: String,

    /// Package name
    #[serde(default)]
    pub package_name: String,

    /// Database name
    #[serde(default)]
    pub database: Option<String>,

    /// Schema name
    pub schema: String,

    /// Identifier (actual table name)
    #[serde(default)]
    pub identifier: Option<String>,

    /// Source configuration
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ManifestSource {
    /// Convert into a pipeline entity
    pub fn to_entity(&self) -> PipelineEntity {
        PipelineEntity {
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            package_name: self.package_name.clone(),
            schema: self.schema.clone(),
            config: EntityConfig(self.config.clone()),
            kind: EntityKind::Source,
        }
    }
}

/// Manifest parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse manifest JSON: {0}")]
    ParseError(String),
}
