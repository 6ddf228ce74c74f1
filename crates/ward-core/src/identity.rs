//! Stable entity identity
//!
//! An [`EntityId`] is derived from the identity-bearing attributes of an
//! entity: resource type, package, schema and name. It is the key health
//! signals are joined on, so it must be injective over that tuple.

use serde::{Deserialize, Serialize};
use crate::entity::{EntityKind, PipelineEntity};

const SEPARATOR: char = '.';
const ESCAPE: char = '\\';

/// Identifier derived from an entity's identity-bearing attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an already-encoded id (e.g. one read from monitoring data)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an id from its components
    pub fn from_parts(resource_type: &str, package_name: &str, schema: &str, name: &str) -> Self {
        let mut id = String::with_capacity(
            resource_type.len() + package_name.len() + schema.len() + name.len() + 3,
        );

        for (i, part) in [resource_type, package_name, schema, name].iter().enumerate() {
            if i > 0 {
                id.push(SEPARATOR);
            }
            push_escaped(&mut id, part);
        }

        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Both the separator and the escape character are escaped, so every id
// splits back into exactly one tuple.
fn push_escaped(out: &mut String, part: &str) {
    for c in part.chars() {
        if c == SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

/// Derive the stable id of an entity
pub fn resolve_id(entity: &PipelineEntity) -> EntityId {
    let resource_type = match &entity.kind {
        EntityKind::Other { raw_type, .. } => raw_type.as_str(),
        _ => entity.resource_type().as_str(),
    };

    EntityId::from_parts(
        resource_type,
        &entity.package_name,
        &entity.schema,
        &entity.name,
    )
}
