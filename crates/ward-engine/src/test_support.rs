//! Snapshot fixtures for unit tests
//!
//! Entities are addressed by `kind:name` keys (`model:orders`,
//! `source:raw_orders`, `seed:countries`, `test:not_null_id`). A reference
//! without a colon is used as a raw reference verbatim.

use std::collections::HashMap;
use serde_json::{Map, Value};
use ward_core::{
    config::DEFAULT_MONITORED_KEY, resolve_id, Anomaly, EntityConfig, EntityId, EntityKind, KnownNode,
    PipelineEntity, PipelineSnapshot, SchemaChange,
};

const PACKAGE: &str = "shop";

#[derive(Debug, Default)]
pub(crate) struct SnapshotFixture {
    snapshot: PipelineSnapshot,
    /// Raw references in insertion order, for deterministic child lists
    order: Vec<String>,
}

impl SnapshotFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn model(self, name: &str, deps: &[&str]) -> Self {
        let depends_on = deps.iter().map(|dep| raw_ref(dep)).collect();
        self.insert(entity(name, "analytics", EntityKind::Model { depends_on }))
    }

    pub(crate) fn seed(self, name: &str) -> Self {
        self.insert(entity(name, "seeds", EntityKind::Seed { depends_on: vec![] }))
    }

    pub(crate) fn source(self, name: &str) -> Self {
        self.insert(entity(name, "raw", EntityKind::Source))
    }

    pub(crate) fn other(self, raw_type: &str, name: &str, deps: &[&str]) -> Self {
        let depends_on = deps.iter().map(|dep| raw_ref(dep)).collect();
        self.insert(entity(
            name,
            "analytics",
            EntityKind::Other {
                raw_type: raw_type.to_string(),
                depends_on,
            },
        ))
    }

    /// Register a copy of an entity under a second raw reference
    pub(crate) fn alias(mut self, key: &str, alias: &str) -> Self {
        let original = raw_ref(key);
        if let Some(entity) = self.snapshot.models.get(&original).cloned() {
            self.snapshot
                .models
                .insert(alias.to_string(), PipelineEntity { unique_id: alias.to_string(), ..entity });
        } else if let Some(entity) = self.snapshot.sources.get(&original).cloned() {
            self.snapshot
                .sources
                .insert(alias.to_string(), PipelineEntity { unique_id: alias.to_string(), ..entity });
        }
        self
    }

    /// Append a raw reference to the full-graph enumeration
    pub(crate) fn known(mut self, raw: &str) -> Self {
        let label = self
            .snapshot
            .entity(raw)
            .map(|entity| resolve_id(entity).to_string())
            .unwrap_or_else(|| raw.to_string());
        self.snapshot.known_nodes.push(KnownNode::new(label, raw));
        self
    }

    pub(crate) fn monitored(mut self, key: &str) -> Self {
        let raw = raw_ref(key);
        if let Some(entity) = self.snapshot.models.get_mut(&raw).or(self.snapshot.sources.get_mut(&raw)) {
            entity
                .config
                .0
                .insert(DEFAULT_MONITORED_KEY.to_string(), Value::Bool(true));
        }
        self
    }

    pub(crate) fn anomaly(mut self, key: &str) -> Self {
        let model = self.id(key);
        self.snapshot.signals.add_anomaly(Anomaly {
            model,
            metric: "row_count".to_string(),
            column_name: None,
            z_score_value: Some(3.5),
            last_value: None,
            time_window_end: None,
        });
        self
    }

    pub(crate) fn schema_change(mut self, key: &str) -> Self {
        let model = self.id(key);
        self.snapshot.signals.add_schema_change(SchemaChange {
            model,
            operation: "column_added".to_string(),
            column_name: Some("status".to_string()),
            data_type: Some("text".to_string()),
            prev_column_name: None,
            prev_data_type: None,
            detected_time: None,
        });
        self
    }

    pub(crate) fn failed_test(mut self, key: &str) -> Self {
        let id = self.id(key);
        self.snapshot.signals.add_failed_test(id);
        self
    }

    /// Entity id of a fixture entity
    pub(crate) fn id(&self, key: &str) -> EntityId {
        let raw = raw_ref(key);
        match self.snapshot.entity(&raw) {
            Some(entity) => resolve_id(entity),
            None => EntityId::new(raw),
        }
    }

    /// Label of a fixture entity (its id, as the loader labels them)
    pub(crate) fn label(&self, key: &str) -> String {
        self.id(key).to_string()
    }

    /// Finished snapshot with labels and adjacency derived from dependencies
    pub(crate) fn snapshot(&self) -> PipelineSnapshot {
        let mut snapshot = self.snapshot.clone();
        let mut children: HashMap<String, Vec<String>> = HashMap::new();

        for raw in &self.order {
            let Some(entity) = snapshot.entity(raw) else { continue };
            let deps = entity.upstream_refs().to_vec();

            for dep in &deps {
                children.entry(dep.clone()).or_default().push(raw.clone());
            }
            if !deps.is_empty() {
                snapshot.parents.insert(raw.clone(), deps);
            }
        }

        snapshot.children = children;
        snapshot
    }

    fn insert(mut self, entity: PipelineEntity) -> Self {
        let raw = entity.unique_id.clone();
        let label = resolve_id(&entity).to_string();

        if matches!(entity.kind, EntityKind::Source) {
            self.snapshot.sources.insert(raw.clone(), entity);
        } else {
            self.snapshot.models.insert(raw.clone(), entity);
        }

        if raw_type_is_supported(&raw) {
            self.snapshot.known_nodes.push(KnownNode::new(label.clone(), raw.clone()));
        }
        self.snapshot.labels.insert(label, raw.clone());
        self.order.push(raw);
        self
    }
}

fn raw_type_is_supported(raw: &str) -> bool {
    ["model.", "source.", "seed."].iter().any(|prefix| raw.starts_with(prefix))
}

fn raw_ref(key: &str) -> String {
    match key.split_once(':') {
        Some(("source", name)) => format!("source.{PACKAGE}.raw.{name}"),
        Some((kind, name)) => format!("{kind}.{PACKAGE}.{name}"),
        None => key.to_string(),
    }
}

fn entity(name: &str, schema: &str, kind: EntityKind) -> PipelineEntity {
    let unique_id = match &kind {
        EntityKind::Model { .. } => raw_ref(&format!("model:{name}")),
        EntityKind::Seed { .. } => raw_ref(&format!("seed:{name}")),
        EntityKind::Source => raw_ref(&format!("source:{name}")),
        EntityKind::Other { raw_type, .. } => raw_ref(&format!("{raw_type}:{name}")),
    };

    PipelineEntity {
        unique_id,
        name: name.to_string(),
        package_name: PACKAGE.to_string(),
        schema: schema.to_string(),
        config: EntityConfig(Map::new()),
        kind,
    }
}
