//! Health signals joined onto graph nodes
//!
//! Monitoring data arrives as three independent collections keyed by
//! [`EntityId`]. Only the presence of entries matters for the graph; the
//! records themselves are kept for detail views.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use crate::identity::EntityId;

/// Per-entity health flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HealthSignals {
    pub has_anomaly: bool,
    pub has_schema_change: bool,
    pub has_failed_test: bool,
}

impl HealthSignals {
    /// Whether any flag is raised
    pub fn any(&self) -> bool {
        self.has_anomaly || self.has_schema_change || self.has_failed_test
    }
}

/// A detected metric anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Entity id of the monitored table
    pub model: EntityId,

    /// Metric name (e.g. "row_count")
    pub metric: String,

    /// Column the metric was computed on, if any
    #[serde(default)]
    pub column_name: Option<String>,

    #[serde(default)]
    pub z_score_value: Option<f64>,

    #[serde(default)]
    pub last_value: Option<f64>,

    #[serde(default)]
    pub time_window_end: Option<String>,
}

/// A detected schema change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaChange {
    /// Entity id of the monitored table
    pub model: EntityId,

    /// Operation (column_added, column_removed, type_change)
    pub operation: String,

    #[serde(default)]
    pub column_name: Option<String>,

    #[serde(default)]
    pub data_type: Option<String>,

    #[serde(default)]
    pub prev_column_name: Option<String>,

    #[serde(default)]
    pub prev_data_type: Option<String>,

    #[serde(default)]
    pub detected_time: Option<String>,
}

/// The three signal collections a build reads from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSources {
    /// Anomalies by entity id
    pub anomalies: HashMap<EntityId, Vec<Anomaly>>,

    /// Schema changes by entity id
    pub schema_changes: HashMap<EntityId, Vec<SchemaChange>>,

    /// Ids of entities with at least one failed test
    pub failed_tests: HashSet<EntityId>,
}

impl SignalSources {
    /// Compute the signals of one entity; missing entries mean no signal
    pub fn signals_for(&self, id: &EntityId) -> HealthSignals {
        HealthSignals {
            has_anomaly: self.anomalies.get(id).is_some_and(|a| !a.is_empty()),
            has_schema_change: self.schema_changes.get(id).is_some_and(|c| !c.is_empty()),
            has_failed_test: self.failed_tests.contains(id),
        }
    }

    /// Record an anomaly
    pub fn add_anomaly(&mut self, anomaly: Anomaly) {
        self.anomalies
            .entry(anomaly.model.clone())
            .or_default()
            .push(anomaly);
    }

    /// Record a schema change
    pub fn add_schema_change(&mut self, change: SchemaChange) {
        self.schema_changes
            .entry(change.model.clone())
            .or_default()
            .push(change);
    }

    /// Mark an entity as having a failed test
    pub fn add_failed_test(&mut self, id: EntityId) {
        self.failed_tests.insert(id);
    }
}
