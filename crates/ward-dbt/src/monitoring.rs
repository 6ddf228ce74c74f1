//! Monitoring data parsing
//!
//! Monitoring runs export anomalies, schema changes and test results as one
//! JSON document. Records reference tables by entity id.

use serde::{Deserialize, Serialize};
use std::path::Path;
use ward_core::{Anomaly, EntityId, SchemaChange, SignalSources};

/// Test statuses that count as a failed test
const FAILING_STATUSES: [&str; 2] = ["fail", "error"];

/// A test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Entity id of the tested table
    pub model: EntityId,

    pub test_name: String,

    /// Status reported by dbt (pass, fail, error, warn, skipped)
    pub status: String,
}

impl TestResult {
    pub fn is_failure(&self) -> bool {
        FAILING_STATUSES
            .iter()
            .any(|status| self.status.eq_ignore_ascii_case(status))
    }
}

/// Monitoring data export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoringData {
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,

    #[serde(default)]
    pub schema_changes: Vec<SchemaChange>,

    #[serde(default)]
    pub tests: Vec<TestResult>,
}

impl MonitoringData {
    /// Load monitoring data from file
    pub fn from_file(path: &Path) -> Result<Self, MonitoringError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MonitoringError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_str(&contents)
    }

    /// Parse monitoring data from JSON string
    pub fn from_str(json: &str) -> Result<Self, MonitoringError> {
        serde_json::from_str(json)
            .map_err(|e| MonitoringError::ParseError(e.to_string()))
    }

    /// Index the records by entity id
    pub fn into_signal_sources(self) -> SignalSources {
        let mut sources = SignalSources::default();

        for anomaly in self.anomalies {
            sources.add_anomaly(anomaly);
        }

        for change in self.schema_changes {
            sources.add_schema_change(change);
        }

        for test in self.tests {
            if test.is_failure() {
                sources.add_failed_test(test.model);
            }
        }

        sources
    }
}

/// Monitoring data errors
#[derive(Debug, thiserror::Error)]
pub enum MonitoringError {
    #[error("Failed to read monitoring file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse monitoring JSON: {0}")]
    ParseError(String),
}
