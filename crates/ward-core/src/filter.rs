//! View filter criteria for full-graph builds

use serde::{Deserialize, Serialize};
use crate::entity::ResourceType;

/// Alert filter toggled from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFilter {
    /// Only entities with anomalies
    Anomaly,

    /// Only entities with schema changes
    SchemaChange,

    /// Only entities with failed tests
    FailedTest,
}

impl AlertFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anomaly => "anomaly",
            Self::SchemaChange => "schema_change",
            Self::FailedTest => "failed_test",
        }
    }
}

impl std::fmt::Display for AlertFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AlertFilter {
    type Err = UnknownAlertFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "anomaly" => Ok(Self::Anomaly),
            "schema_change" => Ok(Self::SchemaChange),
            "failed_test" => Ok(Self::FailedTest),
            other => Err(UnknownAlertFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown alert filter '{0}' (expected anomaly, schema_change or failed_test)")]
pub struct UnknownAlertFilter(pub String);

/// Active filters of a full-graph build
///
/// The dashboard only ever activates one of `resource_type` / `alert` at a
/// time, but both are evaluated independently and combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Keep only entities of this resource type
    #[serde(default)]
    pub resource_type: Option<ResourceType>,

    /// Keep only entities raising this alert
    #[serde(default)]
    pub alert: Option<AlertFilter>,

    /// Keep only entities flagged as monitored in their config
    #[serde(default)]
    pub monitored_only: bool,
}

impl FilterCriteria {
    /// Criteria that retain everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    pub fn with_alert(mut self, alert: AlertFilter) -> Self {
        self.alert = Some(alert);
        self
    }

    pub fn monitored_only(mut self, monitored_only: bool) -> Self {
        self.monitored_only = monitored_only;
        self
    }

    /// Whether any predicate is active
    pub fn is_active(&self) -> bool {
        self.resource_type.is_some() || self.alert.is_some() || self.monitored_only
    }
}
