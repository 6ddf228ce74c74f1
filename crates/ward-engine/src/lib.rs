//! Ward engine - lineage graph construction
//!
//! Turns a [`PipelineSnapshot`] and view filters into the node and edge set
//! a diagram renders:
//! - Focused mode: one entity with its direct parents and children
//! - Full-graph mode: every known entity passing the filter criteria
//! - Edge synthesis shared by both modes
//!
//! Builds are pure and synchronous. All intermediate state belongs to the
//! call, so the same snapshot can serve concurrent builds.

pub mod edges;
pub mod view;

mod builder;
mod global;
mod neighborhood;

#[cfg(test)]
mod test_support;

use serde::{Deserialize, Serialize};
use ward_core::{config::DEFAULT_MONITORED_KEY, FilterCriteria, GraphSettings, PipelineSnapshot};

pub use edges::{EdgePolicy, PendingEdge};
pub use view::{GraphEdge, GraphNode, GraphView, RenderIndex, SearchOption};

/// What to build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRequest {
    /// Label of the entity to focus on; `None` builds the full graph
    #[serde(default)]
    pub focus: Option<String>,

    /// Filters for full-graph builds
    #[serde(default)]
    pub criteria: FilterCriteria,
}

impl GraphRequest {
    pub fn full(criteria: FilterCriteria) -> Self {
        Self {
            focus: None,
            criteria,
        }
    }

    pub fn focused(label: impl Into<String>) -> Self {
        Self {
            focus: Some(label.into()),
            criteria: FilterCriteria::default(),
        }
    }
}

/// Build options that come from configuration rather than the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    /// Entity config key holding the monitoring flag
    pub monitored_key: String,

    pub edge_policy: EdgePolicy,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            monitored_key: DEFAULT_MONITORED_KEY.to_string(),
            edge_policy: EdgePolicy::Preserve,
        }
    }
}

impl From<&GraphSettings> for GraphOptions {
    fn from(settings: &GraphSettings) -> Self {
        Self {
            monitored_key: settings.monitored_key.clone(),
            edge_policy: EdgePolicy::from_dedup_flag(settings.dedup_edges),
        }
    }
}

/// Build the render-ready graph for a request
pub fn generate_graph(snapshot: &PipelineSnapshot, request: &GraphRequest, options: &GraphOptions) -> GraphView {
    let builder = match request.focus.as_deref() {
        Some(label) => {
            tracing::debug!(focus = label, "building focused graph");
            neighborhood::build(snapshot, label)
        }
        None => {
            tracing::debug!(criteria = ?request.criteria, "building full graph");
            let filter = global::EntityFilter::new(&request.criteria, &options.monitored_key);
            global::build(snapshot, filter)
        }
    };

    builder.finish(options.edge_policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SnapshotFixture;
    use pretty_assertions::assert_eq;
    use ward_core::{AlertFilter, ResourceType};

    fn fixture() -> SnapshotFixture {
        SnapshotFixture::new()
            .source("raw_orders")
            .model("orders", &["source:raw_orders"])
            .model("revenue", &["model:orders"])
            .monitored("model:orders")
            .anomaly("model:orders")
    }

    #[test]
    fn test_focus_selects_neighbourhood_mode() {
        let fixture = fixture();
        let request = GraphRequest::focused(fixture.label("model:revenue"));
        let view = generate_graph(&fixture.snapshot(), &request, &GraphOptions::default());

        let names: Vec<&str> = view.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(names, ["revenue", "orders"]);
        assert!(view.options.is_empty());
    }

    #[test]
    fn test_focused_mode_ignores_criteria() {
        let fixture = fixture();
        let request = GraphRequest {
            focus: Some(fixture.label("model:revenue")),
            criteria: FilterCriteria::all().with_resource_type(ResourceType::Source),
        };

        let view = generate_graph(&fixture.snapshot(), &request, &GraphOptions::default());
        assert_eq!(view.nodes.len(), 2);
    }

    #[test]
    fn test_full_mode_applies_monitored_key_from_options() {
        let fixture = fixture();
        let request = GraphRequest::full(FilterCriteria::all().monitored_only(true));

        let view = generate_graph(&fixture.snapshot(), &request, &GraphOptions::default());
        assert_eq!(view.nodes.len(), 1);

        let options = GraphOptions {
            monitored_key: "elementary_monitored".to_string(),
            ..GraphOptions::default()
        };
        assert!(generate_graph(&fixture.snapshot(), &request, &options).is_empty());
    }

    #[test]
    fn test_aliased_upstream_refs_follow_edge_policy() {
        // Two raw references resolving to the same upstream identity
        let fixture = fixture()
            .alias("source:raw_orders", "source.shop.legacy_raw_orders")
            .model("refunds", &["source:raw_orders", "source.shop.legacy_raw_orders"]);
        let request = GraphRequest::full(FilterCriteria::all());
        let snapshot = fixture.snapshot();

        let preserved = generate_graph(&snapshot, &request, &GraphOptions::default());
        assert_eq!(preserved.edges.len(), 4);

        let settings = GraphSettings {
            dedup_edges: true,
            ..GraphSettings::default()
        };
        let deduped = generate_graph(&snapshot, &request, &GraphOptions::from(&settings));
        assert_eq!(deduped.edges.len(), 3);
    }

    #[test]
    fn test_repeated_builds_are_identical() {
        let fixture = fixture();
        let snapshot = fixture.snapshot();
        let request = GraphRequest::full(FilterCriteria::all().with_alert(AlertFilter::Anomaly));

        let first = generate_graph(&snapshot, &request, &GraphOptions::default());
        let second = generate_graph(&snapshot, &request, &GraphOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_view_serializes_render_indices_as_numbers() {
        let fixture = fixture();
        let view = generate_graph(
            &fixture.snapshot(),
            &GraphRequest::full(FilterCriteria::all()),
            &GraphOptions::default(),
        );

        let json: serde_json::Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();
        assert_eq!(json["edges"][0]["source"], 0);
        assert_eq!(json["edges"][0]["target"], 1);
        assert_eq!(json["nodes"][1]["id"], "model.shop.analytics.orders");
        assert_eq!(json["nodes"][1]["resource_type"], "model");
        assert_eq!(json["nodes"][1]["signals"]["has_anomaly"], true);
    }
}
