//! Full-graph mode: every known entity passing the filter criteria
//!
//! Entities are visited in the snapshot's enumeration order and keep that
//! relative order in the output; render indices are their positions in the
//! retained list. Upstream edges are recorded once per distinct upstream
//! reference of every retained non-source entity, whether or not the
//! upstream entity survives the filter; edge synthesis drops the ones that
//! dangle.

use std::collections::HashSet;
use ward_core::{
    resolve_id, AlertFilter, EntityId, EntityKind, FilterCriteria, HealthSignals, PipelineEntity,
    PipelineSnapshot,
};
use crate::builder::GraphBuilder;

/// Evaluates filter criteria against one entity
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntityFilter<'a> {
    criteria: &'a FilterCriteria,
    monitored_key: &'a str,
}

impl<'a> EntityFilter<'a> {
    pub(crate) fn new(criteria: &'a FilterCriteria, monitored_key: &'a str) -> Self {
        Self {
            criteria,
            monitored_key,
        }
    }

    /// Whether the entity passes every active predicate
    pub(crate) fn accepts(&self, entity: &PipelineEntity, signals: &HealthSignals) -> bool {
        let alert_ok = match self.criteria.alert {
            Some(AlertFilter::Anomaly) => signals.has_anomaly,
            Some(AlertFilter::SchemaChange) => signals.has_schema_change,
            Some(AlertFilter::FailedTest) => signals.has_failed_test,
            None => true,
        };

        let monitored_ok = !self.criteria.monitored_only || entity.is_monitored(self.monitored_key);

        let type_ok = self
            .criteria
            .resource_type
            .map_or(true, |resource_type| entity.resource_type() == resource_type);

        alert_ok && monitored_ok && type_ok
    }
}

/// Build the filtered full graph
pub(crate) fn build(snapshot: &PipelineSnapshot, filter: EntityFilter<'_>) -> GraphBuilder {
    let mut builder = GraphBuilder::new();

    for known in &snapshot.known_nodes {
        let Some(entity) = snapshot.entity(&known.raw_ref) else {
            tracing::trace!(label = %known.label, raw_ref = %known.raw_ref, "skipping known node without entity");
            continue;
        };

        let id = resolve_id(entity);
        if builder.contains(&id) {
            continue;
        }

        let signals = snapshot.signals.signals_for(&id);
        if !filter.accepts(entity, &signals) {
            continue;
        }

        builder.place(id.clone(), entity, signals);
        builder.add_option(known.label.clone(), id.clone());

        record_upstream(&mut builder, snapshot, entity, &id);
    }

    builder
}

fn record_upstream(builder: &mut GraphBuilder, snapshot: &PipelineSnapshot, entity: &PipelineEntity, id: &EntityId) {
    match entity.kind {
        EntityKind::Source => {}
        EntityKind::Model { .. } | EntityKind::Seed { .. } | EntityKind::Other { .. } => {
            // Repeated references to the same upstream count once
            let mut seen = HashSet::new();

            for raw_ref in entity.upstream_refs() {
                if !seen.insert(raw_ref.as_str()) {
                    continue;
                }

                match snapshot.entity(raw_ref) {
                    Some(upstream) => builder.connect(resolve_id(upstream), id.clone()),
                    None => tracing::trace!(raw_ref = %raw_ref, "skipping unresolvable upstream"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::EdgePolicy;
    use crate::test_support::SnapshotFixture;
    use ward_core::{ResourceType, config::DEFAULT_MONITORED_KEY};

    fn run(fixture: &SnapshotFixture, criteria: FilterCriteria) -> crate::GraphView {
        build(&fixture.snapshot(), EntityFilter::new(&criteria, DEFAULT_MONITORED_KEY)).finish(EdgePolicy::Preserve)
    }

    fn names(view: &crate::GraphView) -> Vec<&str> {
        view.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    fn pipeline() -> SnapshotFixture {
        SnapshotFixture::new()
            .source("raw_orders")
            .seed("countries")
            .model("orders", &["source:raw_orders", "seed:countries"])
            .model("revenue", &["model:orders"])
    }

    #[test]
    fn test_no_criteria_keeps_everything_in_order() {
        let fixture = pipeline();
        let view = run(&fixture, FilterCriteria::all());

        assert_eq!(names(&view), ["raw_orders", "countries", "orders", "revenue"]);

        let indices: Vec<usize> = view.nodes.iter().map(|n| n.render_index.get()).collect();
        assert_eq!(indices, [0, 1, 2, 3]);

        let edges: Vec<(usize, usize)> = view.edges.iter().map(|e| (e.source.get(), e.target.get())).collect();
        assert_eq!(edges, [(0, 2), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_options_follow_retained_order() {
        let fixture = pipeline();
        let view = run(&fixture, FilterCriteria::all().with_resource_type(ResourceType::Model));

        let options: Vec<(&str, &EntityId)> = view.options.iter().map(|o| (o.label.as_str(), &o.value)).collect();
        let orders = fixture.id("model:orders");
        let revenue = fixture.id("model:revenue");
        assert_eq!(options, [(orders.as_str(), &orders), (revenue.as_str(), &revenue)]);
    }

    #[test]
    fn test_resource_type_filter() {
        let fixture = pipeline();
        let view = run(&fixture, FilterCriteria::all().with_resource_type(ResourceType::Model));

        assert_eq!(names(&view), ["orders", "revenue"]);
        // Indices are contiguous over the retained list
        assert_eq!(view.nodes[0].render_index.get(), 0);
        assert_eq!(view.nodes[1].render_index.get(), 1);
        // Only the model -> model edge survives
        let edges: Vec<(usize, usize)> = view.edges.iter().map(|e| (e.source.get(), e.target.get())).collect();
        assert_eq!(edges, [(0, 1)]);
    }

    #[test]
    fn test_anomaly_filter_keeps_flagged_entities() {
        let fixture = pipeline().anomaly("model:orders");
        let view = run(&fixture, FilterCriteria::all().with_alert(AlertFilter::Anomaly));

        assert_eq!(names(&view), ["orders"]);
        assert!(view.edges.is_empty());
    }

    #[test]
    fn test_failed_test_filter() {
        let fixture = pipeline().failed_test("seed:countries").failed_test("model:revenue");
        let view = run(&fixture, FilterCriteria::all().with_alert(AlertFilter::FailedTest));

        assert_eq!(names(&view), ["countries", "revenue"]);
        assert!(view.nodes.iter().all(|n| n.signals.has_failed_test));
    }

    #[test]
    fn test_monitored_only_excludes_unflagged_even_on_alert_match() {
        let fixture = pipeline()
            .monitored("model:revenue")
            .schema_change("model:orders")
            .schema_change("model:revenue");

        let view = run(
            &fixture,
            FilterCriteria::all()
                .with_alert(AlertFilter::SchemaChange)
                .monitored_only(true),
        );

        assert_eq!(names(&view), ["revenue"]);
    }

    #[test]
    fn test_type_and_alert_filters_combine() {
        let fixture = pipeline().anomaly("source:raw_orders").anomaly("model:orders");

        let view = run(
            &fixture,
            FilterCriteria::all()
                .with_alert(AlertFilter::Anomaly)
                .with_resource_type(ResourceType::Source),
        );

        assert_eq!(names(&view), ["raw_orders"]);
    }

    #[test]
    fn test_duplicate_identities_are_retained_once() {
        let fixture = pipeline().alias("model:orders", "model.shop.orders_copy").known("model.shop.orders_copy");
        let view = run(&fixture, FilterCriteria::all());

        assert_eq!(names(&view), ["raw_orders", "countries", "orders", "revenue"]);
    }

    #[test]
    fn test_unresolvable_known_nodes_and_upstreams_are_skipped() {
        let fixture = pipeline()
            .model("forecast", &["model:revenue", "model.shop.deleted"])
            .known("model.shop.never_loaded");

        let view = run(&fixture, FilterCriteria::all());

        assert_eq!(names(&view), ["raw_orders", "countries", "orders", "revenue", "forecast"]);
        assert_eq!(view.edges.len(), 4);
    }

    #[test]
    fn test_repeated_upstream_reference_yields_one_edge() {
        let fixture = SnapshotFixture::new()
            .source("raw_orders")
            .model("orders", &["source:raw_orders", "source:raw_orders"]);

        let view = run(&fixture, FilterCriteria::all());
        assert_eq!(view.edges.len(), 1);
        assert_eq!(view.edge_ids(), vec![(&fixture.id("source:raw_orders"), &fixture.id("model:orders"))]);
    }

    #[test]
    fn test_upstream_falls_back_to_sources() {
        let fixture = SnapshotFixture::new()
            .source("raw_orders")
            .model("orders", &["source:raw_orders"]);

        let view = run(&fixture, FilterCriteria::all());
        assert_eq!(view.edge_ids(), vec![(&fixture.id("source:raw_orders"), &fixture.id("model:orders"))]);
    }

    #[test]
    fn test_schema_change_scenario() {
        // S1 <- M1 <- M2, only M2 has a schema change
        let fixture = SnapshotFixture::new()
            .source("s1")
            .model("m1", &["source:s1"])
            .model("m2", &["model:m1"])
            .schema_change("model:m2");

        let view = run(&fixture, FilterCriteria::all().with_alert(AlertFilter::SchemaChange));

        assert_eq!(names(&view), ["m2"]);
        assert_eq!(view.nodes[0].render_index.get(), 0);
        assert!(view.edges.is_empty());
    }
}
