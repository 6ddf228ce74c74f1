//! Focused mode: one entity and its direct neighbours
//!
//! The focus gets render index 0. Parents follow in adjacency order, then
//! children, each numbered sequentially. Neighbours are deduplicated by
//! identity, so two raw references resolving to the same entity id collapse
//! into one node and one edge. Filter criteria do not apply here.

use ward_core::{resolve_id, EntityId, PipelineSnapshot};
use crate::builder::GraphBuilder;

#[derive(Clone, Copy)]
enum Direction {
    Upstream,
    Downstream,
}

/// Build the neighbourhood of the entity labelled `focus_label`
///
/// An unknown label yields an empty builder.
pub(crate) fn build(snapshot: &PipelineSnapshot, focus_label: &str) -> GraphBuilder {
    let mut builder = GraphBuilder::new();

    let Some(focus_ref) = snapshot.raw_ref(focus_label) else {
        tracing::debug!(label = focus_label, "focus label not found");
        return builder;
    };

    let Some(focus) = snapshot.entity(focus_ref) else {
        tracing::debug!(label = focus_label, raw_ref = focus_ref, "focus entity not found");
        return builder;
    };

    let focus_id = resolve_id(focus);
    builder.place(focus_id.clone(), focus, snapshot.signals.signals_for(&focus_id));

    add_neighbours(&mut builder, snapshot, &focus_id, snapshot.parents(focus_ref), Direction::Upstream);
    add_neighbours(&mut builder, snapshot, &focus_id, snapshot.children(focus_ref), Direction::Downstream);

    builder
}

fn add_neighbours(
    builder: &mut GraphBuilder,
    snapshot: &PipelineSnapshot,
    focus_id: &EntityId,
    refs: &[String],
    direction: Direction,
) {
    for raw_ref in refs {
        let Some(entity) = snapshot.entity(raw_ref) else {
            tracing::trace!(raw_ref = %raw_ref, "skipping unresolvable neighbour");
            continue;
        };

        if !entity.resource_type().is_supported() {
            continue;
        }

        let id = resolve_id(entity);
        if builder.contains(&id) {
            continue;
        }

        let signals = snapshot.signals.signals_for(&id);
        builder.place(id.clone(), entity, signals);

        match direction {
            Direction::Upstream => builder.connect(id, focus_id.clone()),
            Direction::Downstream => builder.connect(focus_id.clone(), id),
        }
    }
}
