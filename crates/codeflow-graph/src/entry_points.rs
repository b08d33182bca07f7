//! Inbound messaging entry points.
//!
//! A handler method bound to an input channel makes its declaring class a
//! pub/sub participant even when it never touches the publish API.

use crate::config::ScanConfig;
use crate::node::NodeTable;
use crate::role::Role;
use codeflow_core::{EntityId, EntityKind, SymbolIndex};
use tracing::debug;

/// Flags the declaring class of every bound endpoint method as pub/sub.
///
/// Only existing nodes are flagged. Returns the number of endpoint
/// methods that hit a node.
pub(crate) fn mark_entry_points<I>(index: &I, config: &ScanConfig, table: &mut NodeTable) -> usize
where
    I: SymbolIndex + ?Sized,
{
    let Some(marker) = index.resolve_type(&config.endpoint_marker) else {
        debug!("Endpoint marker {} not in index", config.endpoint_marker);
        return 0;
    };

    let mut marked = 0;
    for method in index.find_annotated_entities(marker) {
        if index.kind(method) != Some(EntityKind::Method) {
            continue;
        }
        if !has_input_channel(index, config, method, marker) {
            debug!("Skipping endpoint {} without {}", method, config.input_channel_attribute);
            continue;
        }

        match owner_node(index, table, method) {
            Some(position) => {
                table.draft_mut(position).roles.insert(Role::PubSub);
                marked += 1;
            }
            None => debug!("Endpoint {} has no declaring node", method),
        }
    }

    marked
}

/// The declaring class's node, else the top-level type's node.
fn owner_node<I>(index: &I, table: &NodeTable, method: EntityId) -> Option<usize>
where
    I: SymbolIndex + ?Sized,
{
    let declaring = index.entity(method).and_then(|m| m.container);
    [declaring, index.top_level_type(method)]
        .into_iter()
        .flatten()
        .filter_map(|ty| index.entity(ty))
        .find_map(|owner| table.index_of(&owner.qualified_name))
}

fn has_input_channel<I>(index: &I, config: &ScanConfig, method: EntityId, marker: EntityId) -> bool
where
    I: SymbolIndex + ?Sized,
{
    index
        .annotations(method)
        .iter()
        .filter(|usage| index.resolve_annotation_type(usage) == Some(marker))
        .filter_map(|usage| usage.attribute(&config.input_channel_attribute))
        .any(|channel| !channel.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Origin;
    use codeflow_core::MemoryIndex;
    use serde_json::json;

    const ACTIVATOR: &str = "org.springframework.integration.annotation.ServiceActivator";

    fn setup(types: Vec<serde_json::Value>, nodes: &[&str]) -> (MemoryIndex, NodeTable) {
        let index =
            MemoryIndex::from_snapshot(serde_json::from_value(json!({ "types": types })).unwrap())
                .unwrap();
        let mut table = NodeTable::new();
        for key in nodes {
            let entity = index.entity(index.resolve_type(key).unwrap()).unwrap();
            let position = table.upsert(entity);
            table.draft_mut(position).origins.insert(Origin::Annotated);
        }
        (index, table)
    }

    fn handler(name: &str, channel: Option<&str>) -> serde_json::Value {
        let attributes = match channel {
            Some(channel) => json!({ "inputChannel": channel }),
            None => json!({}),
        };
        json!({ "name": name, "annotations": [{ "type": ACTIVATOR, "attributes": attributes }] })
    }

    #[test]
    fn test_bound_handler_flags_owner() {
        let types = vec![
            json!({ "name": ACTIVATOR, "kind": "annotation", "library": true }),
            json!({ "name": "app.Listener", "methods": [handler("onOrder", Some("orders"))] }),
        ];
        let (index, mut table) = setup(types, &["app.Listener"]);

        assert_eq!(mark_entry_points(&index, &ScanConfig::default(), &mut table), 1);
        let listener = table.draft(table.index_of("app.Listener").unwrap());
        assert!(listener.has_role(Role::PubSub));
    }

    #[test]
    fn test_unbound_or_blank_channel_ignored() {
        let types = vec![
            json!({ "name": ACTIVATOR, "kind": "annotation", "library": true }),
            json!({ "name": "app.Listener",
                    "methods": [handler("noChannel", None), handler("blank", Some("  "))] }),
        ];
        let (index, mut table) = setup(types, &["app.Listener"]);

        assert_eq!(mark_entry_points(&index, &ScanConfig::default(), &mut table), 0);
        let listener = table.draft(table.index_of("app.Listener").unwrap());
        assert!(!listener.has_role(Role::PubSub));
    }

    #[test]
    fn test_nested_declaring_class_resolves_to_top_level() {
        let types = vec![
            json!({ "name": ACTIVATOR, "kind": "annotation", "library": true }),
            json!({ "name": "app.Outer" }),
            json!({ "name": "app.Outer.Inner", "declared_in": "app.Outer",
                    "methods": [handler("onEvent", Some("events"))] }),
        ];
        let (index, mut table) = setup(types, &["app.Outer"]);

        assert_eq!(mark_entry_points(&index, &ScanConfig::default(), &mut table), 1);
        assert!(table
            .draft(table.index_of("app.Outer").unwrap())
            .has_role(Role::PubSub));
    }

    #[test]
    fn test_nested_component_flagged_when_outer_is_not_a_node() {
        let types = vec![
            json!({ "name": ACTIVATOR, "kind": "annotation", "library": true }),
            json!({ "name": "app.Wiring" }),
            json!({ "name": "app.Wiring.Listener", "declared_in": "app.Wiring",
                    "methods": [handler("onOrder", Some("orders"))] }),
        ];
        let (index, mut table) = setup(types, &["app.Wiring.Listener"]);

        assert_eq!(mark_entry_points(&index, &ScanConfig::default(), &mut table), 1);
        assert!(table
            .draft(table.index_of("app.Wiring.Listener").unwrap())
            .has_role(Role::PubSub));
        assert!(table.index_of("app.Wiring").is_none());
    }

    #[test]
    fn test_never_creates_nodes() {
        let types = vec![
            json!({ "name": ACTIVATOR, "kind": "annotation", "library": true }),
            json!({ "name": "app.Listener", "methods": [handler("onOrder", Some("orders"))] }),
        ];
        let (index, mut table) = setup(types, &[]);

        assert_eq!(mark_entry_points(&index, &ScanConfig::default(), &mut table), 0);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_missing_marker_is_noop() {
        let (index, mut table) = setup(vec![json!({ "name": "app.Listener" })], &["app.Listener"]);
        assert_eq!(mark_entry_points(&index, &ScanConfig::default(), &mut table), 0);
    }
}
