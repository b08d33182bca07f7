//! Marker closure.
//!
//! A class is a component when it carries the root marker or any
//! annotation that is itself (transitively) annotated with it, the way
//! `@Service` and `@RestController` are meta-annotated with `@Component`.

use codeflow_core::{EntityId, EntityKind, SymbolIndex};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Returns the root marker and every annotation type reachable from it by
/// repeated annotation search.
///
/// The root comes first; every other marker appears after the marker it
/// was discovered through. An unknown root yields an empty list.
pub fn resolve_marker_closure<I>(index: &I, root_marker: &str) -> Vec<EntityId>
where
    I: SymbolIndex + ?Sized,
{
    let Some(root) = index.resolve_type(root_marker) else {
        debug!("Root marker {} not in index", root_marker);
        return Vec::new();
    };

    let mut markers = Vec::new();
    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        markers.push(current);

        for annotated in index.find_annotated_entities(current) {
            if index.kind(annotated) != Some(EntityKind::Annotation) {
                continue;
            }
            if visited.insert(annotated) {
                queue.push_back(annotated);
            }
        }
    }

    debug!("Resolved {} markers from {}", markers.len(), root_marker);
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeflow_core::MemoryIndex;
    use serde_json::json;

    fn index_from(value: serde_json::Value) -> MemoryIndex {
        MemoryIndex::from_snapshot(serde_json::from_value(value).unwrap()).unwrap()
    }

    fn names(index: &MemoryIndex, ids: &[EntityId]) -> Vec<String> {
        ids.iter()
            .map(|id| index.entity(*id).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn test_transitive_closure() {
        let index = index_from(json!({
            "types": [
                { "name": "s.Component", "kind": "annotation" },
                { "name": "s.Service", "kind": "annotation", "annotations": ["s.Component"] },
                { "name": "s.Controller", "kind": "annotation", "annotations": ["s.Component"] },
                { "name": "s.RestController", "kind": "annotation", "annotations": ["s.Controller"] },
                { "name": "app.Orders", "annotations": ["s.Service"] }
            ]
        }));

        let markers = resolve_marker_closure(&index, "s.Component");
        assert_eq!(
            names(&index, &markers),
            vec!["Component", "Service", "Controller", "RestController"]
        );
    }

    #[test]
    fn test_missing_root_is_empty() {
        let index = index_from(json!({ "types": [{ "name": "app.Orders" }] }));
        assert!(resolve_marker_closure(&index, "s.Component").is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let index = index_from(json!({
            "types": [
                { "name": "s.A", "kind": "annotation", "annotations": ["s.B"] },
                { "name": "s.B", "kind": "annotation", "annotations": ["s.A"] }
            ]
        }));

        let markers = resolve_marker_closure(&index, "s.A");
        assert_eq!(names(&index, &markers), vec!["A", "B"]);
    }

    #[test]
    fn test_works_through_trait_object() {
        let index = index_from(json!({
            "types": [{ "name": "s.Component", "kind": "annotation" }]
        }));
        let dynamic: &dyn SymbolIndex = &index;
        assert_eq!(resolve_marker_closure(dynamic, "s.Component").len(), 1);
    }
}
