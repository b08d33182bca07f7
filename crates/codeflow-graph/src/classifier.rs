//! Role classification.
//!
//! Each candidate gets roles from three sources that are simply unioned:
//! its own annotations (by name suffix), its kind and origin, and two
//! searches of the index for repository subtypes and messaging
//! users. A candidate whose name looks like a test gets the test role and
//! nothing else.

use crate::collector::Candidates;
use crate::config::ScanConfig;
use crate::node::Origin;
use crate::role::{Role, RoleSet};
use codeflow_core::{EntityId, EntityKind, SymbolIndex};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Roles assigned to each candidate, by key.
#[derive(Debug, Default)]
pub struct Classification {
    roles: HashMap<String, RoleSet>,
}

impl Classification {
    /// Roles of a candidate; empty for unknown keys.
    pub fn roles(&self, key: &str) -> RoleSet {
        self.roles.get(key).cloned().unwrap_or_default()
    }

    pub fn has_role(&self, key: &str, role: Role) -> bool {
        self.roles.get(key).is_some_and(|roles| roles.contains(&role))
    }

    fn add(&mut self, key: &str, role: Role) {
        self.roles.entry(key.to_string()).or_default().insert(role);
    }
}

/// Classifies every candidate.
pub fn classify<I>(index: &I, config: &ScanConfig, candidates: &Candidates) -> Classification
where
    I: SymbolIndex + ?Sized,
{
    let mut classification = Classification::default();
    let mut eligible = Vec::new();

    for candidate in candidates.iter() {
        let Some(entity) = index.entity(candidate.entity) else {
            continue;
        };
        classification.roles.entry(candidate.key.clone()).or_default();

        if config.is_test_name(&entity.name) {
            debug!("{} classified as test by name", candidate.key);
            classification.add(&candidate.key, Role::Test);
            continue;
        }

        if entity.kind == EntityKind::Interface {
            classification.add(&candidate.key, Role::Interface);
        }
        if candidate.origins.contains(&Origin::Autowired) {
            classification.add(&candidate.key, Role::InterfaceImpl);
        }
        for role in annotation_roles(index, config, candidate.entity) {
            classification.add(&candidate.key, role);
        }

        eligible.push((candidate.entity, candidate.key.as_str()));
    }

    let repositories = find_repositories(index, config);
    let publishers = find_publishers(index, config);
    let publisher_role = if config.publishers_as_repositories {
        Role::Repository
    } else {
        Role::PubSub
    };

    for (entity, key) in eligible {
        if repositories.contains(&entity) {
            classification.add(key, Role::Repository);
        }
        if enclosing_types(index, entity).any(|ty| publishers.contains(&ty)) {
            classification.add(key, publisher_role);
        }
    }

    classification
}

/// The entity followed by each type it is nested in, innermost first.
///
/// Reference sites name the outermost type, so a nested class is matched
/// through its enclosing types.
fn enclosing_types<I>(index: &I, entity: EntityId) -> impl Iterator<Item = EntityId> + '_
where
    I: SymbolIndex + ?Sized,
{
    std::iter::successors(Some(entity), move |&current| {
        index.entity(current).and_then(|e| e.container)
    })
    .take_while(move |&ty| index.kind(ty).is_some_and(EntityKind::is_type))
}

/// Roles implied by the suffixes of an entity's annotation names.
pub fn annotation_roles<I>(index: &I, config: &ScanConfig, entity: EntityId) -> RoleSet
where
    I: SymbolIndex + ?Sized,
{
    let mut roles = RoleSet::new();

    for usage in index.annotations(entity) {
        let Some(name) = index
            .resolve_annotation_type(&usage)
            .and_then(|ty| index.entity(ty))
            .map(|annotation| annotation.name.as_str())
        else {
            continue;
        };

        if name.ends_with(config.controller_suffix.as_str()) {
            roles.insert(Role::Controller);
        }
        if name.ends_with(config.config_suffix.as_str()) {
            roles.insert(Role::Config);
        }
        if name.ends_with(config.repository_suffix.as_str()) {
            roles.insert(Role::Repository);
        }
    }

    roles
}

/// Every subtype of the repository marker interface.
fn find_repositories<I>(index: &I, config: &ScanConfig) -> HashSet<EntityId>
where
    I: SymbolIndex + ?Sized,
{
    match index.resolve_type(&config.repository_interface) {
        Some(marker) => index.find_subtypes(marker, true).into_iter().collect(),
        None => {
            debug!("Repository interface {} not in index", config.repository_interface);
            HashSet::new()
        }
    }
}

/// Every type that calls a publish operation or uses a message channel.
fn find_publishers<I>(index: &I, config: &ScanConfig) -> HashSet<EntityId>
where
    I: SymbolIndex + ?Sized,
{
    let mut targets = Vec::new();

    if let Some(operations) = index.resolve_type(&config.publish_operations) {
        for method in index.methods(operations) {
            targets.push(method);
            targets.extend(index.find_overriding_methods(method));
        }
    }
    if let Some(channel) = index.resolve_type(&config.message_channel) {
        targets.push(channel);
    }

    targets
        .into_iter()
        .flat_map(|target| index.find_referencing_sites(target))
        .filter_map(|site| site.enclosing_type)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::collect_entities;
    use crate::markers::resolve_marker_closure;
    use codeflow_core::MemoryIndex;
    use serde_json::json;

    fn classify_snapshot(types: Vec<serde_json::Value>, config: &ScanConfig) -> Classification {
        let index =
            MemoryIndex::from_snapshot(serde_json::from_value(json!({ "types": types })).unwrap())
                .unwrap();
        let markers = resolve_marker_closure(&index, &config.root_marker);
        let candidates = collect_entities(&index, config, &markers);
        classify(&index, config, &candidates)
    }

    fn framework() -> Vec<serde_json::Value> {
        vec![
            json!({ "name": "org.springframework.stereotype.Component", "kind": "annotation" }),
            json!({ "name": "org.springframework.web.bind.annotation.RestController", "kind": "annotation",
                    "annotations": ["org.springframework.stereotype.Component"] }),
            json!({ "name": "org.springframework.stereotype.Repository", "kind": "annotation",
                    "annotations": ["org.springframework.stereotype.Component"] }),
            json!({ "name": "org.springframework.context.annotation.Configuration", "kind": "annotation",
                    "annotations": ["org.springframework.stereotype.Component"] }),
            json!({ "name": "org.springframework.data.repository.Repository", "kind": "interface" }),
            json!({ "name": "org.springframework.data.repository.CrudRepository", "kind": "interface",
                    "supertypes": ["org.springframework.data.repository.Repository"] }),
            json!({ "name": "com.google.cloud.spring.pubsub.core.PubSubOperations", "kind": "interface",
                    "methods": [{ "name": "publish" }] }),
            json!({ "name": "com.google.cloud.spring.pubsub.core.PubSubTemplate",
                    "supertypes": ["com.google.cloud.spring.pubsub.core.PubSubOperations"],
                    "methods": [{ "name": "publish",
                                  "overrides": ["com.google.cloud.spring.pubsub.core.PubSubOperations#publish"] }] }),
            json!({ "name": "org.springframework.messaging.MessageChannel", "kind": "interface" }),
        ]
    }

    #[test]
    fn test_annotation_suffix_roles_are_additive() {
        let mut types = framework();
        types.push(json!({
            "name": "app.Hybrid",
            "annotations": [
                "org.springframework.web.bind.annotation.RestController",
                "org.springframework.stereotype.Repository"
            ]
        }));
        let classification = classify_snapshot(types, &ScanConfig::default());
        assert_eq!(
            classification.roles("app.Hybrid"),
            RoleSet::from([Role::Controller, Role::Repository])
        );
    }

    #[test]
    fn test_test_name_short_circuits() {
        let mut types = framework();
        types.push(json!({
            "name": "app.HybridTest",
            "annotations": [
                "org.springframework.web.bind.annotation.RestController",
                "org.springframework.context.annotation.Configuration"
            ],
            "supertypes": ["org.springframework.data.repository.CrudRepository"]
        }));
        let classification = classify_snapshot(types, &ScanConfig::default());
        assert_eq!(
            classification.roles("app.HybridTest"),
            RoleSet::from([Role::Test])
        );
    }

    #[test]
    fn test_repository_search_uses_transitive_subtypes() {
        let mut types = framework();
        types.push(json!({
            "name": "app.OrderStore", "kind": "interface",
            "annotations": ["org.springframework.stereotype.Component"],
            "supertypes": ["org.springframework.data.repository.CrudRepository"]
        }));
        let classification = classify_snapshot(types, &ScanConfig::default());
        assert_eq!(
            classification.roles("app.OrderStore"),
            RoleSet::from([Role::Interface, Role::Repository])
        );
    }

    #[test]
    fn test_publisher_detection() {
        let mut types = framework();
        types.push(json!({
            "name": "app.Notifier",
            "annotations": ["org.springframework.stereotype.Component"],
            "references": ["com.google.cloud.spring.pubsub.core.PubSubTemplate#publish"]
        }));
        types.push(json!({
            "name": "app.Router",
            "annotations": ["org.springframework.stereotype.Component"],
            "references": ["org.springframework.messaging.MessageChannel"]
        }));
        types.push(json!({
            "name": "app.Plain",
            "annotations": ["org.springframework.stereotype.Component"]
        }));

        let classification = classify_snapshot(types.clone(), &ScanConfig::default());
        assert!(classification.has_role("app.Notifier", Role::PubSub));
        assert!(classification.has_role("app.Router", Role::PubSub));
        assert!(classification.roles("app.Plain").is_empty());

        let compat = ScanConfig {
            publishers_as_repositories: true,
            ..ScanConfig::default()
        };
        let classification = classify_snapshot(types, &compat);
        assert!(classification.has_role("app.Notifier", Role::Repository));
        assert!(!classification.has_role("app.Notifier", Role::PubSub));
    }

    #[test]
    fn test_nested_publisher_matched_through_outer_type() {
        let mut types = framework();
        types.push(json!({ "name": "app.Wiring" }));
        types.push(json!({
            "name": "app.Wiring.Sender",
            "declared_in": "app.Wiring",
            "annotations": ["org.springframework.stereotype.Component"],
            "references": ["org.springframework.messaging.MessageChannel"]
        }));
        let classification = classify_snapshot(types, &ScanConfig::default());
        assert!(classification.has_role("app.Wiring.Sender", Role::PubSub));
        assert!(classification.roles("app.Wiring").is_empty());
    }

    #[test]
    fn test_autowired_interface_roles() {
        let mut types = framework();
        types.push(json!({ "name": "app.PaymentGateway", "kind": "interface" }));
        types.push(json!({
            "name": "app.StripeGateway",
            "annotations": ["org.springframework.stereotype.Component"],
            "supertypes": ["app.PaymentGateway"]
        }));
        let classification = classify_snapshot(types, &ScanConfig::default());
        assert_eq!(
            classification.roles("app.PaymentGateway"),
            RoleSet::from([Role::InterfaceImpl, Role::Interface])
        );
        assert!(classification.roles("app.StripeGateway").is_empty());
    }
}
