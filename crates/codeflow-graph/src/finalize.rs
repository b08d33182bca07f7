//! Graph finalization.
//!
//! Turns the frozen [`ArchGraph`] into the flat node and edge lists a
//! renderer consumes: hidden roles are elided, styles derived from roles,
//! and everything sorted by key.

use crate::config::ScanConfig;
use crate::edge::EdgeKind;
use crate::graph::{ArchGraph, NodeId};
use crate::node::ArchNode;
use crate::role::Role;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Style class attached to rendered nodes and edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StyleClass {
    /// Controllers and messaging participants.
    #[serde(rename = "highlightA")]
    HighlightA,
    /// Repositories.
    #[serde(rename = "highlightB")]
    HighlightB,
    /// Tests and configuration, when shown at all.
    #[serde(rename = "muted")]
    Muted,
    /// The edge also follows an extends/implements relation.
    #[serde(rename = "inheritance")]
    Inheritance,
}

impl StyleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighlightA => "highlightA",
            Self::HighlightB => "highlightB",
            Self::Muted => "muted",
            Self::Inheritance => "inheritance",
        }
    }
}

impl fmt::Display for StyleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualNode {
    pub key: String,
    pub label: String,
    pub classes: Vec<StyleClass>,
}

/// A directed edge ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualEdge {
    pub source: String,
    pub target: String,
    pub classes: Vec<StyleClass>,
    pub directed: bool,
}

/// The renderer's input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedGraph {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
}

impl RenderedGraph {
    pub fn node(&self, key: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|node| node.key == key)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&VisualEdge> {
        self.edges
            .iter()
            .find(|edge| edge.source == source && edge.target == target)
    }
}

/// Produces the sorted, styled node and edge lists for `graph`.
pub fn finalize(graph: &ArchGraph, config: &ScanConfig) -> RenderedGraph {
    let visible: HashSet<NodeId> = graph
        .node_indexes()
        .filter(|&id| graph.get(id).is_some_and(|node| is_visible(node, config)))
        .collect();

    let mut nodes: Vec<VisualNode> = visible
        .iter()
        .filter_map(|&id| graph.get(id))
        .map(|node| VisualNode {
            key: node.key.clone(),
            label: node.label(),
            classes: node_style(node).into_iter().collect(),
        })
        .collect();
    nodes.sort_by(|a, b| a.key.cmp(&b.key));

    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for &target in &visible {
        let Some(target_node) = graph.get(target) else {
            continue;
        };
        for source in graph.referenced_from(target) {
            if !visible.contains(&source) || !seen.insert((source, target)) {
                continue;
            }
            let Some(source_node) = graph.get(source) else {
                continue;
            };

            let mut classes = edge_style(source_node, target_node);
            if graph.has_edge(source, target, EdgeKind::Inherits) {
                classes.insert(StyleClass::Inheritance);
            }

            edges.push(VisualEdge {
                source: source_node.key.clone(),
                target: target_node.key.clone(),
                classes: classes.into_iter().collect(),
                directed: true,
            });
        }
    }

    // Inheritance without a recorded reference still yields an edge.
    for &source in &visible {
        let Some(source_node) = graph.get(source) else {
            continue;
        };
        for target in graph.inherits_from(source) {
            if !visible.contains(&target) || !seen.insert((source, target)) {
                continue;
            }
            let Some(target_node) = graph.get(target) else {
                continue;
            };

            let mut classes = edge_style(source_node, target_node);
            classes.insert(StyleClass::Inheritance);

            edges.push(VisualEdge {
                source: source_node.key.clone(),
                target: target_node.key.clone(),
                classes: classes.into_iter().collect(),
                directed: true,
            });
        }
    }
    edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

    RenderedGraph { nodes, edges }
}

fn is_visible(node: &ArchNode, config: &ScanConfig) -> bool {
    if node.has_role(Role::Test) && !config.show_tests {
        return false;
    }
    if node.has_role(Role::Config) && !config.show_config {
        return false;
    }
    true
}

/// Single style class for a node, by precedence.
fn node_style(node: &ArchNode) -> Option<StyleClass> {
    if node.has_role(Role::PubSub) || node.has_role(Role::Controller) {
        Some(StyleClass::HighlightA)
    } else if node.has_role(Role::Repository) {
        Some(StyleClass::HighlightB)
    } else if node.has_role(Role::Test) || node.has_role(Role::Config) {
        Some(StyleClass::Muted)
    } else {
        None
    }
}

/// Classes contributed by either endpoint; they accumulate.
fn edge_style(source: &ArchNode, target: &ArchNode) -> BTreeSet<StyleClass> {
    let mut classes = BTreeSet::new();
    for node in [source, target] {
        if node.has_role(Role::PubSub) || node.has_role(Role::Controller) {
            classes.insert(StyleClass::HighlightA);
        }
        if node.has_role(Role::Repository) {
            classes.insert(StyleClass::HighlightB);
        }
        if node.has_role(Role::Test) || node.has_role(Role::Config) {
            classes.insert(StyleClass::Muted);
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeTable, Origin};
    use codeflow_core::{Entity, EntityId, EntityKind};

    struct Fixture {
        table: NodeTable,
        next: usize,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                table: NodeTable::new(),
                next: 0,
            }
        }

        fn node(&mut self, key: &str, component: bool, roles: &[Role]) -> usize {
            let entity = Entity {
                id: EntityId::new(self.next),
                kind: EntityKind::Class,
                name: key.rsplit('.').next().unwrap().to_string(),
                qualified_name: key.to_string(),
                file: String::new(),
                container: None,
                library: false,
            };
            self.next += 1;
            let position = self.table.upsert(&entity);
            let draft = self.table.draft_mut(position);
            draft.origins.insert(if component {
                Origin::Annotated
            } else {
                Origin::Referencer
            });
            draft.roles.extend(roles.iter().copied());
            position
        }

        fn reference(&mut self, from: usize, to: usize) {
            self.table.draft_mut(to).add_referencer(from);
        }

        fn inherit(&mut self, child: usize, parent: usize) {
            self.table.draft_mut(child).add_supertype(parent);
        }

        fn finalize(self, config: &ScanConfig) -> RenderedGraph {
            finalize(&self.table.freeze(), config)
        }
    }

    #[test]
    fn test_controller_to_repository_edge() {
        let mut fixture = Fixture::new();
        let controller = fixture.node("app.PaymentController", true, &[Role::Controller]);
        let repository = fixture.node("app.PaymentRepository", true, &[Role::Repository]);
        fixture.reference(controller, repository);

        let rendered = fixture.finalize(&ScanConfig::default());
        assert_eq!(rendered.nodes.len(), 2);
        assert_eq!(
            rendered.node("app.PaymentController").unwrap().classes,
            vec![StyleClass::HighlightA]
        );
        assert_eq!(
            rendered.node("app.PaymentRepository").unwrap().classes,
            vec![StyleClass::HighlightB]
        );

        let edge = rendered
            .edge("app.PaymentController", "app.PaymentRepository")
            .unwrap();
        assert_eq!(edge.classes, vec![StyleClass::HighlightA, StyleClass::HighlightB]);
        assert!(edge.directed);
    }

    #[test]
    fn test_tests_and_config_elided() {
        let mut fixture = Fixture::new();
        let service = fixture.node("app.OrderService", true, &[]);
        let test = fixture.node("app.OrderServiceTest", false, &[Role::Test]);
        let config = fixture.node("app.AppConfig", true, &[Role::Config]);
        fixture.reference(test, service);
        fixture.reference(config, service);

        let rendered = fixture.finalize(&ScanConfig::default());
        let keys: Vec<&str> = rendered.nodes.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["app.OrderService"]);
        assert!(rendered.edges.is_empty());
    }

    #[test]
    fn test_shown_tests_are_muted() {
        let mut fixture = Fixture::new();
        let service = fixture.node("app.OrderService", true, &[]);
        let test = fixture.node("app.OrderServiceTest", false, &[Role::Test]);
        fixture.reference(test, service);

        let config = ScanConfig {
            show_tests: true,
            ..ScanConfig::default()
        };
        let rendered = fixture.finalize(&config);
        assert_eq!(
            rendered.node("app.OrderServiceTest").unwrap().classes,
            vec![StyleClass::Muted]
        );
        assert_eq!(
            rendered.edge("app.OrderServiceTest", "app.OrderService").unwrap().classes,
            vec![StyleClass::Muted]
        );
    }

    #[test]
    fn test_inheritance_class_and_labels() {
        let mut fixture = Fixture::new();
        let gateway = fixture.node(
            "app.PaymentGateway",
            true,
            &[Role::Interface, Role::InterfaceImpl],
        );
        let stripe = fixture.node("app.StripeGateway", true, &[]);
        let helper = fixture.node("app.Helper", false, &[]);
        fixture.reference(stripe, gateway);
        fixture.inherit(stripe, gateway);
        fixture.reference(helper, stripe);

        let rendered = fixture.finalize(&ScanConfig::default());
        assert_eq!(rendered.node("app.PaymentGateway").unwrap().label, "<PaymentGateway>");
        assert_eq!(rendered.node("app.StripeGateway").unwrap().label, "StripeGateway");
        assert_eq!(rendered.node("app.Helper").unwrap().label, "[Helper]");

        assert_eq!(
            rendered.edge("app.StripeGateway", "app.PaymentGateway").unwrap().classes,
            vec![StyleClass::Inheritance]
        );
        assert!(rendered.edge("app.Helper", "app.StripeGateway").unwrap().classes.is_empty());
    }

    #[test]
    fn test_inheritance_without_reference_still_emitted() {
        let mut fixture = Fixture::new();
        let base = fixture.node("app.Base", true, &[Role::Repository]);
        let stub = fixture.node("app.StubClock", true, &[]);
        fixture.inherit(stub, base);

        let rendered = fixture.finalize(&ScanConfig::default());
        assert_eq!(rendered.edges.len(), 1);
        assert_eq!(
            rendered.edge("app.StubClock", "app.Base").unwrap().classes,
            vec![StyleClass::HighlightB, StyleClass::Inheritance]
        );
    }

    #[test]
    fn test_test_target_and_its_edges_elided() {
        let mut fixture = Fixture::new();
        let api = fixture.node("app.Api", true, &[Role::Controller]);
        let orders_test = fixture.node("app.OrdersTest", true, &[Role::Test]);
        fixture.reference(api, orders_test);
        fixture.inherit(api, orders_test);

        let rendered = fixture.finalize(&ScanConfig::default());
        let keys: Vec<&str> = rendered.nodes.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["app.Api"]);
        assert!(rendered.edges.is_empty());
    }

    #[test]
    fn test_pubsub_outranks_repository() {
        let mut fixture = Fixture::new();
        fixture.node("app.Publisher", true, &[Role::PubSub, Role::Repository]);

        let rendered = fixture.finalize(&ScanConfig::default());
        assert_eq!(
            rendered.node("app.Publisher").unwrap().classes,
            vec![StyleClass::HighlightA]
        );
    }

    #[test]
    fn test_output_sorted_by_key() {
        let mut fixture = Fixture::new();
        let c = fixture.node("app.C", true, &[]);
        let a = fixture.node("app.A", true, &[]);
        let b = fixture.node("app.B", true, &[]);
        fixture.reference(c, a);
        fixture.reference(b, a);
        fixture.reference(a, b);

        let rendered = fixture.finalize(&ScanConfig::default());
        let keys: Vec<&str> = rendered.nodes.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["app.A", "app.B", "app.C"]);

        let pairs: Vec<(&str, &str)> = rendered
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("app.A", "app.B"), ("app.B", "app.A"), ("app.C", "app.A")]
        );
        assert!(rendered.nodes.iter().all(|n| n.classes.is_empty()));
    }
}
