//! Core graph data structure.
//!
//! The ArchGraph wraps petgraph and adds an index for key lookups.
//! It is the frozen result of a build: nodes and edges are only added by
//! the builder and never change afterwards.

use crate::edge::{Edge, EdgeKind};
use crate::node::ArchNode;
use crate::role::Role;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// The architecture graph.
///
/// Cycles are allowed. Between any ordered pair of nodes there is at most
/// one edge of each kind.
#[derive(Debug, Default)]
pub struct ArchGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<ArchNode, Edge>,

    /// Maps node keys to graph node indexes.
    key_index: HashMap<String, NodeId>,
}

impl ArchGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its index.
    pub(crate) fn add_node(&mut self, node: ArchNode) -> NodeId {
        let key = node.key.clone();
        let index = self.graph.add_node(node);
        self.key_index.insert(key, index);
        index
    }

    /// Adds an edge unless one of the same kind already joins the pair.
    pub(crate) fn add_edge(&mut self, from: NodeId, to: NodeId, edge: Edge) -> bool {
        if self.has_edge(from, to, edge.kind) {
            return false;
        }
        self.graph.add_edge(from, to, edge);
        true
    }

    /// True if an edge of `kind` runs from `from` to `to`.
    pub fn has_edge(&self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .any(|edge_ref| edge_ref.target() == to && edge_ref.weight().kind == kind)
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&ArchNode> {
        self.graph.node_weight(index)
    }

    /// Gets a node by its key.
    pub fn get_by_key(&self, key: &str) -> Option<&ArchNode> {
        let index = self.key_index.get(key)?;
        self.graph.node_weight(*index)
    }

    /// Gets the node index for a key.
    pub fn get_index(&self, key: &str) -> Option<NodeId> {
        self.key_index.get(key).copied()
    }

    /// Nodes that reference `index`, in discovery order.
    pub fn referenced_from(&self, index: NodeId) -> Vec<NodeId> {
        self.neighbors(index, Direction::Incoming, EdgeKind::References)
    }

    /// Direct supertypes of `index` that are nodes, in declaration order.
    pub fn inherits_from(&self, index: NodeId) -> Vec<NodeId> {
        self.neighbors(index, Direction::Outgoing, EdgeKind::Inherits)
    }

    fn neighbors(&self, index: NodeId, direction: Direction, kind: EdgeKind) -> Vec<NodeId> {
        // petgraph walks adjacency newest-first; sort by edge index to
        // restore insertion order.
        let mut found: Vec<_> = self
            .graph
            .edges_directed(index, direction)
            .filter(|edge_ref| edge_ref.weight().kind == kind)
            .map(|edge_ref| {
                let other = match direction {
                    Direction::Incoming => edge_ref.source(),
                    Direction::Outgoing => edge_ref.target(),
                };
                (edge_ref.id(), other)
            })
            .collect();
        found.sort_by_key(|(edge, _)| *edge);
        found.into_iter().map(|(_, node)| node).collect()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges of both kinds.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &ArchNode> {
        self.graph.node_weights()
    }

    /// Iterates over all node indexes.
    pub fn node_indexes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }
}

/// Graph statistics for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub components: usize,
    pub placeholders: usize,
    pub roles: BTreeMap<Role, usize>,
}

impl ArchGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut roles = BTreeMap::new();
        for role in self.nodes().flat_map(|node| node.roles.iter()) {
            *roles.entry(*role).or_insert(0) += 1;
        }

        let components = self.nodes().filter(|node| node.is_component).count();

        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            components,
            placeholders: self.node_count() - components,
            roles,
        }
    }
}
