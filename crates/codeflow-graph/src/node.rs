//! Nodes and the per-build node table.
//!
//! During a build each node lives as a [`NodeDraft`], an accumulator that
//! every pass may add origins, roles and links to. Adding is idempotent
//! and order-free, so the passes commute. [`NodeTable::freeze`] turns the
//! drafts into an immutable [`ArchGraph`].

use crate::edge::{Edge, EdgeKind};
use crate::graph::{ArchGraph, NodeId};
use crate::role::{Role, RoleSet};
use codeflow_core::{Entity, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// How a node entered the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Carries a marker annotation.
    Annotated,
    /// Returned by a factory method.
    Factory,
    /// Supertype of a collected entity.
    Autowired,
    /// Placeholder: only seen referencing a collected entity.
    Referencer,
}

impl Origin {
    /// True for the collection origins; false for placeholders.
    pub fn is_classified(self) -> bool {
        !matches!(self, Self::Referencer)
    }
}

/// A finished architecture node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchNode {
    /// Unique key: the fully qualified name.
    pub key: String,

    /// Simple name, used for labels.
    pub name: String,

    pub file: String,

    /// Handle back into the symbol index.
    pub entity: EntityId,

    /// Discovered by marker, factory or autowiring search.
    pub is_component: bool,

    pub roles: RoleSet,

    pub origins: BTreeSet<Origin>,
}

impl ArchNode {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Display label: `<Name>` for interfaces, `Name` for components and
    /// `[Name]` for any other class.
    pub fn label(&self) -> String {
        if self.has_role(Role::Interface) {
            format!("<{}>", self.name)
        } else if self.is_component {
            self.name.clone()
        } else {
            format!("[{}]", self.name)
        }
    }
}

/// Mutable accumulator for one node during a build.
#[derive(Debug, Clone)]
pub(crate) struct NodeDraft {
    pub(crate) entity: EntityId,
    pub(crate) key: String,
    pub(crate) name: String,
    pub(crate) file: String,
    pub(crate) origins: BTreeSet<Origin>,
    pub(crate) roles: RoleSet,
    /// Table indices of referencing nodes, duplicate-free.
    pub(crate) referenced_from: Vec<usize>,
    /// Table indices of direct supertypes, in discovery order.
    pub(crate) inherits_from: Vec<usize>,
}

impl NodeDraft {
    fn new(entity: &Entity) -> Self {
        Self {
            entity: entity.id,
            key: entity.qualified_name.clone(),
            name: entity.name.clone(),
            file: entity.file.clone(),
            origins: BTreeSet::new(),
            roles: RoleSet::new(),
            referenced_from: Vec::new(),
            inherits_from: Vec::new(),
        }
    }

    pub(crate) fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub(crate) fn is_component(&self) -> bool {
        self.origins.iter().any(|origin| origin.is_classified())
    }

    /// Records a referencing node. Returns false if it was already known.
    pub(crate) fn add_referencer(&mut self, index: usize) -> bool {
        if self.referenced_from.contains(&index) {
            return false;
        }
        self.referenced_from.push(index);
        true
    }

    /// Records a direct supertype. Returns false if it was already known.
    pub(crate) fn add_supertype(&mut self, index: usize) -> bool {
        if self.inherits_from.contains(&index) {
            return false;
        }
        self.inherits_from.push(index);
        true
    }

    /// Roles after applying test precedence.
    fn settled_roles(&self) -> RoleSet {
        if self.has_role(Role::Test) {
            RoleSet::from([Role::Test])
        } else {
            self.roles.clone()
        }
    }

    fn to_node(&self) -> ArchNode {
        ArchNode {
            key: self.key.clone(),
            name: self.name.clone(),
            file: self.file.clone(),
            entity: self.entity,
            is_component: self.is_component(),
            roles: self.settled_roles(),
            origins: self.origins.clone(),
        }
    }
}

/// Node table keyed by qualified name.
#[derive(Debug, Default)]
pub(crate) struct NodeTable {
    drafts: Vec<NodeDraft>,
    by_key: HashMap<String, usize>,
}

impl NodeTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Returns the draft for `entity`, creating it if needed.
    pub(crate) fn upsert(&mut self, entity: &Entity) -> usize {
        if let Some(&index) = self.by_key.get(&entity.qualified_name) {
            if self.drafts[index].entity != entity.id {
                warn!(
                    "Merging {} into existing node with the same key",
                    entity.qualified_name
                );
            }
            return index;
        }

        let index = self.drafts.len();
        self.drafts.push(NodeDraft::new(entity));
        self.by_key.insert(entity.qualified_name.clone(), index);
        index
    }

    pub(crate) fn index_of(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub(crate) fn draft(&self, index: usize) -> &NodeDraft {
        &self.drafts[index]
    }

    pub(crate) fn draft_mut(&mut self, index: usize) -> &mut NodeDraft {
        &mut self.drafts[index]
    }

    /// Freezes the drafts into an immutable graph.
    ///
    /// Each `referenced_from` entry becomes a `References` edge from the
    /// referencer, each `inherits_from` entry an `Inherits` edge to the
    /// supertype.
    pub(crate) fn freeze(self) -> ArchGraph {
        let mut graph = ArchGraph::new();

        let ids: Vec<NodeId> = self
            .drafts
            .iter()
            .map(|draft| graph.add_node(draft.to_node()))
            .collect();

        for (index, draft) in self.drafts.iter().enumerate() {
            for &referencer in &draft.referenced_from {
                graph.add_edge(ids[referencer], ids[index], Edge::new(EdgeKind::References));
            }
            for &supertype in &draft.inherits_from {
                graph.add_edge(ids[index], ids[supertype], Edge::new(EdgeKind::Inherits));
            }
        }

        graph
    }
}
