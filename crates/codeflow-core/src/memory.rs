//! In-memory symbol index.
//!
//! `MemoryIndex` answers [`SymbolIndex`] queries from a JSON snapshot of a
//! codebase: one record per type with its annotations, supertypes,
//! methods and outgoing references. All inverse relations (annotated-by,
//! subtypes, overriders, referencing sites) are computed once at load time
//! so that queries are plain map lookups.

use crate::entity::{AnnotationUse, Entity, EntityId, EntityKind, ReferenceSite};
use crate::error::{IndexError, Result};
use crate::index::SymbolIndex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot format
// ─────────────────────────────────────────────────────────────────────────────

/// Serialized form of an index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSnapshot {
    #[serde(default)]
    pub types: Vec<TypeRecord>,
}

/// One type in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRecord {
    /// Fully qualified name.
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: EntityKind,

    #[serde(default)]
    pub file: String,

    /// Marks dependency types (framework annotations, library interfaces).
    #[serde(default)]
    pub library: bool,

    /// Qualified name of the enclosing type for nested types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_in: Option<String>,

    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,

    /// Superclass and implemented interfaces. Each one also counts as a
    /// reference from this type.
    #[serde(default)]
    pub supertypes: Vec<String>,

    #[serde(default)]
    pub methods: Vec<MethodRecord>,

    /// Outgoing references to types (`pkg.Type`) or methods (`pkg.Type#name`).
    #[serde(default)]
    pub references: Vec<ReferenceRecord>,
}

fn default_kind() -> EntityKind {
    EntityKind::Class
}

/// One method in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,

    /// Qualified name of the declared return type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,

    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,

    /// Methods this one overrides or implements, as `pkg.Type#name`.
    #[serde(default)]
    pub overrides: Vec<String>,
}

/// An outgoing reference, either a bare target or a target with a line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceRecord {
    Target(String),
    Located {
        target: String,
        #[serde(default)]
        line: Option<u32>,
    },
}

impl ReferenceRecord {
    pub fn target(&self) -> &str {
        match self {
            Self::Target(target) | Self::Located { target, .. } => target,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Target(_) => None,
            Self::Located { line, .. } => *line,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryIndex
// ─────────────────────────────────────────────────────────────────────────────

/// A [`SymbolIndex`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    /// Arena of all types and methods, indexed by `EntityId`.
    entities: Vec<Entity>,

    /// Qualified type name to id.
    types_by_name: HashMap<String, EntityId>,

    /// Simple type name to ids, for resolving annotations written unqualified.
    types_by_simple_name: HashMap<String, Vec<EntityId>>,

    /// `Type#method` to ids; overloads share a name.
    methods_by_name: HashMap<String, Vec<EntityId>>,

    /// Annotations per entity, parallel to `entities`.
    annotations: Vec<Vec<AnnotationUse>>,

    /// Direct supertypes per entity, parallel to `entities`.
    supertypes: Vec<Vec<EntityId>>,

    annotated: HashMap<EntityId, Vec<EntityId>>,
    subtypes: HashMap<EntityId, Vec<EntityId>>,
    methods: HashMap<EntityId, Vec<EntityId>>,
    return_types: HashMap<EntityId, EntityId>,
    overriders: HashMap<EntityId, Vec<EntityId>>,
    sites: HashMap<EntityId, Vec<ReferenceSite>>,
}

impl MemoryIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| IndexError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Parses a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: IndexSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Builds the index from a snapshot.
    ///
    /// References to types that are absent from the snapshot are dropped:
    /// they point into libraries that were not indexed. A reference to a
    /// missing method on a type that *is* present is an error, since it
    /// means the snapshot is inconsistent.
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Result<Self> {
        let mut index = Self::new();

        // Pass 1: register every type so later passes can resolve names.
        for record in &snapshot.types {
            if record.kind == EntityKind::Method {
                return Err(IndexError::MethodAsType(record.name.clone()));
            }
            if index.types_by_name.contains_key(&record.name) {
                return Err(IndexError::DuplicateType(record.name.clone()));
            }

            let simple = simple_name(&record.name).to_string();
            let id = index.push_entity(Entity {
                id: EntityId::new(0),
                kind: record.kind,
                name: simple.clone(),
                qualified_name: record.name.clone(),
                file: record.file.clone(),
                container: None,
                library: record.library,
            });
            index.types_by_name.insert(record.name.clone(), id);
            index.types_by_simple_name.entry(simple).or_default().push(id);
        }

        // Pass 2: nesting and method entities.
        let mut method_ids: Vec<Vec<EntityId>> = Vec::with_capacity(snapshot.types.len());
        for record in &snapshot.types {
            let owner = index.types_by_name[&record.name];

            if let Some(outer) = record.declared_in.as_deref() {
                if let Some(outer_id) = index.types_by_name.get(outer).copied() {
                    index.entities[owner.index()].container = Some(outer_id);
                }
            }

            let mut ids = Vec::with_capacity(record.methods.len());
            for method in &record.methods {
                let qualified = format!("{}#{}", record.name, method.name);
                let id = index.push_entity(Entity {
                    id: EntityId::new(0),
                    kind: EntityKind::Method,
                    name: method.name.clone(),
                    qualified_name: qualified.clone(),
                    file: record.file.clone(),
                    container: Some(owner),
                    library: record.library,
                });
                index.methods.entry(owner).or_default().push(id);
                index.methods_by_name.entry(qualified).or_default().push(id);
                ids.push(id);
            }
            method_ids.push(ids);
        }

        index.check_nesting()?;

        // Pass 3: relations.
        for (record, ids) in snapshot.types.iter().zip(&method_ids) {
            let owner = index.types_by_name[&record.name];
            index.annotations[owner.index()] = record.annotations.clone();

            for name in &record.supertypes {
                if let Some(supertype) = index.types_by_name.get(name).copied() {
                    index.supertypes[owner.index()].push(supertype);
                    index.subtypes.entry(supertype).or_default().push(owner);
                    index.add_site(supertype, owner, None);
                }
            }

            for (method, &id) in record.methods.iter().zip(ids) {
                index.annotations[id.index()] = method.annotations.clone();

                if let Some(returns) = method.returns.as_deref() {
                    if let Some(ty) = index.types_by_name.get(returns).copied() {
                        index.return_types.insert(id, ty);
                    }
                }

                for target in &method.overrides {
                    for overridden in index.resolve_target(target)? {
                        index.overriders.entry(overridden).or_default().push(id);
                    }
                }
            }

            for reference in &record.references {
                for target in index.resolve_target(reference.target())? {
                    index.add_site(target, owner, reference.line());
                }
            }
        }

        // Pass 4: invert annotations.
        for position in 0..index.entities.len() {
            let id = EntityId::new(position);
            let resolved: Vec<EntityId> = index.annotations[position]
                .iter()
                .filter_map(|usage| index.resolve_annotation_type(usage))
                .collect();
            for annotation in resolved {
                let targets = index.annotated.entry(annotation).or_default();
                if !targets.contains(&id) {
                    targets.push(id);
                }
            }
        }

        info!(
            "Loaded index snapshot: {} types, {} entities",
            index.types_by_name.len(),
            index.entities.len()
        );

        Ok(index)
    }

    /// Returns the number of entities (types and methods).
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the index holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the number of types.
    pub fn type_count(&self) -> usize {
        self.types_by_name.len()
    }

    /// Iterates over all entities.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    fn push_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId::new(self.entities.len());
        entity.id = id;
        self.entities.push(entity);
        self.annotations.push(Vec::new());
        self.supertypes.push(Vec::new());
        id
    }

    /// Records that `declaring_type` references `target`.
    fn add_site(&mut self, target: EntityId, declaring_type: EntityId, line: Option<u32>) {
        let file = self.entities[declaring_type.index()].file.clone();
        let site = ReferenceSite {
            enclosing_type: self.top_level_type(declaring_type),
            file,
            line,
        };
        self.sites.entry(target).or_default().push(site);
    }

    /// Resolves `pkg.Type` or `pkg.Type#method` to entity ids.
    fn resolve_target(&self, target: &str) -> Result<Vec<EntityId>> {
        let Some((owner, method)) = target.split_once('#') else {
            return Ok(self.types_by_name.get(target).copied().into_iter().collect());
        };

        if owner.is_empty() || method.is_empty() {
            return Err(IndexError::MalformedMember(target.to_string()));
        }
        if !self.types_by_name.contains_key(owner) {
            debug!("Dropping reference into unindexed type {}", owner);
            return Ok(Vec::new());
        }

        self.methods_by_name
            .get(target)
            .cloned()
            .ok_or_else(|| IndexError::UnknownMethod {
                owner: owner.to_string(),
                method: method.to_string(),
            })
    }

    fn check_nesting(&self) -> Result<()> {
        for entity in &self.entities {
            let mut seen = HashSet::new();
            let mut current = entity;
            while let Some(parent) = current.container {
                if !seen.insert(parent) {
                    return Err(IndexError::NestingCycle(entity.qualified_name.clone()));
                }
                current = &self.entities[parent.index()];
            }
        }
        Ok(())
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

impl SymbolIndex for MemoryIndex {
    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    fn resolve_type(&self, qualified_name: &str) -> Option<EntityId> {
        self.types_by_name.get(qualified_name).copied()
    }

    fn find_annotated_entities(&self, annotation: EntityId) -> Vec<EntityId> {
        self.annotated.get(&annotation).cloned().unwrap_or_default()
    }

    fn annotations(&self, entity: EntityId) -> Vec<AnnotationUse> {
        self.annotations
            .get(entity.index())
            .cloned()
            .unwrap_or_default()
    }

    fn resolve_annotation_type(&self, usage: &AnnotationUse) -> Option<EntityId> {
        let is_annotation = |id: &EntityId| self.kind(*id) == Some(EntityKind::Annotation);

        if let Some(id) = self.types_by_name.get(&usage.name).filter(|id| is_annotation(id)) {
            return Some(*id);
        }

        // Unqualified names resolve only when exactly one annotation type matches.
        if usage.name.contains('.') {
            return None;
        }
        let mut matches = self
            .types_by_simple_name
            .get(&usage.name)?
            .iter()
            .filter(|id| is_annotation(id));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Some(*id),
            _ => None,
        }
    }

    fn find_subtypes(&self, ty: EntityId, transitive: bool) -> Vec<EntityId> {
        if !transitive {
            return self.subtypes.get(&ty).cloned().unwrap_or_default();
        }

        let mut result = Vec::new();
        let mut visited = HashSet::from([ty]);
        let mut queue = VecDeque::from([ty]);

        while let Some(current) = queue.pop_front() {
            for &sub in self.subtypes.get(&current).into_iter().flatten() {
                if visited.insert(sub) {
                    result.push(sub);
                    queue.push_back(sub);
                }
            }
        }

        result
    }

    fn direct_supertypes(&self, ty: EntityId) -> Vec<EntityId> {
        self.supertypes.get(ty.index()).cloned().unwrap_or_default()
    }

    fn methods(&self, ty: EntityId) -> Vec<EntityId> {
        self.methods.get(&ty).cloned().unwrap_or_default()
    }

    fn find_overriding_methods(&self, method: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut visited = HashSet::from([method]);
        let mut queue = VecDeque::from([method]);

        // Overrides chain: an implementation of an implementation still counts.
        while let Some(current) = queue.pop_front() {
            for &overrider in self.overriders.get(&current).into_iter().flatten() {
                if visited.insert(overrider) {
                    result.push(overrider);
                    queue.push_back(overrider);
                }
            }
        }

        result
    }

    fn resolve_method_return_type(&self, method: EntityId) -> Option<EntityId> {
        self.return_types.get(&method).copied()
    }

    fn find_referencing_sites(&self, entity: EntityId) -> Vec<ReferenceSite> {
        self.sites.get(&entity).cloned().unwrap_or_default()
    }
}
