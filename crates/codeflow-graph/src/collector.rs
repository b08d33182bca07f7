//! Entity collection.
//!
//! Three searches feed the candidate set:
//! 1. classes carrying any marker annotation
//! 2. types returned by factory (`@Bean`) methods
//! 3. project supertypes of the entities found by 1 and 2
//!
//! Results are unioned by qualified name. An entity found by several
//! searches keeps every origin, so the order of the searches does not
//! matter for classification.

use crate::config::ScanConfig;
use crate::node::Origin;
use codeflow_core::{Entity, EntityId, EntityKind, SymbolIndex};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// One collected entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entity: EntityId,
    pub key: String,
    pub origins: BTreeSet<Origin>,
}

/// The collected entities, in discovery order.
#[derive(Debug, Default)]
pub struct Candidates {
    items: Vec<Candidate>,
    by_key: HashMap<String, usize>,
}

impl Candidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity, merging origins if its key is already present.
    pub fn add(&mut self, entity: &Entity, origin: Origin) {
        if let Some(&position) = self.by_key.get(&entity.qualified_name) {
            self.items[position].origins.insert(origin);
            return;
        }

        self.by_key
            .insert(entity.qualified_name.clone(), self.items.len());
        self.items.push(Candidate {
            entity: entity.id,
            key: entity.qualified_name.clone(),
            origins: BTreeSet::from([origin]),
        });
    }

    pub fn get(&self, key: &str) -> Option<&Candidate> {
        self.by_key.get(key).map(|&position| &self.items[position])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Collects the candidate entities for classification.
pub fn collect_entities<I>(index: &I, config: &ScanConfig, markers: &[EntityId]) -> Candidates
where
    I: SymbolIndex + ?Sized,
{
    let mut candidates = Candidates::new();

    collect_annotated(index, markers, &mut candidates);
    collect_factory_products(index, config, &mut candidates);
    collect_autowired(index, &mut candidates);

    debug!("Collected {} candidate entities", candidates.len());
    candidates
}

fn collect_annotated<I>(index: &I, markers: &[EntityId], candidates: &mut Candidates)
where
    I: SymbolIndex + ?Sized,
{
    for &marker in markers {
        for id in index.find_annotated_entities(marker) {
            if let Some(entity) = index.entity(id).filter(|e| e.kind.is_class_like()) {
                candidates.add(entity, Origin::Annotated);
            }
        }
    }
}

fn collect_factory_products<I>(index: &I, config: &ScanConfig, candidates: &mut Candidates)
where
    I: SymbolIndex + ?Sized,
{
    let Some(factory_marker) = index.resolve_type(&config.factory_marker) else {
        debug!("Factory marker {} not in index", config.factory_marker);
        return;
    };

    for method in index.find_annotated_entities(factory_marker) {
        if index.kind(method) != Some(EntityKind::Method) {
            continue;
        }

        let product = index
            .resolve_method_return_type(method)
            .and_then(|ty| index.entity(ty))
            .filter(|e| e.kind.is_class_like());

        match product {
            Some(entity) => candidates.add(entity, Origin::Factory),
            None => debug!("Skipping factory method {} with unresolved return type", method),
        }
    }
}

fn collect_autowired<I>(index: &I, candidates: &mut Candidates)
where
    I: SymbolIndex + ?Sized,
{
    let collected: Vec<EntityId> = candidates.iter().map(|c| c.entity).collect();

    for id in collected {
        for supertype in index.direct_supertypes(id) {
            let Some(entity) = index.entity(supertype) else {
                continue;
            };
            if entity.kind.is_class_like() && !entity.library {
                candidates.add(entity, Origin::Autowired);
            }
        }
    }
}
