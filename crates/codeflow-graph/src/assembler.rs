//! Reference graph assembly.
//!
//! For each collected entity, every class that references it becomes a
//! node (reusing an existing one when possible) and is recorded in the
//! entity's `referenced_from` list. This is the only pass that creates
//! nodes beyond the collected set.

use crate::collector::Candidates;
use crate::config::ScanConfig;
use crate::node::{NodeTable, Origin};
use crate::role::Role;
use codeflow_core::{Entity, EntityKind, SymbolIndex};
use std::collections::HashSet;
use tracing::debug;

/// Counts from one assembly pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Assembly {
    pub placeholders: usize,
    pub references: usize,
}

/// Resolves the referencers of every candidate into `table`.
///
/// Sites in test source trees and self references are skipped. Each
/// referencing class is counted once per candidate no matter how many
/// sites it has.
pub(crate) fn assemble_references<I>(
    index: &I,
    config: &ScanConfig,
    candidates: &Candidates,
    table: &mut NodeTable,
) -> Assembly
where
    I: SymbolIndex + ?Sized,
{
    let mut assembly = Assembly::default();

    for candidate in candidates.iter() {
        let Some(target) = table.index_of(&candidate.key) else {
            continue;
        };

        let mut seen = HashSet::new();
        for site in index.find_referencing_sites(candidate.entity) {
            if config.is_test_path(&site.file) {
                debug!("Ignoring reference to {} from test path {}", candidate.key, site.file);
                continue;
            }

            let Some(referencer_id) = site.enclosing_type else {
                continue;
            };
            if referencer_id == candidate.entity || !seen.insert(referencer_id) {
                continue;
            }
            let Some(referencer) = index.entity(referencer_id) else {
                continue;
            };

            let source = match table.index_of(&referencer.qualified_name) {
                Some(existing) => existing,
                None => {
                    assembly.placeholders += 1;
                    add_placeholder(index, config, table, referencer)
                }
            };
            if source == target {
                continue;
            }

            if table.draft_mut(target).add_referencer(source) {
                assembly.references += 1;
            }
        }
    }

    debug!(
        "Assembled {} references, {} placeholder nodes",
        assembly.references, assembly.placeholders
    );
    assembly
}

/// Creates a node for a class seen only as a referencer.
fn add_placeholder<I>(index: &I, config: &ScanConfig, table: &mut NodeTable, entity: &Entity) -> usize
where
    I: SymbolIndex + ?Sized,
{
    let position = table.upsert(entity);
    let draft = table.draft_mut(position);
    draft.origins.insert(Origin::Referencer);

    if config.is_test_name(&entity.name) {
        draft.roles.insert(Role::Test);
    } else {
        if entity.kind == EntityKind::Interface {
            draft.roles.insert(Role::Interface);
        }
        link_supertypes(index, table, position);
    }

    position
}

/// Links every non-test node to its direct supertypes that are nodes.
pub(crate) fn link_inheritance<I>(index: &I, table: &mut NodeTable)
where
    I: SymbolIndex + ?Sized,
{
    for position in 0..table.len() {
        if !table.draft(position).has_role(Role::Test) {
            link_supertypes(index, table, position);
        }
    }
}

fn link_supertypes<I>(index: &I, table: &mut NodeTable, position: usize)
where
    I: SymbolIndex + ?Sized,
{
    let entity = table.draft(position).entity;

    for supertype in index.direct_supertypes(entity) {
        let Some(key) = index.entity(supertype).map(|e| e.qualified_name.as_str()) else {
            continue;
        };
        if let Some(parent) = table.index_of(key).filter(|&parent| parent != position) {
            table.draft_mut(position).add_supertype(parent);
        }
    }
}
