//! Graph builder.
//!
//! Runs the discovery passes in order over a symbol index:
//! 1. Resolve the marker closure
//! 2. Collect candidate entities
//! 3. Classify them
//! 4. Assemble references (creating placeholders)
//! 5. Mark messaging entry points
//! 6. Link inheritance and freeze
//!
//! The builder owns nothing but the node table it fills; the index is
//! borrowed read-only for the whole build.

use crate::assembler::{assemble_references, link_inheritance};
use crate::classifier::classify;
use crate::collector::collect_entities;
use crate::config::ScanConfig;
use crate::entry_points::mark_entry_points;
use crate::finalize::{finalize, RenderedGraph};
use crate::graph::ArchGraph;
use crate::markers::resolve_marker_closure;
use crate::node::NodeTable;
use codeflow_core::SymbolIndex;
use std::time::Instant;
use tracing::info;

/// Outcome of a build.
#[derive(Debug)]
pub struct BuildResult {
    /// The frozen graph.
    pub graph: ArchGraph,

    /// Qualified names of the resolved markers, root first.
    pub markers: Vec<String>,

    /// Number of collected (classified) entities.
    pub candidates: usize,

    /// Number of nodes created only because they reference a candidate.
    pub placeholders: usize,

    /// Number of endpoint methods that flagged a node.
    pub entry_points: usize,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Builds an [`ArchGraph`] from a symbol index.
pub struct GraphBuilder<'a, I: SymbolIndex + ?Sized> {
    index: &'a I,
    config: &'a ScanConfig,
}

impl<'a, I: SymbolIndex + ?Sized> GraphBuilder<'a, I> {
    pub fn new(index: &'a I, config: &'a ScanConfig) -> Self {
        Self { index, config }
    }

    /// Runs every pass and returns the frozen graph.
    pub fn build(self) -> BuildResult {
        let start = Instant::now();
        let index = self.index;
        let config = self.config;

        let markers = resolve_marker_closure(index, &config.root_marker);
        let candidates = collect_entities(index, config, &markers);
        let classification = classify(index, config, &candidates);

        let mut table = NodeTable::new();
        for candidate in candidates.iter() {
            let Some(entity) = index.entity(candidate.entity) else {
                continue;
            };
            let position = table.upsert(entity);
            let draft = table.draft_mut(position);
            draft.origins.extend(candidate.origins.iter().copied());
            draft.roles.extend(classification.roles(&candidate.key));
        }

        let assembly = assemble_references(index, config, &candidates, &mut table);
        let entry_points = mark_entry_points(index, config, &mut table);
        link_inheritance(index, &mut table);

        let graph = table.freeze();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Built graph: {} nodes, {} edges from {} markers in {}ms",
            graph.node_count(),
            graph.edge_count(),
            markers.len(),
            duration_ms
        );

        BuildResult {
            graph,
            markers: markers
                .iter()
                .filter_map(|&id| index.entity(id))
                .map(|entity| entity.qualified_name.clone())
                .collect(),
            candidates: candidates.len(),
            placeholders: assembly.placeholders,
            entry_points,
            duration_ms,
        }
    }
}

/// Builds and finalizes in one step.
pub fn build_graph<I>(index: &I, config: &ScanConfig) -> RenderedGraph
where
    I: SymbolIndex + ?Sized,
{
    let result = GraphBuilder::new(index, config).build();
    finalize(&result.graph, config)
}
