//! Codeflow Graph - Architecture discovery over a symbol index
//!
//! This crate finds the components of a dependency-injection codebase,
//! classifies them into architectural roles and connects them by their
//! references, producing a graph ready for rendering.
//!
//! # Architecture
//!
//! The build is a fixed pipeline of passes over a read-only
//! [`SymbolIndex`](codeflow_core::SymbolIndex):
//! - Marker closure: the root marker plus every annotation meta-annotated with it
//! - Collection: annotated classes, factory products and their project supertypes
//! - Classification: role tags from annotations, kinds and index searches
//! - Assembly: referencing classes, with placeholders for non-components
//! - Entry points and inheritance links
//!
//! The result is a petgraph-backed [`ArchGraph`], which [`finalize`] turns
//! into sorted, styled nodes and edges for a [`GraphRenderer`].
//!
//! # Example
//!
//! ```no_run
//! use codeflow_core::MemoryIndex;
//! use codeflow_graph::{GraphBuilder, GraphRenderer, MermaidRenderer, ScanConfig, finalize};
//!
//! let index = MemoryIndex::load("snapshot.json").unwrap();
//! let config = ScanConfig::default();
//!
//! let result = GraphBuilder::new(&index, &config).build();
//! let rendered = finalize(&result.graph, &config);
//! println!("{}", MermaidRenderer::new().render(&rendered).unwrap());
//! ```

mod assembler;
mod builder;
mod classifier;
mod collector;
mod config;
mod edge;
mod entry_points;
mod error;
mod finalize;
mod graph;
mod markers;
mod node;
mod render;
mod role;

pub use builder::{build_graph, BuildResult, GraphBuilder};
pub use classifier::{annotation_roles, classify, Classification};
pub use collector::{collect_entities, Candidate, Candidates};
pub use config::{ScanConfig, CONFIG_DIR, CONFIG_FILE};
pub use edge::{Edge, EdgeKind};
pub use error::{GraphError, Result};
pub use finalize::{finalize, RenderedGraph, StyleClass, VisualEdge, VisualNode};
pub use graph::{ArchGraph, GraphStats, NodeId};
pub use markers::resolve_marker_closure;
pub use node::{ArchNode, Origin};
pub use render::{GraphRenderer, JsonRenderer, MermaidRenderer};
pub use role::{Role, RoleSet};
