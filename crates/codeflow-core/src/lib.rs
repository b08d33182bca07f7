//! Codeflow Core - The symbol index seam
//!
//! Everything the graph engine knows about a codebase comes through the
//! [`SymbolIndex`] trait defined here. The engine never parses source code
//! itself; it asks the index which types carry an annotation, which types
//! extend another, and where an entity is referenced from.
//!
//! # Architecture
//!
//! - [`entity`]: opaque entity handles and the metadata an index exposes
//! - [`index`]: the read-only query capability
//! - [`memory`]: an in-memory index built from a JSON snapshot, used by
//!   the CLI and as the fixture for tests
//!
//! # Example
//!
//! ```no_run
//! use codeflow_core::{MemoryIndex, SymbolIndex};
//!
//! let index = MemoryIndex::load("snapshot.json").unwrap();
//! let component = index.resolve_type("org.springframework.stereotype.Component");
//! ```

pub mod entity;
pub mod error;
pub mod index;
pub mod memory;

pub use entity::{AnnotationUse, Entity, EntityId, EntityKind, ReferenceSite};
pub use error::{IndexError, Result};
pub use index::SymbolIndex;
pub use memory::{IndexSnapshot, MemoryIndex, MethodRecord, ReferenceRecord, TypeRecord};
