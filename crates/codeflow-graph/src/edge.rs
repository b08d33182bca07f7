//! Edge types for the architecture graph.
//!
//! Two relations are tracked: "references" (a class mentions a component)
//! and "inherits" (a class extends or implements another node).

use serde::{Deserialize, Serialize};

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Source references target somewhere in its body or signature.
    References,

    /// Source directly extends or implements target.
    Inherits,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::References => "references",
            Self::Inherits => "inherits",
        };
        write!(f, "{}", s)
    }
}

/// An edge in the architecture graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(kind: EdgeKind) -> Self {
        Self { kind }
    }
}
