//! Error types for loading an index snapshot.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while building a [`MemoryIndex`](crate::MemoryIndex).
///
/// Queries against a built index never fail; absence is reported as an
/// empty result instead.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("type '{0}' is declared more than once")]
    DuplicateType(String),

    #[error("type '{0}' has kind 'method'; expected class, interface, enum or annotation")]
    MethodAsType(String),

    #[error("malformed member reference '{0}', expected 'Type#method'")]
    MalformedMember(String),

    #[error("'{owner}' has no method named '{method}'")]
    UnknownMethod { owner: String, method: String },

    #[error("type '{0}' is nested inside itself")]
    NestingCycle(String),
}

impl IndexError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
