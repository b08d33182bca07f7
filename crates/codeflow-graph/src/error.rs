use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration handling and rendering.
///
/// Graph construction itself never fails: missing markers, unresolvable
/// types and dangling edges degrade to smaller output.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("render error: {0}")]
    Render(#[from] std::fmt::Error),
}

impl GraphError {
    pub fn config_io(path: &Path, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
