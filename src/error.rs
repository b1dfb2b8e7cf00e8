//! Closed error taxonomy for the indexing-and-search engine.
//!
//! Library code returns `Result<T, MawError>` so planners can match on
//! `MawError::QuerySyntax` directly instead of inspecting message text.
//! The CLI boundary converts everything to `anyhow::Error`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MawError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("index not found at {0}; run `maw index` first")]
    IndexMissing(PathBuf),

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("query syntax rejected by full-text engine: {0}")]
    QuerySyntax(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("semantic search backend is not available")]
    SemanticUnavailable,
}
