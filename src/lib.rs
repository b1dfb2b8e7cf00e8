//! `maw`: a local, incremental code indexing and search engine.
//!
//! The library is organized leaves-first: [`language`] and
//! [`ignore_rules`] are pure classifiers, [`scanner`] walks a
//! directory tree using them, [`hash`] fingerprints file content,
//! [`index`] persists everything in SQLite with an FTS5 mirror,
//! [`indexer`] orchestrates an incremental pass, and [`search`] holds
//! the five query planners built on top of [`index::Storage`].

pub mod error;
pub mod hash;
pub mod ignore_rules;
pub mod index;
pub mod indexer;
pub mod language;
pub mod models;
pub mod scanner;
pub mod search;

pub use error::MawError;
pub use index::Storage;
pub use models::{
    FileRecordInput, Filters, Language, SearchMode, SearchResult, SearchType, StatsBlob,
    SymbolKind,
};
