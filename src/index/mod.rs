//! Storage layer: a SQLite-backed index with an FTS5 full-text
//! mirror kept in sync via triggers.

mod sqlite;

pub use sqlite::Storage;
