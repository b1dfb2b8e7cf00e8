//! SQLite-based Storage backend.
//!
//! This backend stores the logical index model in a single SQLite
//! database file:
//!
//! - `files(id, path UNIQUE, content, language, size, last_modified,
//!    content_hash, indexed_at)`
//! - `files_fts` — an external-content FTS5 virtual table over
//!    `(path, content, language)`, tokenized with `porter unicode61`.
//! - `index_stats(key, value)` — a small key/value area for the
//!    statistics blob.
//!
//! `files_fts` is kept in sync with `files` purely through triggers
//! (`files_ai`/`files_ad`/`files_au`); no client code writes to the
//! mirror directly. This centralizes the tokenization policy in the
//! schema rather than in application code.
//!
//! The connection is configured with:
//! - `journal_mode = WAL` for concurrent readers and a single writer.
//! - `synchronous = NORMAL` as a balance between safety and speed.
//! - `busy_timeout` to avoid transient `database is locked` errors.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::error::MawError;
use crate::models::{FileRecordInput, Filters, StatsBlob};

pub struct Storage {
    path: PathBuf,
    conn: Connection,
}

impl Storage {
    /// Open (or create) a SQLite index at the given path, creating
    /// its parent directory if necessary.
    pub fn open(index_path: &Path) -> Result<Self, MawError> {
        if let Some(parent) = index_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| MawError::FileRead {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        let conn = Connection::open_with_flags(index_path, flags)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;

        Self::initialize_schema(&conn)?;

        Ok(Storage {
            path: index_path.to_path_buf(),
            conn,
        })
    }

    pub fn index_path(&self) -> &Path {
        &self.path
    }

    fn initialize_schema(conn: &Connection) -> Result<(), MawError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS files (
                id            INTEGER PRIMARY KEY,
                path          TEXT NOT NULL UNIQUE,
                content       TEXT NOT NULL,
                language      TEXT NOT NULL,
                size          INTEGER NOT NULL,
                last_modified INTEGER NOT NULL,
                content_hash  TEXT NOT NULL,
                indexed_at    INTEGER NOT NULL
            );

            CREATE VIRTUAL TABLE IF NOT EXISTS files_fts USING fts5(
                path,
                content,
                language,
                tokenize = 'porter unicode61',
                content = 'files',
                content_rowid = 'id'
            );

            CREATE TRIGGER IF NOT EXISTS files_ai AFTER INSERT ON files BEGIN
                INSERT INTO files_fts(rowid, path, content, language)
                VALUES (new.id, new.path, new.content, new.language);
            END;

            CREATE TRIGGER IF NOT EXISTS files_ad AFTER DELETE ON files BEGIN
                INSERT INTO files_fts(files_fts, rowid, path, content, language)
                VALUES ('delete', old.id, old.path, old.content, old.language);
            END;

            CREATE TRIGGER IF NOT EXISTS files_au AFTER UPDATE ON files BEGIN
                INSERT INTO files_fts(files_fts, rowid, path, content, language)
                VALUES ('delete', old.id, old.path, old.content, old.language);
                INSERT INTO files_fts(rowid, path, content, language)
                VALUES (new.id, new.path, new.content, new.language);
            END;

            CREATE TABLE IF NOT EXISTS index_stats (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    /// Insert or replace a file record by path.
    pub fn upsert(&mut self, record: &FileRecordInput) -> Result<(), MawError> {
        let tx = self.conn.transaction()?;

        let existing_id: Option<i64> = tx
            .query_row(
                "SELECT id FROM files WHERE path = ?1",
                params![record.path],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing_id {
            tx.execute(
                "UPDATE files SET content = ?1, language = ?2, size = ?3, last_modified = ?4, \
                 content_hash = ?5, indexed_at = ?6 WHERE id = ?7",
                params![
                    record.content,
                    record.language,
                    record.size as i64,
                    record.last_modified,
                    record.content_hash,
                    record.indexed_at,
                    id,
                ],
            )?;
        } else {
            tx.execute(
                "INSERT INTO files (path, content, language, size, last_modified, content_hash, \
                 indexed_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.path,
                    record.content,
                    record.language,
                    record.size as i64,
                    record.last_modified,
                    record.content_hash,
                    record.indexed_at,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn delete(&mut self, path: &str) -> Result<(), MawError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM files WHERE path = ?1", params![path])?;
        tx.commit()?;
        Ok(())
    }

    pub fn lookup_fingerprint(&self, path: &str) -> Result<Option<String>, MawError> {
        let hash = self
            .conn
            .query_row(
                "SELECT content_hash FROM files WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    pub fn enumerate(&self, language_filter: Option<&str>) -> Result<Vec<String>, MawError> {
        let mut stmt = self.conn.prepare(
            "SELECT path FROM files WHERE (?1 IS NULL OR language = ?1) ORDER BY path ASC",
        )?;
        let rows = stmt.query_map(params![language_filter], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Run a sanitized FTS5 query, ranked by BM25 (ascending, i.e.
    /// most relevant first). Returns `MawError::QuerySyntax` — not
    /// `MawError::Storage` — when FTS5 itself rejects the query, so
    /// the Full-Text Planner can fall back.
    pub fn full_text_query(
        &self,
        sanitized_query: &str,
        filters: &Filters,
        limit: usize,
    ) -> Result<Vec<(String, String, String, f64)>, MawError> {
        let sql = "SELECT f.path, f.content, f.language, bm25(files_fts) AS rank \
                    FROM files_fts \
                    JOIN files f ON f.id = files_fts.rowid \
                    WHERE files_fts MATCH ?1 \
                      AND (?2 IS NULL OR f.language = ?2) \
                      AND (?3 IS NULL OR f.path LIKE ?3 ESCAPE '\\') \
                    ORDER BY rank ASC \
                    LIMIT ?4";

        let path_pattern = filters
            .path_substring
            .as_deref()
            .map(|needle| format!("%{}%", escape_like(needle)));

        let mut stmt = self.conn.prepare(sql).map_err(classify_query_error)?;
        let rows = stmt
            .query_map(
                params![
                    sanitized_query,
                    filters.language,
                    path_pattern,
                    limit as i64
                ],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, f64>(3)?,
                    ))
                },
            )
            .map_err(classify_query_error)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(classify_query_error)?);
        }
        Ok(out)
    }

    /// Plain substring containment scan, used by the Fallback
    /// Planner when the full-text engine refuses a query.
    pub fn substring_query(
        &self,
        needle: &str,
        filters: &Filters,
        limit: usize,
    ) -> Result<Vec<(String, String, String)>, MawError> {
        let sql = "SELECT path, content, language FROM files \
                    WHERE content LIKE ?1 ESCAPE '\\' \
                      AND (?2 IS NULL OR language = ?2) \
                      AND (?3 IS NULL OR path LIKE ?3 ESCAPE '\\') \
                    ORDER BY path ASC \
                    LIMIT ?4";

        let content_pattern = format!("%{}%", escape_like(needle));
        let path_pattern = filters
            .path_substring
            .as_deref()
            .map(|n| format!("%{}%", escape_like(n)));

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(
            params![content_pattern, filters.language, path_pattern, limit as i64],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// All stored files, used by the Symbol Planner.
    pub fn read_all(&self) -> Result<Vec<(String, String, String)>, MawError> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, content, language FROM files ORDER BY path ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Match stored paths against a SQL `LIKE` pattern already
    /// translated from a shell-style glob by the File-Name Planner.
    pub fn name_query(
        &self,
        like_pattern: &str,
        limit: usize,
    ) -> Result<Vec<(String, String, u64)>, MawError> {
        let mut stmt = self.conn.prepare(
            "SELECT path, content, size FROM files WHERE path LIKE ?1 ORDER BY path ASC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![like_pattern, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)? as u64,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Drop all file rows, mirror rows (cascading through the
    /// trigger-driven deletes is unnecessary since we truncate the
    /// shadow tables directly), and statistics.
    pub fn clear(&mut self) -> Result<(), MawError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM files", [])?;
        tx.execute("INSERT INTO files_fts(files_fts) VALUES ('rebuild')", [])?;
        tx.execute("DELETE FROM index_stats", [])?;
        tx.commit()?;
        Ok(())
    }

    pub fn put_stats(&mut self, blob: &StatsBlob) -> Result<(), MawError> {
        let json = serde_json::to_string(blob).map_err(|e| {
            MawError::Storage(rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        })?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO index_stats (key, value) VALUES ('stats', ?1) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![json],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_stats(&self) -> Result<Option<StatsBlob>, MawError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM index_stats WHERE key = 'stats'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(text) => {
                let blob = serde_json::from_str(&text).map_err(|e| {
                    MawError::Storage(rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
                })?;
                Ok(Some(blob))
            }
            None => Ok(None),
        }
    }
}

/// Escape `%`, `_`, and `\` for literal use inside a `LIKE ... ESCAPE
/// '\'` pattern.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '\\' || ch == '%' || ch == '_' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Distinguish FTS5 query-syntax rejections from all other storage
/// errors. This is the single place that inspects the underlying
/// SQLite error message; every caller above matches on
/// `MawError::QuerySyntax` itself, never on message text.
fn classify_query_error(err: rusqlite::Error) -> MawError {
    if let rusqlite::Error::SqliteFailure(_, Some(ref message)) = err {
        if message.contains("fts5: syntax error") || message.contains("unknown special query") {
            return MawError::QuerySyntax(message.clone());
        }
    }
    MawError::Storage(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_record<'a>(path: &'a str, content: &'a str, hash: &'a str) -> FileRecordInput<'a> {
        FileRecordInput {
            path,
            content,
            language: "python",
            size: content.len() as u64,
            last_modified: 1_700_000_000,
            content_hash: hash,
            indexed_at: 1_700_000_100,
        }
    }

    #[test]
    fn upsert_insert_then_update_preserves_unique_path() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("code.db");
        let mut storage = Storage::open(&db_path).expect("open");

        storage
            .upsert(&sample_record("a.py", "print('hi')\n", "hash1"))
            .expect("insert");
        storage
            .upsert(&sample_record("a.py", "print('bye')\n", "hash2"))
            .expect("update");

        let paths = storage.enumerate(None).expect("enumerate");
        assert_eq!(paths, vec!["a.py".to_string()]);

        let hash = storage.lookup_fingerprint("a.py").expect("lookup");
        assert_eq!(hash, Some("hash2".to_string()));
    }

    #[test]
    fn mirror_stays_in_sync_with_file_table() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("code.db");
        let mut storage = Storage::open(&db_path).expect("open");

        storage
            .upsert(&sample_record("greet.py", "def greet():\n    return 'hi'\n", "h1"))
            .expect("insert");

        let results = storage
            .full_text_query("greet", &Filters::default(), 10)
            .expect("query");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "greet.py");

        storage.delete("greet.py").expect("delete");

        let results_after = storage
            .full_text_query("greet", &Filters::default(), 10)
            .expect("query");
        assert!(results_after.is_empty());

        let fts_count: i64 = storage
            .conn
            .query_row("SELECT count(*) FROM files_fts", [], |row| row.get(0))
            .expect("count");
        assert_eq!(fts_count, 0);
    }

    #[test]
    fn full_text_query_reports_syntax_error_distinctly() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("code.db");
        let storage = Storage::open(&db_path).expect("open");

        let err = storage
            .full_text_query("(", &Filters::default(), 10)
            .unwrap_err();
        assert!(matches!(err, MawError::QuerySyntax(_)));
    }

    #[test]
    fn stats_round_trip() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("code.db");
        let mut storage = Storage::open(&db_path).expect("open");

        assert!(storage.get_stats().expect("get").is_none());

        let mut blob = StatsBlob::default();
        blob.total_files = 3;
        blob.languages.insert("python".to_string(), 3);
        storage.put_stats(&blob).expect("put");

        let round_tripped = storage.get_stats().expect("get").expect("some");
        assert_eq!(round_tripped, blob);
    }

    #[test]
    fn clear_drops_files_mirror_and_stats() {
        let dir = tempdir().expect("tempdir");
        let db_path = dir.path().join("code.db");
        let mut storage = Storage::open(&db_path).expect("open");

        storage
            .upsert(&sample_record("a.py", "x = 1\n", "h1"))
            .expect("insert");
        storage.put_stats(&StatsBlob::default()).expect("put");

        storage.clear().expect("clear");

        assert!(storage.enumerate(None).expect("enumerate").is_empty());
        assert!(storage.get_stats().expect("get").is_none());
    }

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}
