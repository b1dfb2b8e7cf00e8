//! Full-Text Planner and its Fallback Planner.
//!
//! The Full-Text Planner sanitizes the query and asks Storage for a
//! BM25-ranked FTS5 match. When Storage reports
//! `MawError::QuerySyntax` — and only that variant, never a
//! string-matched error message — the Fallback Planner takes over
//! with a plain substring scan over the *original* (unsanitized)
//! query instead. Fallback is invisible to callers: its hits still
//! carry `search_type = SearchType::FullText`.

use tracing::debug;

use crate::error::MawError;
use crate::index::Storage;
use crate::models::{Filters, SearchResult, SearchType};
use crate::search::extract;
use crate::search::sanitize;

const DISPLAY_CONTENT_LIMIT: usize = 500;

/// Run the Full-Text Planner, falling back to a substring scan if
/// FTS5 rejects the sanitized query.
pub fn search(
    storage: &Storage,
    raw_query: &str,
    filters: &Filters,
    limit: usize,
) -> Result<Vec<SearchResult>, MawError> {
    let sanitized = sanitize::sanitize(raw_query);

    match storage.full_text_query(&sanitized, filters, limit) {
        Ok(rows) => Ok(rows
            .into_iter()
            .map(|(path, content, _language, rank)| {
                build_result(&path, &content, rank.abs(), raw_query, SearchType::FullText)
            })
            .collect()),
        Err(MawError::QuerySyntax(reason)) => {
            debug!(query = %raw_query, reason = %reason, "full-text query rejected, falling back to substring scan");
            fallback_search(storage, raw_query, filters, limit)
        }
        Err(other) => Err(other),
    }
}

/// Substring containment of the *original* query against every
/// stored file body, used when the Full-Text Planner's query is
/// rejected by FTS5. Every hit gets a constant score of `1.0`, in
/// stored-path order.
fn fallback_search(
    storage: &Storage,
    raw_query: &str,
    filters: &Filters,
    limit: usize,
) -> Result<Vec<SearchResult>, MawError> {
    let needle = raw_query.trim();
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    let rows = storage.substring_query(needle, filters, limit)?;
    Ok(rows
        .into_iter()
        .map(|(path, content, _language)| {
            build_result(&path, &content, 1.0, needle, SearchType::FullText)
        })
        .collect())
}

fn build_result(
    path: &str,
    content: &str,
    score: f64,
    needle_source: &str,
    search_type: SearchType,
) -> SearchResult {
    let needle = needle_source.trim().trim_matches('"');
    let extraction = extract::extract(content, needle);
    let display_content: String = content.chars().take(DISPLAY_CONTENT_LIMIT).collect();
    SearchResult {
        path: path.to_string(),
        content: display_content,
        score,
        line_number: extraction.line_number,
        match_context: extraction.match_context,
        search_type,
        highlights: extraction.highlights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileRecordInput;
    use tempfile::tempdir;

    fn seeded_storage(dir: &std::path::Path) -> Storage {
        let mut storage = Storage::open(&dir.join("idx.db")).expect("open");
        storage
            .upsert(&FileRecordInput {
                path: "greet.py",
                content: "def greet():\n    return 'hello world'\n",
                language: "python",
                size: 40,
                last_modified: 0,
                content_hash: "h1",
                indexed_at: 0,
            })
            .expect("upsert");
        storage
    }

    #[test]
    fn finds_matching_file_with_bm25_score() {
        let dir = tempdir().expect("tempdir");
        let storage = seeded_storage(dir.path());
        let results = search(&storage, "greet", &Filters::default(), 10).expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, "greet.py");
        assert!(results[0].score >= 0.0);
    }

    #[test]
    fn falls_back_on_unparsable_query_and_finds_the_literal_character() {
        let dir = tempdir().expect("tempdir");
        let storage = seeded_storage(dir.path());
        // "(" sanitizes to an empty string, which FTS5 rejects; the
        // Fallback Planner then finds the file via the literal "("
        // in `greet()`, per the spec's query-syntax-fallback scenario.
        let results = search(&storage, "(", &Filters::default(), 10).expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, "greet.py");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[0].search_type, SearchType::FullText);
    }

    #[test]
    fn phrase_query_matches_only_the_exact_wording() {
        let dir = tempdir().expect("tempdir");
        let mut storage = seeded_storage(dir.path());
        storage
            .upsert(&FileRecordInput {
                path: "reverse.py",
                content: "count total = 2\n",
                language: "python",
                size: 20,
                last_modified: 0,
                content_hash: "h2",
                indexed_at: 0,
            })
            .expect("upsert");
        storage
            .upsert(&FileRecordInput {
                path: "forward.py",
                content: "total count = 1\n",
                language: "python",
                size: 20,
                last_modified: 0,
                content_hash: "h3",
                indexed_at: 0,
            })
            .expect("upsert");

        let results = search(&storage, "total count", &Filters::default(), 10).expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, "forward.py");
    }
}
