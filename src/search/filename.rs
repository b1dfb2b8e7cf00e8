//! File-Name Planner: translates a shell-style glob into a SQL
//! `LIKE` pattern and matches it against stored paths.

use crate::error::MawError;
use crate::index::Storage;
use crate::models::{SearchResult, SearchType};

/// Translate a shell glob (`*`, `?`) into a SQL `LIKE` pattern and
/// return the files whose path matches it.
pub fn search(storage: &Storage, glob: &str, limit: usize) -> Result<Vec<SearchResult>, MawError> {
    let like_pattern = glob_to_like(glob);
    let rows = storage.name_query(&like_pattern, limit)?;

    Ok(rows
        .into_iter()
        .map(|(path, content, size)| {
            // `\n`-delimited; a trailing newline counts as terminating
            // one more line, matching `content.split('\n').count()`.
            let line_count = content.matches('\n').count() + 1;
            SearchResult {
                path,
                content: format!("{line_count} lines, {size} bytes"),
                score: 1.0,
                line_number: 0,
                match_context: String::new(),
                search_type: SearchType::File,
                highlights: Vec::new(),
            }
        })
        .collect())
}

/// `*` matches any run of characters, `?` matches exactly one, and
/// the whole pattern is wrapped in `%...%` so a bare basename glob
/// still matches files nested under subdirectories.
fn glob_to_like(glob: &str) -> String {
    let mut out = String::from("%");
    for ch in glob.chars() {
        match ch {
            '*' => out.push('%'),
            '?' => out.push('_'),
            other => out.push(other),
        }
    }
    out.push('%');
    out
}
