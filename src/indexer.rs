//! Indexer: orchestrates Scanner, Language Classifier, the content
//! fingerprint, and Storage into one incremental indexing pass.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::error::MawError;
use crate::hash;
use crate::ignore_rules::IgnoreMatcher;
use crate::index::Storage;
use crate::language;
use crate::models::{FileRecordInput, Language as Lang, StatsBlob};
use crate::scanner;

/// Re-scan `root`, upserting changed files and removing files that no
/// longer exist, then persist and return the resulting statistics.
///
/// A file whose content fingerprint matches what is already stored is
/// skipped (neither re-read into the mirror nor re-hashed content
/// written) — only the fingerprint decides staleness, never mtime or
/// size, both of which are still stored for display purposes.
pub fn index_directory(
    root: &Path,
    storage: &mut Storage,
    ignore_matcher: &IgnoreMatcher,
) -> Result<StatsBlob, MawError> {
    let files = scanner::scan(root, ignore_matcher)?;
    let mut seen_relative_paths: HashSet<String> = HashSet::new();

    let mut stats = StatsBlob::default();

    for absolute_path in &files {
        let relative = relative_unix_path(root, absolute_path);

        let bytes = match fs::read(absolute_path) {
            Ok(bytes) => bytes,
            Err(source) => {
                warn!(path = %relative, error = %source, "skipping file: read failed");
                continue;
            }
        };

        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                debug!(path = %relative, "utf-8 decode failed, falling back to latin-1");
                decode_latin1(err.as_bytes())
            }
        };

        let metadata = match fs::metadata(absolute_path) {
            Ok(m) => m,
            Err(source) => {
                warn!(path = %relative, error = %source, "skipping file: stat failed");
                continue;
            }
        };

        let size = metadata.len();
        let last_modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let lang = language::classify_path(absolute_path);
        let fingerprint = hash::fingerprint(&content);

        seen_relative_paths.insert(relative.clone());

        let unchanged = storage
            .lookup_fingerprint(&relative)?
            .map(|existing| existing == fingerprint)
            .unwrap_or(false);

        if unchanged {
            debug!(path = %relative, "unchanged, skipping upsert");
        } else {
            let indexed_at = now_unix();
            storage.upsert(&FileRecordInput {
                path: &relative,
                content: &content,
                language: lang.as_tag(),
                size,
                last_modified,
                content_hash: &fingerprint,
                indexed_at,
            })?;
        }

        accumulate(&mut stats, lang, &content, size);
    }

    let stale: Vec<String> = storage
        .enumerate(None)?
        .into_iter()
        .filter(|path| !seen_relative_paths.contains(path))
        .collect();

    for path in stale {
        debug!(path = %path, "removing from index: no longer present on disk");
        storage.delete(&path)?;
    }

    stats.last_indexed = format_timestamp_iso8601(now_unix());
    storage.put_stats(&stats)?;

    Ok(stats)
}

fn accumulate(stats: &mut StatsBlob, lang: Lang, content: &str, size: u64) {
    stats.total_files += 1;
    // `\n`-delimited; a trailing newline counts as terminating one
    // more line, matching `content.split('\n').count()`.
    stats.total_lines += content.matches('\n').count() as u64 + 1;
    stats.total_size += size;
    *stats.languages.entry(lang.as_tag().to_string()).or_insert(0) += 1;
}

fn relative_unix_path(root: &Path, absolute: &Path) -> String {
    let relative = absolute.strip_prefix(root).unwrap_or(absolute);
    relative.to_string_lossy().replace('\\', "/")
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn format_timestamp_iso8601(secs: i64) -> Option<String> {
    use time::{format_description::well_known::Rfc3339, OffsetDateTime};

    let dt = OffsetDateTime::from_unix_timestamp(secs).ok()?;
    Some(dt.format(&Rfc3339).unwrap_or_else(|_| dt.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_storage(dir: &Path) -> Storage {
        Storage::open(&dir.join("index.db")).expect("open")
    }

    #[test]
    fn indexes_new_files_and_reports_stats() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("hello.py"), "print('hi')\n").expect("write");

        let workdir = tempdir().expect("storage dir");
        let mut storage = open_storage(workdir.path());
        let matcher = IgnoreMatcher::new(&[]);

        let stats = index_directory(dir.path(), &mut storage, &matcher).expect("index");
        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.languages.get("python"), Some(&1));
    }

    #[test]
    fn reindexing_unchanged_tree_is_a_no_op_for_content() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("hello.py"), "print('hi')\n").expect("write");

        let workdir = tempdir().expect("storage dir");
        let mut storage = open_storage(workdir.path());
        let matcher = IgnoreMatcher::new(&[]);

        index_directory(dir.path(), &mut storage, &matcher).expect("first index");
        let fingerprint_before = storage.lookup_fingerprint("hello.py").expect("lookup");

        index_directory(dir.path(), &mut storage, &matcher).expect("second index");
        let fingerprint_after = storage.lookup_fingerprint("hello.py").expect("lookup");

        assert_eq!(fingerprint_before, fingerprint_after);
    }

    #[test]
    fn removes_deleted_files_from_index() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("keep.py"), "x = 1\n").expect("write");
        fs::write(dir.path().join("gone.py"), "y = 2\n").expect("write");

        let workdir = tempdir().expect("storage dir");
        let mut storage = open_storage(workdir.path());
        let matcher = IgnoreMatcher::new(&[]);

        index_directory(dir.path(), &mut storage, &matcher).expect("first index");
        fs::remove_file(dir.path().join("gone.py")).expect("remove");
        index_directory(dir.path(), &mut storage, &matcher).expect("second index");

        let remaining = storage.enumerate(None).expect("enumerate");
        assert_eq!(remaining, vec!["keep.py".to_string()]);
    }
}
