//! Scanner: walks a root directory and yields files eligible for
//! indexing (recognized suffix, not ignored).

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::MawError;
use crate::ignore_rules::IgnoreMatcher;
use crate::language;
use crate::models::Language;

/// Walk `root` and collect every file whose suffix classifies to a
/// known language and whose path is not ignored.
///
/// Order is unspecified but stable within a single traversal: the
/// underlying `ignore` walker is depth-first and deterministic for a
/// fixed filesystem layout.
pub fn scan(root: &Path, ignore_matcher: &IgnoreMatcher) -> Result<Vec<PathBuf>, MawError> {
    if !root.is_dir() {
        return Err(MawError::NotADirectory(root.to_path_buf()));
    }

    let mut out = Vec::new();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();

        if ignore_matcher.is_ignored(path, root) {
            continue;
        }

        if language::classify_path(path) == Language::Unknown {
            continue;
        }

        out.push(path.to_path_buf());
    }

    Ok(out)
}
