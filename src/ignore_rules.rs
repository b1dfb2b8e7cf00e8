//! Ignore Matcher: evaluates a path against file-name, relative-path,
//! and ancestor-directory glob patterns.

use std::path::Path;

use globset::Glob;

/// Default ignore patterns covering common dependency directories,
/// build outputs, editor metadata, compiled artifacts, lockfiles, and
/// minified assets.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "vendor",
    ".git",
    ".hg",
    ".svn",
    ".venv",
    "venv",
    "__pycache__",
    ".idea",
    ".vscode",
    ".DS_Store",
    "*.pyc",
    "*.class",
    "*.o",
    "*.so",
    "*.dll",
    "*.dylib",
    "*.min.js",
    "*.min.css",
    "Cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
];

/// Glob-tests a path against a caller-supplied pattern list plus the
/// built-in defaults.
pub struct IgnoreMatcher {
    patterns: Vec<String>,
}

impl IgnoreMatcher {
    pub fn new(extra_patterns: &[String]) -> Self {
        let mut patterns: Vec<String> = DEFAULT_IGNORE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        patterns.extend(extra_patterns.iter().cloned());
        IgnoreMatcher { patterns }
    }

    /// Whether `path` (absolute or relative) should be ignored,
    /// relative to `root`.
    pub fn is_ignored(&self, path: &Path, root: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);

        let file_name = relative
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        for pattern in &self.patterns {
            if glob_match(pattern, file_name) {
                return true;
            }
        }

        let relative_str = relative.to_string_lossy().replace('\\', "/");
        for pattern in &self.patterns {
            if glob_match(pattern, &relative_str) {
                return true;
            }
        }

        for component in relative.components() {
            let segment = component.as_os_str().to_string_lossy();
            for pattern in &self.patterns {
                if segment == pattern.as_str() || glob_match(pattern, &segment) {
                    return true;
                }
            }
        }

        false
    }
}

fn glob_match(pattern: &str, candidate: &str) -> bool {
    match Glob::new(pattern) {
        Ok(glob) => glob.compile_matcher().is_match(candidate),
        Err(_) => pattern == candidate,
    }
}
