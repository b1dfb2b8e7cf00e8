//! Shared data models for the indexing-and-search engine.
//!
//! These types form the stable JSON API surface used by the CLI.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Closed set of language tags produced by the classifier.
///
/// `Unknown` is reachable from `classify()` but never stored: the
/// scanner filters it out before a file reaches the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Swift,
    Kotlin,
    Scala,
    Shell,
    Html,
    Css,
    Json,
    Yaml,
    Toml,
    Markdown,
    Sql,
    Unknown,
}

impl Language {
    /// Stable lowercase tag used for storage, filtering, and JSON.
    pub fn as_tag(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Scala => "scala",
            Language::Shell => "shell",
            Language::Html => "html",
            Language::Css => "css",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Toml => "toml",
            Language::Markdown => "markdown",
            Language::Sql => "sql",
            Language::Unknown => "unknown",
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "rust" => Language::Rust,
            "python" => Language::Python,
            "javascript" => Language::JavaScript,
            "typescript" => Language::TypeScript,
            "go" => Language::Go,
            "java" => Language::Java,
            "c" => Language::C,
            "cpp" => Language::Cpp,
            "csharp" => Language::CSharp,
            "ruby" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "kotlin" => Language::Kotlin,
            "scala" => Language::Scala,
            "shell" => Language::Shell,
            "html" => Language::Html,
            "css" => Language::Css,
            "json" => Language::Json,
            "yaml" => Language::Yaml,
            "toml" => Language::Toml,
            "markdown" => Language::Markdown,
            "sql" => Language::Sql,
            _ => Language::Unknown,
        }
    }
}

/// Kind of a symbol the Symbol Planner can look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Variable,
}

/// Mode requested for a search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    FullText,
    Semantic,
    Hybrid,
}

/// How a `SearchResult` was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    FullText,
    Symbol,
    File,
    Hybrid,
}

/// A single ranked hit returned by any planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub path: String,
    pub content: String,
    pub score: f64,
    pub line_number: u32,
    pub match_context: String,
    pub search_type: SearchType,
    pub highlights: Vec<String>,
}

/// Read-only filters shared by every planner.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub language: Option<String>,
    pub path_substring: Option<String>,
}

/// Persisted, singleton index statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsBlob {
    pub total_files: u64,
    pub total_lines: u64,
    pub total_size: u64,
    pub languages: HashMap<String, u64>,
    pub last_indexed: Option<String>,
    #[serde(default = "default_index_version")]
    pub index_version: String,
}

fn default_index_version() -> String {
    "1.0".to_string()
}

impl Default for StatsBlob {
    fn default() -> Self {
        StatsBlob {
            total_files: 0,
            total_lines: 0,
            total_size: 0,
            languages: HashMap::new(),
            last_indexed: None,
            index_version: default_index_version(),
        }
    }
}

/// A record ready to be upserted into Storage.
#[derive(Debug, Clone)]
pub struct FileRecordInput<'a> {
    pub path: &'a str,
    pub content: &'a str,
    pub language: &'a str,
    pub size: u64,
    pub last_modified: i64,
    pub content_hash: &'a str,
    pub indexed_at: i64,
}
