//! Language Classifier: a pure function from file suffix to a closed
//! language tag.

use crate::models::Language;

/// Classify a file suffix (with or without a leading dot) into a
/// language tag. Case-insensitive. Unknown suffixes yield
/// `Language::Unknown`, which the scanner treats as a skip signal.
pub fn classify(suffix: &str) -> Language {
    let normalized = suffix.trim_start_matches('.').to_ascii_lowercase();
    match normalized.as_str() {
        "rs" => Language::Rust,
        "py" | "pyi" | "pyw" => Language::Python,
        "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
        "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
        "go" => Language::Go,
        "java" => Language::Java,
        "c" | "h" => Language::C,
        "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
        "cs" => Language::CSharp,
        "rb" => Language::Ruby,
        "php" => Language::Php,
        "swift" => Language::Swift,
        "kt" | "kts" => Language::Kotlin,
        "scala" | "sc" => Language::Scala,
        "sh" | "bash" | "zsh" => Language::Shell,
        "html" | "htm" => Language::Html,
        "css" | "scss" | "sass" | "less" => Language::Css,
        "json" => Language::Json,
        "yaml" | "yml" => Language::Yaml,
        "toml" => Language::Toml,
        "md" | "markdown" => Language::Markdown,
        "sql" => Language::Sql,
        _ => Language::Unknown,
    }
}

/// Classify a path by its extension.
pub fn classify_path(path: &std::path::Path) -> Language {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => classify(ext),
        None => Language::Unknown,
    }
}
