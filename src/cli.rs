//! Command-line surface: `index`, `search`, `symbol`, `files`,
//! `stats`, `clear`, `list-files`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use maw::ignore_rules::IgnoreMatcher;
use maw::index::Storage;
use maw::models::{Filters, SearchResult, SymbolKind};
use maw::search::{filename, fulltext, hybrid, symbol};
use maw::{indexer, MawError};

use crate::lock::LockGuard;

#[derive(Parser)]
#[command(name = "maw", about = "Local code search engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory and update its index.
    Index {
        #[arg(default_value = ".")]
        directory: PathBuf,
        #[arg(long = "index-path")]
        index_path: Option<PathBuf>,
        #[arg(long = "ignore")]
        ignore_patterns: Vec<String>,
    },
    /// Full-text, semantic, or hybrid search over indexed content.
    Search {
        query: String,
        #[arg(long = "index-path")]
        index_path: Option<PathBuf>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long = "path")]
        path_substring: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = ModeArg::FullText)]
        mode: ModeArg,
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },
    /// Search for a symbol by name, optionally restricted to a type.
    Symbol {
        name: String,
        #[arg(long = "type", value_enum)]
        symbol_type: Option<SymbolKindArg>,
        #[arg(long = "index-path")]
        index_path: Option<PathBuf>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long = "path")]
        path_substring: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },
    /// Search for files by a shell-style glob over their path.
    Files {
        pattern: String,
        #[arg(long = "index-path")]
        index_path: Option<PathBuf>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },
    /// Show index-wide statistics, or report that nothing is indexed.
    Stats {
        #[arg(long = "index-path")]
        index_path: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },
    /// Drop the index.
    Clear {
        #[arg(long = "index-path")]
        index_path: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
    /// List every indexed file, optionally filtered by language.
    ListFiles {
        #[arg(long = "index-path")]
        index_path: Option<PathBuf>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    FullText,
    Semantic,
    Hybrid,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SymbolKindArg {
    Function,
    Class,
    Variable,
}

impl From<SymbolKindArg> for SymbolKind {
    fn from(value: SymbolKindArg) -> Self {
        match value {
            SymbolKindArg::Function => SymbolKind::Function,
            SymbolKindArg::Class => SymbolKind::Class,
            SymbolKindArg::Variable => SymbolKind::Variable,
        }
    }
}

/// Default index location for a given base directory: `<base>/.maw/index/code.db`.
fn default_index_path(base: &Path) -> PathBuf {
    base.join(".maw").join("index").join("code.db")
}

fn resolve_index_path(explicit: Option<PathBuf>, base: &Path) -> PathBuf {
    explicit.unwrap_or_else(|| default_index_path(base))
}

fn open_existing_storage(index_path: &Path) -> Result<Storage, MawError> {
    if !index_path.exists() {
        return Err(MawError::IndexMissing(index_path.to_path_buf()));
    }
    Storage::open(index_path)
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Index {
            directory,
            index_path,
            ignore_patterns,
        } => run_index(&directory, index_path, ignore_patterns),
        Commands::Search {
            query,
            index_path,
            language,
            path_substring,
            limit,
            mode,
            format,
        } => run_search(index_path, &query, language, path_substring, limit, mode, format),
        Commands::Symbol {
            name,
            symbol_type,
            index_path,
            language,
            path_substring,
            limit,
            format,
        } => run_symbol(index_path, symbol_type, &name, language, path_substring, limit, format),
        Commands::Files {
            pattern,
            index_path,
            limit,
            format,
        } => run_files(index_path, &pattern, limit, format),
        Commands::Stats { index_path, format } => run_stats(index_path, format),
        Commands::Clear { index_path, force } => run_clear(index_path, force),
        Commands::ListFiles {
            index_path,
            language,
            format,
        } => run_list_files(index_path, language, format),
    }
}

fn run_index(
    directory: &Path,
    index_path: Option<PathBuf>,
    ignore_patterns: Vec<String>,
) -> anyhow::Result<()> {
    let index_path = resolve_index_path(index_path, directory);
    let _guard = LockGuard::acquire(index_path.parent().unwrap_or(Path::new(".")))?;

    let mut storage = Storage::open(&index_path)?;
    let matcher = IgnoreMatcher::new(&ignore_patterns);
    let stats = indexer::index_directory(directory, &mut storage, &matcher)?;
    println!(
        "indexed {} files, {} lines, {} bytes",
        stats.total_files, stats.total_lines, stats.total_size
    );
    Ok(())
}

fn run_search(
    index_path: Option<PathBuf>,
    query: &str,
    language: Option<String>,
    path_substring: Option<String>,
    limit: usize,
    mode: ModeArg,
    format: FormatArg,
) -> anyhow::Result<()> {
    let index_path = resolve_index_path(index_path, Path::new("."));
    let storage = open_existing_storage(&index_path)?;
    let filters = Filters {
        language,
        path_substring,
    };

    let results = match mode {
        ModeArg::FullText => fulltext::search(&storage, query, &filters, limit)?,
        ModeArg::Hybrid => {
            let semantic: Option<&Arc<dyn hybrid::SemanticPlanner>> = None;
            hybrid::search(&storage, semantic, query, &filters, limit)?
        }
        ModeArg::Semantic => {
            tracing::warn!("semantic backend unavailable, falling back to full-text");
            fulltext::search(&storage, query, &filters, limit)?
        }
    };

    render(&results, format);
    Ok(())
}

fn run_symbol(
    index_path: Option<PathBuf>,
    symbol_type: Option<SymbolKindArg>,
    name: &str,
    language: Option<String>,
    path_substring: Option<String>,
    limit: usize,
    format: FormatArg,
) -> anyhow::Result<()> {
    let index_path = resolve_index_path(index_path, Path::new("."));
    let storage = open_existing_storage(&index_path)?;
    let filters = Filters {
        language,
        path_substring,
    };
    let results = symbol::search(&storage, symbol_type.map(Into::into), name, &filters, limit)?;
    render(&results, format);
    Ok(())
}

fn run_files(
    index_path: Option<PathBuf>,
    pattern: &str,
    limit: usize,
    format: FormatArg,
) -> anyhow::Result<()> {
    let index_path = resolve_index_path(index_path, Path::new("."));
    let storage = open_existing_storage(&index_path)?;
    let results = filename::search(&storage, pattern, limit)?;
    render(&results, format);
    Ok(())
}

fn run_stats(index_path: Option<PathBuf>, format: FormatArg) -> anyhow::Result<()> {
    let index_path = resolve_index_path(index_path, Path::new("."));

    if !index_path.exists() {
        match format {
            FormatArg::Json => println!("null"),
            FormatArg::Text => println!("not indexed"),
        }
        return Ok(());
    }

    let storage = Storage::open(&index_path)?;
    let stats = storage.get_stats()?.unwrap_or_default();

    match format {
        FormatArg::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        FormatArg::Text => {
            println!("total files: {}", stats.total_files);
            println!("total lines: {}", stats.total_lines);
            println!("total size:  {} bytes", stats.total_size);
            println!("index version: {}", stats.index_version);
            if let Some(last_indexed) = &stats.last_indexed {
                println!("last indexed: {last_indexed}");
            }
            let mut languages: Vec<(&String, &u64)> = stats.languages.iter().collect();
            languages.sort_by(|a, b| a.0.cmp(b.0));
            for (language, count) in languages {
                println!("  {language}: {count}");
            }
        }
    }
    Ok(())
}

fn run_clear(index_path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    if !force {
        anyhow::bail!("this drops the entire index; pass --force to confirm");
    }

    let index_path = resolve_index_path(index_path, Path::new("."));
    let _guard = LockGuard::acquire(index_path.parent().unwrap_or(Path::new(".")))?;
    let mut storage = Storage::open(&index_path)?;
    storage.clear()?;
    println!("index cleared");
    Ok(())
}

fn run_list_files(
    index_path: Option<PathBuf>,
    language: Option<String>,
    format: FormatArg,
) -> anyhow::Result<()> {
    let index_path = resolve_index_path(index_path, Path::new("."));
    let storage = open_existing_storage(&index_path)?;
    let paths = storage.enumerate(language.as_deref())?;

    match format {
        FormatArg::Json => println!("{}", serde_json::to_string_pretty(&paths)?),
        FormatArg::Text => {
            for path in paths {
                println!("{path}");
            }
        }
    }
    Ok(())
}

fn render(results: &[SearchResult], format: FormatArg) {
    match format {
        FormatArg::Json => {
            if let Ok(text) = serde_json::to_string_pretty(results) {
                println!("{text}");
            }
        }
        FormatArg::Text => {
            for result in results {
                println!("{}:{} (score {:.4})", result.path, result.line_number, result.score);
                for highlight in &result.highlights {
                    println!("  {highlight}");
                }
            }
        }
    }
}
