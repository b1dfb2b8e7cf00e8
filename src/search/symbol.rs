//! Symbol Planner: regex-based symbol search over stored file
//! content. No AST or tree-sitter grammar is involved — each symbol
//! kind has a fixed, ordered table of patterns built around the
//! requested name, not a generic identifier-capturing scan.

use regex::Regex;

use crate::error::MawError;
use crate::index::Storage;
use crate::models::{Filters, SearchResult, SearchType, SymbolKind};

const DISPLAY_CONTENT_LIMIT: usize = 500;

/// One templated pattern in the fixed precedence table. `%NAME%` is
/// substituted with the escaped symbol name before compiling.
struct PatternTemplate {
    kind: SymbolKind,
    template: &'static str,
}

const PATTERN_TABLE: &[PatternTemplate] = &[
    PatternTemplate {
        kind: SymbolKind::Function,
        template: r"def\s+%NAME%\s*\(",
    },
    PatternTemplate {
        kind: SymbolKind::Function,
        template: r"function\s+%NAME%\s*\(",
    },
    PatternTemplate {
        kind: SymbolKind::Function,
        template: r"func\s+%NAME%\s*\(",
    },
    PatternTemplate {
        kind: SymbolKind::Function,
        template: r"fn\s+%NAME%\s*\(",
    },
    PatternTemplate {
        kind: SymbolKind::Class,
        template: r"class\s+%NAME%\s*[:(]",
    },
    PatternTemplate {
        kind: SymbolKind::Class,
        template: r"struct\s+%NAME%\s*\{",
    },
    PatternTemplate {
        kind: SymbolKind::Class,
        template: r"interface\s+%NAME%\s*\{",
    },
    PatternTemplate {
        kind: SymbolKind::Variable,
        template: r"(?:const|let|var)\s+%NAME%\s*=",
    },
    PatternTemplate {
        kind: SymbolKind::Variable,
        template: r"%NAME%\s*:=",
    },
    PatternTemplate {
        kind: SymbolKind::Variable,
        template: r"(?:let|const)\s+%NAME%\s*:",
    },
];

/// Search stored files for a symbol name. When `kind` is `None`, the
/// union of every kind's patterns is tried, in the table's fixed
/// order; otherwise only that kind's patterns participate. For each
/// file, the first pattern (in table order) with any match wins —
/// the file's score is that pattern's match count.
pub fn search(
    storage: &Storage,
    kind: Option<SymbolKind>,
    name_query: &str,
    filters: &Filters,
    limit: usize,
) -> Result<Vec<SearchResult>, MawError> {
    let escaped_name = regex::escape(name_query);
    let patterns: Vec<Regex> = PATTERN_TABLE
        .iter()
        .filter(|p| kind.map(|k| k == p.kind).unwrap_or(true))
        .map(|p| {
            let pattern = p.template.replace("%NAME%", &escaped_name);
            Regex::new(&pattern).expect("symbol pattern compiles")
        })
        .collect();

    let mut hits: Vec<SearchResult> = Vec::new();

    for (path, content, language) in storage.read_all()? {
        if let Some(filter_lang) = &filters.language {
            if &language != filter_lang {
                continue;
            }
        }
        if let Some(substr) = &filters.path_substring {
            if !path.contains(substr.as_str()) {
                continue;
            }
        }

        let Some((line_number, match_context, highlights, score)) =
            first_winning_pattern(&patterns, &content)
        else {
            continue;
        };

        let display_content: String = content.chars().take(DISPLAY_CONTENT_LIMIT).collect();
        hits.push(SearchResult {
            path,
            content: display_content,
            score,
            line_number,
            match_context,
            search_type: SearchType::Symbol,
            highlights,
        });
    }

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(limit);
    Ok(hits)
}

/// Try each pattern in order; the first with any match in `content`
/// decides this file's line number, context, highlights, and score.
fn first_winning_pattern(
    patterns: &[Regex],
    content: &str,
) -> Option<(u32, String, Vec<String>, f64)> {
    for pattern in patterns {
        let matches: Vec<_> = pattern.find_iter(content).collect();
        if matches.is_empty() {
            continue;
        }

        let first = &matches[0];
        let line_number = byte_offset_to_line(content, first.start());
        let match_context = context_around(content, line_number);
        let highlights = matches
            .iter()
            .take(3)
            .map(|m| m.as_str().to_string())
            .collect();

        return Some((line_number, match_context, highlights, matches.len() as f64));
    }
    None
}

fn byte_offset_to_line(content: &str, offset: usize) -> u32 {
    content[..offset].matches('\n').count() as u32 + 1
}

fn context_around(content: &str, line_number: u32) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let idx = (line_number as usize).saturating_sub(1);
    let start = idx.saturating_sub(2);
    let end = (idx + 3).min(lines.len());
    lines[start..end].join("\n")
}
