//! Match Extractor: builds display context and highlights around the
//! first case-insensitive substring hit of a needle inside a file's
//! content.

#[derive(Debug, PartialEq, Eq)]
pub struct MatchExtraction {
    pub line_number: u32,
    pub match_context: String,
    pub highlights: Vec<String>,
}

impl MatchExtraction {
    fn empty() -> Self {
        MatchExtraction {
            line_number: 0,
            match_context: String::new(),
            highlights: Vec::new(),
        }
    }
}

/// Locate the first case-insensitive occurrence of `needle` in
/// `content` and build up to 3 lines of context plus up to 3
/// highlighted matching lines. Returns the zeroed sentinel (line 0,
/// empty context, no highlights) when `needle` does not occur at all
/// — the caller still surfaces a result for the row, it just carries
/// no match detail.
pub fn extract(content: &str, needle: &str) -> MatchExtraction {
    if needle.is_empty() {
        return MatchExtraction::empty();
    }

    let lower_needle = needle.to_lowercase();
    let lines: Vec<&str> = content.lines().collect();

    let Some(first_hit) = lines
        .iter()
        .position(|line| line.to_lowercase().contains(&lower_needle))
    else {
        return MatchExtraction::empty();
    };

    let start = first_hit.saturating_sub(2);
    let end = (first_hit + 3).min(lines.len());
    let match_context = lines[start..end].join("\n");

    let highlights = lines
        .iter()
        .filter(|line| line.to_lowercase().contains(&lower_needle))
        .take(3)
        .map(|line| line.trim().to_string())
        .collect();

    MatchExtraction {
        line_number: (first_hit + 1) as u32,
        match_context,
        highlights,
    }
}
