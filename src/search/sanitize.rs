//! Query Sanitizer: turns a raw user query into something FTS5 will
//! accept, without ever string-matching on FTS5's own error text.
//!
//! Policy:
//! - If the query contains whitespace and does not already start
//!   with a double-quote, wrap it in double quotes and double any
//!   embedded double-quotes — a phrase query.
//! - Otherwise, replace each of `* " ' ( ) - + : ^ ~` with a space
//!   and collapse consecutive whitespace — a bag-of-words query.
//!
//! This is lossy for operators a user might have intended, but FTS5's
//! grammar reserves those characters and naive pass-through would
//! raise a syntax error.

const RESERVED: &[char] = &['*', '"', '\'', '(', ')', '-', '+', ':', '^', '~'];

/// Sanitize a raw query string for use with `Storage::full_text_query`.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.chars().any(char::is_whitespace) && !trimmed.starts_with('"') {
        let escaped = trimmed.replace('"', "\"\"");
        return format!("\"{escaped}\"");
    }

    let stripped: String = trimmed
        .chars()
        .map(|c| if RESERVED.contains(&c) { ' ' } else { c })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
