//! Hybrid Planner: fuses the Full-Text Planner with an optional
//! pluggable semantic backend via Reciprocal Rank Fusion.
//!
//! No concrete embedding backend ships here; `SemanticPlanner` is a
//! capability other code can supply. When it is absent, or it
//! returns an error, the Hybrid Planner degrades to the full-text
//! ranking alone and only logs a warning — callers never see a
//! distinct error for an unavailable semantic backend.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::error::MawError;
use crate::index::Storage;
use crate::models::{Filters, SearchResult, SearchType};
use crate::search::fulltext;

const RRF_K: f64 = 60.0;

/// A pluggable semantic/embedding-based search capability.
pub trait SemanticPlanner: Send + Sync {
    fn search(
        &self,
        query: &str,
        filters: &Filters,
        limit: usize,
    ) -> Result<Vec<SearchResult>, MawError>;
}

/// Run the Hybrid Planner: fuse full-text results with semantic
/// results (when a backend is configured and available) via RRF with
/// `k = 60`.
pub fn search(
    storage: &Storage,
    semantic: Option<&Arc<dyn SemanticPlanner>>,
    raw_query: &str,
    filters: &Filters,
    limit: usize,
) -> Result<Vec<SearchResult>, MawError> {
    let oversampled = limit.saturating_mul(2);
    let mut fulltext_results = fulltext::search(storage, raw_query, filters, oversampled)?;

    let Some(backend) = semantic else {
        fulltext_results.truncate(limit);
        return Ok(fulltext_results);
    };

    match backend.search(raw_query, filters, oversampled) {
        Ok(semantic_results) => Ok(fuse(&[fulltext_results, semantic_results], limit)),
        Err(err) => {
            warn!(error = %err, "semantic backend unavailable, degrading to full-text only");
            fulltext_results.truncate(limit);
            Ok(fulltext_results)
        }
    }
}

/// Reciprocal Rank Fusion across an arbitrary number of ranked
/// lists: each list contributes `1 / (k + rank + 1)` (0-indexed rank)
/// to a result's combined score; the first list to surface a path
/// supplies the surviving `SearchResult` object, with only its score
/// and `search_type` overwritten.
fn fuse(ranked_lists: &[Vec<SearchResult>], limit: usize) -> Vec<SearchResult> {
    let mut order: Vec<String> = Vec::new();
    let mut combined: HashMap<String, (SearchResult, f64)> = HashMap::new();

    for list in ranked_lists {
        for (rank, result) in list.iter().enumerate() {
            let contribution = 1.0 / (RRF_K + rank as f64 + 1.0);
            match combined.get_mut(&result.path) {
                Some((_, score)) => *score += contribution,
                None => {
                    order.push(result.path.clone());
                    let mut owned = result.clone();
                    owned.search_type = SearchType::Hybrid;
                    combined.insert(result.path.clone(), (owned, contribution));
                }
            }
        }
    }

    let mut fused: Vec<SearchResult> = order
        .into_iter()
        .map(|path| {
            let (mut result, score) = combined.remove(&path).expect("path tracked in order");
            result.score = score;
            result
        })
        .collect();

    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    fused.truncate(limit);
    fused
}
