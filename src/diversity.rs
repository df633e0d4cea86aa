//! Per-creator diversity decay.
//!
//! A strictly sequential greedy pass, not a constrained-optimization
//! diversity solution: candidates are walked in hybrid-score order and the
//! Nth item from one creator is multiplied by `decay^N`. Correctness
//! depends on the processing order, so this stage must never be
//! parallelized or re-sorted mid-pass.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::core::RankedCandidate;

/// Annotate candidates with their penalized score and return them sorted
/// by it, descending.
///
/// Ties in `hybrid_score` keep their incoming (catalog) order: the sort is
/// stable and candidates arrive in ascending index order. A decay of 1.0
/// makes this a no-op re-sort.
pub fn rerank(
    mut candidates: Vec<RankedCandidate>,
    catalog: &Catalog,
    decay: f64,
) -> Vec<RankedCandidate> {
    candidates.sort_by(|a, b| {
        b.hybrid_score
            .partial_cmp(&a.hybrid_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut counts: HashMap<String, i32> = HashMap::new();
    for candidate in candidates.iter_mut() {
        let key = catalog.item(candidate.index).creator_key();
        let count = counts.entry(key).or_insert(0);
        candidate.penalized_score = candidate.hybrid_score * decay.powi(*count);
        *count += 1;
    }

    candidates.sort_by(|a, b| {
        b.penalized_score
            .partial_cmp(&a.penalized_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    candidates
}
