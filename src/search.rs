//! Read-only catalog lookup.
//!
//! Small, typo-prone catalogs use fuzzy best-match scoring against item
//! names; large catalogs use substring containment over a precomputed
//! search string, with popularity as the tie-break.

use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::core::CatalogItem;

/// Per-domain search behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Jaro-Winkler percentage against item names, results below
    /// `cutoff` dropped
    Fuzzy { cutoff: f64 },
    /// Containment over the lowercase "name creator" search string
    Substring,
}

/// Search the catalog, returning up to `limit` items ranked best-first.
///
/// An empty or whitespace query returns no results.
pub fn search(catalog: &Catalog, query: &str, limit: usize, mode: SearchMode) -> Vec<CatalogItem> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    match mode {
        SearchMode::Fuzzy { cutoff } => fuzzy(catalog, query, limit, cutoff),
        SearchMode::Substring => substring(catalog, query, limit),
    }
}

fn fuzzy(catalog: &Catalog, query: &str, limit: usize, cutoff: f64) -> Vec<CatalogItem> {
    let query_lower = query.to_lowercase();

    let mut scored: Vec<(usize, f64)> = catalog
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let name_lower = item.name.to_lowercase();
            let score =
                jaro_winkler::normalized_similarity(query_lower.chars(), name_lower.chars()) * 100.0;
            (i, score)
        })
        .filter(|(_, score)| *score >= cutoff)
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let pa = catalog.item(a.0).popularity;
                let pb = catalog.item(b.0).popularity;
                pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(i, _)| catalog.item(i).clone())
        .collect()
}

fn substring(catalog: &Catalog, query: &str, limit: usize) -> Vec<CatalogItem> {
    let query_lower = query.to_lowercase();

    let mut hits: Vec<usize> = (0..catalog.len())
        .filter(|i| catalog.search_string(*i).contains(&query_lower))
        .collect();

    hits.sort_by(|a, b| {
        let pa = catalog.item(*a).popularity;
        let pb = catalog.item(*b).popularity;
        pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
    });

    hits.into_iter()
        .take(limit)
        .map(|i| catalog.item(i).clone())
        .collect()
}
