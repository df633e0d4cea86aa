//! Cosine similarity over the catalog feature matrix.
//!
//! Two profile-construction modes are supported, selected per domain:
//!
//! - **PerSeedMerge**: one similarity pass per seed, union of each seed's
//!   top-K neighbors, max similarity kept for items reached from several
//!   seeds. Rewards items close to *any* seed.
//! - **AveragedProfile**: one pass against the elementwise mean of the
//!   seed vectors. Rewards items close to the overall taste center.
//!
//! Seeds are always excluded from the candidate set, in either mode.

use std::collections::HashSet;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// Per-domain profile-construction mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    PerSeedMerge { top_k: usize },
    AveragedProfile,
}

/// Cosine similarity of one query vector against one catalog row.
///
/// Returns 0.0 when either norm is zero. For arbitrary real-valued
/// vectors the result lies in [-1, 1]; for non-negative feature spaces
/// it lies in [0, 1].
fn cosine(query: &ArrayView1<'_, f32>, query_norm: f64, row: &ArrayView1<'_, f32>, row_norm: f64) -> f64 {
    if query_norm == 0.0 || row_norm == 0.0 {
        return 0.0;
    }
    let dot: f64 = query
        .iter()
        .zip(row.iter())
        .map(|(a, b)| *a as f64 * *b as f64)
        .sum();
    dot / (query_norm * row_norm)
}

fn vector_norm(v: &ArrayView1<'_, f32>) -> f64 {
    v.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt()
}

/// Compute candidate similarities for a resolved seed set.
///
/// Returns `(catalog_index, similarity)` pairs in ascending index order,
/// which later stages rely on as the stable tie-break basis. Seed rows
/// never appear in the output.
pub fn similarities(catalog: &Catalog, seeds: &[usize], mode: SimilarityMode) -> Vec<(usize, f64)> {
    if seeds.is_empty() {
        return Vec::new();
    }
    let excluded: HashSet<usize> = seeds.iter().copied().collect();

    match mode {
        SimilarityMode::PerSeedMerge { top_k } => per_seed_merge(catalog, seeds, &excluded, top_k),
        SimilarityMode::AveragedProfile => averaged_profile(catalog, seeds, &excluded),
    }
}

fn per_seed_merge(
    catalog: &Catalog,
    seeds: &[usize],
    excluded: &HashSet<usize>,
    top_k: usize,
) -> Vec<(usize, f64)> {
    // Best similarity per candidate across all seeds, keyed by row index
    let mut best: Vec<Option<f64>> = vec![None; catalog.len()];

    for &seed in seeds {
        let query = catalog.row(seed);
        let query_norm = catalog.norm(seed);

        let mut scored: Vec<(usize, f64)> = (0..catalog.len())
            .filter(|i| !excluded.contains(i))
            .map(|i| {
                let sim = cosine(&query, query_norm, &catalog.row(i), catalog.norm(i));
                (i, sim)
            })
            .collect();

        // Top-K neighbors of this seed only
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        for (i, sim) in scored.into_iter().take(top_k) {
            let slot = &mut best[i];
            match slot {
                Some(existing) if *existing >= sim => {}
                _ => *slot = Some(sim),
            }
        }
    }

    best.into_iter()
        .enumerate()
        .filter_map(|(i, sim)| sim.map(|s| (i, s)))
        .collect()
}

fn averaged_profile(
    catalog: &Catalog,
    seeds: &[usize],
    excluded: &HashSet<usize>,
) -> Vec<(usize, f64)> {
    let mut profile = Array1::<f32>::zeros(catalog.dim());
    for &seed in seeds {
        profile += &catalog.row(seed);
    }
    profile /= seeds.len() as f32;

    let view = profile.view();
    let profile_norm = vector_norm(&view);

    (0..catalog.len())
        .filter(|i| !excluded.contains(i))
        .map(|i| {
            let sim = cosine(&view, profile_norm, &catalog.row(i), catalog.norm(i));
            (i, sim)
        })
        .collect()
}
