//! Score-to-display normalization.
//!
//! Raw penalized scores are meaningless to users; each domain maps them
//! onto a bounded presentation band. The mapping is a presentation choice,
//! not a similarity measurement, and must be deterministic for identical
//! scored input (the fixed-tier draws use a config-seeded RNG).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::RankedCandidate;

const LOG_EPSILON: f64 = 1e-9;

/// Per-domain display normalization strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStrategy {
    /// Anchor the top score and a reference score at a fixed rank offset,
    /// then map the log-range between them onto `[floor, top]` with a
    /// square-root curve (middle ranks compress toward the top).
    LogRelative {
        top: f64,
        floor: f64,
        reference_rank: usize,
    },
    /// The top three ranks draw from three disjoint fixed ranges; the rest
    /// are min-max normalized, shaped with `norm^curve` to spread the low
    /// end, and mapped onto `[rest_floor, rest_ceil]`. Zero spread in the
    /// rest collapses to `flat`.
    FixedTiers {
        tiers: [(f64, f64); 3],
        rest_floor: f64,
        rest_ceil: f64,
        curve: f64,
        flat: f64,
        seed: u64,
    },
}

/// Annotate candidates (sorted by penalized score, descending) with their
/// display score.
pub fn normalize(candidates: &mut [RankedCandidate], strategy: &DisplayStrategy) {
    if candidates.is_empty() {
        return;
    }
    match strategy {
        DisplayStrategy::LogRelative {
            top,
            floor,
            reference_rank,
        } => log_relative(candidates, *top, *floor, *reference_rank),
        DisplayStrategy::FixedTiers {
            tiers,
            rest_floor,
            rest_ceil,
            curve,
            flat,
            seed,
        } => fixed_tiers(candidates, tiers, *rest_floor, *rest_ceil, *curve, *flat, *seed),
    }
}

fn log_relative(candidates: &mut [RankedCandidate], top: f64, floor: f64, reference_rank: usize) {
    if candidates.len() == 1 {
        candidates[0].display_score = top;
        return;
    }

    let log_scores: Vec<f64> = candidates
        .iter()
        .map(|c| (c.penalized_score + LOG_EPSILON).ln())
        .collect();

    let log_max = log_scores[0];
    let log_ref = log_scores[reference_rank.min(log_scores.len() - 1)];

    if log_max <= log_ref {
        // Degenerate spread: everything is "the best"
        for c in candidates.iter_mut() {
            c.display_score = top;
        }
        return;
    }

    let log_range = log_max - log_ref;
    let display_range = top - floor;
    for (c, ls) in candidates.iter_mut().zip(log_scores) {
        let relative = ((ls - log_ref) / log_range).clamp(0.0, 1.0);
        c.display_score = relative.sqrt() * display_range + floor;
    }
}

fn fixed_tiers(
    candidates: &mut [RankedCandidate],
    tiers: &[(f64, f64); 3],
    rest_floor: f64,
    rest_ceil: f64,
    curve: f64,
    flat: f64,
    seed: u64,
) {
    let mut rng = StdRng::seed_from_u64(seed);
    for (c, (lo, hi)) in candidates.iter_mut().zip(tiers.iter()) {
        c.display_score = rng.gen_range(*lo..*hi);
    }

    if candidates.len() <= 3 {
        return;
    }

    let rest = &mut candidates[3..];
    let min = rest
        .iter()
        .map(|c| c.penalized_score)
        .fold(f64::INFINITY, f64::min);
    let max = rest
        .iter()
        .map(|c| c.penalized_score)
        .fold(f64::NEG_INFINITY, f64::max);

    if max > min {
        let span = rest_ceil - rest_floor;
        for c in rest.iter_mut() {
            let norm = (c.penalized_score - min) / (max - min);
            c.display_score = rest_floor + norm.powf(curve) * span;
        }
    } else {
        for c in rest.iter_mut() {
            c.display_score = flat;
        }
    }
}
