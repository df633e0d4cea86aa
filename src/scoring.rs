//! Hybrid scoring: blend of content similarity and the quality prior.
//!
//! Both inputs are rescaled onto a 0-100 band first, then fused:
//!
//! ```text
//! hybrid = sim_weight * sim_pct + quality_weight * quality_pct
//! ```
//!
//! The similarity rescale uses a domain-specific ceiling: sparse feature
//! spaces (TF-IDF text) rarely produce cosine values near 1.0, so the
//! ceiling anchors "a very good match" for that domain and anything above
//! it clips to the cap.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::core::RankedCandidate;

/// Weight pair for the similarity/quality blend
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HybridWeights {
    pub similarity: f64,
    pub quality: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            similarity: 0.7,
            quality: 0.3,
        }
    }
}

/// Per-domain scoring constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreParams {
    pub weights: HybridWeights,
    /// Raw similarity treated as a full-scale match
    pub similarity_ceiling: f64,
    /// Scale factor applied after dividing by the ceiling
    pub similarity_scale: f64,
    /// Hard cap on the rescaled similarity
    pub similarity_clip: f64,
    /// Multiplier taking the quality prior onto 0-100
    pub quality_scale: f64,
    /// Sharpening exponent applied to raw similarity before rescaling
    pub similarity_exponent: f64,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            weights: HybridWeights::default(),
            similarity_ceiling: 1.0,
            similarity_scale: 100.0,
            similarity_clip: 100.0,
            quality_scale: 100.0,
            similarity_exponent: 1.0,
        }
    }
}

/// Annotate candidates with their hybrid score.
///
/// An empty candidate set yields an empty scored set, never an error.
pub fn score(
    candidates: Vec<(usize, f64)>,
    catalog: &Catalog,
    params: &ScoreParams,
) -> Vec<RankedCandidate> {
    candidates
        .into_iter()
        .map(|(index, similarity)| {
            // Negative similarity carries no content signal; clamp before
            // the exponent so fractional exponents stay well-defined
            let sharpened = similarity.max(0.0).powf(params.similarity_exponent);
            let sim_pct = (sharpened / params.similarity_ceiling * params.similarity_scale)
                .min(params.similarity_clip);

            let quality_pct = (catalog.item(index).quality * params.quality_scale).clamp(0.0, 100.0);

            let mut candidate = RankedCandidate::new(index, similarity);
            candidate.hybrid_score =
                params.weights.similarity * sim_pct + params.weights.quality * quality_pct;
            candidate
        })
        .collect()
}
