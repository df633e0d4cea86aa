use serde::{Deserialize, Serialize};

use crate::core::CatalogItem;

/// Per-request candidate carried through the ranking pipeline.
///
/// Holds the catalog row index rather than a cloned item; never persisted.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    /// Positional index into the catalog
    pub index: usize,
    /// Raw cosine similarity
    pub similarity: f64,
    /// Similarity/quality blend (0-100 scale)
    pub hybrid_score: f64,
    /// Hybrid score after the per-creator diversity penalty
    pub penalized_score: f64,
    /// Bounded presentation score
    pub display_score: f64,
}

impl RankedCandidate {
    pub fn new(index: usize, similarity: f64) -> Self {
        Self {
            index,
            similarity,
            hybrid_score: 0.0,
            penalized_score: 0.0,
            display_score: 0.0,
        }
    }
}

/// One recommended item annotated with its display score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Display score, one decimal of precision is meaningful
    pub score: f64,
}

/// A named, capped, mutually-exclusive result category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationBucket {
    pub label: String,
    pub items: Vec<RecommendedItem>,
}

/// Summary of the seed list the recommendations were built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Seed items, in request order (unknown ids dropped)
    pub items: Vec<CatalogItem>,
    /// Most frequent tag across the seeds (lexicographic tie-break)
    pub dominant_tag: Option<String>,
    /// Every tag touched by the seeds, sorted and deduplicated
    pub tags: Vec<String>,
}

/// Full response for one recommendation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Buckets in declared order; empty buckets are omitted entirely
    pub buckets: Vec<RecommendationBucket>,
    pub profile: ProfileSummary,
    /// Echo of the requested explore tag, if any
    pub explore_tag: Option<String>,
}

impl RecommendationResult {
    /// Look up a bucket by label
    pub fn bucket(&self, label: &str) -> Option<&RecommendationBucket> {
        self.buckets.iter().find(|b| b.label == label)
    }

    /// Total number of recommended items across all buckets
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
