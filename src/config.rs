//! Per-domain configuration.
//!
//! Each domain (games, music, movies) runs the same pipeline with its own
//! constants. A [`DomainConfig`] is assembled once at process start and is
//! never mutated afterwards; the presets below encode the production
//! constants for the three shipped catalogs.

use serde::{Deserialize, Serialize};

use crate::bucketize::{BucketRule, BucketSpec};
use crate::catalog::loader::{ArtifactSpec, FacetSpec};
use crate::discover::{DiscoverSpec, IconicRule};
use crate::display::DisplayStrategy;
use crate::scoring::{HybridWeights, ScoreParams};
use crate::search::SearchMode;
use crate::similarity::SimilarityMode;

/// Full configuration for one domain catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Domain name, used in logs and not-ready errors
    pub domain: String,
    /// Minimum number of seed ids a recommendation request must carry
    pub min_seeds: usize,
    pub artifacts: ArtifactSpec,
    pub similarity: SimilarityMode,
    pub score: ScoreParams,
    /// Per-creator diversity decay
    pub decay: f64,
    pub display: DisplayStrategy,
    /// Buckets in evaluation order
    pub buckets: Vec<BucketSpec>,
    /// Title similarity (0-100) above which a candidate is treated as a
    /// near-duplicate within a bucket; None disables suppression
    pub near_duplicate_threshold: Option<f64>,
    pub search: SearchMode,
    pub search_limit: usize,
    pub discover: DiscoverSpec,
}

impl DomainConfig {
    /// Steam games catalog
    pub fn games() -> Self {
        Self {
            domain: "games".to_string(),
            min_seeds: 3,
            artifacts: ArtifactSpec {
                items: "games_items.json".to_string(),
                facets: vec![
                    FacetSpec { file: "genres_matrix.json".to_string(), weight: 4.0 },
                    FacetSpec { file: "categories_matrix.json".to_string(), weight: 3.0 },
                    FacetSpec { file: "description_matrix.json".to_string(), weight: 1.0 },
                    FacetSpec { file: "developers_matrix.json".to_string(), weight: 1.0 },
                ],
            },
            similarity: SimilarityMode::PerSeedMerge { top_k: 20 },
            score: ScoreParams {
                weights: HybridWeights { similarity: 0.7, quality: 0.3 },
                similarity_ceiling: 1.0,
                similarity_scale: 100.0,
                similarity_clip: 100.0,
                // review score is 0-1
                quality_scale: 100.0,
                similarity_exponent: 1.0,
            },
            decay: 0.85,
            display: DisplayStrategy::LogRelative { top: 99.0, floor: 85.0, reference_rank: 15 },
            buckets: vec![
                BucketSpec::new("main", BucketRule::TopRemaining, 10),
                BucketSpec::new("genre_favorites", BucketRule::ExploreTag, 5),
                BucketSpec::new("famous", BucketRule::QualityAtLeast(0.92), 5),
                BucketSpec::new(
                    "hidden_gems",
                    BucketRule::HiddenGem { max_quality: 0.88, min_display: 75.0 },
                    5,
                ),
            ],
            near_duplicate_threshold: None,
            search: SearchMode::Fuzzy { cutoff: 60.0 },
            search_limit: 30,
            discover: DiscoverSpec {
                iconic: IconicRule::ByIds(
                    ["570", "730", "271590", "1091500", "292030", "1245620", "620", "413150"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
                explore_quality: Some((0.92, 1.0)),
                explore_popularity: None,
                excluded_tags: vec![
                    "Ação".to_string(),
                    "Aventura".to_string(),
                    "RPG".to_string(),
                    "Estratégia".to_string(),
                ],
                sample_size: 15,
                seed: 42,
            },
        }
    }

    /// Spotify tracks catalog
    pub fn music() -> Self {
        Self {
            domain: "music".to_string(),
            min_seeds: 3,
            artifacts: ArtifactSpec {
                items: "music_items.json".to_string(),
                facets: vec![FacetSpec { file: "music_features.json".to_string(), weight: 1.0 }],
            },
            similarity: SimilarityMode::PerSeedMerge { top_k: 20 },
            score: ScoreParams {
                // Music ranks on sharpened similarity alone; the quality
                // prior only feeds bucket predicates
                weights: HybridWeights { similarity: 1.0, quality: 0.0 },
                similarity_ceiling: 1.0,
                similarity_scale: 100.0,
                similarity_clip: 100.0,
                quality_scale: 1.0,
                similarity_exponent: 4.0,
            },
            decay: 0.85,
            display: DisplayStrategy::LogRelative { top: 99.0, floor: 85.0, reference_rank: 15 },
            buckets: vec![
                BucketSpec::new("main", BucketRule::TopRemaining, 12),
                BucketSpec::new("explore_genre", BucketRule::ExploreTag, 6),
                BucketSpec::new("your_taste", BucketRule::DominantTag, 6),
                BucketSpec::new("hidden_gems", BucketRule::PopularityBelow(50.0), 6),
            ],
            near_duplicate_threshold: None,
            search: SearchMode::Substring,
            search_limit: 30,
            discover: DiscoverSpec {
                iconic: IconicRule::TopPerCreator(
                    [
                        "Arctic Monkeys", "Billie Eilish", "The Weeknd", "Daft Punk", "Queen",
                        "Kendrick Lamar", "Tame Impala", "Radiohead", "Red Hot Chili Peppers",
                        "Foo Fighters",
                    ]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                ),
                explore_quality: None,
                explore_popularity: Some((60.0, 80.0)),
                excluded_tags: vec![
                    "pop".to_string(),
                    "dance".to_string(),
                    "rock".to_string(),
                    "hip-hop".to_string(),
                    "latin".to_string(),
                ],
                sample_size: 15,
                seed: 42,
            },
        }
    }

    /// TMDB movies catalog
    pub fn movies() -> Self {
        Self {
            domain: "movies".to_string(),
            min_seeds: 3,
            artifacts: ArtifactSpec {
                items: "movies_items.json".to_string(),
                facets: vec![FacetSpec { file: "movie_tfidf.json".to_string(), weight: 1.0 }],
            },
            similarity: SimilarityMode::AveragedProfile,
            score: ScoreParams {
                weights: HybridWeights { similarity: 0.7, quality: 0.3 },
                // TF-IDF cosine rarely exceeds 0.35 in this catalog
                similarity_ceiling: 0.35,
                similarity_scale: 95.0,
                similarity_clip: 99.0,
                // vote average is 0-10
                quality_scale: 10.0,
                similarity_exponent: 1.0,
            },
            decay: 0.85,
            display: DisplayStrategy::FixedTiers {
                tiers: [(98.0, 99.0), (96.0, 97.0), (95.0, 96.0)],
                rest_floor: 70.0,
                rest_ceil: 94.0,
                curve: 1.5,
                flat: 82.0,
                seed: 42,
            },
            buckets: vec![
                BucketSpec::new("main", BucketRule::TopRemaining, 12),
                BucketSpec::new("genre_favorites", BucketRule::ExploreTag, 6),
                BucketSpec::new("blockbusters", BucketRule::PopularityAbovePercentile(0.95), 6),
                BucketSpec::new(
                    "cult_classics",
                    BucketRule::ClassicBefore { year: 2005, min_quality: 7.0 },
                    6,
                ),
                BucketSpec::new(
                    "hidden_gems",
                    BucketRule::PopularityBand { lo_pct: 0.3, hi_pct: 0.7, min_quality: 7.5 },
                    6,
                ),
            ],
            near_duplicate_threshold: Some(90.0),
            search: SearchMode::Substring,
            search_limit: 20,
            discover: DiscoverSpec {
                iconic: IconicRule::TopPerCreator(
                    [
                        "Christopher Nolan", "Steven Spielberg", "Quentin Tarantino",
                        "Martin Scorsese", "Denis Villeneuve", "Hayao Miyazaki",
                    ]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                ),
                explore_quality: Some((7.0, 10.0)),
                explore_popularity: None,
                excluded_tags: vec!["Drama".to_string(), "Comédia".to_string(), "Ação".to_string()],
                sample_size: 15,
                seed: 42,
            },
        }
    }
}
