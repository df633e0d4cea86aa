use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::bucketize::{self, BucketContext};
use crate::catalog::{loader, ArtifactSource, Catalog, CatalogStatus};
use crate::config::DomainConfig;
use crate::core::{CatalogItem, ProfileSummary, RecommendationResult};
use crate::discover::{self, DiscoverResult};
use crate::display;
use crate::diversity;
use crate::error::{EngineError, Result};
use crate::scoring;
use crate::search;
use crate::similarity;

struct Slot {
    status: CatalogStatus,
    catalog: Option<Arc<Catalog>>,
}

/// One domain's recommendation engine.
///
/// Owns the catalog snapshot and the per-domain configuration; constructed
/// once at process start and shared by reference with request handlers.
/// Every operation reads an immutable catalog snapshot, so arbitrarily
/// many requests may run concurrently; `load` swaps in a fresh snapshot
/// atomically and in-flight requests keep the one they started with.
pub struct RecommendEngine {
    config: DomainConfig,
    slot: RwLock<Slot>,
}

impl RecommendEngine {
    /// Create an engine in the `Loading` state; call [`load`](Self::load)
    /// before serving requests
    pub fn new(config: DomainConfig) -> Self {
        Self {
            config,
            slot: RwLock::new(Slot {
                status: CatalogStatus::Loading,
                catalog: None,
            }),
        }
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    /// Load (or reload) the catalog from its artifacts.
    ///
    /// On failure the engine flips to `Failed` and stays inert until the
    /// next successful load; the process is never taken down by a bad
    /// cache artifact.
    pub async fn load(&self, source: &dyn ArtifactSource) -> Result<()> {
        match loader::load(source, &self.config.artifacts).await {
            Ok(catalog) => {
                info!(domain = %self.config.domain, items = catalog.len(), "catalog ready");
                let mut slot = self.slot.write().unwrap();
                slot.status = CatalogStatus::Ready;
                slot.catalog = Some(Arc::new(catalog));
                Ok(())
            }
            Err(e) => {
                warn!(domain = %self.config.domain, error = %e, "catalog load failed");
                let mut slot = self.slot.write().unwrap();
                slot.status = CatalogStatus::Failed;
                slot.catalog = None;
                Err(e)
            }
        }
    }

    pub fn status(&self) -> CatalogStatus {
        self.slot.read().unwrap().status
    }

    pub fn is_ready(&self) -> bool {
        self.status() == CatalogStatus::Ready
    }

    fn snapshot(&self) -> Result<Arc<Catalog>> {
        let slot = self.slot.read().unwrap();
        match (&slot.status, &slot.catalog) {
            (CatalogStatus::Ready, Some(catalog)) => Ok(Arc::clone(catalog)),
            _ => Err(EngineError::NotReady(self.config.domain.clone())),
        }
    }

    /// The catalog's categorical tag vocabulary
    pub fn tags(&self) -> Result<Vec<String>> {
        Ok(self.snapshot()?.tags().to_vec())
    }

    /// Fuzzy or substring lookup per the domain's search mode
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<CatalogItem>> {
        let catalog = self.snapshot()?;
        let limit = limit.unwrap_or(self.config.search_limit);
        Ok(search::search(&catalog, query, limit, self.config.search))
    }

    /// Cold-start discovery lists
    pub fn discover(&self) -> Result<DiscoverResult> {
        let catalog = self.snapshot()?;
        Ok(discover::discover(&catalog, &self.config.discover))
    }

    /// Run the full recommendation pipeline for a seed list.
    ///
    /// Unknown seed ids are silently dropped; a request with fewer ids
    /// than the domain minimum, or whose known set resolves empty, is an
    /// `InvalidQuery`. A pipeline that produces zero candidates is a
    /// valid result with no buckets.
    pub fn recommend(
        &self,
        seed_ids: &[String],
        explore_tag: Option<&str>,
    ) -> Result<RecommendationResult> {
        let catalog = self.snapshot()?;

        if seed_ids.len() < self.config.min_seeds {
            return Err(EngineError::InvalidQuery(format!(
                "at least {} seed ids are required, got {}",
                self.config.min_seeds,
                seed_ids.len()
            )));
        }

        // Resolve seeds, dropping unknown ids and duplicates
        let mut seen = HashSet::new();
        let seeds: Vec<usize> = seed_ids
            .iter()
            .filter_map(|id| catalog.index_of(id))
            .filter(|i| seen.insert(*i))
            .collect();

        if seeds.is_empty() {
            return Err(EngineError::InvalidQuery(
                "none of the seed ids exist in the catalog".to_string(),
            ));
        }

        let candidates = similarity::similarities(&catalog, &seeds, self.config.similarity);
        let scored = scoring::score(candidates, &catalog, &self.config.score);
        let mut ranked = diversity::rerank(scored, &catalog, self.config.decay);
        display::normalize(&mut ranked, &self.config.display);

        debug!(
            domain = %self.config.domain,
            seeds = seeds.len(),
            candidates = ranked.len(),
            "pipeline ranked"
        );

        let profile = build_profile(&catalog, &seeds);

        let ctx = BucketContext {
            explore_tag: explore_tag.map(|t| t.to_string()),
            dominant_tag: profile.dominant_tag.clone(),
        };

        // Seeds never reappear in any bucket
        let mut used_ids: HashSet<String> = seed_ids.iter().cloned().collect();
        let buckets = bucketize::bucketize(
            &ranked,
            &catalog,
            &self.config.buckets,
            &ctx,
            self.config.near_duplicate_threshold,
            &mut used_ids,
        );

        Ok(RecommendationResult {
            buckets,
            profile,
            explore_tag: explore_tag.map(|t| t.to_string()),
        })
    }
}

/// Summarize the resolved seed set: items, modal tag, touched tags
fn build_profile(catalog: &Catalog, seeds: &[usize]) -> ProfileSummary {
    let items: Vec<CatalogItem> = seeds.iter().map(|&i| catalog.item(i).clone()).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in &items {
        for tag in &item.tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    // Modal tag; lexicographic tie-break keeps the result deterministic
    let dominant_tag = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(tag, _)| tag.to_string());

    let mut tags: Vec<String> = counts.keys().map(|t| t.to_string()).collect();
    tags.sort();

    ProfileSummary {
        items,
        dominant_tag,
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketize::{BucketRule, BucketSpec};
    use crate::catalog::loader::{ArtifactSpec, FacetSpec};
    use crate::catalog::MemorySource;
    use crate::discover::{DiscoverSpec, IconicRule};
    use crate::display::DisplayStrategy;
    use crate::scoring::{HybridWeights, ScoreParams};
    use crate::search::SearchMode;
    use crate::similarity::SimilarityMode;

    fn test_config() -> DomainConfig {
        DomainConfig {
            domain: "test".to_string(),
            min_seeds: 3,
            artifacts: ArtifactSpec {
                items: "items.json".to_string(),
                facets: vec![FacetSpec {
                    file: "features.json".to_string(),
                    weight: 1.0,
                }],
            },
            similarity: SimilarityMode::PerSeedMerge { top_k: 20 },
            score: ScoreParams {
                weights: HybridWeights {
                    similarity: 0.7,
                    quality: 0.3,
                },
                similarity_ceiling: 1.0,
                similarity_scale: 100.0,
                similarity_clip: 100.0,
                quality_scale: 100.0,
                similarity_exponent: 1.0,
            },
            decay: 0.85,
            display: DisplayStrategy::LogRelative {
                top: 99.0,
                floor: 85.0,
                reference_rank: 15,
            },
            buckets: vec![BucketSpec::new("main", BucketRule::TopRemaining, 10)],
            near_duplicate_threshold: None,
            search: SearchMode::Fuzzy { cutoff: 60.0 },
            search_limit: 30,
            discover: DiscoverSpec {
                iconic: IconicRule::ByIds(vec!["s1".to_string()]),
                explore_quality: None,
                explore_popularity: None,
                excluded_tags: Vec::new(),
                sample_size: 2,
                seed: 42,
            },
        }
    }

    /// Five items: three seeds plus two candidates sharing one creator
    fn five_item_source() -> MemorySource {
        let mut source = MemorySource::new();
        source.insert(
            "items.json",
            r#"[
                {"id": "s1", "name": "Seed One", "creator": "SeedCo", "quality": 0.9, "tags": ["RPG"]},
                {"id": "s2", "name": "Seed Two", "creator": "SeedCo", "quality": 0.9, "tags": ["RPG", "Indie"]},
                {"id": "s3", "name": "Seed Three", "creator": "SeedCo", "quality": 0.9, "tags": ["RPG"]},
                {"id": "c1", "name": "Candidate One", "creator": "Same Dev", "quality": 0.9},
                {"id": "c2", "name": "Candidate Two", "creator": "Same Dev", "quality": 0.8}
            ]"#,
        );
        source.insert(
            "features.json",
            r#"{"facet": "combined", "dim": 2, "rows": [
                [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0]
            ]}"#,
        );
        source
    }

    fn seeds() -> Vec<String> {
        vec!["s1".to_string(), "s2".to_string(), "s3".to_string()]
    }

    #[tokio::test]
    async fn test_not_ready_before_load() {
        let engine = RecommendEngine::new(test_config());
        assert_eq!(engine.status(), CatalogStatus::Loading);

        assert!(matches!(engine.tags(), Err(EngineError::NotReady(_))));
        assert!(matches!(engine.search("x", None), Err(EngineError::NotReady(_))));
        assert!(matches!(engine.discover(), Err(EngineError::NotReady(_))));
        assert!(matches!(
            engine.recommend(&seeds(), None),
            Err(EngineError::NotReady(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_load_is_sticky_until_reload() {
        let engine = RecommendEngine::new(test_config());

        let empty = MemorySource::new();
        assert!(engine.load(&empty).await.is_err());
        assert_eq!(engine.status(), CatalogStatus::Failed);
        assert!(matches!(engine.discover(), Err(EngineError::NotReady(_))));

        engine.load(&five_item_source()).await.unwrap();
        assert_eq!(engine.status(), CatalogStatus::Ready);
        assert!(engine.discover().is_ok());
    }

    #[tokio::test]
    async fn test_too_few_seeds_is_invalid_query() {
        let engine = RecommendEngine::new(test_config());
        engine.load(&five_item_source()).await.unwrap();

        let err = engine.recommend(&[], None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));

        let err = engine
            .recommend(&["s1".to_string(), "s2".to_string()], None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_all_unknown_seeds_is_invalid_query() {
        let engine = RecommendEngine::new(test_config());
        engine.load(&five_item_source()).await.unwrap();

        let unknown = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let err = engine.recommend(&unknown, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_shared_creator_decay_scenario() {
        let engine = RecommendEngine::new(test_config());
        engine.load(&five_item_source()).await.unwrap();

        let result = engine.recommend(&seeds(), None).unwrap();
        let main = result.bucket("main").unwrap();
        assert_eq!(main.items.len(), 2);

        // Both candidates sit at similarity 1.0; c1 wins on quality and
        // c2, second from the same creator, is decayed once. With
        // hybrid(c1) = 97 and hybrid(c2) = 94 * 0.85 = 79.9 the order is
        // c1 then c2.
        assert_eq!(main.items[0].item.id, "c1");
        assert_eq!(main.items[1].item.id, "c2");
    }

    #[tokio::test]
    async fn test_profile_summary() {
        let engine = RecommendEngine::new(test_config());
        engine.load(&five_item_source()).await.unwrap();

        let result = engine.recommend(&seeds(), None).unwrap();
        assert_eq!(result.profile.items.len(), 3);
        assert_eq!(result.profile.dominant_tag.as_deref(), Some("RPG"));
        assert_eq!(result.profile.tags, vec!["Indie".to_string(), "RPG".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_seed_ids_are_dropped() {
        let engine = RecommendEngine::new(test_config());
        engine.load(&five_item_source()).await.unwrap();

        let mut ids = seeds();
        ids.push("does-not-exist".to_string());
        let result = engine.recommend(&ids, None).unwrap();
        assert_eq!(result.profile.items.len(), 3);
    }

    #[tokio::test]
    async fn test_seeds_never_recommended() {
        let engine = RecommendEngine::new(test_config());
        engine.load(&five_item_source()).await.unwrap();

        let result = engine.recommend(&seeds(), None).unwrap();
        for bucket in &result.buckets {
            for item in &bucket.items {
                assert!(!item.item.id.starts_with('s'));
            }
        }
    }
}
