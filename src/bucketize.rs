//! Partition the final ranked list into named, capped, mutually exclusive
//! buckets.
//!
//! Buckets are evaluated in declared order and every accepted item is
//! removed from the pool available to later buckets, so no item appears
//! twice in one response. A bucket whose rule matches nothing is omitted,
//! never an error. Like the diversity pass this is greedy and
//! order-dependent by design.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::core::{CatalogItem, RankedCandidate, RecommendationBucket, RecommendedItem};

/// Predicate deciding membership of one bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketRule {
    /// Best remaining candidates, no further condition
    TopRemaining,
    /// Matches the request's explore tag (bucket skipped when no tag was
    /// requested)
    ExploreTag,
    /// Matches the seed profile's dominant tag (skipped when it equals
    /// the explore tag, to avoid a duplicate section)
    DominantTag,
    /// Quality prior at or above a threshold, in the catalog's native
    /// quality units
    QualityAtLeast(f64),
    /// Low-profile but well-matched: quality below a threshold with a
    /// display score above another
    HiddenGem { max_quality: f64, min_display: f64 },
    /// Popularity above the given catalog percentile (0-1)
    PopularityAbovePercentile(f64),
    /// Popularity below a fixed threshold, native units
    PopularityBelow(f64),
    /// Released before `year` with quality at or above `min_quality`
    ClassicBefore { year: i32, min_quality: f64 },
    /// Popularity between two catalog percentiles, quality floor applied
    PopularityBand {
        lo_pct: f64,
        hi_pct: f64,
        min_quality: f64,
    },
}

/// One bucket declaration: label, predicate, size cap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSpec {
    pub label: String,
    pub rule: BucketRule,
    pub cap: usize,
}

impl BucketSpec {
    pub fn new(label: impl Into<String>, rule: BucketRule, cap: usize) -> Self {
        Self {
            label: label.into(),
            rule,
            cap,
        }
    }
}

/// Request-scoped inputs the rules close over
#[derive(Debug, Clone, Default)]
pub struct BucketContext {
    pub explore_tag: Option<String>,
    pub dominant_tag: Option<String>,
}

fn rule_matches(
    rule: &BucketRule,
    item: &CatalogItem,
    candidate: &RankedCandidate,
    catalog: &Catalog,
    ctx: &BucketContext,
) -> bool {
    match rule {
        BucketRule::TopRemaining => true,
        BucketRule::ExploreTag => ctx
            .explore_tag
            .as_deref()
            .map(|tag| item.has_tag(tag))
            .unwrap_or(false),
        BucketRule::DominantTag => match (&ctx.dominant_tag, &ctx.explore_tag) {
            (Some(dominant), explore) if explore.as_deref() != Some(dominant.as_str()) => {
                item.has_tag(dominant)
            }
            _ => false,
        },
        BucketRule::QualityAtLeast(q) => item.quality >= *q,
        BucketRule::HiddenGem {
            max_quality,
            min_display,
        } => item.quality < *max_quality && candidate.display_score > *min_display,
        BucketRule::PopularityAbovePercentile(p) => {
            item.popularity > catalog.popularity_percentile(*p)
        }
        BucketRule::PopularityBelow(threshold) => item.popularity < *threshold,
        BucketRule::ClassicBefore { year, min_quality } => {
            item.year.map(|y| y < *year).unwrap_or(false) && item.quality >= *min_quality
        }
        BucketRule::PopularityBand {
            lo_pct,
            hi_pct,
            min_quality,
        } => {
            let lo = catalog.popularity_percentile(*lo_pct);
            let hi = catalog.popularity_percentile(*hi_pct);
            item.popularity >= lo && item.popularity <= hi && item.quality >= *min_quality
        }
    }
}

/// Token-order-insensitive fuzzy similarity between two titles (0-100)
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    fn sorted_tokens(s: &str) -> String {
        let lower = s.to_lowercase();
        let mut tokens: Vec<&str> = lower.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Allocate the ranked, display-annotated candidates into buckets.
///
/// `used_ids` is pre-seeded with the request's seed ids and mutated as
/// items are placed. When `near_duplicate_threshold` is set, a candidate
/// whose title similarity against an already-accepted item in the same
/// bucket exceeds the threshold is skipped and scanning continues.
pub fn bucketize(
    ranked: &[RankedCandidate],
    catalog: &Catalog,
    specs: &[BucketSpec],
    ctx: &BucketContext,
    near_duplicate_threshold: Option<f64>,
    used_ids: &mut HashSet<String>,
) -> Vec<RecommendationBucket> {
    let mut buckets = Vec::new();

    for spec in specs {
        let mut items: Vec<RecommendedItem> = Vec::new();

        for candidate in ranked {
            if items.len() >= spec.cap {
                break;
            }
            let item = catalog.item(candidate.index);
            if used_ids.contains(&item.id) {
                continue;
            }
            if !rule_matches(&spec.rule, item, candidate, catalog, ctx) {
                continue;
            }
            if let Some(threshold) = near_duplicate_threshold {
                let redundant = items
                    .iter()
                    .any(|accepted| token_sort_ratio(&item.name, &accepted.item.name) > threshold);
                if redundant {
                    continue;
                }
            }

            used_ids.insert(item.id.clone());
            items.push(RecommendedItem {
                item: item.clone(),
                score: (candidate.display_score * 10.0).round() / 10.0,
            });
        }

        if !items.is_empty() {
            buckets.push(RecommendationBucket {
                label: spec.label.clone(),
                items,
            });
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    struct ItemSpec {
        id: &'static str,
        name: &'static str,
        quality: f64,
        popularity: f64,
        year: Option<i32>,
        tags: &'static [&'static str],
    }

    fn catalog(specs: &[ItemSpec]) -> Catalog {
        let items = specs
            .iter()
            .map(|s| {
                let mut item = CatalogItem::new(s.id, s.name, "Dev");
                item.quality = s.quality;
                item.popularity = s.popularity;
                item.year = s.year;
                item.tags = s.tags.iter().map(|t| t.to_string()).collect();
                item
            })
            .collect();
        Catalog::from_parts(items, Array2::zeros((specs.len(), 2)))
    }

    fn ranked_all(catalog: &Catalog) -> Vec<RankedCandidate> {
        (0..catalog.len())
            .map(|i| {
                let mut c = RankedCandidate::new(i, 0.5);
                c.penalized_score = 100.0 - i as f64;
                c.display_score = 99.0 - i as f64;
                c
            })
            .collect()
    }

    fn four_items() -> Catalog {
        catalog(&[
            ItemSpec { id: "a", name: "Alpha", quality: 0.95, popularity: 90.0, year: Some(2001), tags: &["RPG"] },
            ItemSpec { id: "b", name: "Beta", quality: 0.80, popularity: 40.0, year: Some(2015), tags: &["Indie"] },
            ItemSpec { id: "c", name: "Gamma", quality: 0.93, popularity: 70.0, year: Some(1999), tags: &["RPG"] },
            ItemSpec { id: "d", name: "Delta", quality: 0.60, popularity: 10.0, year: None, tags: &["Indie"] },
        ])
    }

    #[test]
    fn test_buckets_are_disjoint_and_capped() {
        let catalog = four_items();
        let ranked = ranked_all(&catalog);
        let specs = vec![
            BucketSpec::new("main", BucketRule::TopRemaining, 2),
            BucketSpec::new("famous", BucketRule::QualityAtLeast(0.92), 2),
        ];

        let mut used = HashSet::new();
        let buckets = bucketize(&ranked, &catalog, &specs, &BucketContext::default(), None, &mut used);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].items.len(), 2); // a, b

        // c qualifies for famous; a does too but was consumed by main
        let famous_ids: Vec<&str> = buckets[1].items.iter().map(|i| i.item.id.as_str()).collect();
        assert_eq!(famous_ids, vec!["c"]);

        let mut all_ids = HashSet::new();
        for bucket in &buckets {
            for item in &bucket.items {
                assert!(all_ids.insert(item.item.id.clone()), "duplicate across buckets");
            }
        }
    }

    #[test]
    fn test_empty_bucket_omitted() {
        let catalog = four_items();
        let ranked = ranked_all(&catalog);
        let specs = vec![
            BucketSpec::new("main", BucketRule::TopRemaining, 10),
            BucketSpec::new("leftover", BucketRule::TopRemaining, 10),
        ];

        let mut used = HashSet::new();
        let buckets = bucketize(&ranked, &catalog, &specs, &BucketContext::default(), None, &mut used);

        // Second pass finds an empty pool and is dropped from the result
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "main");
    }

    #[test]
    fn test_used_ids_preseeded_with_seeds() {
        let catalog = four_items();
        let ranked = ranked_all(&catalog);
        let specs = vec![BucketSpec::new("main", BucketRule::TopRemaining, 10)];

        let mut used: HashSet<String> = ["a".to_string()].into_iter().collect();
        let buckets = bucketize(&ranked, &catalog, &specs, &BucketContext::default(), None, &mut used);

        assert!(buckets[0].items.iter().all(|i| i.item.id != "a"));
        assert_eq!(used.len(), 4);
    }

    #[test]
    fn test_explore_tag_bucket() {
        let catalog = four_items();
        let ranked = ranked_all(&catalog);
        let specs = vec![BucketSpec::new("explore", BucketRule::ExploreTag, 10)];

        let ctx = BucketContext {
            explore_tag: Some("rpg".to_string()),
            dominant_tag: None,
        };
        let mut used = HashSet::new();
        let buckets = bucketize(&ranked, &catalog, &specs, &ctx, None, &mut used);

        let ids: Vec<&str> = buckets[0].items.iter().map(|i| i.item.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        // No explore tag requested: bucket yields nothing and is omitted
        let mut used = HashSet::new();
        let buckets = bucketize(&ranked, &catalog, &specs, &BucketContext::default(), None, &mut used);
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_dominant_tag_skipped_when_equals_explore() {
        let catalog = four_items();
        let ranked = ranked_all(&catalog);
        let specs = vec![BucketSpec::new("taste", BucketRule::DominantTag, 10)];

        let ctx = BucketContext {
            explore_tag: Some("RPG".to_string()),
            dominant_tag: Some("RPG".to_string()),
        };
        let mut used = HashSet::new();
        assert!(bucketize(&ranked, &catalog, &specs, &ctx, None, &mut used).is_empty());

        let ctx = BucketContext {
            explore_tag: None,
            dominant_tag: Some("Indie".to_string()),
        };
        let mut used = HashSet::new();
        let buckets = bucketize(&ranked, &catalog, &specs, &ctx, None, &mut used);
        let ids: Vec<&str> = buckets[0].items.iter().map(|i| i.item.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d"]);
    }

    #[test]
    fn test_percentile_and_classic_rules() {
        let catalog = four_items();
        let ranked = ranked_all(&catalog);
        let specs = vec![
            BucketSpec::new("blockbusters", BucketRule::PopularityAbovePercentile(0.5), 10),
            BucketSpec::new("classics", BucketRule::ClassicBefore { year: 2005, min_quality: 0.9 }, 10),
        ];

        let mut used = HashSet::new();
        let buckets = bucketize(&ranked, &catalog, &specs, &BucketContext::default(), None, &mut used);

        // p50 popularity of [10, 40, 70, 90] is 70 (nearest rank); only a is above
        let ids: Vec<&str> = buckets[0].items.iter().map(|i| i.item.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        // a was consumed upstream, so only the 1999 release remains
        let ids: Vec<&str> = buckets[1].items.iter().map(|i| i.item.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_near_duplicate_suppression() {
        let catalog = catalog(&[
            ItemSpec { id: "a", name: "The Matrix", quality: 0.9, popularity: 50.0, year: None, tags: &[] },
            ItemSpec { id: "b", name: "Matrix, The", quality: 0.9, popularity: 50.0, year: None, tags: &[] },
            ItemSpec { id: "c", name: "Blade Runner", quality: 0.9, popularity: 50.0, year: None, tags: &[] },
        ]);
        let ranked = ranked_all(&catalog);
        let specs = vec![BucketSpec::new("main", BucketRule::TopRemaining, 10)];

        let mut used = HashSet::new();
        let buckets = bucketize(&ranked, &catalog, &specs, &BucketContext::default(), Some(90.0), &mut used);

        let names: Vec<&str> = buckets[0].items.iter().map(|i| i.item.name.as_str()).collect();
        assert_eq!(names, vec!["The Matrix", "Blade Runner"]);
    }

    #[test]
    fn test_token_sort_ratio_order_insensitive() {
        assert!(token_sort_ratio("The Matrix", "Matrix, The") > 90.0);
        assert!(token_sort_ratio("the matrix", "matrix the") > 99.0);
        assert!(token_sort_ratio("The Matrix", "Blade Runner") < 50.0);
    }
}
