//! Cold-start discovery: catalog-wide picks served before any seed
//! preferences exist.
//!
//! `iconic` is a fixed curated slice of the catalog; `explore` is a
//! reproducible pseudo-random sample of less-mainstream items, seeded so
//! two calls against the same catalog return the same set.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::core::CatalogItem;

/// How the iconic list is selected
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconicRule {
    /// A curated list of well-known item ids
    ByIds(Vec<String>),
    /// The single most popular item per curated creator
    TopPerCreator(Vec<String>),
}

/// Per-domain discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverSpec {
    pub iconic: IconicRule,
    /// Inclusive quality band for explore candidates, native units
    pub explore_quality: Option<(f64, f64)>,
    /// Inclusive popularity band for explore candidates, native units
    pub explore_popularity: Option<(f64, f64)>,
    /// Dominant tags excluded from explore, to surface the long tail
    pub excluded_tags: Vec<String>,
    pub sample_size: usize,
    /// RNG seed; fixed per domain for reproducible sampling
    pub seed: u64,
}

/// Discovery response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverResult {
    pub iconic: Vec<CatalogItem>,
    pub explore: Vec<CatalogItem>,
}

/// Build the discovery lists for one catalog
pub fn discover(catalog: &Catalog, spec: &DiscoverSpec) -> DiscoverResult {
    DiscoverResult {
        iconic: iconic(catalog, &spec.iconic),
        explore: explore(catalog, spec),
    }
}

fn iconic(catalog: &Catalog, rule: &IconicRule) -> Vec<CatalogItem> {
    match rule {
        IconicRule::ByIds(ids) => catalog.get_items(ids).into_iter().cloned().collect(),
        IconicRule::TopPerCreator(creators) => {
            let wanted: HashMap<String, usize> = creators
                .iter()
                .enumerate()
                .map(|(rank, c)| (c.to_lowercase(), rank))
                .collect();

            // Most popular item per curated creator
            let mut best: HashMap<String, usize> = HashMap::new();
            for (i, item) in catalog.items().iter().enumerate() {
                let key = item.creator_key();
                if !wanted.contains_key(&key) {
                    continue;
                }
                match best.get(&key) {
                    Some(&existing) if catalog.item(existing).popularity >= item.popularity => {}
                    _ => {
                        best.insert(key, i);
                    }
                }
            }

            // Keep the curated list's order
            let mut picks: Vec<(usize, usize)> = best
                .into_iter()
                .map(|(key, index)| (wanted[&key], index))
                .collect();
            picks.sort_unstable();
            picks
                .into_iter()
                .map(|(_, index)| catalog.item(index).clone())
                .collect()
        }
    }
}

fn explore(catalog: &Catalog, spec: &DiscoverSpec) -> Vec<CatalogItem> {
    let eligible: Vec<usize> = catalog
        .items()
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            if let Some((lo, hi)) = spec.explore_quality {
                if item.quality < lo || item.quality > hi {
                    return false;
                }
            }
            if let Some((lo, hi)) = spec.explore_popularity {
                if item.popularity < lo || item.popularity > hi {
                    return false;
                }
            }
            !spec.excluded_tags.iter().any(|tag| item.has_tag(tag))
        })
        .map(|(i, _)| i)
        .collect();

    if eligible.is_empty() || spec.sample_size == 0 {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let amount = spec.sample_size.min(eligible.len());
    let sampled = rand::seq::index::sample(&mut rng, eligible.len(), amount);

    sampled
        .into_iter()
        .map(|i| catalog.item(eligible[i]).clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn catalog() -> Catalog {
        let specs: Vec<(&str, &str, f64, f64, &[&str])> = vec![
            ("1", "One", 0.95, 90.0, &["Action"]),
            ("2", "Two", 0.94, 50.0, &["Puzzle"]),
            ("3", "Three", 0.93, 30.0, &["Puzzle"]),
            ("4", "Four", 0.50, 20.0, &["Puzzle"]),
            ("5", "Five", 0.96, 70.0, &["Simulation"]),
        ];
        let items = specs
            .iter()
            .enumerate()
            .map(|(i, (id, name, q, pop, tags))| {
                let mut item = CatalogItem::new(*id, *name, if i < 2 { "Alpha Dev" } else { "Beta Dev" });
                item.quality = *q;
                item.popularity = *pop;
                item.tags = tags.iter().map(|t| t.to_string()).collect();
                item
            })
            .collect();
        Catalog::from_parts(items, Array2::zeros((specs.len(), 2)))
    }

    fn spec() -> DiscoverSpec {
        DiscoverSpec {
            iconic: IconicRule::ByIds(vec!["1".to_string(), "5".to_string()]),
            explore_quality: Some((0.9, 1.0)),
            explore_popularity: None,
            excluded_tags: vec!["Action".to_string()],
            sample_size: 2,
            seed: 42,
        }
    }

    #[test]
    fn test_iconic_by_ids_preserves_order() {
        let result = discover(&catalog(), &spec());
        let ids: Vec<&str> = result.iconic.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);
    }

    #[test]
    fn test_iconic_top_per_creator() {
        let mut s = spec();
        s.iconic = IconicRule::TopPerCreator(vec!["Beta Dev".to_string(), "Alpha Dev".to_string()]);

        let result = discover(&catalog(), &s);
        let ids: Vec<&str> = result.iconic.iter().map(|i| i.id.as_str()).collect();
        // Most popular per creator, in curated-list order
        assert_eq!(ids, vec!["5", "1"]);
    }

    #[test]
    fn test_explore_respects_band_and_exclusions() {
        let result = discover(&catalog(), &spec());
        for item in &result.explore {
            assert!(item.quality >= 0.9);
            assert!(!item.has_tag("Action"));
        }
        assert_eq!(result.explore.len(), 2);
    }

    #[test]
    fn test_explore_is_reproducible() {
        let a = discover(&catalog(), &spec());
        let b = discover(&catalog(), &spec());
        let ids_a: Vec<&str> = a.explore.iter().map(|i| i.id.as_str()).collect();
        let ids_b: Vec<&str> = b.explore.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_explore_sample_larger_than_pool() {
        let mut s = spec();
        s.sample_size = 50;
        let result = discover(&catalog(), &s);
        // Pool is {2, 3, 5}
        assert_eq!(result.explore.len(), 3);
    }
}
