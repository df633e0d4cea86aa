pub mod loader;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::core::CatalogItem;

pub use loader::{ArtifactSource, FsSource, MemorySource};

/// Lifecycle state of one domain catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    /// Construction started, artifacts not loaded yet
    Loading,
    /// Artifacts loaded and validated; serving requests
    Ready,
    /// Loading failed; inert until an explicit successful reload
    Failed,
}

/// Immutable, in-memory item table plus the combined feature matrix.
///
/// Built once by [`loader::load`], then shared read-only across requests.
/// A reload constructs a fresh instance; nothing here is ever mutated.
#[derive(Debug)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    matrix: Array2<f32>,
    /// L2 norm per matrix row, precomputed at load time
    norms: Vec<f64>,
    /// Sorted, deduplicated tag vocabulary
    tags: Vec<String>,
    id_index: HashMap<String, usize>,
    /// Lowercase "name creator" per item, for substring search
    search_strings: Vec<String>,
    /// Popularity values sorted ascending, for percentile predicates
    popularity_sorted: Vec<f64>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    pub(crate) fn from_parts(items: Vec<CatalogItem>, matrix: Array2<f32>) -> Self {
        let norms = matrix
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|v| (*v as f64).powi(2)).sum::<f64>().sqrt())
            .collect();

        let id_index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();

        let search_strings = items
            .iter()
            .map(|item| format!("{} {}", item.name, item.creator).to_lowercase())
            .collect();

        let mut tags: Vec<String> = items
            .iter()
            .flat_map(|item| item.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();

        let mut popularity_sorted: Vec<f64> = items.iter().map(|i| i.popularity).collect();
        popularity_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Self {
            items,
            matrix,
            norms,
            tags,
            id_index,
            search_strings,
            popularity_sorted,
            loaded_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Feature space dimensionality
    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> &CatalogItem {
        &self.items[index]
    }

    /// Resolve an item id to its row index
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    /// Resolve ids to items, preserving request order; unknown ids are
    /// silently dropped
    pub fn get_items(&self, ids: &[String]) -> Vec<&CatalogItem> {
        ids.iter()
            .filter_map(|id| self.index_of(id))
            .map(|i| &self.items[i])
            .collect()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f32> {
        self.matrix.row(index)
    }

    pub fn norm(&self, index: usize) -> f64 {
        self.norms[index]
    }

    pub fn search_string(&self, index: usize) -> &str {
        &self.search_strings[index]
    }

    /// Nearest-rank popularity percentile, `p` in [0, 1]
    pub fn popularity_percentile(&self, p: f64) -> f64 {
        if self.popularity_sorted.is_empty() {
            return 0.0;
        }
        let n = self.popularity_sorted.len();
        let rank = (p.clamp(0.0, 1.0) * (n as f64 - 1.0)).round() as usize;
        self.popularity_sorted[rank.min(n - 1)]
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
