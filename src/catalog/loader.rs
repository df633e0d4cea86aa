use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use async_trait::async_trait;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Catalog;
use crate::core::CatalogItem;
use crate::error::{EngineError, Result};

/// Trait for catalog artifact sources
///
/// The offline ingestion job writes the item table and facet matrices
/// somewhere; this seam lets the engine read them from disk in production
/// and from memory in tests.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Read one named artifact in full
    async fn read(&self, name: &str) -> Result<Vec<u8>>;
}

/// Filesystem-backed artifact source (one directory per catalog)
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactSource for FsSource {
    async fn read(&self, name: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.root.join(name)).await?)
    }
}

/// In-memory artifact source
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), bytes.into());
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactSource for MemorySource {
    async fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.files.get(name).cloned().ok_or_else(|| {
            EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("artifact not found: {}", name),
            ))
        })
    }
}

/// One facet matrix and its weight in the combined feature matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetSpec {
    pub file: String,
    pub weight: f32,
}

/// Names of the artifacts one catalog is built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Item table file (JSON array of records)
    pub items: String,
    /// Facet matrices, combined as a fixed weighted sum
    pub facets: Vec<FacetSpec>,
}

/// On-disk facet matrix layout, positionally keyed to the item table
#[derive(Debug, Deserialize)]
struct FacetMatrixFile {
    #[allow(dead_code)]
    facet: String,
    dim: usize,
    rows: Vec<Vec<f32>>,
}

/// Load and validate one catalog from its artifacts.
///
/// Fails closed: any missing file, decode failure or shape mismatch is
/// fatal to this catalog (the caller flips it to `Failed`), never to the
/// process.
pub async fn load(source: &dyn ArtifactSource, spec: &ArtifactSpec) -> Result<Catalog> {
    let items_bytes = source.read(&spec.items).await?;
    let items: Vec<CatalogItem> = serde_json::from_slice(&items_bytes)?;

    if items.is_empty() {
        return Err(EngineError::Schema(format!(
            "item table '{}' is empty",
            spec.items
        )));
    }

    let mut seen = HashSet::new();
    for item in &items {
        if !seen.insert(item.id.as_str()) {
            return Err(EngineError::Schema(format!(
                "duplicate item id '{}' in '{}'",
                item.id, spec.items
            )));
        }
    }

    if spec.facets.is_empty() {
        return Err(EngineError::Schema(
            "at least one facet matrix is required".to_string(),
        ));
    }

    let mut combined: Option<Array2<f32>> = None;

    for facet in &spec.facets {
        let bytes = source.read(&facet.file).await?;
        let parsed: FacetMatrixFile = serde_json::from_slice(&bytes)?;

        if parsed.rows.len() != items.len() {
            return Err(EngineError::Schema(format!(
                "facet '{}' has {} rows, item table has {}",
                facet.file,
                parsed.rows.len(),
                items.len()
            )));
        }

        let matrix = combined.get_or_insert_with(|| Array2::zeros((items.len(), parsed.dim)));

        if parsed.dim != matrix.ncols() {
            return Err(EngineError::Schema(format!(
                "facet '{}' has dim {}, expected {}",
                facet.file,
                parsed.dim,
                matrix.ncols()
            )));
        }

        for (i, row) in parsed.rows.iter().enumerate() {
            if row.len() != parsed.dim {
                return Err(EngineError::Schema(format!(
                    "facet '{}' row {} has width {}, declared dim is {}",
                    facet.file,
                    i,
                    row.len(),
                    parsed.dim
                )));
            }
            for (j, value) in row.iter().enumerate() {
                matrix[[i, j]] += facet.weight * value;
            }
        }
    }

    // facets is non-empty, so combined is always set here
    let matrix = combined.expect("combined matrix");

    let catalog = Catalog::from_parts(items, matrix);
    info!(
        items = catalog.len(),
        tags = catalog.tags().len(),
        dim = catalog.dim(),
        "catalog loaded"
    );

    Ok(catalog)
}
