//! # Taste Engine
//!
//! Content-based media recommendation engine with:
//! - One generic ranking pipeline shared by the games, music and movies catalogs
//! - Cosine similarity over precomputed, facet-weighted feature matrices
//! - Hybrid similarity/quality scoring with per-creator diversity decay
//! - Bounded display scores and named, capped, mutually exclusive result buckets
//! - Fuzzy/substring search and reproducible cold-start discovery
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use taste_engine::{DomainConfig, FsSource, RecommendEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = RecommendEngine::new(DomainConfig::games());
//!     engine.load(&FsSource::new("cache/games")).await?;
//!
//!     let seeds = vec!["570".to_string(), "730".to_string(), "620".to_string()];
//!     let result = engine.recommend(&seeds, Some("RPG"))?;
//!
//!     for bucket in &result.buckets {
//!         println!("{}: {} items", bucket.label, bucket.items.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod bucketize;
pub mod catalog;
pub mod config;
pub mod core;
pub mod discover;
pub mod display;
pub mod diversity;
pub mod engine;
pub mod error;
pub mod scoring;
pub mod search;
pub mod similarity;

// Re-export primary types
pub use catalog::{ArtifactSource, Catalog, CatalogStatus, FsSource, MemorySource};
pub use config::DomainConfig;
pub use core::{CatalogItem, RecommendationBucket, RecommendationResult, RecommendedItem};
pub use discover::DiscoverResult;
pub use engine::RecommendEngine;
pub use error::{EngineError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
