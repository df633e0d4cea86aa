pub mod item;
pub mod recommendation;

pub use item::CatalogItem;
pub use recommendation::{
    ProfileSummary, RankedCandidate, RecommendationBucket, RecommendationResult, RecommendedItem,
};
