use serde::{Deserialize, Serialize};

fn default_creator() -> String {
    "unknown".to_string()
}

/// Deserialize year from string or int (offline job emits both)
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearValue {
        Int(i32),
        String(String),
        Null,
    }

    match YearValue::deserialize(deserializer)? {
        YearValue::Int(i) => Ok(Some(i)),
        YearValue::String(s) => {
            // Partial dates like "2011-04-12" still carry a usable year
            let head = s.split('-').next().unwrap_or("");
            head.parse::<i32>()
                .map(Some)
                .map_err(|_| Error::custom(format!("Invalid year string: {}", s)))
        }
        YearValue::Null => Ok(None),
    }
}

/// Deserialize tags from a list or a comma-delimited string
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagsValue {
        List(Vec<String>),
        Delimited(String),
        Null,
    }

    Ok(match TagsValue::deserialize(deserializer)? {
        TagsValue::List(tags) => tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        TagsValue::Delimited(s) => s
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        TagsValue::Null => Vec::new(),
    })
}

/// One catalog row: display metadata plus the quality/popularity priors.
///
/// The matching feature vector lives in the catalog matrix at the same
/// positional index; items are immutable once a catalog is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Unique ID within the catalog (Steam appid, Spotify id, TMDB id)
    pub id: String,

    /// Display name / title
    #[serde(default)]
    pub name: String,

    /// Attribution key: developer, artist or studio
    #[serde(default = "default_creator")]
    pub creator: String,

    /// Release year
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_year")]
    pub year: Option<i32>,

    /// Quality prior in the domain's native range (0-1 review score,
    /// 0-10 vote average, ...)
    #[serde(default)]
    pub quality: f64,

    /// Popularity prior in the domain's native range
    #[serde(default)]
    pub popularity: f64,

    /// Categorical tags (genres)
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

impl CatalogItem {
    /// Create a new item with required fields
    pub fn new(id: impl Into<String>, name: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            creator: creator.into(),
            year: None,
            quality: 0.0,
            popularity: 0.0,
            tags: Vec::new(),
        }
    }

    /// Case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == needle)
    }

    /// Key used for per-creator diversity counting; items without a
    /// creator share one synthetic bucket
    pub fn creator_key(&self) -> String {
        let key = self.creator.trim().to_lowercase();
        if key.is_empty() {
            "unknown".to_string()
        } else {
            key
        }
    }

    /// Get display name (for logging/UI)
    pub fn display_name(&self) -> String {
        if let Some(year) = self.year {
            format!("{} ({})", self.name, year)
        } else {
            self.name.clone()
        }
    }
}

impl Default for CatalogItem {
    fn default() -> Self {
        Self::new("0", "Unknown Item", "unknown")
    }
}
