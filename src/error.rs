use thiserror::Error;

/// Main error type for the recommendation engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Artifact I/O errors (missing cache file, unreadable path)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact decode errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Artifact schema mismatch (wrong matrix width, row count, duplicate ids)
    #[error("Schema mismatch: {0}")]
    Schema(String),

    /// Catalog failed to load or has not been loaded yet
    #[error("Catalog '{0}' is not ready")]
    NotReady(String),

    /// Client-side query errors (too few seeds, no known seed ids)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Other(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;
