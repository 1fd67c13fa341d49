use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Square API error: {message}")]
    Api { message: String },
}

impl CatalogError {
    /// Whether the error was an upstream request that ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CatalogError::Http(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
