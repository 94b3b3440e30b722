use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Unique, exclusion or compare-and-set violation. The write did not apply.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Storage not configured: {0}")]
    Configuration(String),
}
