//! Error types for the plex sorter.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a metadata provider binding.
///
/// Transient failures make the caller treat the current query term as
/// empty and continue; fatal failures abort the current file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("transient provider failure: {0}")]
    Transient(String),

    #[error("provider request failed: {0}")]
    Fatal(String),
}

impl ProviderError {
    /// Whether the failure may succeed if retried later.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return ProviderError::Transient(err.to_string());
        }
        match err.status() {
            Some(status) if status.as_u16() == 429 || status.is_server_error() => {
                ProviderError::Transient(err.to_string())
            }
            _ => ProviderError::Fatal(err.to_string()),
        }
    }
}

/// Main error type for the plex sorter.
#[derive(Error, Debug)]
pub enum Error {
    // Preflight errors
    #[error("TMDB API key not configured. Set TMDB_API_KEY environment variable")]
    TmdbApiKeyMissing,

    #[error("OMDb API key not configured. Set OMDB_API_KEY environment variable")]
    OmdbApiKeyMissing,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("File already exists: {0}")]
    FileAlreadyExists(String),

    #[error("Failed to place {from} at {to}: {source}")]
    Placement {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },

    // Provider errors
    #[error(transparent)]
    Provider(#[from] ProviderError),

    // Run errors
    #[error("Run worker failed: {0}")]
    Worker(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
