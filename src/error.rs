// Error types for kle-cache.
// Separates remote fetch failures from local cache and listing outcomes.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the remote gist API. All of these surface to callers
/// as [`GistError::FetchFailed`] and leave the cache untouched.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("GitHub API error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),
}

#[derive(Error, Debug)]
pub enum GistError {
    #[error("Fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("Cache entry for {identifier} is missing or corrupt")]
    CacheCorrupt { identifier: String },

    #[error("Listing gists requires a GitHub token")]
    ListingUnavailable,

    #[error("Invalid gist identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for GistError {
    fn from(err: reqwest::Error) -> Self {
        GistError::FetchFailed(FetchError::Transport(err))
    }
}

impl From<tempfile::PersistError> for GistError {
    fn from(err: tempfile::PersistError) -> Self {
        GistError::Io(err.error)
    }
}

pub type Result<T> = std::result::Result<T, GistError>;
