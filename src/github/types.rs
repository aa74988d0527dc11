// GitHub gist API response types.
// Defines structs for deserializing gist and gist listing responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single gist as returned by `GET /gists/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gist {
    #[serde(default)]
    pub id: String,
    /// Files keyed by filename.
    pub files: BTreeMap<String, GistFile>,
}

/// A file attached to a gist, including its body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub truncated: bool,
}

/// Gist entry in a listing (`GET /gists`). File bodies are not included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistSummary {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub files: BTreeMap<String, GistFileMeta>,
}

impl GistSummary {
    /// Whether any attached file name ends with `suffix`.
    pub fn has_file_with_suffix(&self, suffix: &str) -> bool {
        self.files.keys().any(|name| name.ends_with(suffix))
    }
}

/// File metadata within a gist listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFileMeta {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Outcome of a (possibly conditional) gist request.
#[derive(Debug, Clone)]
pub enum GistResponse {
    /// The server answered 304 to an `If-Modified-Since` request.
    NotModified,
    Body(Gist),
}

/// One page of a gist listing plus its raw `Link` header.
#[derive(Debug, Clone, Default)]
pub struct GistPage {
    pub gists: Vec<GistSummary>,
    pub link: Option<String>,
}

/// Opaque GitHub access token supplied by the caller.
///
/// Sent verbatim as the `access_token` query parameter; never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Treat an empty or whitespace-only token as no credential at all.
    pub fn from_optional(token: Option<String>) -> Option<Self> {
        token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
