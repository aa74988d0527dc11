// Runtime configuration.
// Built once by the caller and handed to each component at construction.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::error::{GistError, Result};

pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

/// Cached copies younger than this are served without a network round trip.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60);

pub const DEFAULT_DOCUMENT_SUFFIX: &str = ".kbd.json";
pub const DEFAULT_CACHE_EXTENSION: &str = "gist";
pub const DEFAULT_PER_PAGE: u32 = 25;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration shared by the cache store, the GitHub client and the fetcher.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the GitHub REST API, without a trailing slash.
    pub api_root: String,
    /// Directory holding one file per cached gist.
    pub cache_dir: PathBuf,
    /// Maximum age before a cached copy must be revalidated.
    pub freshness: Duration,
    /// Filename ending that marks the layout file inside a gist.
    pub document_suffix: String,
    /// Extension of cache files (`{identifier}.{ext}`).
    pub cache_extension: String,
    /// Page size for gist listings.
    pub per_page: u32,
    /// Request timeout for the HTTP client.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            cache_dir: default_cache_dir(),
            freshness: DEFAULT_FRESHNESS,
            document_suffix: DEFAULT_DOCUMENT_SUFFIX.to_string(),
            cache_extension: DEFAULT_CACHE_EXTENSION.to_string(),
            per_page: DEFAULT_PER_PAGE,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("kle-cache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `KLE_CACHE_DIR`, `KLE_CACHE_TIME` and `KLE_API_ROOT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup("KLE_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }

        if let Some(secs) = lookup("KLE_CACHE_TIME") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| GistError::Config(format!("KLE_CACHE_TIME is not a number: {secs}")))?;
            config.freshness = Duration::from_secs(secs);
        }

        if let Some(root) = lookup("KLE_API_ROOT") {
            config = config.with_api_root(root)?;
        }

        Ok(config)
    }

    /// Replace the API root, rejecting values that are not absolute URLs.
    pub fn with_api_root(mut self, root: impl Into<String>) -> Result<Self> {
        let root = root.into();
        url::Url::parse(&root)
            .map_err(|e| GistError::Config(format!("invalid API root {root}: {e}")))?;
        self.api_root = root.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }
}

/// XDG cache directory (~/.cache/kle-cache on Linux), or `kle_cache` when no
/// home directory can be determined.
pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "kle-cache")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("kle_cache"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_root, "https://api.github.com");
        assert_eq!(config.freshness, Duration::from_secs(60));
        assert_eq!(config.document_suffix, ".kbd.json");
        assert_eq!(config.per_page, 25);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("KLE_CACHE_DIR", "/tmp/layouts"),
            ("KLE_CACHE_TIME", "300"),
            ("KLE_API_ROOT", "http://127.0.0.1:9000/"),
        ]))
        .unwrap();

        assert_eq!(config.cache_dir, PathBuf::from("/tmp/layouts"));
        assert_eq!(config.freshness, Duration::from_secs(300));
        assert_eq!(config.api_root, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_cache_time_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("KLE_CACHE_TIME", "soon")])).unwrap_err();
        assert!(matches!(err, GistError::Config(_)));
    }

    #[test]
    fn test_invalid_api_root_is_rejected() {
        let err = Config::default().with_api_root("not a url").unwrap_err();
        assert!(matches!(err, GistError::Config(_)));
    }
}
