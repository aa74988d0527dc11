// Gist fetcher.
// Serves layout documents from the cache, revalidating stale copies with GitHub.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheState, CacheStore, validate_identifier};
use crate::config::Config;
use crate::error::{FetchError, GistError, Result};
use crate::github::{Credential, Gist, GistApi, GistResponse, GistSummary, PageLinkSet};

/// Where a returned document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    /// Fresh cache hit, no network call.
    Cache,
    /// Stale cache entry confirmed unchanged by a 304.
    Revalidated,
    /// Downloaded from GitHub and written to the cache.
    Network,
}

/// Result of [`GistFetcher::fetch_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found {
        content: String,
        source: DocumentSource,
    },
    /// The gist exists but has no file ending in the document suffix.
    NotFound,
}

impl FetchOutcome {
    pub fn content(&self) -> Option<&str> {
        match self {
            FetchOutcome::Found { content, .. } => Some(content.as_str()),
            FetchOutcome::NotFound => None,
        }
    }

    pub fn into_content(self) -> Option<String> {
        match self {
            FetchOutcome::Found { content, .. } => Some(content),
            FetchOutcome::NotFound => None,
        }
    }
}

/// One page of the user's layout gists.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentListing {
    /// The 1-based page that was requested.
    pub page: u32,
    /// Gists holding at least one layout file.
    pub gists: Vec<GistSummary>,
    pub pagination: PageLinkSet,
}

/// Fetches layout documents through the cache store.
pub struct GistFetcher<A> {
    api: A,
    store: CacheStore,
    document_suffix: String,
    per_page: u32,
}

impl<A: GistApi> GistFetcher<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            api,
            store: CacheStore::from_config(config),
            document_suffix: config.document_suffix.clone(),
            per_page: config.per_page,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Return the current layout document for gist `identifier`.
    ///
    /// Fresh cache entries are served without contacting GitHub. Stale entries
    /// are revalidated with `If-Modified-Since`; a 304 serves the cached copy
    /// and leaves its mtime untouched, so the next request after the freshness
    /// window revalidates again. Failures leave the cache as it was.
    pub async fn fetch_document(
        &mut self,
        identifier: &str,
        credential: Option<&Credential>,
    ) -> Result<FetchOutcome> {
        validate_identifier(identifier)?;

        let if_modified_since = match self.store.classify(identifier)? {
            CacheState::Fresh { .. } => match self.store.read(identifier) {
                Ok(content) => {
                    debug!(identifier, "serving fresh cache entry");
                    return Ok(FetchOutcome::Found {
                        content,
                        source: DocumentSource::Cache,
                    });
                }
                Err(GistError::CacheCorrupt { .. }) => {
                    warn!(identifier, "fresh cache entry unreadable, fetching");
                    None
                }
                Err(e) => return Err(e),
            },
            CacheState::Stale { stored_at } => Some(stored_at),
            CacheState::Absent | CacheState::Invalid => None,
        };

        info!(
            identifier,
            conditional = if_modified_since.is_some(),
            "fetching gist"
        );
        match self
            .api
            .get_gist(identifier, credential, if_modified_since)
            .await?
        {
            GistResponse::Body(gist) => self.accept(identifier, &gist),
            GistResponse::NotModified => match self.store.read(identifier) {
                Ok(content) => {
                    debug!(identifier, "gist not modified, serving cached copy");
                    Ok(FetchOutcome::Found {
                        content,
                        source: DocumentSource::Revalidated,
                    })
                }
                Err(GistError::CacheCorrupt { .. }) => {
                    warn!(identifier, "not modified but cache entry is corrupt, refetching");
                    self.store.remove(identifier)?;
                    self.refetch(identifier, credential).await
                }
                Err(e) => Err(e),
            },
        }
    }

    async fn refetch(
        &mut self,
        identifier: &str,
        credential: Option<&Credential>,
    ) -> Result<FetchOutcome> {
        match self.api.get_gist(identifier, credential, None).await? {
            GistResponse::Body(gist) => self.accept(identifier, &gist),
            GistResponse::NotModified => Err(FetchError::Status {
                status: reqwest::StatusCode::NOT_MODIFIED,
                body: "unconditional request answered with 304".to_string(),
            }
            .into()),
        }
    }

    fn accept(&self, identifier: &str, gist: &Gist) -> Result<FetchOutcome> {
        let Some(content) = extract_document(gist, &self.document_suffix) else {
            info!(identifier, suffix = %self.document_suffix, "gist has no layout file");
            return Ok(FetchOutcome::NotFound);
        };

        // Empty documents would be purged as invalid on the next classify.
        if content.is_empty() {
            debug!(identifier, "layout file is empty, not caching");
        } else {
            self.store.write(identifier, &content)?;
            info!(identifier, bytes = content.len(), "cached gist document");
        }

        Ok(FetchOutcome::Found {
            content,
            source: DocumentSource::Network,
        })
    }

    /// List page `page` (1-based) of the authenticated user's gists, keeping
    /// only those with a layout file.
    ///
    /// Fails with [`GistError::ListingUnavailable`] before any request when
    /// no credential is supplied.
    pub async fn list_documents(
        &mut self,
        credential: Option<&Credential>,
        page: u32,
    ) -> Result<DocumentListing> {
        let credential = credential.ok_or(GistError::ListingUnavailable)?;
        let page = page.max(1);

        info!(page, per_page = self.per_page, "listing gists");
        let response = self.api.list_gists(credential, page, self.per_page).await?;
        let pagination = PageLinkSet::parse(response.link.as_deref());

        let total = response.gists.len();
        let gists: Vec<GistSummary> = response
            .gists
            .into_iter()
            .filter(|gist| gist.has_file_with_suffix(&self.document_suffix))
            .collect();
        debug!(page, total, layouts = gists.len(), "filtered gist listing");

        Ok(DocumentListing {
            page,
            gists,
            pagination,
        })
    }
}

/// Pick the first file (by name) ending in `suffix` and strip the first and
/// last lines of its content.
pub fn extract_document(gist: &Gist, suffix: &str) -> Option<String> {
    let file = gist
        .files
        .values()
        .find(|file| file.filename.ends_with(suffix))?;

    if file.truncated {
        warn!(gist = %gist.id, file = %file.filename, "gist file content is truncated");
    }

    Some(strip_outer_lines(&file.content))
}

fn strip_outer_lines(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() <= 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n")
}
