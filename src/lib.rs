// kle-cache: fetch keyboard-layout gists from GitHub through an on-disk cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;

pub use config::Config;
pub use error::{FetchError, GistError, Result};
pub use fetcher::{DocumentListing, DocumentSource, FetchOutcome, GistFetcher, extract_document};
pub use github::{Credential, GistApi, GitHubClient, PageLinkSet};
