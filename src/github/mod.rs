// GitHub API module.
// Provides the client, gist endpoints, and response helpers for the gist API.

pub mod client;
pub mod endpoints;
pub mod http_date;
pub mod pagination;
pub mod types;

pub use client::{FetchResult, GitHubClient};
pub use endpoints::GistApi;
pub use pagination::PageLinkSet;
pub use types::*;
