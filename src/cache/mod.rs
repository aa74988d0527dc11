// Cache module for local filesystem caching.
// Stores extracted gist documents so repeat requests skip the GitHub API.

pub mod paths;
pub mod store;

pub use paths::{entry_path, validate_identifier};
pub use store::{CacheState, CacheStore};
