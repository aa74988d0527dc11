// GitHub gist endpoint functions.
// Typed requests for a single gist and for the authenticated user's gist list.

use std::time::SystemTime;

use reqwest::StatusCode;
use reqwest::header::LINK;

use super::client::{FetchResult, GitHubClient};
use super::types::{Credential, Gist, GistPage, GistResponse, GistSummary};

/// The remote operations the fetcher needs. Implemented by [`GitHubClient`];
/// tests substitute an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait GistApi {
    /// `GET /gists/{id}`, conditional when `if_modified_since` is set.
    async fn get_gist(
        &mut self,
        id: &str,
        credential: Option<&Credential>,
        if_modified_since: Option<SystemTime>,
    ) -> FetchResult<GistResponse>;

    /// `GET /gists?per_page={per_page}&page={page}`.
    async fn list_gists(
        &mut self,
        credential: &Credential,
        page: u32,
        per_page: u32,
    ) -> FetchResult<GistPage>;
}

impl GistApi for GitHubClient {
    async fn get_gist(
        &mut self,
        id: &str,
        credential: Option<&Credential>,
        if_modified_since: Option<SystemTime>,
    ) -> FetchResult<GistResponse> {
        let no_params: [(&str, &str); 0] = [];
        let response = self
            .get(&format!("/gists/{}", id), &no_params, credential, if_modified_since)
            .await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(GistResponse::NotModified);
        }

        let gist: Gist = response.json().await?;
        Ok(GistResponse::Body(gist))
    }

    async fn list_gists(
        &mut self,
        credential: &Credential,
        page: u32,
        per_page: u32,
    ) -> FetchResult<GistPage> {
        let params = [
            ("per_page", &per_page.to_string()),
            ("page", &page.to_string()),
        ];
        let response = self
            .get("/gists", &params, Some(credential), None)
            .await?;

        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let gists: Vec<GistSummary> = response.json().await?;

        Ok(GistPage { gists, link })
    }
}
