// GitHub API HTTP client.
// Handles credentials, conditional requests, rate limiting, and status mapping.

use std::time::SystemTime;

use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, IF_MODIFIED_SINCE, USER_AGENT},
};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::FetchError;

use super::http_date::format_http_date;
use super::types::{Credential, RateLimit};

pub type FetchResult<T> = std::result::Result<T, FetchError>;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// GitHub API client with optional per-request credentials and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    api_root: String,
    rate_limit: RateLimit,
}

impl GitHubClient {
    /// Create a client for `config.api_root` with the configured user agent and timeout.
    pub fn new(config: &Config) -> FetchResult<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| FetchError::InvalidHeader(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_root: config.api_root.trim_end_matches('/').to_string(),
            rate_limit: RateLimit::default(),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Get the rate limit reported by the most recent response.
    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    /// GET `endpoint` with query parameters, an optional credential and an
    /// optional `If-Modified-Since` time.
    ///
    /// A 304 is returned as a response like any success; callers that sent
    /// `if_modified_since` must check for it.
    pub async fn get<T: serde::Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        params: &T,
        credential: Option<&Credential>,
        if_modified_since: Option<SystemTime>,
    ) -> FetchResult<Response> {
        let url = format!("{}{}", self.api_root, endpoint);
        let mut request = self.client.get(&url).query(params);

        if let Some(credential) = credential {
            request = request.query(&[("access_token", credential.as_str())]);
        }

        if let Some(time) = if_modified_since {
            let date = format_http_date(time);
            debug!(%url, if_modified_since = %date, "conditional request");
            request = request.header(IF_MODIFIED_SINCE, date);
        }

        self.send(request).await
    }

    async fn send(&mut self, request: RequestBuilder) -> FetchResult<Response> {
        let response = request.send().await?;
        info!(url = %response.url().path(), status = %response.status(), "GitHub API response");

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&mut self, response: &Response) {
        if let Some(limit) = header_u64(response, "x-ratelimit-limit") {
            self.rate_limit.limit = limit;
        }
        if let Some(remaining) = header_u64(response, "x-ratelimit-remaining") {
            self.rate_limit.remaining = remaining;
        }
        if let Some(reset) = header_u64(response, "x-ratelimit-reset") {
            self.rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> FetchResult<Response> {
        match response.status() {
            StatusCode::OK | StatusCode::NOT_MODIFIED => Ok(response),
            StatusCode::UNAUTHORIZED => Err(FetchError::Unauthorized),
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(response.url().to_string())),
            StatusCode::FORBIDDEN if header_u64(&response, "x-ratelimit-remaining") == Some(0) => {
                let reset_at = chrono::DateTime::from_timestamp(self.rate_limit.reset as i64, 0)
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(FetchError::RateLimited { reset_at })
            }
            status => Err(FetchError::Status {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

fn header_u64(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
