//! Shodan REST API client
//!
//! This module exposes the three calls the query pipeline needs:
//!
//! - account check (`/api-info`), used once at startup to validate the key
//! - cursor search (`/shodan/host/search`), fetched one page at a time
//! - host lookup (`/shodan/host/{ip}`)
//!
//! The pipeline talks to the API through the [`HostIntel`] trait so tests can
//! substitute scripted responses.
//!
//! # Example
//!
//! ```no_run
//! use blacked_core::shodan::{HostIntel, SearchCursor, ShodanClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ShodanClient::new("MY_KEY")?;
//! client.check_account().await?;
//! let mut cursor = client.search("apache");
//! while let Some(item) = cursor.next().await {
//!     println!("{:?}", item?.ip_str());
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::types::{AccountInfo, RawRecord};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

pub const SHODAN_API_BASE: &str = "https://api.shodan.io";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote host-intelligence operations used by the pipeline
#[allow(async_fn_in_trait)]
pub trait HostIntel {
    type Cursor: SearchCursor;

    /// Validates the API key
    async fn check_account(&self) -> Result<AccountInfo>;

    /// Starts a lazy search; nothing is fetched until the cursor is pulled
    fn search(&self, query: &str) -> Self::Cursor;

    /// Fetches everything known about one IP
    async fn lookup(&self, ip: &str) -> Result<RawRecord>;
}

/// Pull-based sequence of search results
///
/// Yields `None` once exhausted. After yielding an error the cursor is
/// finished. Dropping a cursor early is always fine.
#[allow(async_fn_in_trait)]
pub trait SearchCursor {
    async fn next(&mut self) -> Option<Result<RawRecord>>;
}

/// Client for the Shodan REST API
#[derive(Clone)]
pub struct ShodanClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for ShodanClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShodanClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
}

/// One page of search results
#[derive(Debug, Default, Deserialize)]
struct SearchPage {
    #[serde(default)]
    matches: Vec<RawRecord>,
    #[serde(default)]
    total: Option<u64>,
}

impl ShodanClient {
    /// Creates a client for the public API with the default timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom request timeout
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("blacked/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: SHODAN_API_BASE.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Points the client at another API root (no trailing slash needed)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Performs one GET and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        tracing::debug!(path, "shodan request");

        let response = self
            .client
            .get(self.endpoint(path))
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::RemoteService(api_error_message(status, &body)));
        }

        // Some failures come back as 200 with an error object.
        if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(&body) {
            return Err(Error::RemoteService(err.error));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::RemoteService(format!("Unexpected response from Shodan: {}", e)))
    }

    async fn search_page(&self, query: &str, page: u32) -> Result<SearchPage> {
        let page = page.to_string();
        self.get_json("/shodan/host/search", &[("query", query), ("page", page.as_str())])
            .await
    }
}

impl HostIntel for ShodanClient {
    type Cursor = ShodanSearch;

    async fn check_account(&self) -> Result<AccountInfo> {
        self.get_json("/api-info", &[]).await
    }

    fn search(&self, query: &str) -> ShodanSearch {
        ShodanSearch::new(self.clone(), query)
    }

    async fn lookup(&self, ip: &str) -> Result<RawRecord> {
        self.get_json(&format!("/shodan/host/{}", ip), &[]).await
    }
}

/// Lazy page-by-page search cursor
#[derive(Debug)]
pub struct ShodanSearch {
    client: ShodanClient,
    query: String,
    next_page: u32,
    buffered: VecDeque<RawRecord>,
    yielded: u64,
    total: Option<u64>,
    finished: bool,
}

impl ShodanSearch {
    fn new(client: ShodanClient, query: &str) -> Self {
        Self {
            client,
            query: query.to_string(),
            next_page: 1,
            buffered: VecDeque::new(),
            yielded: 0,
            total: None,
            finished: false,
        }
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> u32 {
        self.next_page - 1
    }

    fn exhausted(&self) -> bool {
        self.finished || self.total.is_some_and(|total| self.yielded >= total)
    }

    async fn fill(&mut self) -> Result<()> {
        let page = self.client.search_page(&self.query, self.next_page).await?;
        tracing::debug!(
            page = self.next_page,
            matches = page.matches.len(),
            total = ?page.total,
            "fetched search page"
        );
        self.next_page += 1;

        if page.matches.is_empty() {
            self.finished = true;
        }
        if page.total.is_some() {
            self.total = page.total;
        }
        self.buffered.extend(page.matches);
        Ok(())
    }
}

impl SearchCursor for ShodanSearch {
    async fn next(&mut self) -> Option<Result<RawRecord>> {
        if self.buffered.is_empty() {
            if self.exhausted() {
                return None;
            }
            if let Err(e) = self.fill().await {
                self.finished = true;
                return Some(Err(e));
            }
        }

        let item = self.buffered.pop_front()?;
        self.yielded += 1;
        Some(Ok(item))
    }
}

/// Extracts the provider's message from a failed response
fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(err) => err.error,
        Err(_) => match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => format!("API request failed with status: {}", status),
        },
    }
}
