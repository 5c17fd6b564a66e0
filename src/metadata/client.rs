//! HTTP transports for product pages and the image search API, using wreq.

use crate::config::{Config, SearchSettings};
use crate::error::PipelineError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;
use wreq_util::Emulation;

/// Fetches raw product page HTML - enables mocking for tests.
#[async_trait]
pub trait PageFetch: Send + Sync {
    /// Returns the body of a 2xx response.
    async fn fetch_html(&self, url: &str) -> Result<String, PipelineError>;
}

/// Runs one image search query - enables mocking for tests.
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Returns the first result link, or `None` when the API found nothing.
    async fn first_image(&self, query: &str) -> Result<Option<String>, PipelineError>;
}

const MAX_REDIRECTS: usize = 10;

fn build_client(config: &Config) -> Result<Client> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let mut builder = Client::builder()
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(wreq::redirect::Policy::limited(MAX_REDIRECTS));

    if let Some(proxy_url) = &config.proxy {
        debug!("Configuring proxy: {}", proxy_url);
        let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Maps a wreq failure to a transport error, without the request URI (search URIs carry the key).
fn transport_error(target: &str, err: wreq::Error) -> PipelineError {
    if err.is_timeout() {
        PipelineError::transport(target, "request timed out")
    } else {
        PipelineError::transport(target, err.without_uri())
    }
}

/// Product page client with browser impersonation.
pub struct HttpPageFetcher {
    client: Client,
    user_agent: String,
}

impl HttpPageFetcher {
    /// Creates a page fetcher with the configured timeout, proxy and user agent.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self { client: build_client(config)?, user_agent: config.user_agent.clone() })
    }
}

#[async_trait]
impl PageFetch for HttpPageFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, PipelineError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(PipelineError::HttpStatus { status: status.as_u16(), target: url.to_string() });
        }

        response.text().await.map_err(|e| transport_error(url, e))
    }
}

/// Subset of the Custom Search JSON response that the pipeline reads.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(rename = "searchInformation")]
    search_information: Option<SearchInformation>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchInformation {
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

const SEARCH_TARGET: &str = "image search API";

/// Google Custom Search client restricted to image results.
pub struct GoogleImageSearch {
    client: Client,
    settings: SearchSettings,
}

impl GoogleImageSearch {
    /// Creates a search client; the settings are fixed for its lifetime.
    pub fn new(config: &Config, settings: SearchSettings) -> Result<Self> {
        Ok(Self { client: build_client(config)?, settings })
    }

    fn request_url(&self, query: &str) -> String {
        format!(
            "{}?key={}&cx={}&q={}&searchType=image&num=1",
            self.settings.endpoint,
            urlencoding::encode(&self.settings.api_key),
            urlencoding::encode(&self.settings.engine_id),
            urlencoding::encode(query)
        )
    }

    /// Returns true if a trivial query is answered with a 2xx status.
    pub async fn check_connection(&self) -> bool {
        match self.client.get(self.request_url("test")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Connection check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl ImageSearch for GoogleImageSearch {
    async fn first_image(&self, query: &str) -> Result<Option<String>, PipelineError> {
        // The request URL carries the API key; log the query only.
        debug!("GET {} q={:?}", self.settings.endpoint, query);

        let response = self
            .client
            .get(self.request_url(query))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| transport_error(SEARCH_TARGET, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::HttpStatus {
                status: status.as_u16(),
                target: SEARCH_TARGET.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| transport_error(SEARCH_TARGET, e))?;
        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| PipelineError::Parse(format!("image search response: {}", e)))?;

        let link = parsed
            .items
            .into_iter()
            .next()
            .and_then(|item| item.link)
            .filter(|link| !link.trim().is_empty());

        match &link {
            Some(_) => info!("Found image for query: {}", query),
            None => {
                let total = parsed
                    .search_information
                    .and_then(|info| info.total_results)
                    .unwrap_or_else(|| "unknown".to_string());
                info!("No results for query (total: {}): {}", total, query);
            }
        }

        Ok(link)
    }
}
