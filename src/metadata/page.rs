//! Product page scraping: fetch, parse share tags, never fail outward.

use crate::error::PipelineError;
use crate::metadata::client::PageFetch;
use crate::metadata::models::ProductMetadata;
use crate::metadata::parser;
use crate::retry::RetryPolicy;
use tracing::{info, warn};
use url::Url;

/// Scrapes OpenGraph/Twitter metadata from a product page.
pub struct PageScraper<F> {
    fetcher: F,
    retry: RetryPolicy,
}

impl<F: PageFetch> PageScraper<F> {
    pub fn new(fetcher: F, retry: RetryPolicy) -> Self {
        Self { fetcher, retry }
    }

    /// Fetches `url` and returns whatever metadata the page exposes.
    ///
    /// Failures come back as `success = false` with an error message.
    pub async fn fetch(&self, url: &str) -> ProductMetadata {
        let url = url.trim();
        if let Err(err) = validate_url(url) {
            warn!("Not fetching metadata: {}", err);
            return ProductMetadata::failed(err.to_string());
        }

        info!("Fetching metadata for URL: {}", url);

        let html = match self.retry.execute("page fetch", || self.fetcher.fetch_html(url)).await {
            Ok(html) => html,
            Err(err) => {
                warn!("Error fetching metadata: {}", err);
                return ProductMetadata::failed(err.to_string());
            }
        };

        let tags = parser::parse_page(&html);
        let mut metadata = ProductMetadata {
            image_url: tags.image_url,
            price: tags.price,
            title: tags.title,
            description: tags.description,
            success: false,
            error_message: None,
        };
        metadata.success = metadata.has_image() || metadata.has_title();

        info!(
            "Fetched metadata: title={:?}, image_url={:?}",
            metadata.title.as_deref().unwrap_or(""),
            metadata.image_url.as_deref().unwrap_or("")
        );

        metadata
    }
}

fn validate_url(url: &str) -> Result<(), PipelineError> {
    if url.is_empty() {
        return Err(PipelineError::InvalidInput("URL is empty".to_string()));
    }

    let parsed =
        Url::parse(url).map_err(|e| PipelineError::InvalidInput(format!("invalid URL '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(PipelineError::InvalidInput(format!("unsupported URL scheme '{}'", other))),
    }
}
