//! End-to-end metadata resolution: scrape first, image search when the page has no image.

use crate::config::Config;
use crate::error::PipelineError;
use crate::metadata::client::{GoogleImageSearch, HttpPageFetcher, ImageSearch, PageFetch};
use crate::metadata::models::ProductMetadata;
use crate::metadata::page::PageScraper;
use crate::metadata::search::ImageSearchClient;
use crate::metadata::strategy;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Resolver wired to the real HTTP transports.
pub type HttpMetadataResolver = MetadataResolver<HttpPageFetcher, GoogleImageSearch>;

/// Combines page scraping with the image search fallback.
pub struct MetadataResolver<F, S> {
    scraper: PageScraper<F>,
    search: ImageSearchClient<S>,
}

impl HttpMetadataResolver {
    /// Builds a resolver from configuration. Fails when search credentials are missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = config.search_settings()?;
        let retry = RetryPolicy::from_config(config);

        let fetcher = HttpPageFetcher::new(config).context("Failed to create HTTP client")?;
        let backend =
            GoogleImageSearch::new(config, settings).context("Failed to create search client")?;

        Ok(Self::new(PageScraper::new(fetcher, retry), ImageSearchClient::new(backend, retry)))
    }
}

impl<F: PageFetch, S: ImageSearch> MetadataResolver<F, S> {
    pub fn new(scraper: PageScraper<F>, search: ImageSearchClient<S>) -> Self {
        Self { scraper, search }
    }

    /// Resolves image, title and description for a product URL.
    ///
    /// `known_title` steers the search query; when absent the scraped title is
    /// used. Never fails: problems are reported through `success` and
    /// `error_message`.
    pub async fn resolve(&self, url: &str, known_title: Option<&str>) -> ProductMetadata {
        let scraped = self.scraper.fetch(url).await;

        let title = non_blank(scraped.title);
        let mut image_url = non_blank(scraped.image_url);
        let mut search_error = None;

        if image_url.is_none() {
            let hint = known_title.filter(|t| !t.trim().is_empty()).or(title.as_deref());

            match strategy::build_query(url, hint) {
                Some(plan) => {
                    let query = plan.query();
                    info!("No image on page, searching ({}): {}", plan.strategy.label(), query);
                    let outcome =
                        self.search.search_with_fallback(&query, plan.fallback.as_ref()).await;
                    image_url = outcome.image_url;
                    search_error = outcome.error.map(|e| e.to_string());
                }
                None => debug!("No search strategy applies to '{}'", url),
            }
        }

        let success = image_url.is_some() || title.is_some();
        let error_message = if success {
            None
        } else {
            let no_result = || {
                PipelineError::NoResult(format!("no image or title found for {}", url)).to_string()
            };
            Some(non_blank(scraped.error_message).or(search_error).unwrap_or_else(no_result))
        };

        ProductMetadata {
            image_url,
            price: scraped.price,
            title,
            description: non_blank(scraped.description),
            success,
            error_message,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
