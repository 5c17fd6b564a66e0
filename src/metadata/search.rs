//! Image search with progressive query simplification.

use crate::error::PipelineError;
use crate::metadata::client::ImageSearch;
use crate::metadata::models::Fallback;
use crate::retry::{RetryOutcome, RetryPolicy};
use tracing::{debug, info, warn};

/// What a fallback search produced.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// First image link found, if any
    pub image_url: Option<String>,
    /// Queries actually sent, in order
    pub attempted: Vec<String>,
    /// Last transport/API failure seen; `None` if every attempt merely came back empty
    pub error: Option<PipelineError>,
}

/// Runs image searches through a retry policy.
pub struct ImageSearchClient<S> {
    backend: S,
    retry: RetryPolicy,
}

impl<S: ImageSearch> ImageSearchClient<S> {
    pub fn new(backend: S, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// Runs one query; `Ok(None)` means the API answered with no items.
    pub async fn search(&self, query: &str) -> RetryOutcome<Option<String>> {
        self.retry.execute("image search", || self.backend.first_image(query)).await
    }

    /// Tries `primary`, then `"{domain} {name}"`, then `"{domain} {first 4 words}"`
    /// when the name has more than four words. Stops at the first link found.
    /// Identical queries are sent only once.
    pub async fn search_with_fallback(
        &self,
        primary: &str,
        fallback: Option<&Fallback>,
    ) -> SearchOutcome {
        let mut queries = vec![primary.to_string()];
        if let Some(fallback) = fallback {
            queries.extend(fallback.simplified_queries());
        }

        let mut outcome = SearchOutcome::default();

        for (step, query) in queries.into_iter().enumerate() {
            if outcome.attempted.contains(&query) {
                debug!("Skipping repeated query: {}", query);
                continue;
            }

            if step > 0 {
                info!("Previous search found nothing. Trying simplified query: {}", query);
            }

            let result = self.search(&query).await;
            outcome.attempted.push(query);

            match result {
                Ok(Some(link)) => {
                    outcome.image_url = Some(link);
                    return outcome;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!("Error executing image search: {}", err);
                    outcome.error = Some(err);
                }
            }
        }

        outcome
    }
}
