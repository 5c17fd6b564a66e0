//! Metadata resolution command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::metadata::{HttpMetadataResolver, ImageSearch, MetadataResolver, PageFetch};
use anyhow::Result;
use tracing::info;

/// Resolves image and title for one or more product URLs.
pub struct ResolveCommand {
    config: Config,
}

impl ResolveCommand {
    /// Creates a new resolve command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Resolves `urls` against the live page and search API and returns formatted output.
    pub async fn execute(&self, urls: &[String], title: Option<&str>) -> Result<String> {
        Self::check_args(urls, title)?;

        let resolver = HttpMetadataResolver::from_config(&self.config)?;
        self.execute_with_resolver(&resolver, urls, title).await
    }

    /// Resolves `urls` with a provided resolver (for testing).
    pub async fn execute_with_resolver<F: PageFetch, S: ImageSearch>(
        &self,
        resolver: &MetadataResolver<F, S>,
        urls: &[String],
        title: Option<&str>,
    ) -> Result<String> {
        Self::check_args(urls, title)?;

        let formatter = Formatter::new(self.config.format);

        if let [url] = urls {
            let metadata = resolver.resolve(url, title).await;
            return Ok(formatter.format_metadata(url, &metadata));
        }

        let mut results = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            info!("Resolving {}/{}: {}", i + 1, urls.len(), url);
            let metadata = resolver.resolve(url, None).await;
            results.push((url.clone(), metadata));
        }

        Ok(formatter.format_batch(&results))
    }

    fn check_args(urls: &[String], title: Option<&str>) -> Result<()> {
        if urls.is_empty() {
            anyhow::bail!("At least one URL is required");
        }
        if title.is_some() && urls.len() > 1 {
            anyhow::bail!("--title can only be used with a single URL");
        }
        Ok(())
    }
}
