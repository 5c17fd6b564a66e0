//! Image search credential check.

use crate::config::Config;
use crate::metadata::GoogleImageSearch;
use anyhow::{Context, Result};
use tracing::info;

/// Verifies that the configured image search credentials are accepted.
pub struct CheckCommand {
    config: Config,
}

impl CheckCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Sends one test query. Fails if credentials are missing or the API rejects them.
    pub async fn execute(&self) -> Result<String> {
        let settings = self.config.search_settings()?;
        let endpoint = settings.endpoint.clone();

        let search = GoogleImageSearch::new(&self.config, settings)
            .context("Failed to create search client")?;

        info!("Checking image search API at {}", endpoint);

        if search.check_connection().await {
            Ok(format!("Image search API reachable: {}", endpoint))
        } else {
            anyhow::bail!("Image search API check failed: {}", endpoint)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(endpoint: String) -> Config {
        Config {
            search_endpoint: endpoint,
            search_engine_id: Some("test-cx".to_string()),
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_check_ok() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "test"))
            .and(query_param("cx", "test-cx"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&mock_server)
            .await;

        let cmd = CheckCommand::new(make_config(mock_server.uri()));
        let output = assert_ok!(cmd.execute().await);
        assert!(output.contains("reachable"));
    }

    #[tokio::test]
    async fn test_check_rejected_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let cmd = CheckCommand::new(make_config(mock_server.uri()));
        let err = assert_err!(cmd.execute().await);
        assert!(err.to_string().contains("check failed"));
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn test_check_requires_engine_id() {
        let config = Config { search_engine_id: None, ..make_config("http://unused".to_string()) };
        let err = assert_err!(CheckCommand::new(config).execute().await);
        assert!(err.to_string().contains("Missing search engine id"));
    }
}
