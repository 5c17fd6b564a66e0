//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default Google Custom Search endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Key holding the API secret inside the credentials file.
const CREDENTIALS_KEY: &str = "google_custom_search_api_key";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Custom search engine id (`cx`)
    #[serde(default)]
    pub search_engine_id: Option<String>,

    /// API key; when absent it is read from `credentials_file`
    #[serde(default)]
    pub api_key: Option<String>,

    /// JSON file holding the API key
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,

    /// Image search endpoint
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with page fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Attempts per remote call before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff delay; doubles after every failed attempt
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("app_client_secret.json")
}

fn default_search_endpoint() -> String {
    DEFAULT_SEARCH_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_engine_id: None,
            api_key: None,
            credentials_file: default_credentials_file(),
            search_endpoint: default_search_endpoint(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            proxy: None,
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            format: OutputFormat::Table,
        }
    }
}

/// Immutable credentials handed to the image search client.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub endpoint: String,
    pub api_key: String,
    pub engine_id: String,
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(rename = "google_custom_search_api_key")]
    api_key: String,
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("product-meta.toml");
        if local_config.exists() {
            debug!("Found product-meta.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("product-meta").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(id) = std::env::var("PRODUCT_META_SEARCH_ENGINE_ID") {
            self.search_engine_id = Some(id);
        }

        if let Ok(key) = std::env::var("PRODUCT_META_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(path) = std::env::var("PRODUCT_META_CREDENTIALS") {
            self.credentials_file = PathBuf::from(path);
        }

        if let Ok(proxy) = std::env::var("PRODUCT_META_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("PRODUCT_META_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        self
    }

    /// Returns the API key, reading the credentials file when none was configured.
    pub fn load_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }

        let path = &self.credentials_file;
        debug!("Reading API key from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;

        let credentials: Credentials = serde_json::from_str(&content).with_context(|| {
            format!("Credentials file {} has no '{}' string", path.display(), CREDENTIALS_KEY)
        })?;

        if credentials.api_key.trim().is_empty() {
            anyhow::bail!("'{}' in {} is empty", CREDENTIALS_KEY, path.display());
        }

        Ok(credentials.api_key)
    }

    /// Resolves everything the image search client needs at construction time.
    pub fn search_settings(&self) -> Result<SearchSettings> {
        let engine_id = self
            .search_engine_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .context("Missing search engine id. Set search_engine_id or PRODUCT_META_SEARCH_ENGINE_ID")?;

        Ok(SearchSettings {
            endpoint: self.search_endpoint.clone(),
            api_key: self.load_api_key()?,
            engine_id,
        })
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
