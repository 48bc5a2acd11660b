use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Where and how the catalog site is queried
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Header text of the search results section that lists titles
    #[serde(default = "default_section_label")]
    pub section_label: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum spacing between the start of two outbound requests
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

fn default_base_url() -> String {
    "https://www.imdb.com".to_string()
}

fn default_section_label() -> String {
    "Titles".to_string()
}

fn default_accept_language() -> String {
    "en-US,en".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_min_interval_ms() -> u64 {
    2000
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            section_label: default_section_label(),
            accept_language: default_accept_language(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if there is one, defaults otherwise
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rate_limit.min_interval_ms == 0 {
            return Err(anyhow::anyhow!("rate_limit.min_interval_ms must be greater than zero"));
        }

        let base = url::Url::parse(self.catalog.base_url.trim()).map_err(|e| {
            anyhow::anyhow!("catalog.base_url '{}' is not a valid URL: {}", self.catalog.base_url, e)
        })?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(anyhow::anyhow!(
                "catalog.base_url must be an http(s) URL with a host, got '{}'",
                self.catalog.base_url
            ));
        }

        if self.catalog.section_label.trim().is_empty() {
            return Err(anyhow::anyhow!("catalog.section_label cannot be empty"));
        }

        Ok(())
    }
}
