use serde::Deserialize;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Refresh interval in minutes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
    /// Upper bound on simultaneous feed fetches within a category
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

fn default_refresh_interval() -> u64 {
    15
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_max_concurrent_fetches() -> usize {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    pub name: String,
    pub feeds: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            fetch_timeout: default_fetch_timeout(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            categories: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: the aggregator starts with an
    /// empty category list and serves an empty page. Malformed TOML is
    /// surfaced so the operator notices a broken config.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file {} not found, starting with no feeds", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn feed_count(&self) -> usize {
        self.categories.iter().map(|c| c.feeds.len()).sum()
    }
}
