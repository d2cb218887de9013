use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::client::{FetchPolicy, Subgraph};

/// Default config file path.
pub const CONFIG_PATH: &str = "dashboard.toml";

/// Top-level dashboard config deserialized from `dashboard.toml`.
///
/// Every section is optional; an absent file means built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Per-subgraph endpoint overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub positions: Option<String>,
    pub accounts: Option<String>,
    pub orderbook: Option<String>,
    pub conditional_tokens: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of query results kept in memory.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default)]
    pub fetch_policy: FetchPolicy,
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write config to the given TOML file path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Endpoint for `subgraph`: the override if set, the built-in URL otherwise.
    pub fn endpoint_url(&self, subgraph: Subgraph) -> Result<Url> {
        let configured = match subgraph {
            Subgraph::Positions => self.endpoints.positions.as_deref(),
            Subgraph::Accounts => self.endpoints.accounts.as_deref(),
            Subgraph::Orderbook => self.endpoints.orderbook.as_deref(),
            Subgraph::ConditionalTokens => self.endpoints.conditional_tokens.as_deref(),
        };
        let raw = configured.unwrap_or(subgraph.default_url());
        Url::parse(raw).with_context(|| format!("invalid {subgraph} endpoint URL: {raw}"))
    }
}
