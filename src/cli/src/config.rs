//! Frontend configuration loading and validation

use anyhow::{Context, Result};
use objectseeker_roles::{EngineConfig, FetcherConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Complete frontend configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeekerConfig {
    #[serde(default)]
    pub search: SearchSection,

    #[serde(default)]
    pub azure: AzureSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSection {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AzureSection {
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub cli_path: Option<PathBuf>,
    #[serde(default = "default_token_audience")]
    pub token_audience: String,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for AzureSection {
    fn default() -> Self {
        Self {
            management_endpoint: default_management_endpoint(),
            api_version: default_api_version(),
            cli_path: None,
            token_audience: default_token_audience(),
        }
    }
}

// Default value functions
fn default_max_results() -> usize { 100 }
fn default_timeout() -> u64 { 30 }
fn default_management_endpoint() -> String { "https://management.azure.com".to_string() }
fn default_api_version() -> String { "2022-04-01".to_string() }
fn default_token_audience() -> String { "https://management.azure.com/".to_string() }

/// `~/.objectseeker/config.toml`, when a home directory is known
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".objectseeker").join("config.toml"))
}

impl SeekerConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {:?}", path.as_ref()))?;

        let config: SeekerConfig = toml::from_str(&contents)
            .context("Failed to parse configuration file")?;

        Ok(config)
    }

    /// Load an explicit file, or the default file when it exists
    ///
    /// An explicit path must exist. A missing default file yields the
    /// built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::load(path)?;
            info!("Loaded configuration from {:?}", path);
            return Ok(config);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let config = Self::load(&path)?;
                info!("Loaded configuration from {:?}", path);
                Ok(config)
            }
            _ => {
                info!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 {
            anyhow::bail!("search.max_results must be at least 1");
        }

        if self.search.timeout_secs == 0 {
            anyhow::bail!("search.timeout_secs must be at least 1");
        }

        let endpoint = &self.azure.management_endpoint;
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            anyhow::bail!("azure.management_endpoint must be an http(s) URL: {}", endpoint);
        }

        if self.azure.api_version.trim().is_empty() {
            anyhow::bail!("azure.api_version cannot be empty");
        }

        Ok(())
    }

    /// Fetcher settings for the role catalog
    pub fn fetcher_config(&self) -> FetcherConfig {
        let timeout = Duration::from_secs(self.search.timeout_secs);
        FetcherConfig {
            management_endpoint: self.azure.management_endpoint.clone(),
            api_version: self.azure.api_version.clone(),
            token_audience: self.azure.token_audience.clone(),
            request_timeout: timeout,
            cli_timeout: timeout,
            ..FetcherConfig::default()
        }
    }

    /// Engine settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_max_results: self.search.max_results,
        }
    }
}
