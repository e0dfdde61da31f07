//! Single-locale role definition acquisition
//!
//! [`RoleCatalogFetcher`] asks the REST provider first and drops to the
//! Azure CLI when the provider fails or answers with something unreadable.
//! The outcome records which path produced the records, since the CLI path
//! has no locale.

mod cli;
mod payload;
mod rest;

pub use cli::CliRoleProvider;
pub use payload::{parse_cli_listing, parse_provider_page, ProviderPage};
pub use rest::RestRoleProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::az::CommandRunner;
use crate::credential::CredentialProvider;
use crate::error::Result;
use crate::scope::ScopePath;
use crate::types::{Locale, RawRoleRecord};

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Resource manager base URL
    pub management_endpoint: String,

    /// `api-version` query parameter
    pub api_version: String,

    /// Audience requested from the credential provider
    pub token_audience: String,

    /// Bound on each provider request
    pub request_timeout: Duration,

    /// Bound on the CLI fallback
    pub cli_timeout: Duration,

    /// Maximum `nextLink` pages followed per fetch
    pub max_pages: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            management_endpoint: "https://management.azure.com".to_string(),
            api_version: "2022-04-01".to_string(),
            token_audience: "https://management.azure.com/".to_string(),
            request_timeout: Duration::from_secs(30),
            cli_timeout: Duration::from_secs(30),
            max_pages: 50,
        }
    }
}

/// Which path produced a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// REST provider, in the requested locale
    Provider,
    /// Azure CLI, in whatever locale the CLI is configured for
    CliFallback,
}

/// Records from one fetch plus their origin
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub records: Vec<RawRoleRecord>,
    pub origin: FetchOrigin,
}

impl FetchOutcome {
    pub fn provider(records: Vec<RawRoleRecord>) -> Self {
        Self {
            records,
            origin: FetchOrigin::Provider,
        }
    }

    pub fn fallback(records: Vec<RawRoleRecord>) -> Self {
        Self {
            records,
            origin: FetchOrigin::CliFallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == FetchOrigin::CliFallback
    }
}

/// Source of single-locale role definitions
#[async_trait]
pub trait RoleDefinitionSource: Send + Sync {
    /// Built-in role definitions at `scope` (tenant root when `None`)
    async fn fetch(&self, scope: Option<&ScopePath>, locale: Locale) -> Result<FetchOutcome>;
}

/// REST provider with CLI fallback
pub struct RoleCatalogFetcher {
    rest: RestRoleProvider,
    cli: CliRoleProvider,
}

impl RoleCatalogFetcher {
    /// Create a fetcher
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, API version and timeouts
    /// * `credentials` - Token issuer for the provider
    /// * `runner` - `az` runner for the fallback
    pub fn new(
        config: FetcherConfig,
        credentials: Arc<dyn CredentialProvider>,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let cli = CliRoleProvider::new(runner, config.cli_timeout);
        let rest = RestRoleProvider::new(config, credentials)?;
        Ok(Self { rest, cli })
    }
}

#[async_trait]
impl RoleDefinitionSource for RoleCatalogFetcher {
    async fn fetch(&self, scope: Option<&ScopePath>, locale: Locale) -> Result<FetchOutcome> {
        match self.rest.fetch(scope, locale).await {
            Ok(records) => {
                info!("Fetched {} role definitions ({})", records.len(), locale);
                Ok(FetchOutcome::provider(records))
            }
            Err(e) if e.triggers_fallback() => {
                warn!(
                    "Role provider failed for {} ({}); using Azure CLI without localized text",
                    locale, e
                );
                let records = self.cli.fetch(scope).await?;
                info!("Fetched {} role definitions via Azure CLI", records.len());
                Ok(FetchOutcome::fallback(records))
            }
            Err(e) => Err(e),
        }
    }
}
