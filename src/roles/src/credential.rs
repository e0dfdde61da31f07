//! Credential boundary
//!
//! The catalog never signs anyone in. It asks a [`CredentialProvider`] for a
//! bearer token and the tenant id, and reports any failure as
//! [`RoleError::AuthRequired`] without retrying.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::az::CommandRunner;
use crate::error::{Result, RoleError};

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Assumed lifetime when the issuer omits an expiry
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(600);

/// Default timeout for credential commands
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Bearer token for one resource audience
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: SystemTime,
}

impl AccessToken {
    /// Create a token valid until `expires_at`
    pub fn new(secret: impl Into<String>, expires_at: SystemTime) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    /// The raw bearer value
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Expiry instant
    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Whether the token is still usable, keeping a refresh margin
    pub fn is_fresh(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN < self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Issues bearer tokens and reports the signed-in tenant
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Token for a resource audience (e.g. `https://management.azure.com/`)
    async fn access_token(&self, audience: &str) -> Result<AccessToken>;

    /// Tenant of the current sign-in
    async fn tenant_id(&self) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct AccountShow {
    #[serde(rename = "tenantId")]
    tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
    /// Seconds since the epoch, emitted by newer CLI releases
    expires_on: Option<u64>,
}

/// Credentials from the signed-in Azure CLI session
///
/// Runs `az account show` once for the tenant and
/// `az account get-access-token --resource <audience>` per audience, caching
/// tokens until shortly before they expire.
pub struct AzureCliCredential {
    runner: Arc<dyn CommandRunner>,
    command_timeout: Duration,
    tenant: Mutex<Option<String>>,
    tokens: DashMap<String, AccessToken>,
}

impl AzureCliCredential {
    /// Create a provider over an `az` runner
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_timeout(runner, DEFAULT_COMMAND_TIMEOUT)
    }

    /// Create a provider with a custom command timeout
    pub fn with_timeout(runner: Arc<dyn CommandRunner>, command_timeout: Duration) -> Self {
        Self {
            runner,
            command_timeout,
            tenant: Mutex::new(None),
            tokens: DashMap::new(),
        }
    }

    /// Run `az login` attached to the terminal, then read the new tenant
    ///
    /// Cached tokens and tenant are dropped first, so the next request uses
    /// the new session.
    pub async fn login(&self) -> Result<String> {
        info!("Starting Azure CLI sign-in");
        self.tokens.clear();
        *self.tenant.lock().await = None;

        let status = self
            .runner
            .run_interactive(&["login", "--output", "none"])
            .await
            .map_err(|e| RoleError::AuthRequired(e.to_string()))?;

        if status != Some(0) {
            warn!("az login exited with {:?}", status);
            return Err(RoleError::AuthRequired(format!(
                "az login exited with {}",
                status.map_or_else(|| "signal".to_string(), |code| code.to_string())
            )));
        }

        let tenant = self.tenant_id().await?;
        info!("Signed in to tenant {}", tenant);
        Ok(tenant)
    }

    async fn run_json<T: for<'de> Deserialize<'de>>(&self, args: &[&str]) -> Result<T> {
        let output = self
            .runner
            .run(args, self.command_timeout)
            .await
            .map_err(|e| RoleError::AuthRequired(e.to_string()))?;

        if !output.success() {
            return Err(RoleError::AuthRequired(format!(
                "az {} failed: {}",
                args.join(" "),
                output.stderr.trim()
            )));
        }

        serde_json::from_str(&output.stdout).map_err(|e| {
            RoleError::AuthRequired(format!("unreadable output from az {}: {}", args.join(" "), e))
        })
    }
}

#[async_trait]
impl CredentialProvider for AzureCliCredential {
    async fn access_token(&self, audience: &str) -> Result<AccessToken> {
        if let Some(token) = self.tokens.get(audience) {
            if token.is_fresh() {
                return Ok(token.clone());
            }
        }

        debug!("Requesting access token for {}", audience);
        let response: TokenResponse = self
            .run_json(&["account", "get-access-token", "--resource", audience, "--output", "json"])
            .await?;

        let secret = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RoleError::AuthRequired("az returned no access token".to_string()))?;

        let expires_at = response
            .expires_on
            .map(|secs| UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap_or_else(|| SystemTime::now() + DEFAULT_TOKEN_LIFETIME);

        let token = AccessToken::new(secret, expires_at);
        self.tokens.insert(audience.to_string(), token.clone());
        info!("Access token acquired for {}", audience);
        Ok(token)
    }

    async fn tenant_id(&self) -> Result<String> {
        let mut tenant = self.tenant.lock().await;
        if let Some(id) = tenant.as_ref() {
            return Ok(id.clone());
        }

        let account: AccountShow = self.run_json(&["account", "show", "--output", "json"]).await?;
        let id = account
            .tenant_id
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RoleError::AuthRequired("az account has no tenant".to_string()))?;

        *tenant = Some(id.clone());
        Ok(id)
    }
}
