//! Role-definition provider (Azure Resource Manager REST)

use std::sync::Arc;

use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::payload::parse_provider_page;
use super::FetcherConfig;
use crate::credential::CredentialProvider;
use crate::error::{Result, RoleError};
use crate::scope::ScopePath;
use crate::types::{Locale, RawRoleRecord};

/// Restricts the listing to platform-defined roles
const BUILT_IN_FILTER: &str = "type eq 'BuiltInRole'";

/// Lists built-in role definitions for one locale over REST
pub struct RestRoleProvider {
    client: Client,
    endpoint: Url,
    config: FetcherConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl RestRoleProvider {
    /// Create a provider client bounded by `config.request_timeout`
    pub fn new(config: FetcherConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RoleError::Internal(format!("HTTP client: {}", e)))?;
        let endpoint = Url::parse(&config.management_endpoint).map_err(|e| {
            RoleError::Internal(format!(
                "management endpoint '{}': {}",
                config.management_endpoint, e
            ))
        })?;

        Ok(Self {
            client,
            endpoint,
            config,
            credentials,
        })
    }

    /// `{endpoint}{scope}/providers/Microsoft.Authorization/roleDefinitions`
    pub fn list_url(&self, scope: Option<&ScopePath>) -> String {
        format!(
            "{}{}/providers/Microsoft.Authorization/roleDefinitions",
            self.config.management_endpoint.trim_end_matches('/'),
            scope.map(ScopePath::as_str).unwrap_or_default()
        )
    }

    /// Parses a `nextLink`, which must share the endpoint's origin
    ///
    /// The bearer token is attached to every page, so links to any other
    /// scheme, host or port are refused.
    pub fn next_page_url(&self, next_link: &str) -> Result<Url> {
        let url = Url::parse(next_link)
            .map_err(|e| RoleError::Parse(format!("nextLink '{}': {}", next_link, e)))?;
        if url.origin() != self.endpoint.origin() {
            return Err(RoleError::Fetch(format!(
                "nextLink '{}' leaves {}",
                next_link,
                self.endpoint.origin().ascii_serialization()
            )));
        }
        Ok(url)
    }

    /// Fetch every page of built-in roles in `locale`
    ///
    /// # Errors
    ///
    /// - `AuthRequired` when no token can be issued
    /// - `Fetch` on transport failure, timeout, non-success status or a
    ///   `nextLink` to another origin
    /// - `Parse` on a malformed body
    pub async fn fetch(
        &self,
        scope: Option<&ScopePath>,
        locale: Locale,
    ) -> Result<Vec<RawRoleRecord>> {
        let token = self
            .credentials
            .access_token(&self.config.token_audience)
            .await?;

        let mut records = Vec::new();
        let mut page = self
            .client
            .get(self.list_url(scope))
            .query(&[
                ("api-version", self.config.api_version.as_str()),
                ("$filter", BUILT_IN_FILTER),
            ]);

        for page_number in 1..=self.config.max_pages {
            let response = page
                .bearer_auth(token.secret())
                .header(ACCEPT_LANGUAGE, locale.accept_language())
                .send()
                .await
                .map_err(|e| RoleError::Fetch(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(RoleError::Fetch(format!(
                    "role definition list returned {}",
                    status
                )));
            }

            let body = response
                .text()
                .await
                .map_err(|e| RoleError::Fetch(e.to_string()))?;
            let parsed = parse_provider_page(&body)?;
            debug!(
                "Fetched {} role definitions ({}, page {})",
                parsed.records.len(),
                locale,
                page_number
            );
            records.extend(parsed.records);

            match parsed.next_link {
                Some(next) => page = self.client.get(self.next_page_url(&next)?),
                None => return Ok(records),
            }
        }

        warn!(
            "Stopped following role definition pages after {}",
            self.config.max_pages
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::AccessToken;
    use async_trait::async_trait;

    struct NoCredential;

    #[async_trait]
    impl CredentialProvider for NoCredential {
        async fn access_token(&self, _audience: &str) -> Result<AccessToken> {
            Err(RoleError::AuthRequired("unused".into()))
        }

        async fn tenant_id(&self) -> Result<String> {
            Err(RoleError::AuthRequired("unused".into()))
        }
    }

    fn provider(endpoint: &str) -> RestRoleProvider {
        let config = FetcherConfig {
            management_endpoint: endpoint.to_string(),
            ..FetcherConfig::default()
        };
        RestRoleProvider::new(config, Arc::new(NoCredential)).unwrap()
    }

    #[test]
    fn test_next_link_on_same_origin_is_followed() {
        let rest = provider("https://management.azure.com");
        let url = rest
            .next_page_url("https://management.azure.com/providers/x?$skiptoken=abc")
            .unwrap();
        assert_eq!(url.host_str(), Some("management.azure.com"));
    }

    #[test]
    fn test_next_link_to_other_origin_is_refused() {
        let rest = provider("https://management.azure.com");

        for link in [
            "https://attacker.example/providers/x",
            "http://management.azure.com/providers/x",
            "https://management.azure.com:8443/providers/x",
        ] {
            assert!(
                matches!(rest.next_page_url(link), Err(RoleError::Fetch(_))),
                "{} should be refused",
                link
            );
        }
    }

    #[test]
    fn test_unparseable_next_link_is_parse_error() {
        let rest = provider("https://management.azure.com");
        assert!(matches!(
            rest.next_page_url("not a url"),
            Err(RoleError::Parse(_))
        ));
    }

    #[test]
    fn test_list_url_includes_scope() {
        let rest = provider("https://management.azure.com/");
        let scope = ScopePath::subscription("S").unwrap();
        let url = rest.list_url(Some(&scope));
        assert!(url.starts_with("https://management.azure.com/subscriptions/S/providers/"));
        assert!(url.ends_with("/Microsoft.Authorization/roleDefinitions"));
    }
}
