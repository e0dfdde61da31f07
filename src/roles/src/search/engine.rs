//! Role search engine
//!
//! Orchestrates credential check, catalog cache and matching:
//!
//! ```text
//! search(query) → CredentialProvider → RoleCache ─(miss)→ RoleCatalogFetcher(en, ja) → RoleMerger
//!                                         ↓
//!                                   substring match → SearchResult[..max_results]
//! ```

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::display_name::derive_display_name;
use crate::az::CommandRunner;
use crate::cache::RoleCache;
use crate::credential::{AzureCliCredential, CredentialProvider};
use crate::error::{Result, RoleError};
use crate::fetcher::{FetcherConfig, RoleCatalogFetcher, RoleDefinitionSource};
use crate::scope::ScopePath;
use crate::types::{Catalog, RoleDefinition, SearchResult};

/// Search engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Result limit used by frontends that do not pass one
    pub default_max_results: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_results: 100,
        }
    }
}

/// Answers free-text role queries against a cached bilingual catalog
pub struct RoleSearchEngine {
    credentials: Arc<dyn CredentialProvider>,
    cache: RoleCache,
    config: EngineConfig,
}

impl RoleSearchEngine {
    /// Create an engine
    ///
    /// # Arguments
    ///
    /// * `credentials` - Checked before every query
    /// * `source` - Role definitions, fetched at most once per cache lifetime
    /// * `config` - Engine configuration
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        source: Arc<dyn RoleDefinitionSource>,
        config: EngineConfig,
    ) -> Self {
        info!(
            "RoleSearchEngine initialized with default_max_results={}",
            config.default_max_results
        );
        Self {
            credentials,
            cache: RoleCache::new(source),
            config,
        }
    }

    /// Wire an engine to Azure: CLI credentials, REST provider, CLI fallback
    pub fn azure(
        fetcher_config: FetcherConfig,
        config: EngineConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let credentials: Arc<dyn CredentialProvider> =
            Arc::new(AzureCliCredential::with_timeout(runner.clone(), fetcher_config.cli_timeout));
        let fetcher = RoleCatalogFetcher::new(fetcher_config, credentials.clone(), runner)?;
        Ok(Self::new(credentials, Arc::new(fetcher), config))
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The catalog cache
    pub fn cache(&self) -> &RoleCache {
        &self.cache
    }

    /// Search roles by English or Japanese name
    ///
    /// # Pipeline
    ///
    /// 1. Require a credential (`AuthRequired` otherwise)
    /// 2. Load the catalog (fetch + merge at most once per cache lifetime)
    /// 3. Flag entries whose role name, English display name, Japanese
    ///    display name or Japanese description contains `query`
    /// 4. Emit flagged entries in catalog order, up to `max_results`
    ///
    /// An empty `query` matches every entry. No results is not an error.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        scope: Option<&ScopePath>,
    ) -> Result<Vec<SearchResult>> {
        info!("Role search: query='{}'", query);
        let catalog = self.catalog(scope).await?;
        debug!("Searching {} role definitions", catalog.len());

        let query_lower = query.to_lowercase();
        let matched: Vec<&RoleDefinition> = catalog
            .iter()
            .filter(|role| matches_role(role, query, &query_lower))
            .collect();
        debug!("{} role ids matched", matched.len());

        let results: Vec<SearchResult> = matched
            .into_iter()
            .take(max_results)
            .map(to_search_result)
            .collect();

        info!("Role search complete: {} results", results.len());
        Ok(results)
    }

    /// Run [`search`](Self::search) on a Tokio task
    ///
    /// The result arrives on the returned channel, so an interactive caller
    /// stays responsive while the catalog is fetched.
    pub fn spawn_search(
        self: &Arc<Self>,
        query: String,
        max_results: usize,
        scope: Option<ScopePath>,
    ) -> oneshot::Receiver<Result<Vec<SearchResult>>> {
        let (tx, rx) = oneshot::channel();
        let engine = Arc::clone(self);

        tokio::spawn(async move {
            let result = engine.search(&query, max_results, scope.as_ref()).await;
            if tx.send(result).is_err() {
                debug!("Search receiver dropped before completion");
            }
        });

        rx
    }

    /// Canonical role name for a human-readable (usually Japanese) name
    ///
    /// Exact matches on the Japanese display name (stored or derived), the
    /// English display name and the role name are tried first; then the
    /// first Japanese display name containing `name`.
    pub async fn role_name_for(
        &self,
        name: &str,
        scope: Option<&ScopePath>,
    ) -> Result<Option<String>> {
        let name = name.trim();
        let catalog = self.catalog(scope).await?;
        if name.is_empty() {
            return Ok(None);
        }

        let exact = catalog.iter().find(|role| {
            resolved_display_name(role) == name
                || role.display_name_en.as_deref() == Some(name)
                || role.role_name == name
        });
        let found = exact.or_else(|| {
            catalog
                .iter()
                .find(|role| resolved_display_name(role).contains(name))
        });

        match found {
            Some(role) => {
                info!("Resolved role name: {} -> {}", name, role.role_name);
                Ok(Some(role.role_name.clone()))
            }
            None => {
                warn!("No role found for name: {}", name);
                Ok(None)
            }
        }
    }

    /// Looks a role up by role name (case-insensitive) or id
    pub async fn describe(
        &self,
        key: &str,
        scope: Option<&ScopePath>,
    ) -> Result<Option<SearchResult>> {
        let key = key.trim();
        let catalog = self.catalog(scope).await?;

        let role = catalog.get(key).or_else(|| {
            catalog.iter().find(|role| {
                role.id.eq_ignore_ascii_case(key) || role.role_name.eq_ignore_ascii_case(key)
            })
        });

        Ok(role.map(to_search_result))
    }

    /// Drop the cached catalog; the next query refetches
    pub async fn clear_cache(&self) {
        self.cache.invalidate().await;
    }

    async fn catalog(&self, scope: Option<&ScopePath>) -> Result<Arc<Catalog>> {
        self.ensure_authenticated().await?;
        self.cache.get(scope).await
    }

    async fn ensure_authenticated(&self) -> Result<()> {
        match self.credentials.tenant_id().await {
            Ok(tenant) => {
                debug!("Authenticated for tenant {}", tenant);
                Ok(())
            }
            Err(RoleError::AuthRequired(reason)) => Err(RoleError::AuthRequired(reason)),
            Err(other) => Err(RoleError::AuthRequired(other.to_string())),
        }
    }
}

/// Substring test in lower-cased and original case
///
/// Lower-casing is kept alongside the raw comparison because case folding
/// is unreliable across scripts.
fn contains_query(field: &str, query: &str, query_lower: &str) -> bool {
    field.to_lowercase().contains(query_lower) || field.contains(query)
}

fn matches_role(role: &RoleDefinition, query: &str, query_lower: &str) -> bool {
    let matches =
        |field: Option<&str>| field.map_or(false, |f| contains_query(f, query, query_lower));

    contains_query(&role.role_name, query, query_lower)
        || matches(role.display_name_en.as_deref())
        || matches(role.display_name_ja.as_deref())
        || matches(role.description_ja.as_deref())
}

/// Japanese display name, synthesized from the description when absent
fn resolved_display_name(role: &RoleDefinition) -> String {
    role.display_name_ja
        .clone()
        .or_else(|| role.description_ja.as_deref().and_then(derive_display_name))
        .unwrap_or_default()
}

fn to_search_result(role: &RoleDefinition) -> SearchResult {
    let description = role
        .description_ja
        .as_deref()
        .filter(|d| !d.is_empty())
        .or(role.description_en.as_deref())
        .unwrap_or_default()
        .to_string();

    SearchResult {
        role_name: role.role_name.clone(),
        display_name: resolved_display_name(role),
        description,
        id: role.id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> RoleDefinition {
        RoleDefinition {
            id: format!("/providers/Microsoft.Authorization/roleDefinitions/{}", name),
            role_name: name.to_string(),
            display_name_en: None,
            display_name_ja: None,
            description_en: None,
            description_ja: None,
            is_built_in: true,
        }
    }

    #[test]
    fn test_case_insensitive_role_name_match() {
        let reader = role("Reader");
        assert!(matches_role(&reader, "reader", "reader"));
        assert!(matches_role(&reader, "READ", "read"));
        assert!(!matches_role(&reader, "owner", "owner"));
    }

    #[test]
    fn test_original_case_match_when_folding_misses() {
        // Word-final sigma folds to "ς", a lone query sigma to "σ"
        let role = RoleDefinition {
            display_name_ja: Some("ΑΣ".into()),
            ..role("Reader")
        };
        let query = "Σ";
        let query_lower = query.to_lowercase();

        assert!(!"ΑΣ".to_lowercase().contains(&query_lower));
        assert!(contains_query("ΑΣ", query, &query_lower));
        assert!(matches_role(&role, query, &query_lower));
    }

    #[test]
    fn test_english_description_is_not_searched() {
        let reader = RoleDefinition {
            description_en: Some("View all resources".into()),
            ..role("Reader")
        };
        assert!(!matches_role(&reader, "resources", "resources"));
    }

    #[test]
    fn test_japanese_description_is_searched() {
        let reader = RoleDefinition {
            description_ja: Some("すべてを表示できます".into()),
            ..role("Reader")
        };
        assert!(matches_role(&reader, "表示", "表示"));
    }

    #[test]
    fn test_result_prefers_japanese_text() {
        let reader = RoleDefinition {
            display_name_ja: Some("閲覧者".into()),
            description_en: Some("View all resources".into()),
            description_ja: Some("すべてを表示できます".into()),
            ..role("Reader")
        };

        let result = to_search_result(&reader);
        assert_eq!(result.display_name, "閲覧者");
        assert_eq!(result.description, "すべてを表示できます");
    }

    #[test]
    fn test_result_falls_back_to_english_description() {
        let reader = RoleDefinition {
            description_en: Some("View all resources".into()),
            ..role("Reader")
        };

        let result = to_search_result(&reader);
        assert_eq!(result.display_name, "");
        assert_eq!(result.description, "View all resources");
    }

    #[test]
    fn test_result_derives_display_name() {
        let reader = RoleDefinition {
            description_ja: Some("閲覧者ロールは読み取りのみ許可します。".into()),
            ..role("Reader")
        };

        assert_eq!(to_search_result(&reader).display_name, "閲覧者");
    }
}
