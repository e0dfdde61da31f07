//! # ObjectSeeker role catalog
//!
//! Resolves human-readable Azure role names (English or Japanese) to the
//! canonical role definitions of Azure RBAC, and back.
//!
//! ## Features
//!
//! - **Bilingual acquisition** of built-in role definitions (`en-US` and `ja-JP`)
//! - **CLI fallback** through `az role definition list` when the provider is unreachable
//! - **Merged catalog** keyed by role id, English fetch as the source of truth
//! - **Single-flight cache** with explicit invalidation
//! - **Substring search** over role names, display names and Japanese descriptions
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use objectseeker_roles::{
//!     AzCommandRunner, EngineConfig, FetcherConfig, RoleSearchEngine, ScopeResolver,
//!     SubscriptionSelection,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Arc::new(AzCommandRunner::discover(None)?);
//!     let engine =
//!         RoleSearchEngine::azure(FetcherConfig::default(), EngineConfig::default(), runner)?;
//!
//!     let scope = ScopeResolver::resolve(&SubscriptionSelection::AllBuiltIn, None)?;
//!     for role in engine.search("閲覧者", 10, scope.as_ref()).await? {
//!         println!("{} ({})", role.role_name, role.display_name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod az;
pub mod cache;
pub mod credential;
pub mod error;
pub mod fetcher;
pub mod merge;
pub mod scope;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use az::{AzCommandRunner, CommandOutput, CommandRunner};
pub use cache::{CacheStats, RoleCache};
pub use credential::{AccessToken, AzureCliCredential, CredentialProvider};
pub use error::{Result, RoleError};
pub use fetcher::{
    FetchOrigin, FetchOutcome, FetcherConfig, RoleCatalogFetcher, RoleDefinitionSource,
};
pub use merge::RoleMerger;
pub use scope::{ResourceGroupSelection, ScopePath, ScopeResolver, SubscriptionSelection};
pub use search::{derive_display_name, EngineConfig, RoleSearchEngine, MAX_DERIVED_CHARS};
pub use types::{Catalog, Locale, RawRoleRecord, RoleDefinition, SearchResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
