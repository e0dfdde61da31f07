//! Per-engine role catalog cache
//!
//! Holds one merged [`Catalog`] together with the scope it was built for.
//! Population is single-flight: the slot mutex is held for the whole
//! English fetch → Japanese fetch → merge sequence, so concurrent callers
//! wait for that one build instead of starting their own, and
//! [`RoleCache::invalidate`] lands only after an in-flight build finishes.
//! Callers that queued behind a failed build receive its error; the next
//! caller to arrive afterwards starts a fresh build.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Result, RoleError};
use crate::fetcher::{FetchOrigin, RoleDefinitionSource};
use crate::merge::RoleMerger;
use crate::scope::ScopePath;
use crate::types::{Catalog, Locale};

/// Statistics about cache usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls answered from the stored catalog
    pub hits: usize,
    /// Completed fetch + merge cycles
    pub builds: usize,
    /// Build attempts that ended in an error
    pub failed_builds: usize,
    /// Explicit invalidations and scope changes
    pub invalidations: usize,
    /// Entries in the stored catalog (0 when empty)
    pub entries: usize,
    /// Origin of the stored catalog
    pub origin: Option<FetchOrigin>,
}

struct CachedCatalog {
    scope: Option<ScopePath>,
    catalog: Arc<Catalog>,
    origin: FetchOrigin,
}

/// Error of the most recent build, handed to callers queued behind it
struct FailedBuild {
    scope: Option<ScopePath>,
    attempt: u64,
    error: RoleError,
}

#[derive(Default)]
struct Slot {
    cached: Option<CachedCatalog>,
    failure: Option<FailedBuild>,
}

/// Lazily built, explicitly invalidated role catalog
pub struct RoleCache {
    source: Arc<dyn RoleDefinitionSource>,
    slot: Mutex<Slot>,
    /// Finished build attempts, successful or not
    attempts: AtomicU64,
    hits: AtomicUsize,
    builds: AtomicUsize,
    failed_builds: AtomicUsize,
    invalidations: AtomicUsize,
}

impl RoleCache {
    /// Create an empty cache over a definition source
    pub fn new(source: Arc<dyn RoleDefinitionSource>) -> Self {
        Self {
            source,
            slot: Mutex::new(Slot::default()),
            attempts: AtomicU64::new(0),
            hits: AtomicUsize::new(0),
            builds: AtomicUsize::new(0),
            failed_builds: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        }
    }

    /// Returns the catalog for `scope`, building it on first use
    ///
    /// A scope different from the stored one invalidates the stored catalog
    /// before rebuilding. A failed build leaves the cache empty; callers
    /// that were already waiting on it get the same error.
    pub async fn get(&self, scope: Option<&ScopePath>) -> Result<Arc<Catalog>> {
        let seen = self.attempts.load(Ordering::SeqCst);
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.cached.as_ref() {
            if cached.scope.as_ref() == scope {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(cached.catalog.clone());
            }
            info!(
                "Scope changed from {} to {}; rebuilding role catalog",
                describe_scope(cached.scope.as_ref()),
                describe_scope(scope)
            );
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            slot.cached = None;
        }

        if let Some(failure) = slot.failure.as_ref() {
            if failure.attempt > seen && failure.scope.as_ref() == scope {
                debug!("Sharing failed role catalog build: {}", failure.error);
                return Err(failure.error.clone());
            }
        }

        let built = self.build(scope).await;
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        match built {
            Ok((catalog, origin)) => {
                let catalog = Arc::new(catalog);
                slot.cached = Some(CachedCatalog {
                    scope: scope.cloned(),
                    catalog: catalog.clone(),
                    origin,
                });
                slot.failure = None;
                self.builds.fetch_add(1, Ordering::Relaxed);
                Ok(catalog)
            }
            Err(error) => {
                warn!("Role catalog build failed: {}", error);
                slot.failure = Some(FailedBuild {
                    scope: scope.cloned(),
                    attempt,
                    error: error.clone(),
                });
                self.failed_builds.fetch_add(1, Ordering::Relaxed);
                Err(error)
            }
        }
    }

    /// Drops the stored catalog; waits for any in-flight build first
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        slot.failure = None;
        if slot.cached.take().is_some() {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!("Role catalog cache cleared");
        }
    }

    /// Returns cache statistics
    pub async fn stats(&self) -> CacheStats {
        let slot = self.slot.lock().await;
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            failed_builds: self.failed_builds.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            entries: slot.cached.as_ref().map_or(0, |cached| cached.catalog.len()),
            origin: slot.cached.as_ref().map(|cached| cached.origin),
        }
    }

    /// English, then Japanese, then merge
    ///
    /// Whenever a locale comes back from the CLI fallback, that listing alone
    /// becomes the catalog; provider and fallback results are never mixed.
    async fn build(&self, scope: Option<&ScopePath>) -> Result<(Catalog, FetchOrigin)> {
        info!("Building role catalog for {}", describe_scope(scope));

        let en = self.source.fetch(scope, Locale::English).await?;
        if en.is_fallback() {
            warn!("Role catalog degraded to CLI output; Japanese names unavailable");
            return Ok((RoleMerger::merge(&en.records, &[]), FetchOrigin::CliFallback));
        }

        let ja = self.source.fetch(scope, Locale::Japanese).await?;
        if ja.is_fallback() {
            warn!("Japanese fetch fell back to CLI; discarding provider results");
            return Ok((RoleMerger::merge(&ja.records, &[]), FetchOrigin::CliFallback));
        }

        let catalog = RoleMerger::merge(&en.records, &ja.records);
        info!("Role catalog ready: {} definitions", catalog.len());
        Ok((catalog, FetchOrigin::Provider))
    }
}

fn describe_scope(scope: Option<&ScopePath>) -> &str {
    scope.map_or("tenant root", ScopePath::as_str)
}
