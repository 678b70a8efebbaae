//! Single-slot navigation cache with a freshness window
//!
//! An expired entry is never patched: it is dropped and the next read
//! recomputes the whole tree. The cache lives inside the session state, so
//! the session mutex is what keeps two refreshes from running at once.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::types::NavigationTree;
use crate::error::StorybookResult;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub tree: NavigationTree,
    pub fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() <= ttl
    }
}

#[derive(Debug)]
pub struct NavigationCache {
    ttl: Duration,
    slot: Option<CacheEntry>,
}

impl NavigationCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    /// The cached tree if it is still within the TTL
    #[must_use]
    pub fn fresh(&self) -> Option<&NavigationTree> {
        self.slot
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| &entry.tree)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// Return the cached tree, or run `refresh` and store its result.
    ///
    /// A failed refresh leaves the slot empty and propagates the error.
    pub async fn get_or_refresh<F, Fut>(
        &mut self,
        force_refresh: bool,
        refresh: F,
    ) -> StorybookResult<NavigationTree>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StorybookResult<NavigationTree>>,
    {
        if !force_refresh && let Some(tree) = self.fresh() {
            debug!("Navigation cache hit ({} entries)", tree.len());
            return Ok(tree.clone());
        }

        debug!(
            "Navigation cache {}; rediscovering",
            if force_refresh { "bypassed" } else { "miss" }
        );
        self.slot = None;
        let tree = refresh().await?;
        self.slot = Some(CacheEntry {
            tree: tree.clone(),
            fetched_at: Instant::now(),
        });
        Ok(tree)
    }
}
