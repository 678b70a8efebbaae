//! Type-safe builder for `StorybookConfig` using the typestate pattern
//!
//! `build()` only exists once a base URL has been supplied, and it validates
//! that URL before any session can use it.

use crate::error::StorybookResult;
use crate::utils::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_COMMIT_SETTLE_MS, DEFAULT_EXPAND_SETTLE_MS,
    DEFAULT_INDEX_TIMEOUT_SECS, DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_RENDER_SETTLE_MS,
    DEFAULT_WINDOW_SIZE, validate_base_url,
};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::time::Duration;

use super::types::StorybookConfig;

// Type states for the builder
pub struct WithBaseUrl;

pub struct StorybookConfigBuilder<State = ()> {
    pub(crate) base_url: Option<String>,
    pub(crate) headless: bool,
    pub(crate) navigation_timeout_ms: u64,
    pub(crate) cache_ttl_ms: u64,
    pub(crate) index_timeout_ms: u64,
    pub(crate) commit_settle_ms: u64,
    pub(crate) render_settle_ms: u64,
    pub(crate) expand_settle_ms: u64,
    pub(crate) window_size: (u32, u32),
    pub(crate) chrome_data_dir: Option<PathBuf>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for StorybookConfigBuilder<()> {
    fn default() -> Self {
        Self {
            base_url: None,
            headless: true,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_SECS * 1000,
            cache_ttl_ms: DEFAULT_CACHE_TTL_SECS * 1000,
            index_timeout_ms: DEFAULT_INDEX_TIMEOUT_SECS * 1000,
            commit_settle_ms: DEFAULT_COMMIT_SETTLE_MS,
            render_settle_ms: DEFAULT_RENDER_SETTLE_MS,
            expand_settle_ms: DEFAULT_EXPAND_SETTLE_MS,
            window_size: DEFAULT_WINDOW_SIZE,
            chrome_data_dir: None,
            _phantom: PhantomData,
        }
    }
}

impl StorybookConfig {
    /// Create a builder for configuring a `StorybookConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> StorybookConfigBuilder<()> {
        StorybookConfigBuilder::default()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl StorybookConfigBuilder<()> {
    pub fn base_url(self, url: impl Into<String>) -> StorybookConfigBuilder<WithBaseUrl> {
        StorybookConfigBuilder {
            base_url: Some(url.into()),
            headless: self.headless,
            navigation_timeout_ms: self.navigation_timeout_ms,
            cache_ttl_ms: self.cache_ttl_ms,
            index_timeout_ms: self.index_timeout_ms,
            commit_settle_ms: self.commit_settle_ms,
            render_settle_ms: self.render_settle_ms,
            expand_settle_ms: self.expand_settle_ms,
            window_size: self.window_size,
            chrome_data_dir: self.chrome_data_dir,
            _phantom: PhantomData,
        }
    }
}

impl<State> StorybookConfigBuilder<State> {
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout_ms = millis(timeout);
        self
    }

    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = millis(ttl);
        self
    }

    #[must_use]
    pub fn index_timeout(mut self, timeout: Duration) -> Self {
        self.index_timeout_ms = millis(timeout);
        self
    }

    #[must_use]
    pub fn commit_settle(mut self, delay: Duration) -> Self {
        self.commit_settle_ms = millis(delay);
        self
    }

    #[must_use]
    pub fn render_settle(mut self, delay: Duration) -> Self {
        self.render_settle_ms = millis(delay);
        self
    }

    #[must_use]
    pub fn expand_settle(mut self, delay: Duration) -> Self {
        self.expand_settle_ms = millis(delay);
        self
    }

    #[must_use]
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chrome_data_dir = Some(dir.into());
        self
    }
}

impl StorybookConfigBuilder<WithBaseUrl> {
    /// Validate the base URL and produce the final configuration.
    ///
    /// Returns `StorybookError::Configuration` when the URL is not an
    /// absolute http(s) URL.
    pub fn build(self) -> StorybookResult<StorybookConfig> {
        let base_url = validate_base_url(self.base_url.as_deref().unwrap_or_default())?;

        Ok(StorybookConfig {
            base_url,
            headless: self.headless,
            navigation_timeout_ms: self.navigation_timeout_ms,
            cache_ttl_ms: self.cache_ttl_ms,
            index_timeout_ms: self.index_timeout_ms,
            commit_settle_ms: self.commit_settle_ms,
            render_settle_ms: self.render_settle_ms,
            expand_settle_ms: self.expand_settle_ms,
            window_size: self.window_size,
            chrome_data_dir: self.chrome_data_dir,
        })
    }
}
