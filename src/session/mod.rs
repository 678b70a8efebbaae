//! Storybook session
//!
//! A session owns one browser backend, exactly one page, the memoized
//! `FormatInfo` and the navigation cache. All of it sits behind one async
//! mutex, and every operation holds that lock from navigation through
//! extraction, so two callers can never interleave on the shared page.

pub mod manager;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::browser::{BrowserBackend, ChromeBackend, NavigationTiming, PageDriver, safe_navigate};
use crate::config::StorybookConfig;
use crate::error::{StorybookError, StorybookResult};
use crate::page_extractor::js_scripts::LIVENESS_SCRIPT;
use crate::page_extractor::{ExtractOptions, PageContent, try_extract, wait_for_render};
use crate::storybook::{
    DiscoveryContext, FormatInfo, FullNavigation, IndexClient, NavEntry, NavigationCache,
    NavigationTree, OutputFormat, ProbeTiming, StoryEntry, ViewMode, build_full_navigation,
    detect_format, discover, resolve_url, search_entries,
};
use crate::utils::{COMPONENT_EXAMPLE_CODE_LIMIT, STORY_CONTENT_CODE_LIMIT};

pub use manager::SessionManager;

/// Outcome of a content operation
///
/// Extraction failures are reported here instead of as errors so one broken
/// page never takes the session down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Loaded {
        url: String,
        content: PageContent,
    },
    Unavailable {
        id: String,
        url: String,
        reason: String,
    },
}

impl PageOutcome {
    #[must_use]
    pub fn content(&self) -> Option<&PageContent> {
        match self {
            Self::Loaded { content, .. } => Some(content),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Outcome of a screenshot
///
/// A capture failure is reported like an extraction failure: the page
/// loaded, its pixels are just not available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScreenshotOutcome {
    Captured {
        url: String,
        png: Vec<u8>,
    },
    Unavailable {
        id: String,
        url: String,
        reason: String,
    },
}

impl ScreenshotOutcome {
    #[must_use]
    pub fn png(&self) -> Option<&[u8]> {
        match self {
            Self::Captured { png, .. } => Some(png),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Result of `list_components`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ComponentListing {
    Flat(NavigationTree),
    Full(FullNavigation),
}

struct SessionState<B: BrowserBackend> {
    backend: B,
    page: Option<B::Page>,
    format: Option<FormatInfo>,
    cache: NavigationCache,
}

pub struct StorybookSession<B: BrowserBackend = ChromeBackend> {
    config: StorybookConfig,
    index: IndexClient,
    state: Mutex<SessionState<B>>,
}

impl StorybookSession<ChromeBackend> {
    /// Session backed by Chrome. The browser starts on first use.
    pub fn launch(config: StorybookConfig) -> StorybookResult<Self> {
        let backend = ChromeBackend::new(&config);
        Self::new(config, backend)
    }
}

/// Return the live page, replacing it when the liveness probe fails
async fn ready_page<'a, B: BrowserBackend>(
    backend: &mut B,
    slot: &'a mut Option<B::Page>,
) -> StorybookResult<&'a B::Page> {
    if let Some(page) = slot.as_ref()
        && let Err(e) = page.evaluate(LIVENESS_SCRIPT).await
    {
        warn!("Page failed liveness probe ({:#}); recreating", e);
        if let Some(dead) = slot.take() {
            dead.close().await;
        }
    }

    if slot.is_none() {
        *slot = Some(backend.open_page().await?);
    }

    slot.as_ref()
        .ok_or_else(|| StorybookError::Browser("no page available after reopen".into()))
}

impl<B: BrowserBackend> StorybookSession<B> {
    pub fn new(config: StorybookConfig, backend: B) -> StorybookResult<Self> {
        let index = IndexClient::new(config.index_timeout())?;
        let cache = NavigationCache::new(config.cache_ttl());
        info!("Storybook session created for {}", config.base_url());

        Ok(Self {
            config,
            index,
            state: Mutex::new(SessionState {
                backend,
                page: None,
                format: None,
                cache,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorybookConfig {
        &self.config
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    fn navigation_timing(&self) -> NavigationTiming {
        NavigationTiming {
            timeout: self.config.navigation_timeout(),
            commit_settle: self.config.commit_settle(),
        }
    }

    async fn format_for(&self, slot: &mut Option<FormatInfo>, page: &B::Page) -> FormatInfo {
        if let Some(format) = slot {
            return *format;
        }

        let timing = ProbeTiming {
            navigation: self.navigation_timing(),
            render_settle: self.config.render_settle(),
        };
        let format = detect_format(page, &self.index, self.base_url(), timing).await;
        *slot = Some(format);
        format
    }

    async fn tree_for(
        &self,
        cache: &mut NavigationCache,
        page: &B::Page,
        format: &FormatInfo,
        force_refresh: bool,
    ) -> StorybookResult<NavigationTree> {
        let ctx = DiscoveryContext {
            base_url: self.base_url(),
            format,
            index: &self.index,
            navigation: self.navigation_timing(),
            expand_settle: self.config.expand_settle(),
        };
        cache
            .get_or_refresh(force_refresh, || discover(page, ctx))
            .await
    }

    async fn full_navigation_for(
        &self,
        cache: &mut NavigationCache,
        page: &B::Page,
        format: &FormatInfo,
    ) -> StorybookResult<FullNavigation> {
        if let Some(index) = self.index.probe(self.base_url()).await.into_populated() {
            debug!("Building full navigation from index ({} entries)", index.entries.len());
            return Ok(build_full_navigation(index.entries));
        }

        debug!("No usable index; building full navigation from discovery");
        let tree = self.tree_for(cache, page, format, false).await?;
        Ok(build_full_navigation(tree.flat_list.iter().map(StoryEntry::from)))
    }

    /// Detected format, computed on first use
    pub async fn format_info(&self) -> StorybookResult<FormatInfo> {
        let mut guard = self.state.lock().await;
        let SessionState {
            backend,
            page,
            format,
            ..
        } = &mut *guard;

        let page = ready_page(backend, page).await?;
        Ok(self.format_for(format, page).await)
    }

    /// Navigation tree, from cache unless expired or `force_refresh`
    pub async fn navigation(&self, force_refresh: bool) -> StorybookResult<NavigationTree> {
        let mut guard = self.state.lock().await;
        let SessionState {
            backend,
            page,
            format,
            cache,
        } = &mut *guard;

        let page = ready_page(backend, page).await?;
        let format = self.format_for(format, page).await;
        self.tree_for(cache, page, &format, force_refresh).await
    }

    /// Category → component → {docs, stories} hierarchy
    pub async fn full_navigation(&self) -> StorybookResult<FullNavigation> {
        let mut guard = self.state.lock().await;
        let SessionState {
            backend,
            page,
            format,
            cache,
        } = &mut *guard;

        let page = ready_page(backend, page).await?;
        let format = self.format_for(format, page).await;
        self.full_navigation_for(cache, page, &format).await
    }

    /// Components as a flat categorized tree, or as the full hierarchy
    pub async fn list_components(
        &self,
        category: Option<&str>,
        full: bool,
    ) -> StorybookResult<ComponentListing> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());

        if full {
            let nav = self.full_navigation().await?;
            return Ok(ComponentListing::Full(match category {
                Some(category) => nav.filter_category(category),
                None => nav,
            }));
        }

        let tree = self.navigation(false).await?;
        Ok(ComponentListing::Flat(match category {
            Some(category) => tree.filter_category(category),
            None => tree,
        }))
    }

    pub async fn search(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> StorybookResult<Vec<NavEntry>> {
        let tree = self.navigation(false).await?;
        let hits = search_entries(&tree.flat_list, query, category);
        debug!("Search '{}' matched {} of {} entries", query, hits.len(), tree.len());
        Ok(hits)
    }

    /// Docs page for an entry
    pub async fn get_docs(&self, id: &str, output: OutputFormat) -> StorybookResult<PageOutcome> {
        self.fetch_page(id, ViewMode::Docs, COMPONENT_EXAMPLE_CODE_LIMIT, output)
            .await
    }

    /// Single story for an entry
    pub async fn get_story(&self, id: &str, output: OutputFormat) -> StorybookResult<PageOutcome> {
        self.fetch_page(id, ViewMode::Story, STORY_CONTENT_CODE_LIMIT, output)
            .await
    }

    async fn fetch_page(
        &self,
        id: &str,
        mode: ViewMode,
        code_limit: usize,
        output: OutputFormat,
    ) -> StorybookResult<PageOutcome> {
        let mut guard = self.state.lock().await;
        let SessionState {
            backend,
            page,
            format,
            ..
        } = &mut *guard;

        let page = ready_page(backend, page).await?;
        let format = self.format_for(format, page).await;
        let url = resolve_url(self.base_url(), id, mode, &format);

        safe_navigate(page, &url, self.navigation_timing()).await?;
        wait_for_render(page, self.config.render_settle()).await;

        let options = ExtractOptions {
            markdown: output == OutputFormat::Markdown,
            code_limit,
        };
        match try_extract(page, &url, options).await {
            Ok(content) => {
                info!("Extracted {} ({})", id, mode);
                Ok(PageOutcome::Loaded { url, content })
            }
            Err(e) => {
                warn!("Content unavailable for {}: {}", id, e);
                Ok(PageOutcome::Unavailable {
                    id: id.to_string(),
                    url,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// PNG of an entry rendered in its iframe
    pub async fn screenshot(&self, id: &str, mode: ViewMode) -> StorybookResult<ScreenshotOutcome> {
        let mut guard = self.state.lock().await;
        let SessionState {
            backend,
            page,
            format,
            ..
        } = &mut *guard;

        let page = ready_page(backend, page).await?;
        let format = self.format_for(format, page).await;
        let url = resolve_url(self.base_url(), id, mode, &format);

        safe_navigate(page, &url, self.navigation_timing()).await?;
        wait_for_render(page, self.config.render_settle()).await;

        match page.screenshot_png().await {
            Ok(png) => {
                info!("Captured {} byte screenshot of {}", png.len(), id);
                Ok(ScreenshotOutcome::Captured { url, png })
            }
            Err(e) => {
                let reason = StorybookError::extraction(&url, format!("{e:#}")).to_string();
                warn!("Screenshot unavailable for {}: {}", id, reason);
                Ok(ScreenshotOutcome::Unavailable {
                    id: id.to_string(),
                    url,
                    reason,
                })
            }
        }
    }

    /// Close the page and the browser. The session stays usable: the next
    /// operation opens a fresh page.
    pub async fn shutdown(&self) {
        let mut guard = self.state.lock().await;
        if let Some(page) = guard.page.take() {
            page.close().await;
        }
        guard.backend.shutdown().await;
        guard.cache.invalidate();
        info!("Storybook session for {} shut down", self.base_url());
    }
}
