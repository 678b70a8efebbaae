//! Browser capability consumed by the Storybook core
//!
//! The core never talks to chromiumoxide directly. It drives a `PageDriver`
//! (one page: navigate, evaluate, screenshot) obtained from a
//! `BrowserBackend`, which owns the browser process and hands out fresh pages
//! when the current one stops responding.

use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::error::StorybookResult;

/// Completion criterion for a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// Document parsed (`readyState` left `loading`)
    DomContentLoaded,
    /// `readyState === "complete"`
    Load,
    /// Loaded and no new resource requests for a quiet window
    NetworkIdle,
    /// Navigation committed; nothing else awaited
    Commit,
}

impl LoadState {
    /// Strategies tried in order before falling back to `Commit`
    pub const ESCALATION: [LoadState; 3] =
        [LoadState::DomContentLoaded, LoadState::Load, LoadState::NetworkIdle];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::DomContentLoaded => "domcontentloaded",
            Self::Load => "load",
            Self::NetworkIdle => "networkidle",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single browser page
///
/// Implementations apply their own timeout to `evaluate` and
/// `screenshot_png`; `navigate` receives it explicitly because
/// `safe_navigate` owns the escalation.
pub trait PageDriver: Send + Sync {
    /// Navigate and wait until `wait` is satisfied.
    ///
    /// Timeouts must surface as `StorybookError::Timeout` and network-level
    /// failures as `StorybookError::Network`; anything else is treated as
    /// fatal for the URL.
    fn navigate(
        &self,
        url: &str,
        wait: LoadState,
        timeout: Duration,
    ) -> impl Future<Output = StorybookResult<()>> + Send;

    /// Evaluate a script expression and return its JSON value
    fn evaluate(&self, script: &str) -> impl Future<Output = anyhow::Result<Value>> + Send;

    /// Address of the current document, if any
    fn current_url(&self) -> impl Future<Output = Option<String>> + Send;

    /// Full-page PNG capture
    fn screenshot_png(&self) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;

    /// Best-effort close; errors are logged, not returned
    fn close(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized;
}

/// Owner of the browser process
pub trait BrowserBackend: Send + Sync {
    type Page: PageDriver;

    /// Open a fresh page, (re)launching the browser if needed
    fn open_page(&mut self) -> impl Future<Output = StorybookResult<Self::Page>> + Send;

    /// Close the browser and release its resources. Safe to call repeatedly.
    fn shutdown(&mut self) -> impl Future<Output = ()> + Send;
}
