//! Core configuration types for Storybook sessions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct for a Storybook session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorybookConfig {
    /// Base URL of the Storybook deployment.
    ///
    /// **INVARIANT:** http or https, no query/fragment, no trailing slash
    /// (normalized in builder).
    pub(crate) base_url: String,

    pub(crate) headless: bool,

    /// Timeout in milliseconds for every navigation attempt and script evaluation
    ///
    /// Default: 30 seconds
    pub(crate) navigation_timeout_ms: u64,

    /// Freshness window of the navigation cache
    ///
    /// Default: 5 minutes
    pub(crate) cache_ttl_ms: u64,

    /// Timeout for the `index.json` probe
    ///
    /// Default: 10 seconds
    pub(crate) index_timeout_ms: u64,

    /// Fixed delay after a commit-only load
    pub(crate) commit_settle_ms: u64,

    /// Upper bound for waiting on client-side rendering
    pub(crate) render_settle_ms: u64,

    /// Delay after expanding sidebar groups
    pub(crate) expand_settle_ms: u64,

    pub(crate) window_size: (u32, u32),

    /// Optional Chrome profile directory. When unset every launch gets a
    /// unique temporary profile that is removed on shutdown.
    pub(crate) chrome_data_dir: Option<PathBuf>,
}
