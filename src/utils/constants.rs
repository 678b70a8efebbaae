//! Shared configuration constants
//!
//! Default values and Storybook markers used throughout the codebase, kept in
//! one place to avoid magic numbers and strings.

/// Default timeout for every navigation and evaluation: 30 seconds
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// Navigation cache freshness window: 5 minutes
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

/// Timeout for the `index.json` HTTP probe
pub const DEFAULT_INDEX_TIMEOUT_SECS: u64 = 10;

/// Settle delay after a commit-only load, before the page is used
pub const DEFAULT_COMMIT_SETTLE_MS: u64 = 2_000;

/// Upper bound for waiting on client-side rendering after a load
pub const DEFAULT_RENDER_SETTLE_MS: u64 = 2_000;

/// Delay after clicking sidebar toggles so expanded groups can render
pub const DEFAULT_EXPAND_SETTLE_MS: u64 = 1_000;

/// Browser window size
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Code block ceiling for component docs pages (short examples)
pub const COMPONENT_EXAMPLE_CODE_LIMIT: usize = 2_000;

/// Code block ceiling for full story content
pub const STORY_CONTENT_CODE_LIMIT: usize = 5_000;

/// Fewer entries than this after the DOM scans triggers the legacy name scan
pub const LEGACY_SCAN_THRESHOLD: usize = 10;

/// Fewer entries than this after all DOM scans triggers index augmentation
pub const INDEX_AUGMENT_THRESHOLD: usize = 20;

/// Number of sidebar links sampled when probing for legacy routing
pub const LEGACY_LINK_SAMPLE: usize = 5;

/// Machine-readable index published by Storybook 7+ (and 6.4+ with storyStoreV7)
pub const INDEX_PATH: &str = "index.json";

/// Iframe entry point every Storybook build serves
pub const IFRAME_PATH: &str = "iframe.html";

/// Suffix identifying a docs entry
pub const DOCS_MARKER: &str = "--docs";

/// Substring identifying color/design-token pages, which only render as docs
pub const COLOR_MARKER: &str = "color";

/// Separator between the component part and the story part of an id
pub const ID_SEPARATOR: &str = "--";

/// Path segment used by legacy (Storybook 5) routing
pub const LEGACY_STORY_SEGMENT: &str = "/story/";

/// Chrome user agent string
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
