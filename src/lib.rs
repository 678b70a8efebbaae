pub mod browser;
pub mod config;
pub mod error;
pub mod markdown_converter;
pub mod page_extractor;
pub mod session;
pub mod storybook;
pub mod utils;

pub use browser::{BrowserBackend, ChromeBackend, LoadState, PageDriver, safe_navigate};
pub use config::{StorybookConfig, StorybookConfigBuilder};
pub use error::{StorybookError, StorybookResult};
pub use markdown_converter::{clean_markdown, convert_html_to_markdown};
pub use page_extractor::{CodeBlock, ExtractOptions, PageContent, Section, Table};
pub use session::{
    ComponentListing, PageOutcome, ScreenshotOutcome, SessionManager, StorybookSession,
};
pub use storybook::{
    EntryKind, FormatInfo, FullNavigation, NavCategory, NavEntry, NavigationTree, OutputFormat,
    StoryEntry, StorybookVersion, ViewMode, categorize, resolve_url, search_entries,
};
