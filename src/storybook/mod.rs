//! Storybook format detection, navigation discovery and URL resolution

pub mod categorize;
pub mod discovery;
pub mod discovery_rules;
pub mod format;
pub mod full_navigation;
pub mod index;
pub mod nav_cache;
pub mod search;
pub mod types;
pub mod url_resolver;

pub use categorize::categorize;
pub use discovery::{DiscoveryContext, ScanOutcome, discover};
pub use format::{FormatInfo, ProbeTiming, StorybookVersion, detect_format};
pub use full_navigation::{ComponentNode, FullCategory, FullNavigation, build_full_navigation};
pub use index::{IndexClient, IndexContainer, IndexProbe, StorybookIndex};
pub use nav_cache::NavigationCache;
pub use search::search_entries;
pub use types::{
    EntryKind, NavCategory, NavEntry, NavigationTree, OutputFormat, StoryEntry, ViewMode,
};
pub use url_resolver::resolve_url;
