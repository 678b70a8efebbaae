//! Storybook version and routing detection
//!
//! Two independent signals feed `FormatInfo`: the `index.json` probe and a
//! live load of the manager UI. Either may fail; detection always produces a
//! best-effort answer.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::index::{IndexClient, IndexProbe};
use crate::browser::{NavigationTiming, PageDriver, safe_navigate};
use crate::page_extractor::js_scripts::sidebar_links_script;
use crate::utils::{LEGACY_LINK_SAMPLE, LEGACY_STORY_SEGMENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorybookVersion {
    V5,
    V6,
    V7,
    #[default]
    Unknown,
}

impl fmt::Display for StorybookVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::V5 => "v5",
            Self::V6 => "v6",
            Self::V7 => "v7",
            Self::Unknown => "unknown",
        })
    }
}

/// Detected site format. Computed once per session, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FormatInfo {
    version: StorybookVersion,
    has_index: bool,
    uses_legacy_story_path: bool,
    uses_iframe_docs: bool,
}

impl FormatInfo {
    #[must_use]
    pub const fn new(version: StorybookVersion, has_index: bool, uses_legacy_story_path: bool) -> Self {
        Self {
            version,
            has_index,
            uses_legacy_story_path,
            uses_iframe_docs: has_index && !uses_legacy_story_path,
        }
    }

    #[must_use]
    pub fn version(&self) -> StorybookVersion {
        self.version
    }

    #[must_use]
    pub fn has_index(&self) -> bool {
        self.has_index
    }

    #[must_use]
    pub fn uses_legacy_story_path(&self) -> bool {
        self.uses_legacy_story_path
    }

    /// True iff an index exists and routing is not legacy
    #[must_use]
    pub fn uses_iframe_docs(&self) -> bool {
        self.uses_iframe_docs
    }

    /// Legacy routing takes no view-mode parameter
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.uses_legacy_story_path || self.version == StorybookVersion::V5
    }
}

/// Combine the two signals.
///
/// Legacy routing without an index means the oldest supported version.
#[must_use]
pub fn combine_signals(index_version: Option<StorybookVersion>, legacy_routing: bool) -> FormatInfo {
    let has_index = index_version.is_some();
    let version = match index_version {
        Some(version) => version,
        None if legacy_routing => StorybookVersion::V5,
        None => StorybookVersion::Unknown,
    };
    FormatInfo::new(version, has_index, legacy_routing)
}

/// True when `href` (absolute, or relative to `base_url`) routes through a
/// `/story/` path segment. A `?path=/story/..` query is modern routing and
/// does not count.
#[must_use]
pub fn has_legacy_story_segment(href: &str, base_url: &str) -> bool {
    let resolved = Url::parse(href).or_else(|_| {
        Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).and_then(|base| base.join(href))
    });

    match resolved {
        Ok(url) => url.path().contains(LEGACY_STORY_SEGMENT),
        Err(_) => href
            .split(['?', '#'])
            .next()
            .is_some_and(|path| path.contains(LEGACY_STORY_SEGMENT)),
    }
}

/// Timing used by the live probe
#[derive(Debug, Clone, Copy)]
pub struct ProbeTiming {
    pub navigation: NavigationTiming,
    pub render_settle: Duration,
}

/// Run both probes against `base_url`
pub async fn detect_format<P: PageDriver>(
    page: &P,
    index: &IndexClient,
    base_url: &str,
    timing: ProbeTiming,
) -> FormatInfo {
    let index_version = match index.probe(base_url).await {
        IndexProbe::Found(index) => Some(index.version_tag()),
        IndexProbe::Missing(_) | IndexProbe::Failed(_) => None,
    };

    let legacy_routing = probe_legacy_routing(page, base_url, timing).await;
    let info = combine_signals(index_version, legacy_routing);

    info!(
        "Detected Storybook format for {}: {} (index: {}, legacy routing: {})",
        base_url,
        info.version(),
        info.has_index(),
        info.uses_legacy_story_path()
    );
    info
}

async fn probe_legacy_routing<P: PageDriver>(
    page: &P,
    base_url: &str,
    timing: ProbeTiming,
) -> bool {
    if let Err(e) = safe_navigate(page, base_url, timing.navigation).await {
        warn!("Live format probe could not load {}: {}", base_url, e);
        return false;
    }
    tokio::time::sleep(timing.render_settle).await;

    if let Some(address) = page.current_url().await
        && has_legacy_story_segment(&address, base_url)
    {
        debug!("Address {} uses legacy story routing", address);
        return true;
    }

    match page.evaluate(&sidebar_links_script(LEGACY_LINK_SAMPLE)).await {
        Ok(Value::Array(links)) => links
            .iter()
            .filter_map(Value::as_str)
            .take(LEGACY_LINK_SAMPLE)
            .any(|href| has_legacy_story_segment(href, base_url)),
        Ok(_) => false,
        Err(e) => {
            debug!("Sidebar link sampling failed: {:#}", e);
            false
        }
    }
}
