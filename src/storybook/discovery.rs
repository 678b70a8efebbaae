//! Navigation discovery
//!
//! Loads the manager UI, expands the sidebar, runs the scan rules and tops
//! the result up from `index.json` when the sidebar yielded little. Only a
//! failure to load the page at all is an error; a failing scan counts as
//! zero entries.

use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::discovery_rules::{RawNavRecord, SCAN_RULES, ScanCondition, ScanRule};
use super::format::FormatInfo;
use super::index::IndexClient;
use super::types::{NavEntry, NavigationTree};
use crate::browser::{NavigationTiming, PageDriver, safe_navigate};
use crate::error::StorybookResult;
use crate::page_extractor::js_scripts::EXPAND_NAVIGATION_SCRIPT;
use crate::utils::{INDEX_AUGMENT_THRESHOLD, LEGACY_SCAN_THRESHOLD};

/// Result of one scan step
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Found(Vec<NavEntry>),
    Failed(String),
}

/// Inputs for one discovery run
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryContext<'a> {
    pub base_url: &'a str,
    pub format: &'a FormatInfo,
    pub index: &'a IndexClient,
    pub navigation: NavigationTiming,
    pub expand_settle: Duration,
}

/// Accumulates entries in discovery order, first occurrence of an id wins
#[derive(Debug, Default)]
struct EntryCollector {
    seen: HashSet<String>,
    entries: Vec<NavEntry>,
}

impl EntryCollector {
    /// Returns how many entries were new
    fn extend(&mut self, entries: impl IntoIterator<Item = NavEntry>) -> usize {
        let before = self.entries.len();
        for entry in entries {
            if self.seen.insert(entry.id.clone()) {
                self.entries.push(entry);
            }
        }
        self.entries.len() - before
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn should_run(rule: &ScanRule, format: &FormatInfo, found_so_far: usize) -> bool {
    match rule.condition {
        ScanCondition::Always => true,
        ScanCondition::LegacyOrSparse => {
            format.uses_legacy_story_path() || found_so_far < LEGACY_SCAN_THRESHOLD
        }
    }
}

/// Interpret the JSON a scan script returned
#[must_use]
pub fn interpret_scan(rule: &ScanRule, value: Value) -> ScanOutcome {
    if !value.is_array() {
        return ScanOutcome::Failed(format!("expected an array, got {value}"));
    }
    match serde_json::from_value::<Vec<RawNavRecord>>(value) {
        Ok(records) => ScanOutcome::Found(
            records
                .iter()
                .filter_map(|record| rule.kind.interpret(record))
                .collect(),
        ),
        Err(e) => ScanOutcome::Failed(format!("unreadable scan records: {e}")),
    }
}

async fn run_scan<P: PageDriver>(page: &P, rule: &ScanRule) -> ScanOutcome {
    match page.evaluate(rule.script).await {
        Ok(value) => interpret_scan(rule, value),
        Err(e) => ScanOutcome::Failed(format!("{e:#}")),
    }
}

/// Discover the navigation of the Storybook at `ctx.base_url`
pub async fn discover<P: PageDriver>(
    page: &P,
    ctx: DiscoveryContext<'_>,
) -> StorybookResult<NavigationTree> {
    safe_navigate(page, ctx.base_url, ctx.navigation).await?;

    match page.evaluate(EXPAND_NAVIGATION_SCRIPT).await {
        Ok(clicked) => debug!("Expanded sidebar ({} clicks)", clicked),
        Err(e) => debug!("Sidebar expansion failed: {:#}", e),
    }
    tokio::time::sleep(ctx.expand_settle).await;

    let mut collector = EntryCollector::default();
    for rule in SCAN_RULES {
        if !should_run(rule, ctx.format, collector.len()) {
            debug!("Skipping {} scan ({} entries so far)", rule.label, collector.len());
            continue;
        }

        match run_scan(page, rule).await {
            ScanOutcome::Found(entries) => {
                let total = entries.len();
                let added = collector.extend(entries);
                debug!("{} scan: {} found, {} new", rule.label, total, added);
            }
            ScanOutcome::Failed(reason) => {
                warn!("{} scan failed on {}: {}", rule.label, ctx.base_url, reason);
            }
        }
    }

    if collector.len() < INDEX_AUGMENT_THRESHOLD {
        let index_entries = ctx
            .index
            .probe(ctx.base_url)
            .await
            .into_populated()
            .map(|index| index.entries)
            .unwrap_or_default();
        let added = collector.extend(
            index_entries
                .into_iter()
                .map(|entry| NavEntry::new(entry.name, entry.id, entry.kind)),
        );
        debug!("Index augmentation added {} entries", added);
    }

    let tree = NavigationTree::from_entries(collector.entries);
    info!(
        "Discovered {} entries in {} categories at {}",
        tree.len(),
        tree.categories.len(),
        ctx.base_url
    );
    Ok(tree)
}
