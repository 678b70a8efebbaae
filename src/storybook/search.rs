//! Linear, case-insensitive filter over the flat navigation list

use super::types::NavEntry;

/// Entries whose name or id contains `query` (case-insensitive), optionally
/// restricted to one derived category. An empty query matches everything.
/// Results keep input order.
#[must_use]
pub fn search_entries(entries: &[NavEntry], query: &str, category: Option<&str>) -> Vec<NavEntry> {
    let needle = query.trim().to_lowercase();
    let category = category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());

    entries
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.name.to_lowercase().contains(&needle)
                || entry.id.to_lowercase().contains(&needle)
        })
        .filter(|entry| {
            category
                .as_deref()
                .is_none_or(|wanted| entry.category() == wanted)
        })
        .cloned()
        .collect()
}
