//! Category → component → {docs, stories} hierarchy built from titles

use serde::Serialize;
use std::collections::BTreeMap;

use super::types::{EntryKind, StoryEntry};

/// Title used when an entry has neither a title nor a name
pub const UNTITLED_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentNode {
    pub name: String,
    /// Full slash-joined title
    pub path: String,
    pub docs: Option<StoryEntry>,
    pub stories: Vec<StoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullCategory {
    pub name: String,
    pub components: Vec<ComponentNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FullNavigation {
    pub categories: Vec<FullCategory>,
    pub total_docs: usize,
    pub total_stories: usize,
    pub total_entries: usize,
}

impl FullNavigation {
    fn from_categories(categories: Vec<FullCategory>) -> Self {
        let components = categories.iter().flat_map(|c| c.components.iter());
        let (total_docs, total_stories) = components.fold((0, 0), |(docs, stories), node| {
            (docs + usize::from(node.docs.is_some()), stories + node.stories.len())
        });

        Self {
            categories,
            total_docs,
            total_stories,
            total_entries: total_docs + total_stories,
        }
    }

    /// Keep one top-level category (case-insensitive), recounting totals
    #[must_use]
    pub fn filter_category(&self, category: &str) -> Self {
        let wanted = category.trim().to_lowercase();
        Self::from_categories(
            self.categories
                .iter()
                .filter(|c| c.name.to_lowercase() == wanted)
                .cloned()
                .collect(),
        )
    }
}

/// Trimmed, non-empty title segments; falls back to the name, then to
/// `UNTITLED_CATEGORY`.
fn title_segments(entry: &StoryEntry) -> Vec<String> {
    let split = |text: &str| -> Vec<String> {
        text.split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };

    let from_title = split(&entry.title);
    if !from_title.is_empty() {
        return from_title;
    }
    let from_name = split(&entry.name);
    if !from_name.is_empty() {
        return from_name;
    }
    vec![UNTITLED_CATEGORY.to_string()]
}

/// Group entries by title. Categories and components come out sorted by
/// name; stories keep source order; a repeated docs entry replaces the
/// earlier one.
pub fn build_full_navigation(entries: impl IntoIterator<Item = StoryEntry>) -> FullNavigation {
    let mut tree: BTreeMap<String, BTreeMap<String, ComponentNode>> = BTreeMap::new();

    for entry in entries {
        let segments = title_segments(&entry);
        let category = segments[0].clone();
        let component = if segments.len() > 1 {
            segments[1..].join("/")
        } else {
            category.clone()
        };
        let path = segments.join("/");

        let node = tree
            .entry(category)
            .or_default()
            .entry(component.clone())
            .or_insert_with(|| ComponentNode {
                name: component,
                path,
                docs: None,
                stories: Vec::new(),
            });

        match entry.kind {
            EntryKind::Docs => node.docs = Some(entry),
            EntryKind::Story => node.stories.push(entry),
        }
    }

    FullNavigation::from_categories(
        tree.into_iter()
            .map(|(name, components)| FullCategory {
                name,
                components: components.into_values().collect(),
            })
            .collect(),
    )
}
