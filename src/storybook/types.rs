//! Navigation data model shared by discovery, the cache, search and the
//! full-hierarchy builder.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::categorize::categorize;
use crate::utils::{DOCS_MARKER, ID_SEPARATOR};

/// Whether an entry renders a single story or a docs composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Story,
    Docs,
}

impl EntryKind {
    /// Infer the kind from an id alone
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        if has_docs_marker(id) {
            Self::Docs
        } else {
            Self::Story
        }
    }
}

/// True when the id carries the `--docs` marker
#[must_use]
pub fn has_docs_marker(id: &str) -> bool {
    id.to_ascii_lowercase().contains(DOCS_MARKER)
}

/// Fallback display name: the last `--`-delimited segment of the id
#[must_use]
pub fn name_from_id(id: &str) -> String {
    id.rsplit(ID_SEPARATOR).next().unwrap_or(id).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub name: String,
    pub id: String,
    pub kind: EntryKind,
}

impl NavEntry {
    pub fn new(name: impl Into<String>, id: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            kind,
        }
    }

    #[must_use]
    pub fn category(&self) -> String {
        categorize(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavCategory {
    pub name: String,
    pub entries: Vec<NavEntry>,
}

/// Deduplicated, categorized navigation
///
/// **INVARIANT:** `flat_list` never holds two entries with the same id, and
/// `categories` is always derived from `flat_list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTree {
    pub categories: Vec<NavCategory>,
    pub flat_list: Vec<NavEntry>,
}

impl NavigationTree {
    /// Build a tree from entries in discovery order. The first occurrence of
    /// an id wins; later duplicates are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = NavEntry>) -> Self {
        let mut seen = HashSet::new();
        let flat_list: Vec<NavEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.id.clone()))
            .collect();

        let categories = group_by_category(&flat_list);
        Self {
            categories,
            flat_list,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flat_list.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flat_list.is_empty()
    }

    /// Narrow the tree to a single category (case-insensitive)
    #[must_use]
    pub fn filter_category(&self, category: &str) -> Self {
        let wanted = category.trim().to_lowercase();
        Self::from_entries(
            self.flat_list
                .iter()
                .filter(|entry| entry.category() == wanted)
                .cloned(),
        )
    }
}

/// Group entries preserving first-seen order of categories and of entries
/// within each category.
fn group_by_category(entries: &[NavEntry]) -> Vec<NavCategory> {
    let mut categories: Vec<NavCategory> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let name = entry.category();
        let idx = *positions.entry(name.clone()).or_insert_with(|| {
            categories.push(NavCategory {
                name,
                entries: Vec::new(),
            });
            categories.len() - 1
        });
        categories[idx].entries.push(entry.clone());
    }

    categories
}

/// Index-style entry with its hierarchical title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEntry {
    pub id: String,
    pub name: String,
    pub kind: EntryKind,
    /// Slash-delimited hierarchy, e.g. `Components/Button`
    pub title: String,
}

impl From<&NavEntry> for StoryEntry {
    /// Minimal record used when no index is available: the title is the name
    fn from(entry: &NavEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            kind: entry.kind,
            title: entry.name.clone(),
        }
    }
}

/// View mode requested for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Story,
    Docs,
}

impl ViewMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Docs => "docs",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "story" => Ok(Self::Story),
            "docs" => Ok(Self::Docs),
            other => Err(format!("unknown view mode '{other}' (expected story or docs)")),
        }
    }
}

/// Output format selector for content operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Structured,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(Self::Structured),
            "markdown" => Ok(Self::Markdown),
            other => Err(format!(
                "unknown output format '{other}' (expected structured or markdown)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str) -> NavEntry {
        NavEntry::new(name_from_id(id), id, EntryKind::from_id(id))
    }

    #[test]
    fn duplicates_dropped_first_wins() {
        let tree = NavigationTree::from_entries(vec![
            NavEntry::new("First", "components-button--basic", EntryKind::Story),
            story("components-card--docs"),
            NavEntry::new("Second", "components-button--basic", EntryKind::Story),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.flat_list[0].name, "First");
        assert_eq!(tree.categories.len(), 1);
        assert_eq!(tree.categories[0].entries.len(), 2);
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let tree = NavigationTree::from_entries(vec![
            story("foo--one"),
            story("components-button--basic"),
            story("foo--two"),
            story("standalone"),
        ]);

        let names: Vec<&str> = tree.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "components", "other"]);
        let foo: Vec<&str> = tree.categories[0]
            .entries
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(foo, vec!["foo--one", "foo--two"]);
    }

    #[test]
    fn rederiving_is_deterministic() {
        let tree = NavigationTree::from_entries(vec![story("a--x"), story("b--y"), story("a--z")]);
        let again = NavigationTree::from_entries(tree.flat_list.clone());
        assert_eq!(tree, again);
    }

    #[test]
    fn filter_category_is_case_insensitive() {
        let tree = NavigationTree::from_entries(vec![
            story("components-button--basic"),
            story("foo--bar"),
        ]);
        let only = tree.filter_category("Components");
        assert_eq!(only.len(), 1);
        assert_eq!(only.flat_list[0].id, "components-button--basic");
    }

    #[test]
    fn kind_and_name_inference() {
        assert_eq!(EntryKind::from_id("button--docs"), EntryKind::Docs);
        assert_eq!(EntryKind::from_id("button--primary"), EntryKind::Story);
        assert_eq!(name_from_id("components-button--primary"), "primary");
        assert_eq!(name_from_id("standalone"), "standalone");
    }

    #[test]
    fn selectors_parse() {
        assert_eq!("Docs".parse::<ViewMode>().unwrap(), ViewMode::Docs);
        assert_eq!("markdown".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
