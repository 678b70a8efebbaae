//! Sidebar scan rules
//!
//! Each rule pairs an in-page scan script with the Rust-side interpretation
//! of the records it returns. Supporting another Storybook sidebar variant
//! means adding a row to `SCAN_RULES`.

use serde::Deserialize;
use url::Url;

use super::types::{EntryKind, NavEntry, has_docs_marker, name_from_id};
use crate::page_extractor::js_scripts::{
    ITEM_ID_SCAN_SCRIPT, LEGACY_NAME_SCAN_SCRIPT, PATH_LINK_SCAN_SCRIPT,
};
use crate::utils::LEGACY_STORY_SEGMENT;

/// `data-nodetype` values of sidebar nodes that group entries rather than
/// being entries themselves
pub const PLACEHOLDER_NODE_TYPES: &[&str] = &["root", "group", "component"];

/// Query parameter the manager UI encodes entry paths in
pub const PATH_PARAM: &str = "path";

/// Used only to resolve relative hrefs; never requested
const RESOLUTION_BASE: &str = "http://storybook.invalid/";

/// One element as reported by a scan script
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawNavRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// Elements with an explicit `data-item-id`
    ItemIdAttribute,
    /// Anchors whose href carries `?path=/story/<id>` or `?path=/docs/<id>`
    PathQueryLink,
    /// Legacy `data-name` elements linked by `path=` or a `/story/<id>` segment
    LegacyNameAttribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCondition {
    Always,
    /// Only with legacy routing, or when earlier rules found fewer than the
    /// threshold
    LegacyOrSparse,
}

#[derive(Debug, Clone, Copy)]
pub struct ScanRule {
    pub label: &'static str,
    pub kind: ScanKind,
    pub script: &'static str,
    pub condition: ScanCondition,
}

/// Scan rules in the order they run
pub const SCAN_RULES: &[ScanRule] = &[
    ScanRule {
        label: "item-id attribute",
        kind: ScanKind::ItemIdAttribute,
        script: ITEM_ID_SCAN_SCRIPT,
        condition: ScanCondition::Always,
    },
    ScanRule {
        label: "path query link",
        kind: ScanKind::PathQueryLink,
        script: PATH_LINK_SCAN_SCRIPT,
        condition: ScanCondition::Always,
    },
    ScanRule {
        label: "legacy name attribute",
        kind: ScanKind::LegacyNameAttribute,
        script: LEGACY_NAME_SCAN_SCRIPT,
        condition: ScanCondition::LegacyOrSparse,
    },
];

/// Entry id lifted from a link, with the kind its prefix implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPath {
    pub id: String,
    pub kind: EntryKind,
}

fn resolve_href(href: &str) -> Option<Url> {
    let base = Url::parse(RESOLUTION_BASE).ok()?;
    base.join(href.trim()).ok()
}

/// Strip `/story/`, `/docs/` or `/` from a decoded path value
fn decode_path_value(value: &str) -> Option<DecodedPath> {
    let value = value.trim();
    let (rest, docs_prefix) = if let Some(rest) = value.strip_prefix("/story/") {
        (rest, false)
    } else if let Some(rest) = value.strip_prefix("/docs/") {
        (rest, true)
    } else {
        (value.trim_start_matches('/'), false)
    };

    let id = rest.trim_matches('/');
    if id.is_empty() {
        return None;
    }

    let kind = if docs_prefix || has_docs_marker(id) {
        EntryKind::Docs
    } else {
        EntryKind::Story
    };
    Some(DecodedPath {
        id: id.to_string(),
        kind,
    })
}

/// Decode the `path` query parameter of an href
#[must_use]
pub fn decode_entry_path(href: &str) -> Option<DecodedPath> {
    let url = resolve_href(href)?;
    let value = url
        .query_pairs()
        .find(|(key, _)| key == PATH_PARAM)
        .map(|(_, value)| value.into_owned())?;
    decode_path_value(&value)
}

/// Legacy links: the `path` parameter when present, else the id following a
/// `/story/` path segment
#[must_use]
pub fn decode_legacy_href(href: &str) -> Option<DecodedPath> {
    if let Some(decoded) = decode_entry_path(href) {
        return Some(decoded);
    }

    let url = resolve_href(href)?;
    let path = urlencoding::decode(url.path()).ok()?.into_owned();
    let (_, tail) = path.split_once(LEGACY_STORY_SEGMENT)?;
    let id = tail.split('/').next().unwrap_or_default().trim();
    (!id.is_empty()).then(|| DecodedPath {
        id: id.to_string(),
        kind: EntryKind::Story,
    })
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl ScanKind {
    /// Turn one scanned record into an entry, or skip it
    #[must_use]
    pub fn interpret(&self, record: &RawNavRecord) -> Option<NavEntry> {
        match self {
            Self::ItemIdAttribute => {
                let id = non_empty(record.id.as_ref())?;
                if let Some(node_type) = non_empty(record.node_type.as_ref())
                    && PLACEHOLDER_NODE_TYPES.contains(&node_type.to_ascii_lowercase().as_str())
                {
                    return None;
                }
                let name = non_empty(record.name.as_ref())
                    .map_or_else(|| name_from_id(id), str::to_string);
                Some(NavEntry::new(name, id, EntryKind::from_id(id)))
            }
            Self::PathQueryLink => {
                let decoded = decode_entry_path(non_empty(record.href.as_ref())?)?;
                let name = non_empty(record.name.as_ref())
                    .map_or_else(|| name_from_id(&decoded.id), str::to_string);
                Some(NavEntry::new(name, decoded.id, decoded.kind))
            }
            Self::LegacyNameAttribute => {
                let decoded = decode_legacy_href(non_empty(record.href.as_ref())?)?;
                let name = non_empty(record.name.as_ref())
                    .map_or_else(|| name_from_id(&decoded.id), str::to_string);
                Some(NavEntry::new(name, decoded.id, EntryKind::Story))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: Option<&str>, name: Option<&str>, node_type: Option<&str>, href: Option<&str>) -> RawNavRecord {
        RawNavRecord {
            id: id.map(str::to_string),
            name: name.map(str::to_string),
            node_type: node_type.map(str::to_string),
            href: href.map(str::to_string),
        }
    }

    #[test]
    fn item_id_skips_placeholders() {
        let kind = ScanKind::ItemIdAttribute;
        assert!(kind.interpret(&record(Some("components"), Some("Components"), Some("root"), None)).is_none());
        assert!(kind.interpret(&record(Some("components-button"), None, Some("component"), None)).is_none());
        assert!(kind.interpret(&record(Some("forms"), None, Some("GROUP"), None)).is_none());

        let entry = kind
            .interpret(&record(Some("components-button--docs"), Some("Docs"), Some("document"), None))
            .unwrap();
        assert_eq!(entry.kind, EntryKind::Docs);
        assert_eq!(entry.name, "Docs");

        let entry = kind
            .interpret(&record(Some("components-button--primary"), Some("  "), Some("story"), None))
            .unwrap();
        assert_eq!(entry.kind, EntryKind::Story);
        assert_eq!(entry.name, "primary");
    }

    #[test]
    fn path_param_decoding() {
        assert_eq!(
            decode_entry_path("/?path=/story/components-button--primary"),
            Some(DecodedPath {
                id: "components-button--primary".into(),
                kind: EntryKind::Story
            })
        );
        assert_eq!(
            decode_entry_path("?path=%2Fdocs%2Fintro--page"),
            Some(DecodedPath {
                id: "intro--page".into(),
                kind: EntryKind::Docs
            })
        );
        assert_eq!(
            decode_entry_path("https://sb.example.com/?path=/button--docs&args="),
            Some(DecodedPath {
                id: "button--docs".into(),
                kind: EntryKind::Docs
            })
        );
        assert_eq!(decode_entry_path("/?path=/story/"), None);
        assert_eq!(decode_entry_path("/about"), None);
    }

    #[test]
    fn legacy_links() {
        assert_eq!(
            decode_legacy_href("/story/button--primary").map(|d| d.id),
            Some("button--primary".to_string())
        );
        assert_eq!(
            decode_legacy_href("?path=/story/button--secondary").map(|d| d.id),
            Some("button--secondary".to_string())
        );
        assert!(decode_legacy_href("/components/button").is_none());

        let entry = ScanKind::LegacyNameAttribute
            .interpret(&record(None, Some("Primary"), None, Some("/story/button--primary")))
            .unwrap();
        assert_eq!(entry.name, "Primary");
        assert_eq!(entry.kind, EntryKind::Story);
    }

    #[test]
    fn rule_table_order() {
        let kinds: Vec<ScanKind> = SCAN_RULES.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ScanKind::ItemIdAttribute,
                ScanKind::PathQueryLink,
                ScanKind::LegacyNameAttribute
            ]
        );
        assert_eq!(SCAN_RULES[2].condition, ScanCondition::LegacyOrSparse);
    }
}
