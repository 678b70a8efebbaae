//! Entry id to iframe URL mapping
//!
//! Pure and deterministic: the same id, mode and format always give the same
//! URL, and nothing here touches the network.

use super::format::FormatInfo;
use super::types::{ViewMode, has_docs_marker};
use crate::utils::{COLOR_MARKER, DOCS_MARKER, IFRAME_PATH};

/// Path prefixes an id may arrive with when it was lifted from a `path=` link
const ID_PATH_PREFIXES: &[&str] = &["/story/", "/docs/"];

/// Strip `/story/`, `/docs/` and leading slashes
#[must_use]
pub fn clean_entry_id(raw: &str) -> &str {
    let trimmed = raw.trim();
    let unprefixed = ID_PATH_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    unprefixed.trim_start_matches('/')
}

fn has_color_marker(id: &str) -> bool {
    id.to_ascii_lowercase().contains(COLOR_MARKER)
}

/// Build the iframe URL for an entry.
///
/// Legacy routing (or v5) takes the bare id. Otherwise docs view is used
/// when asked for or when the id already looks like a docs page, and a docs
/// request for a plain story id gets `--docs` appended.
#[must_use]
pub fn resolve_url(base_url: &str, raw_id: &str, mode: ViewMode, format: &FormatInfo) -> String {
    let base = base_url.trim_end_matches('/');
    let id = clean_entry_id(raw_id);

    if format.is_legacy() {
        return format!("{base}/{IFRAME_PATH}?id={}", urlencoding::encode(id));
    }

    let docs_like = has_docs_marker(id) || has_color_marker(id);
    let view_mode = if mode == ViewMode::Docs || docs_like {
        ViewMode::Docs
    } else {
        ViewMode::Story
    };

    let id = if view_mode == ViewMode::Docs && !docs_like {
        format!("{id}{DOCS_MARKER}")
    } else {
        id.to_string()
    };

    format!(
        "{base}/{IFRAME_PATH}?viewMode={view_mode}&id={}",
        urlencoding::encode(&id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storybook::format::StorybookVersion;

    const BASE: &str = "https://sb.example.com";

    fn modern() -> FormatInfo {
        FormatInfo::new(StorybookVersion::V7, true, false)
    }

    fn legacy() -> FormatInfo {
        FormatInfo::new(StorybookVersion::V5, false, true)
    }

    #[test]
    fn docs_request_appends_marker() {
        assert_eq!(
            resolve_url(BASE, "components-button--basic", ViewMode::Docs, &modern()),
            "https://sb.example.com/iframe.html?viewMode=docs&id=components-button--basic--docs"
        );
    }

    #[test]
    fn legacy_ignores_mode() {
        let expected = "https://sb.example.com/iframe.html?id=components-button--basic";
        assert_eq!(
            resolve_url(BASE, "components-button--basic", ViewMode::Story, &legacy()),
            expected
        );
        assert_eq!(
            resolve_url(BASE, "components-button--basic", ViewMode::Docs, &legacy()),
            expected
        );
    }

    #[test]
    fn v5_without_legacy_flag_is_still_bare() {
        let format = FormatInfo::new(StorybookVersion::V5, false, false);
        assert_eq!(
            resolve_url(BASE, "button--primary", ViewMode::Docs, &format),
            "https://sb.example.com/iframe.html?id=button--primary"
        );
    }

    #[test]
    fn story_mode_keeps_plain_id() {
        assert_eq!(
            resolve_url(BASE, "components-button--basic", ViewMode::Story, &modern()),
            "https://sb.example.com/iframe.html?viewMode=story&id=components-button--basic"
        );
    }

    #[test]
    fn docs_like_ids_force_docs_view() {
        assert_eq!(
            resolve_url(BASE, "components-button--docs", ViewMode::Story, &modern()),
            "https://sb.example.com/iframe.html?viewMode=docs&id=components-button--docs"
        );
        assert_eq!(
            resolve_url(BASE, "design-tokens-colors--page", ViewMode::Story, &modern()),
            "https://sb.example.com/iframe.html?viewMode=docs&id=design-tokens-colors--page"
        );
        assert_eq!(
            resolve_url(BASE, "design-tokens-colors--page", ViewMode::Docs, &modern()),
            "https://sb.example.com/iframe.html?viewMode=docs&id=design-tokens-colors--page"
        );
    }

    #[test]
    fn prefixes_and_trailing_slash_stripped() {
        assert_eq!(
            resolve_url("https://sb.example.com/", "/story/button--primary", ViewMode::Story, &modern()),
            "https://sb.example.com/iframe.html?viewMode=story&id=button--primary"
        );
        assert_eq!(
            resolve_url(BASE, "/docs/button--docs", ViewMode::Docs, &modern()),
            "https://sb.example.com/iframe.html?viewMode=docs&id=button--docs"
        );
        assert_eq!(clean_entry_id("//button--primary"), "button--primary");
    }

    #[test]
    fn id_is_percent_encoded() {
        assert_eq!(
            resolve_url(BASE, "a b&c", ViewMode::Story, &modern()),
            "https://sb.example.com/iframe.html?viewMode=story&id=a%20b%26c"
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let first = resolve_url(BASE, "x--y", ViewMode::Docs, &modern());
        let second = resolve_url(BASE, "x--y", ViewMode::Docs, &modern());
        assert_eq!(first, second);
    }
}
