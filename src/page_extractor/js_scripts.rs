//! JavaScript evaluation scripts
//!
//! Every script returns plain JSON (strings, booleans, arrays of flat
//! objects). Interpretation happens on the Rust side so it can be tested
//! without a browser.

/// Trivial no-op used to check that a page still answers
pub const LIVENESS_SCRIPT: &str = "1 + 1";

/// Document parsed
pub const DOM_PARSED_SCRIPT: &str = "document.readyState !== 'loading'";

/// Document and subresources loaded
pub const LOAD_COMPLETE_SCRIPT: &str = "document.readyState === 'complete'";

/// Snapshot used for network-idle detection: the resource-timing entry count
/// is compared across polls.
pub const NETWORK_ACTIVITY_SCRIPT: &str = r#"
    (() => ({
        complete: document.readyState === 'complete',
        resources: performance.getEntriesByType('resource').length
    }))()
"#;

/// True once the docs or story root has rendered children
pub const RENDER_READY_SCRIPT: &str = r#"
    (() => {
        const roots = ['#storybook-docs', '#storybook-root', '#root', '#docs-root'];
        return roots.some(selector => {
            const el = document.querySelector(selector);
            return !!el && el.children.length > 0;
        });
    })()
"#;

/// Full body markup; noise removal and parsing happen in Rust
pub const CONTENT_SNAPSHOT_SCRIPT: &str = "document.body ? document.body.innerHTML : ''";

/// Click every collapsed toggle and every group node once. Returns the
/// number of clicks attempted; a throwing click is skipped.
pub const EXPAND_NAVIGATION_SCRIPT: &str = r#"
    (() => {
        const targets = new Set([
            ...document.querySelectorAll('[aria-expanded="false"]'),
            ...document.querySelectorAll('[data-nodetype="group"], [data-nodetype="component"]')
        ]);
        let clicked = 0;
        targets.forEach(el => {
            try {
                el.click();
                clicked += 1;
            } catch (e) {}
        });
        return clicked;
    })()
"#;

/// Elements carrying an explicit entry id
pub const ITEM_ID_SCAN_SCRIPT: &str = r#"
    (() => Array.from(document.querySelectorAll('[data-item-id]')).map(el => ({
        id: el.getAttribute('data-item-id'),
        name: (el.textContent || '').trim(),
        nodeType: el.getAttribute('data-nodetype'),
        href: el.getAttribute('href')
    })))()
"#;

/// Anchors whose link encodes a `path` query parameter
pub const PATH_LINK_SCAN_SCRIPT: &str = r#"
    (() => Array.from(document.querySelectorAll('a[href*="path="]')).map(a => ({
        id: null,
        name: (a.textContent || '').trim(),
        nodeType: null,
        href: a.getAttribute('href')
    })))()
"#;

/// Legacy sidebars: elements named by `data-name`, linked directly or by the
/// closest enclosing anchor
pub const LEGACY_NAME_SCAN_SCRIPT: &str = r#"
    (() => Array.from(document.querySelectorAll('[data-name]')).map(el => {
        const anchor = el.tagName === 'A' ? el : el.closest('a');
        return {
            id: null,
            name: el.getAttribute('data-name'),
            nodeType: null,
            href: anchor ? anchor.getAttribute('href') : el.getAttribute('href')
        };
    }))()
"#;

/// Hrefs of the first `sample` sidebar links
#[must_use]
pub fn sidebar_links_script(sample: usize) -> String {
    format!(
        r#"
    (() => {{
        const selectors = '#storybook-explorer-tree a, nav a, a[href*="path="], a[href*="/story/"]';
        return Array.from(document.querySelectorAll(selectors))
            .slice(0, {sample})
            .map(a => a.getAttribute('href') || '');
    }})()
"#
    )
}
