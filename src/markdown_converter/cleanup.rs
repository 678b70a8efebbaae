//! Post-conversion cleanup for Storybook markdown
//!
//! Docs pages convert with artifacts: the ArgsTable header cells and copy
//! buttons become standalone lines, and an unrendered story leaves a
//! "No Preview" block behind. The rules below only ever match whole lines
//! made of those exact tokens, so prose that merely contains the words is
//! untouched.

use regex::Regex;
use std::sync::LazyLock;

/// One cleanup step: every match of `pattern` becomes `replacement`
pub struct CleanupRule {
    pub label: &'static str,
    pub pattern: &'static LazyLock<Regex>,
    pub replacement: &'static str,
}

static TABLE_LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:Name|Description|Default|Control|Copy)[ \t]*(?:\r?\n|\z)")
        .expect("TABLE_LABEL_LINE: hardcoded regex is valid")
});

static NO_PREVIEW_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^#{0,6}[ \t]*No Preview[ \t]*(?:\r?\n|\z)(?:[ \t]*\r?\n)*(?:[ \t]*Sorry, but[^\n]*(?:\n|\z))?",
    )
    .expect("NO_PREVIEW_SECTION: hardcoded regex is valid")
});

static BLANK_LINE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n(?:[ \t]*\r?\n){4,}").expect("BLANK_LINE_RUN: hardcoded regex is valid")
});

/// Applied in order; blank-line collapsing runs last so it also absorbs the
/// gaps left by the removals.
pub static CLEANUP_RULES: &[CleanupRule] = &[
    CleanupRule {
        label: "table label lines",
        pattern: &TABLE_LABEL_LINE,
        replacement: "",
    },
    CleanupRule {
        label: "no-preview placeholder",
        pattern: &NO_PREVIEW_SECTION,
        replacement: "",
    },
    CleanupRule {
        label: "blank line runs",
        pattern: &BLANK_LINE_RUN,
        replacement: "\n\n\n",
    },
];

/// Run every rule over converted markdown
#[must_use]
pub fn clean_markdown(markdown: &str) -> String {
    CLEANUP_RULES
        .iter()
        .fold(markdown.to_string(), |text, rule| {
            rule.pattern
                .replace_all(&text, rule.replacement)
                .into_owned()
        })
}
