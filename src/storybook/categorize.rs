//! Category derivation from entry ids
//!
//! A strict function of the id string: the same id always lands in the same
//! category, whatever source discovered it.

use crate::utils::ID_SEPARATOR;

/// Marker prefixes checked in order, as `(marker, category)`.
///
/// A marker matches when the lowercased id equals it or continues with `-`
/// or `/` right after it.
pub const CATEGORY_MARKERS: &[(&str, &str)] = &[
    ("components", "components"),
    ("getting-started", "getting-started"),
];

/// Category used for ids with no marker and no `--` separator, and for ids
/// whose segment before the first `--` is empty (`--orphan`)
pub const FALLBACK_CATEGORY: &str = "other";

#[must_use]
pub fn categorize(id: &str) -> String {
    let lowered = id.to_lowercase();

    for (marker, category) in CATEGORY_MARKERS {
        if let Some(rest) = lowered.strip_prefix(marker)
            && (rest.is_empty() || rest.starts_with('-') || rest.starts_with('/'))
        {
            return (*category).to_string();
        }
    }

    match lowered.split_once(ID_SEPARATOR) {
        Some((head, _)) if !head.is_empty() => head.to_string(),
        _ => FALLBACK_CATEGORY.to_string(),
    }
}
