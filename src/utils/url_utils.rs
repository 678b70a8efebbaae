//! URL validation and joining helpers.

use url::Url;

use crate::error::{StorybookError, StorybookResult};

/// Validate a Storybook base URL and normalize it for joining.
///
/// Only http and https are accepted. Query strings and fragments are dropped
/// (a pasted `?path=/story/...` address still points at the same deployment)
/// and the trailing slash is removed, so `join_base` can always insert one.
pub fn validate_base_url(raw: &str) -> StorybookResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StorybookError::configuration(
            "No Storybook base URL provided. Pass the http(s) address of a deployed Storybook.",
        ));
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| {
        StorybookError::configuration(format!(
            "Invalid Storybook base URL '{trimmed}': {e}. Expected an absolute http(s) URL."
        ))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(StorybookError::configuration(format!(
            "Unsupported scheme '{}' in Storybook base URL '{trimmed}'. Only http and https are supported.",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(StorybookError::configuration(format!(
            "Storybook base URL '{trimmed}' has no host."
        )));
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    // A base pointing at a file (index.html, iframe.html) means its directory
    let path = parsed.path().to_string();
    if path.ends_with(".html") {
        let dir = path.rsplit_once('/').map_or("", |(dir, _)| dir).to_string();
        parsed.set_path(&dir);
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Join a normalized base URL and a relative path
#[must_use]
pub fn join_base(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
