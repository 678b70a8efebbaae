//! HTML to Markdown conversion for extracted Storybook pages
//!
//! `htmd` does the conversion; `cleanup` strips the Storybook-specific
//! artifacts it leaves behind.

pub mod cleanup;

use anyhow::{Context, Result};
use htmd::HtmlToMarkdown;

pub use cleanup::{CLEANUP_RULES, CleanupRule, clean_markdown};

fn create_converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript", "svg"])
        .build()
}

/// Convert an HTML snapshot to cleaned markdown
pub fn convert_html_to_markdown(html: &str) -> Result<String> {
    let markdown = create_converter()
        .convert(html)
        .context("Failed to convert HTML to markdown")?;
    Ok(clean_markdown(markdown.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_and_cleans() {
        let html = "<h1>Button</h1><p>Name</p><p>Primary call to action.</p><script>x()</script>";
        let markdown = convert_html_to_markdown(html).unwrap();
        assert!(markdown.starts_with("# Button"));
        assert!(markdown.contains("Primary call to action."));
        assert!(!markdown.lines().any(|line| line.trim() == "Name"));
        assert!(!markdown.contains("x()"));
    }
}
