//! Helper functions for consistent chromiumoxide Page error handling

use chromiumoxide::page::Page;
use tracing::trace;

/// Current page URL, or `None` when the page has not navigated yet or the
/// browser could not be reached.
pub async fn get_page_url(page: &Page) -> Option<String> {
    match page.url().await {
        Ok(Some(url)) if url != "about:blank" => Some(url),
        Ok(_) => {
            trace!("Page has no URL yet");
            None
        }
        Err(e) => {
            trace!("Failed to get page URL (browser communication error): {}", e);
            None
        }
    }
}
