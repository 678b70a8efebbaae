//! Escalating page load
//!
//! Storybook builds disagree about which readiness signal they ever reach:
//! some never go network-idle, some never fire `load`. Each strategy is tried
//! in turn and a bare commit plus a fixed settle delay is the last resort.

use std::time::Duration;
use tracing::{debug, warn};

use super::driver::{LoadState, PageDriver};
use crate::error::{StorybookError, StorybookResult};

/// Navigation timing knobs taken from the session configuration
#[derive(Debug, Clone, Copy)]
pub struct NavigationTiming {
    pub timeout: Duration,
    pub commit_settle: Duration,
}

/// Load `url`, returning the strategy that succeeded.
///
/// A non-transient failure aborts at once. When every strategy fails for
/// timeout or network reasons and the commit fallback fails too, the first
/// error encountered is reported.
pub async fn safe_navigate<P: PageDriver>(
    page: &P,
    url: &str,
    timing: NavigationTiming,
) -> StorybookResult<LoadState> {
    let mut first_error: Option<StorybookError> = None;

    for wait in LoadState::ESCALATION {
        match page.navigate(url, wait, timing.timeout).await {
            Ok(()) => {
                debug!("Loaded {} ({})", url, wait);
                return Ok(wait);
            }
            Err(e) if e.is_transient() => {
                debug!("Load strategy {} failed for {}: {}", wait, url, e);
                first_error.get_or_insert(e);
            }
            Err(e) => {
                warn!("Aborting navigation to {}: {}", url, e);
                return Err(into_navigation_error(url, e));
            }
        }
    }

    match page.navigate(url, LoadState::Commit, timing.timeout).await {
        Ok(()) => {
            debug!(
                "Committed {} after readiness strategies failed; settling {}ms",
                url,
                timing.commit_settle.as_millis()
            );
            tokio::time::sleep(timing.commit_settle).await;
            Ok(LoadState::Commit)
        }
        Err(e) => {
            let first = first_error.unwrap_or(e);
            warn!("All load strategies failed for {}: {}", url, first);
            Err(into_navigation_error(url, first))
        }
    }
}

fn into_navigation_error(url: &str, err: StorybookError) -> StorybookError {
    match err {
        StorybookError::Navigation { .. } => err,
        other => StorybookError::navigation(url, other.to_string()),
    }
}
