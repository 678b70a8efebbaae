//! Timeout wrapper for page operations

use std::future::Future;
use std::time::Duration;

use crate::error::{StorybookError, StorybookResult};

/// Run a page operation under `tokio::time::timeout`.
///
/// Expiry becomes `StorybookError::Timeout` naming the operation, which
/// keeps it distinguishable from the operation's own failures.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> StorybookResult<T>
where
    F: Future<Output = StorybookResult<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(StorybookError::Timeout {
            operation: operation_name.to_string(),
            elapsed: timeout,
        }),
    }
}
