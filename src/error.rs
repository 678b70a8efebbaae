//! Error types for Storybook operations
//!
//! Every variant names what was attempted together with the URL or entry
//! identifier involved, so the protocol layer can hand the `Display` output
//! straight to the caller.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Storybook operations
pub type StorybookResult<T> = Result<T, StorybookError>;

#[derive(Debug, Error)]
pub enum StorybookError {
    /// Missing or invalid base URL (or other unusable configuration)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A URL could not be loaded after every load strategy was exhausted
    #[error("Failed to load {url}: {message}")]
    Navigation { url: String, message: String },

    /// The page loaded but in-page evaluation or conversion failed
    #[error("Failed to extract content from {url}: {message}")]
    Extraction { url: String, message: String },

    /// A page operation exceeded its deadline
    #[error("{operation} timed out after {}ms", .elapsed.as_millis())]
    Timeout { operation: String, elapsed: Duration },

    /// The browser reported a network-level failure (DNS, refused, net::ERR_*)
    #[error("Network error loading {url}: {message}")]
    Network { url: String, message: String },

    /// Browser process or DevTools connection failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// `index.json` request failed
    #[error("Index request failed: {0}")]
    Index(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for StorybookError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        Self::Other(format!("{err:#}"))
    }
}

impl StorybookError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn extraction(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Timeouts and network failures are worth escalating past; anything
    /// else means the page will not load no matter which readiness signal
    /// we wait for.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(
            StorybookError::Timeout {
                operation: "load".into(),
                elapsed: Duration::from_secs(1),
            }
            .is_transient()
        );
        assert!(StorybookError::network("http://x", "net::ERR_CONNECTION_REFUSED").is_transient());
        assert!(!StorybookError::navigation("http://x", "boom").is_transient());
        assert!(!StorybookError::Browser("gone".into()).is_transient());
    }

    #[test]
    fn messages_name_the_target() {
        let err = StorybookError::extraction("http://sb/iframe.html?id=a--b", "script threw");
        assert_eq!(
            err.to_string(),
            "Failed to extract content from http://sb/iframe.html?id=a--b: script threw"
        );

        let err = StorybookError::Timeout {
            operation: "Page load (load)".into(),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Page load (load) timed out after 1500ms");
    }
}
