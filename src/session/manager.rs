//! Holder for the connected session
//!
//! The caller owns a `SessionManager` and passes it around; there is no
//! process-wide instance. Connecting replaces the previous session wholesale,
//! which discards its `FormatInfo` and cache along with it.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use super::StorybookSession;
use crate::browser::{BrowserBackend, ChromeBackend};
use crate::config::StorybookConfig;
use crate::error::{StorybookError, StorybookResult};

pub struct SessionManager<B: BrowserBackend = ChromeBackend> {
    current: Arc<Mutex<Option<Arc<StorybookSession<B>>>>>,
}

// Manual impl: cloning shares the slot and needs no `B: Clone`
impl<B: BrowserBackend> Clone for SessionManager<B> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<B: BrowserBackend> Default for SessionManager<B> {
    fn default() -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
        }
    }
}

impl SessionManager<ChromeBackend> {
    /// Connect to a Storybook with a Chrome backend
    pub async fn connect_chrome(
        &self,
        config: StorybookConfig,
    ) -> StorybookResult<Arc<StorybookSession<ChromeBackend>>> {
        let backend = ChromeBackend::new(&config);
        self.connect(config, backend).await
    }
}

impl<B: BrowserBackend> SessionManager<B> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new session, shutting down the previous one
    pub async fn connect(
        &self,
        config: StorybookConfig,
        backend: B,
    ) -> StorybookResult<Arc<StorybookSession<B>>> {
        let session = Arc::new(StorybookSession::new(config, backend)?);

        let previous = {
            let mut guard = self.current.lock().await;
            guard.replace(Arc::clone(&session))
        };
        if let Some(previous) = previous {
            info!(
                "Replacing session for {} with {}",
                previous.base_url(),
                session.base_url()
            );
            previous.shutdown().await;
        }

        Ok(session)
    }

    /// Drop the current session, if any
    pub async fn disconnect(&self) {
        let previous = self.current.lock().await.take();
        if let Some(previous) = previous {
            info!("Disconnecting from {}", previous.base_url());
            previous.shutdown().await;
        }
    }

    /// The connected session
    ///
    /// Returns `StorybookError::Configuration` when nothing is connected.
    pub async fn current(&self) -> StorybookResult<Arc<StorybookSession<B>>> {
        self.current.lock().await.clone().ok_or_else(|| {
            StorybookError::configuration(
                "no Storybook base URL configured: connect to a Storybook \
                 (for example http://localhost:6006) before running this operation",
            )
        })
    }

    pub async fn is_connected(&self) -> bool {
        self.current.lock().await.is_some()
    }
}
