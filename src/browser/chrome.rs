//! chromiumoxide-backed browser
//!
//! `ChromeBackend` launches Chrome lazily on the first `open_page`, health
//! checks it on every later call and relaunches it when the DevTools
//! connection has died.

use anyhow::Context;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, NavigateParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use super::driver::{BrowserBackend, LoadState, PageDriver};
use super::page_helpers::get_page_url;
use super::page_timeout::with_page_timeout;
use super::profile::BrowserProfile;
use super::setup::launch_browser;
use crate::config::StorybookConfig;
use crate::error::{StorybookError, StorybookResult};
use crate::page_extractor::js_scripts::{
    DOM_PARSED_SCRIPT, LOAD_COMPLETE_SCRIPT, NETWORK_ACTIVITY_SCRIPT,
};

const READINESS_POLL: Duration = Duration::from_millis(100);

/// Resource count must hold still this long to count as network idle
const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Browser, its CDP handler task and its profile directory
///
/// The handler must be aborted once the browser is gone or it keeps running.
struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    profile: BrowserProfile,
}

impl BrowserWrapper {
    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        self.handler.abort();
        // Only after the process exited, or Chrome may still hold the files
        self.profile.cleanup();
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

pub struct ChromeBackend {
    config: StorybookConfig,
    wrapper: Option<BrowserWrapper>,
}

impl ChromeBackend {
    /// Nothing is launched until the first page is requested
    #[must_use]
    pub fn new(config: &StorybookConfig) -> Self {
        Self {
            config: config.clone(),
            wrapper: None,
        }
    }

    async fn ensure_browser(&mut self) -> StorybookResult<&Browser> {
        if let Some(wrapper) = self.wrapper.as_ref() {
            match wrapper.browser.version().await {
                Ok(_) => debug!("Browser health check passed"),
                Err(e) => {
                    warn!("Browser health check failed: {}. Relaunching", e);
                    if let Some(crashed) = self.wrapper.take() {
                        crashed.close().await;
                    }
                }
            }
        }

        if self.wrapper.is_none() {
            let mut profile = BrowserProfile::for_launch(self.config.chrome_data_dir())
                .map_err(|e| StorybookError::Browser(format!("{e:#}")))?;
            match launch_browser(&self.config, profile.path()).await {
                Ok((browser, handler)) => {
                    self.wrapper = Some(BrowserWrapper {
                        browser,
                        handler,
                        profile,
                    });
                }
                Err(e) => {
                    profile.cleanup();
                    return Err(StorybookError::Browser(format!("{e:#}")));
                }
            }
        }

        self.wrapper
            .as_ref()
            .map(|wrapper| &wrapper.browser)
            .ok_or_else(|| StorybookError::Browser("browser not running after launch".into()))
    }
}

impl BrowserBackend for ChromeBackend {
    type Page = ChromePage;

    async fn open_page(&mut self) -> StorybookResult<ChromePage> {
        let op_timeout = self.config.navigation_timeout();
        let browser = self.ensure_browser().await?;
        let page = with_page_timeout(
            async {
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| StorybookError::Browser(format!("Failed to create page: {e}")))
            },
            op_timeout,
            "create page",
        )
        .await?;

        info!("Opened new browser page");
        Ok(ChromePage { page, op_timeout })
    }

    async fn shutdown(&mut self) {
        if let Some(wrapper) = self.wrapper.take() {
            info!("Shutting down Storybook browser");
            wrapper.close().await;
        }
    }
}

pub struct ChromePage {
    page: Page,
    op_timeout: Duration,
}

impl ChromePage {
    async fn eval_value(&self, script: &str) -> StorybookResult<Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| StorybookError::Other(format!("Script evaluation failed: {e}")))?;
        // `undefined` has no JSON value
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn eval_flag(&self, script: &str) -> bool {
        matches!(self.eval_value(script).await, Ok(Value::Bool(true)))
    }

    /// Issue `Page.navigate` and map the outcome onto the error taxonomy
    async fn commit(&self, url: &str) -> StorybookResult<()> {
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| classify_cdp_error(url, &e, self.op_timeout))?;

        match response.result.error_text.as_deref() {
            None | Some("") => Ok(()),
            Some(text) => Err(classify_error_text(url, text)),
        }
    }

    async fn wait_until(&self, script: &str) {
        while !self.eval_flag(script).await {
            tokio::time::sleep(READINESS_POLL).await;
        }
    }

    async fn wait_network_idle(&self) {
        let mut last_count: Option<u64> = None;
        let mut stable_since = Instant::now();

        loop {
            if let Ok(snapshot) = self.eval_value(NETWORK_ACTIVITY_SCRIPT).await {
                let complete = snapshot.get("complete").and_then(Value::as_bool) == Some(true);
                let count = snapshot.get("resources").and_then(Value::as_u64);

                if complete && count.is_some() && count == last_count {
                    if stable_since.elapsed() >= NETWORK_QUIET_WINDOW {
                        return;
                    }
                } else {
                    last_count = count;
                    stable_since = Instant::now();
                }
            }
            tokio::time::sleep(READINESS_POLL).await;
        }
    }
}

fn classify_error_text(url: &str, text: &str) -> StorybookError {
    if text.contains("net::ERR") {
        StorybookError::network(url, text)
    } else {
        StorybookError::navigation(url, text)
    }
}

/// `request_timeout` is the CDP request timeout the browser was launched with
fn classify_cdp_error(url: &str, err: &CdpError, request_timeout: Duration) -> StorybookError {
    match err {
        CdpError::Timeout => StorybookError::Timeout {
            operation: format!("navigation to {url}"),
            elapsed: request_timeout,
        },
        other => classify_error_text(url, &other.to_string()),
    }
}

impl PageDriver for ChromePage {
    async fn navigate(&self, url: &str, wait: LoadState, timeout: Duration) -> StorybookResult<()> {
        let operation = format!("navigate to {url} ({wait})");
        trace!("{}", operation);

        with_page_timeout(
            async {
                self.commit(url).await?;
                match wait {
                    LoadState::Commit => {}
                    LoadState::DomContentLoaded => self.wait_until(DOM_PARSED_SCRIPT).await,
                    LoadState::Load => self.wait_until(LOAD_COMPLETE_SCRIPT).await,
                    LoadState::NetworkIdle => self.wait_network_idle().await,
                }
                Ok(())
            },
            timeout,
            &operation,
        )
        .await
    }

    async fn evaluate(&self, script: &str) -> anyhow::Result<Value> {
        with_page_timeout(self.eval_value(script), self.op_timeout, "script evaluation")
            .await
            .map_err(anyhow::Error::from)
    }

    async fn current_url(&self) -> Option<String> {
        get_page_url(&self.page).await
    }

    async fn screenshot_png(&self) -> anyhow::Result<Vec<u8>> {
        let params = CaptureScreenshotParams {
            format: Some(CaptureScreenshotFormat::Png),
            capture_beyond_viewport: Some(true),
            ..Default::default()
        };

        tokio::time::timeout(self.op_timeout, self.page.screenshot(params))
            .await
            .context("Screenshot capture timed out")?
            .context("Failed to capture screenshot")
    }

    async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!("Failed to close page (already gone?): {}", e);
        }
    }
}
