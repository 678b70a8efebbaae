//! Test utilities for the storybook test suite
//!
//! `MockPage` stands in for a Chrome tab: scripted evaluate responses, a
//! per-strategy navigation outcome and an ordered log of every navigation
//! and evaluation. Each driver call yields once before acting, so concurrent
//! callers that are not serialized visibly interleave.
//! Clones share state so a test can keep a handle after the page has been
//! handed to a session.

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use kodegen_tools_storybook::page_extractor::js_scripts::{LIVENESS_SCRIPT, RENDER_READY_SCRIPT};
use kodegen_tools_storybook::{
    BrowserBackend, LoadState, PageDriver, StorybookConfig, StorybookError, StorybookResult,
};

static LOGGING: Once = Once::new();

/// Install a tracing subscriber honouring `RUST_LOG`, once per test binary
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One driver call, in the order the page saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Navigate(String),
    Evaluate(String),
}

/// What a navigation attempt with a given strategy does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavBehavior {
    Succeed,
    Timeout,
    NetworkError,
    Fatal,
}

#[derive(Debug)]
struct MockState {
    responses: HashMap<String, Value>,
    failing: HashSet<String>,
    behaviors: HashMap<LoadState, NavBehavior>,
    navigations: Vec<(String, LoadState)>,
    evaluations: Vec<String>,
    calls: Vec<MockCall>,
    echo_url: HashSet<String>,
    current_url: Option<String>,
    url_after_load: Option<String>,
    alive: bool,
    closed: bool,
    screenshot: Option<Vec<u8>>,
}

impl Default for MockState {
    fn default() -> Self {
        let mut responses = HashMap::new();
        responses.insert(LIVENESS_SCRIPT.to_string(), json!(2));
        responses.insert(RENDER_READY_SCRIPT.to_string(), json!(true));

        Self {
            responses,
            failing: HashSet::new(),
            behaviors: HashMap::new(),
            navigations: Vec::new(),
            evaluations: Vec::new(),
            calls: Vec::new(),
            echo_url: HashSet::new(),
            current_url: None,
            url_after_load: None,
            alive: true,
            closed: false,
            screenshot: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockPage {
    state: Arc<Mutex<MockState>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self.state.lock().expect("mock state poisoned");
        f(&mut state)
    }

    /// Respond to `script` with `value`, clearing any scripted failure
    pub fn respond(&self, script: impl Into<String>, value: Value) -> &Self {
        let script = script.into();
        self.with_state(|s| {
            s.failing.remove(&script);
            s.responses.insert(script, value);
        });
        self
    }

    /// Make `script` fail to evaluate
    pub fn fail_script(&self, script: impl Into<String>) -> &Self {
        self.with_state(|s| {
            s.failing.insert(script.into());
        });
        self
    }

    /// Answer `script` with an `<h1>` holding the currently loaded address
    pub fn echo_url(&self, script: impl Into<String>) -> &Self {
        self.with_state(|s| {
            s.echo_url.insert(script.into());
        });
        self
    }

    pub fn set_behavior(&self, wait: LoadState, behavior: NavBehavior) -> &Self {
        self.with_state(|s| {
            s.behaviors.insert(wait, behavior);
        });
        self
    }

    /// Address reported after a successful load, e.g. a redirect target
    pub fn set_url_after_load(&self, url: impl Into<String>) -> &Self {
        self.with_state(|s| s.url_after_load = Some(url.into()));
        self
    }

    pub fn set_screenshot(&self, png: Vec<u8>) -> &Self {
        self.with_state(|s| s.screenshot = Some(png));
        self
    }

    /// Simulate a crashed tab: every evaluation fails from now on
    pub fn kill(&self) {
        self.with_state(|s| s.alive = false);
    }

    pub fn navigations(&self) -> Vec<(String, LoadState)> {
        self.with_state(|s| s.navigations.clone())
    }

    pub fn navigated_urls(&self) -> Vec<String> {
        self.with_state(|s| {
            let mut urls: Vec<String> = Vec::new();
            for (url, _) in &s.navigations {
                if urls.last() != Some(url) {
                    urls.push(url.clone());
                }
            }
            urls
        })
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn evaluation_count(&self, script: &str) -> usize {
        self.with_state(|s| s.evaluations.iter().filter(|e| *e == script).count())
    }

    pub fn is_closed(&self) -> bool {
        self.with_state(|s| s.closed)
    }
}

impl PageDriver for MockPage {
    async fn navigate(&self, url: &str, wait: LoadState, timeout: Duration) -> StorybookResult<()> {
        tokio::task::yield_now().await;
        let behavior = self.with_state(|s| {
            s.navigations.push((url.to_string(), wait));
            s.calls.push(MockCall::Navigate(url.to_string()));
            s.behaviors.get(&wait).copied().unwrap_or(NavBehavior::Succeed)
        });

        match behavior {
            NavBehavior::Succeed => {
                self.with_state(|s| {
                    s.current_url = Some(s.url_after_load.clone().unwrap_or_else(|| url.to_string()));
                });
                Ok(())
            }
            NavBehavior::Timeout => Err(StorybookError::Timeout {
                operation: format!("navigate ({wait})"),
                elapsed: timeout,
            }),
            NavBehavior::NetworkError => {
                Err(StorybookError::network(url, "net::ERR_CONNECTION_REFUSED"))
            }
            NavBehavior::Fatal => Err(StorybookError::navigation(url, "net::ERR_ABORTED (fatal)")),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        tokio::task::yield_now().await;
        self.with_state(|s| {
            s.evaluations.push(script.to_string());
            s.calls.push(MockCall::Evaluate(script.to_string()));
            if !s.alive {
                return Err(anyhow!("Target closed"));
            }
            if s.failing.contains(script) {
                return Err(anyhow!("Evaluation failed: Uncaught TypeError"));
            }
            if s.echo_url.contains(script) {
                let url = s.current_url.clone().unwrap_or_default();
                return Ok(json!(format!("<h1>{}</h1>", html_escape::encode_text(&url))));
            }
            Ok(s.responses.get(script).cloned().unwrap_or(Value::Null))
        })
    }

    async fn current_url(&self) -> Option<String> {
        self.with_state(|s| s.current_url.clone())
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        self.with_state(|s| s.screenshot.clone())
            .ok_or_else(|| anyhow!("Screenshot capture failed"))
    }

    async fn close(self) {
        self.with_state(|s| s.closed = true);
    }
}

/// Hands out queued pages, then fresh default pages
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    pages: Arc<Mutex<VecDeque<MockPage>>>,
    opened: Arc<Mutex<usize>>,
    shutdowns: Arc<Mutex<usize>>,
}

impl MockBackend {
    pub fn with_pages(pages: impl IntoIterator<Item = MockPage>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(pages.into_iter().collect())),
            ..Self::default()
        }
    }

    pub fn opened(&self) -> usize {
        *self.opened.lock().expect("mock counter poisoned")
    }

    pub fn shutdowns(&self) -> usize {
        *self.shutdowns.lock().expect("mock counter poisoned")
    }
}

impl BrowserBackend for MockBackend {
    type Page = MockPage;

    async fn open_page(&mut self) -> StorybookResult<MockPage> {
        *self.opened.lock().expect("mock counter poisoned") += 1;
        let queued = self.pages.lock().expect("mock pages poisoned").pop_front();
        Ok(queued.unwrap_or_default())
    }

    async fn shutdown(&mut self) {
        *self.shutdowns.lock().expect("mock counter poisoned") += 1;
    }
}

/// Configuration with every settle delay shortened for tests
pub fn test_config(base_url: &str) -> StorybookConfig {
    StorybookConfig::builder()
        .base_url(base_url)
        .navigation_timeout(Duration::from_secs(1))
        .index_timeout(Duration::from_secs(2))
        .commit_settle(Duration::from_millis(5))
        .render_settle(Duration::from_millis(5))
        .expand_settle(Duration::from_millis(5))
        .build()
        .expect("test config is valid")
}

/// A sidebar record as the scan scripts return it
pub fn sidebar_item(id: &str, name: &str, node_type: &str) -> Value {
    json!({ "id": id, "name": name, "nodeType": node_type, "href": null })
}

/// A sidebar link record
pub fn sidebar_link(href: &str, name: &str) -> Value {
    json!({ "id": null, "name": name, "nodeType": null, "href": href })
}

/// Body markup of a rendered docs page
pub fn create_docs_body(title: &str, body: &str) -> String {
    format!(
        r#"<div id="storybook-docs"><h1>{}</h1>{}</div>"#,
        html_escape::encode_text(title),
        body
    )
}
