//! Structured content extraction from a rendered Storybook iframe
//!
//! The page is read once (`document.body.innerHTML`); noise removal,
//! parsing and markdown conversion all run on that snapshot.

use anyhow::{Context, Result, anyhow};
use lol_html::{HtmlRewriter, Settings, element};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::js_scripts::{CONTENT_SNAPSHOT_SCRIPT, RENDER_READY_SCRIPT};
use crate::browser::PageDriver;
use crate::error::{StorybookError, StorybookResult};
use crate::markdown_converter::convert_html_to_markdown;

/// Elements removed before the snapshot is parsed: error overlays, loading
/// placeholders, and anything that is not content
pub const NOISE_SELECTORS: &[&str] = &[
    ".sb-errordisplay",
    ".sb-preparing-story",
    ".sb-preparing-docs",
    ".sb-loader",
    "script",
    "style",
    "noscript",
];

/// Language tag for code blocks without a `language-*` class
pub const DEFAULT_CODE_LANGUAGE: &str = "html";

const RENDER_POLL: Duration = Duration::from_millis(100);

static H1: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("H1: hardcoded selector is valid"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("PARAGRAPH: hardcoded selector is valid"));
static SECTION_HEADING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2, h3").expect("SECTION_HEADING: hardcoded selector is valid")
});
static PRE_CODE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("pre code").expect("PRE_CODE: hardcoded selector is valid"));
static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("TABLE: hardcoded selector is valid"));
static TABLE_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("TABLE_HEADER: hardcoded selector is valid"));
static TABLE_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("TABLE_ROW: hardcoded selector is valid"));
static TABLE_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("TABLE_CELL: hardcoded selector is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub level: u8,
    pub heading: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageContent {
    pub title: String,
    pub description: String,
    pub sections: Vec<Section>,
    pub code_blocks: Vec<CodeBlock>,
    pub tables: Vec<Table>,
    /// Body markup with noise removed
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub markdown: bool,
    /// Code blocks longer than this many characters are dropped
    pub code_limit: usize,
}

/// Placeholder headings Storybook renders when nothing is selected
fn is_placeholder_title(text: &str) -> bool {
    text.eq_ignore_ascii_case("No Preview") || text.starts_with("Sorry, but")
}

fn element_text(el: ElementRef<'_>) -> String {
    let raw = el.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove every `NOISE_SELECTORS` element (with its contents)
pub fn strip_noise(html: &str) -> Result<String> {
    let mut output = Vec::with_capacity(html.len());
    let handlers = NOISE_SELECTORS
        .iter()
        .map(|selector| {
            element!(*selector, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );
    rewriter
        .write(html.as_bytes())
        .map_err(|e| anyhow!("HTML rewrite error: {e}"))?;
    rewriter
        .end()
        .map_err(|e| anyhow!("HTML rewrite finalization error: {e}"))?;

    String::from_utf8(output).context("Invalid UTF-8 in cleaned HTML")
}

fn code_language(code: ElementRef<'_>) -> String {
    let parent_classes = code
        .parent()
        .and_then(ElementRef::wrap)
        .into_iter()
        .flat_map(|pre| pre.value().classes());

    code.value()
        .classes()
        .chain(parent_classes)
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
        .unwrap_or(DEFAULT_CODE_LANGUAGE)
        .to_string()
}

fn extract_table(table: ElementRef<'_>) -> Table {
    let headers = table.select(&TABLE_HEADER).map(element_text).collect();
    let rows = table
        .select(&TABLE_ROW)
        .map(|row| row.select(&TABLE_CELL).map(element_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();
    Table { headers, rows }
}

/// Parse a body snapshot into `PageContent`
pub fn parse_page_content(body_html: &str, options: ExtractOptions) -> Result<PageContent> {
    let html = strip_noise(body_html)?;
    let document = Html::parse_fragment(&html);

    let title = document
        .select(&H1)
        .map(element_text)
        .find(|text| !text.is_empty() && !is_placeholder_title(text))
        .unwrap_or_default();

    let description = document
        .select(&PARAGRAPH)
        .map(element_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    let sections = document
        .select(&SECTION_HEADING)
        .filter_map(|el| {
            let heading = element_text(el);
            let level = if el.value().name() == "h2" { 2 } else { 3 };
            (!heading.is_empty()).then_some(Section { level, heading })
        })
        .collect();

    let code_blocks = document
        .select(&PRE_CODE)
        .filter_map(|code| {
            let text: String = code.text().collect();
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.chars().count() > options.code_limit {
                return None;
            }
            Some(CodeBlock {
                language: code_language(code),
                code: trimmed.to_string(),
            })
        })
        .collect();

    let tables = document.select(&TABLE).map(extract_table).collect();

    let markdown = if options.markdown {
        Some(convert_html_to_markdown(&html)?)
    } else {
        None
    };

    Ok(PageContent {
        title,
        description,
        sections,
        code_blocks,
        tables,
        html,
        markdown,
    })
}

/// Snapshot the current page and parse it
pub async fn try_extract<P: PageDriver>(
    page: &P,
    url: &str,
    options: ExtractOptions,
) -> StorybookResult<PageContent> {
    let snapshot = page
        .evaluate(CONTENT_SNAPSHOT_SCRIPT)
        .await
        .map_err(|e| StorybookError::extraction(url, format!("{e:#}")))?;

    let Value::String(body) = snapshot else {
        return Err(StorybookError::extraction(
            url,
            format!("body snapshot was not a string: {snapshot}"),
        ));
    };

    parse_page_content(&body, options)
        .map_err(|e| StorybookError::extraction(url, format!("{e:#}")))
}

/// `try_extract`, with failure reported as absence
pub async fn extract_page_content<P: PageDriver>(
    page: &P,
    url: &str,
    options: ExtractOptions,
) -> Option<PageContent> {
    match try_extract(page, url, options).await {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

/// Poll until the docs or story root has rendered, up to `max_wait`.
/// Proceeds regardless once the deadline passes.
pub async fn wait_for_render<P: PageDriver>(page: &P, max_wait: Duration) {
    let start = Instant::now();

    loop {
        match page.evaluate(RENDER_READY_SCRIPT).await {
            Ok(Value::Bool(true)) => {
                debug!("Story root rendered after {:.2}s", start.elapsed().as_secs_f64());
                return;
            }
            Ok(_) => {}
            Err(e) => debug!("Render check failed: {:#}, retrying", e),
        }

        if start.elapsed() >= max_wait {
            debug!(
                "Render not detected after {}ms, extracting anyway",
                max_wait.as_millis()
            );
            return;
        }
        tokio::time::sleep(RENDER_POLL).await;
    }
}
