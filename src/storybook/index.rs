//! `index.json` probing and lenient interpretation
//!
//! The index is advisory. Storybook 7 publishes `{"v": 4, "entries": {..}}`,
//! 6.x publishes `{"v": 3, "stories": {..}}` with the title under `kind`, and
//! custom builds drift from both. Fields are read one by one with fallbacks
//! instead of deserializing into a fixed shape.

use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::format::StorybookVersion;
use super::types::{EntryKind, StoryEntry, name_from_id};
use crate::error::{StorybookError, StorybookResult};
use crate::utils::{CHROME_USER_AGENT, INDEX_PATH, join_base};

/// Upper bound on the index body; larger responses are treated as failures
pub const MAX_INDEX_BYTES: usize = 32 * 1024 * 1024;

/// Which top-level map held the entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexContainer {
    Entries,
    Stories,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorybookIndex {
    /// Raw `v` discriminant, when numeric
    pub version: Option<u64>,
    pub container: IndexContainer,
    /// Entries in document order
    pub entries: Vec<StoryEntry>,
}

impl StorybookIndex {
    /// Interpret a parsed index document
    #[must_use]
    pub fn from_json(doc: &Value) -> Self {
        let version = doc.get("v").and_then(Value::as_u64);

        let (container, map) = if let Some(map) = doc.get("entries").and_then(Value::as_object) {
            (IndexContainer::Entries, Some(map))
        } else if let Some(map) = doc.get("stories").and_then(Value::as_object) {
            (IndexContainer::Stories, Some(map))
        } else {
            (IndexContainer::None, None)
        };

        let entries = map
            .map(|map| {
                map.iter()
                    .filter_map(|(key, raw)| parse_entry(key, raw.as_object()?))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            version,
            container,
            entries,
        }
    }

    #[must_use]
    pub fn version_tag(&self) -> StorybookVersion {
        classify_version(self.version, self.container)
    }
}

/// `v >= 4` is v7, `v == 3` is v6; without a usable `v` the container name
/// decides.
#[must_use]
pub fn classify_version(v: Option<u64>, container: IndexContainer) -> StorybookVersion {
    match (v, container) {
        (Some(v), _) if v >= 4 => StorybookVersion::V7,
        (Some(3), _) => StorybookVersion::V6,
        (_, IndexContainer::Entries) => StorybookVersion::V7,
        (_, IndexContainer::Stories) => StorybookVersion::V6,
        _ => StorybookVersion::Unknown,
    }
}

fn str_field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_entry(key: &str, raw: &Map<String, Value>) -> Option<StoryEntry> {
    let id = str_field(raw, "id").unwrap_or(key).trim();
    if id.is_empty() {
        return None;
    }

    let docs_only = raw
        .get("parameters")
        .and_then(|p| p.get("docsOnly"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let kind = match str_field(raw, "type") {
        Some("docs") => EntryKind::Docs,
        Some("story") => EntryKind::Story,
        _ if docs_only => EntryKind::Docs,
        _ => EntryKind::from_id(id),
    };

    let name = str_field(raw, "name")
        .or_else(|| str_field(raw, "story"))
        .map_or_else(|| name_from_id(id), str::to_string);

    // v6 stories.json keeps the hierarchical title under `kind`
    let title = str_field(raw, "title")
        .or_else(|| str_field(raw, "kind"))
        .unwrap_or_default()
        .to_string();

    Some(StoryEntry {
        id: id.to_string(),
        name,
        kind,
        title,
    })
}

/// Result of fetching `<base>/index.json`
#[derive(Debug, Clone)]
pub enum IndexProbe {
    Found(StorybookIndex),
    /// Non-success HTTP status
    Missing(u16),
    /// Transport failure, oversized body, or a body that is not JSON
    Failed(String),
}

impl IndexProbe {
    /// The index when it was found and holds at least one entry
    #[must_use]
    pub fn into_populated(self) -> Option<StorybookIndex> {
        match self {
            Self::Found(index) if !index.entries.is_empty() => Some(index),
            _ => None,
        }
    }
}

/// HTTP client for the index endpoint
#[derive(Debug, Clone)]
pub struct IndexClient {
    client: Client,
}

impl IndexClient {
    pub fn new(timeout: Duration) -> StorybookResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(CHROME_USER_AGENT)
            .build()
            .map_err(|e| StorybookError::Index(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch and interpret the index under `base_url`. Never errors: every
    /// failure is folded into the probe result.
    pub async fn probe(&self, base_url: &str) -> IndexProbe {
        let url = join_base(base_url, INDEX_PATH);
        match self.fetch(&url).await {
            Ok(doc) => {
                let index = StorybookIndex::from_json(&doc);
                debug!(
                    "Index at {} has {} entries (v={:?}, container={:?})",
                    url,
                    index.entries.len(),
                    index.version,
                    index.container
                );
                IndexProbe::Found(index)
            }
            Err(ProbeFailure::Status(status)) => {
                debug!("No index at {} (HTTP {})", url, status);
                IndexProbe::Missing(status)
            }
            Err(ProbeFailure::Other(reason)) => {
                warn!("Index probe failed for {}: {}", url, reason);
                IndexProbe::Failed(reason)
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Value, ProbeFailure> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ProbeFailure::Other(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ProbeFailure::Status(response.status().as_u16()));
        }

        let mut body = Vec::with_capacity(
            response
                .content_length()
                .and_then(|len| usize::try_from(len).ok())
                .unwrap_or(0)
                .min(MAX_INDEX_BYTES),
        );
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ProbeFailure::Other(format!("read failed: {e}")))?;
            if body.len() + chunk.len() > MAX_INDEX_BYTES {
                return Err(ProbeFailure::Other(format!(
                    "body exceeds {MAX_INDEX_BYTES} bytes"
                )));
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body)
            .map_err(|e| ProbeFailure::Other(format!("body is not JSON: {e}")))
    }
}

enum ProbeFailure {
    Status(u16),
    Other(String),
}
