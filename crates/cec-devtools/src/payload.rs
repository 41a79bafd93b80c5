//! Event payload
//!
//! What the capture hook records for one custom event. The JSON form is
//! also the export format.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `at fn (url:line:col)`
static PAREN_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*):(\d+):(\d+)\)").expect("static regex"));

/// `at url:line:col`
static BARE_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"at (.*):(\d+):(\d+)").expect("static regex"));

/// Stack lines before the caller: the error line, the hook, and dispatch
const SKIPPED_FRAMES: usize = 3;

/// One captured custom event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEventPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub detail: Value,
    /// Milliseconds since the Unix epoch
    pub time: u64,
    #[serde(default)]
    pub target_tag: Option<String>,
    #[serde(default)]
    pub target_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_url: Option<String>,
    #[serde(default)]
    pub initiator: Option<Initiator>,
}

impl CustomEventPayload {
    /// Payload with no target and no initiator
    pub fn new(event_type: impl Into<String>, detail: Value, time: u64) -> Self {
        Self {
            event_type: event_type.into(),
            detail,
            time,
            target_tag: None,
            target_selector: None,
            tab_id: None,
            tab_url: None,
            initiator: None,
        }
    }

    /// Compact JSON of `detail`
    pub fn detail_json(&self) -> String {
        self.detail.to_string()
    }

    /// Indented JSON of `detail`
    pub fn detail_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.detail).unwrap_or_else(|_| self.detail_json())
    }
}

/// Call site that dispatched the event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiator {
    pub url: String,
    pub line: u32,
    pub column: u32,
}

impl Initiator {
    /// First caller frame of a stack trace.
    ///
    /// The first three lines belong to the capture machinery and are skipped.
    pub fn from_stack(stack: &str) -> Option<Self> {
        stack
            .lines()
            .skip(SKIPPED_FRAMES)
            .map(str::trim)
            .find_map(|line| {
                let caps = PAREN_FRAME
                    .captures(line)
                    .or_else(|| BARE_FRAME.captures(line))?;
                Some(Self {
                    url: caps[1].to_string(),
                    line: caps[2].parse().ok()?,
                    column: caps[3].parse().ok()?,
                })
            })
    }

    /// Last path segment of the script URL, or its host for root URLs
    pub fn file_name(&self) -> String {
        if let Ok(parsed) = url::Url::parse(&self.url) {
            let last = parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty());
            if let Some(name) = last.or(parsed.host_str()) {
                return name.to_string();
            }
        }
        self.url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(&self.url)
            .to_string()
    }

    /// `file:line`
    pub fn label(&self) -> String {
        format!("{}:{}", self.file_name(), self.line)
    }

    /// `url:line:column`
    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.url, self.line, self.column)
    }
}
