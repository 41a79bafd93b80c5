//! Messages
//!
//! Runtime messages exchanged between the content relay, the background
//! and panels, tagged by `type` on the wire. Page messages stay inside one
//! tab: captured payloads going out, replay requests coming in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::CustomEventPayload;

/// Extension runtime message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuntimeMessage {
    /// Content relay → background: a captured event
    #[serde(rename = "cec_custom_event")]
    TrackEvent { payload: CustomEventPayload },

    /// Background → panels: an event tagged with its tab
    #[serde(rename = "custom-event")]
    ShowEvent { payload: CustomEventPayload },

    /// Panel → background: send me everything buffered so far
    #[serde(rename = "panel_ready")]
    BacklogRequest,

    /// Background → panels: the whole buffer
    #[serde(rename = "backlog")]
    BacklogResponse { payload: Vec<CustomEventPayload> },

    /// Popup → background: `{count}` reply
    #[serde(rename = "get_event_count")]
    CountRequest,

    /// Popup or panel → everyone: capture switched on or off.
    /// A missing `enabled` means on.
    #[serde(rename = "capture_toggle")]
    CaptureToggle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enabled: Option<bool>,
    },

    /// Panel → content relay: dispatch an event again in the page
    #[serde(rename = "replay_custom_event")]
    ReplayCustomEvent { payload: ReplayRequest },

    /// Panel → content relay: put text on the clipboard
    #[serde(rename = "copy_to_clipboard")]
    CopyToClipboard { payload: String },

    /// Panel → background: drop buffered events, for one tab if given
    #[serde(rename = "clear_custom_events")]
    ClearCustomEvents {
        #[serde(default, rename = "tabId", skip_serializing_if = "Option::is_none")]
        tab_id: Option<u32>,
    },
}

impl RuntimeMessage {
    /// Wire name of this message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TrackEvent { .. } => "cec_custom_event",
            Self::ShowEvent { .. } => "custom-event",
            Self::BacklogRequest => "panel_ready",
            Self::BacklogResponse { .. } => "backlog",
            Self::CountRequest => "get_event_count",
            Self::CaptureToggle { .. } => "capture_toggle",
            Self::ReplayCustomEvent { .. } => "replay_custom_event",
            Self::CopyToClipboard { .. } => "copy_to_clipboard",
            Self::ClearCustomEvents { .. } => "clear_custom_events",
        }
    }
}

/// What to dispatch again, and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRequest {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub detail: Value,
    #[serde(default)]
    pub target_selector: Option<String>,
}

impl From<&CustomEventPayload> for ReplayRequest {
    fn from(payload: &CustomEventPayload) -> Self {
        Self {
            event_type: payload.event_type.clone(),
            detail: payload.detail.clone(),
            target_selector: payload.target_selector.clone(),
        }
    }
}

/// Reply to a request message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Count {
        count: usize,
    },
    Outcome {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Response {
    pub fn ok() -> Self {
        Self::Outcome {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self::Outcome {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Tab a message came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabInfo {
    pub id: Option<u32>,
    pub url: Option<String>,
}

impl TabInfo {
    pub fn new(id: u32, url: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            url: Some(url.into()),
        }
    }
}

/// Browser notification about a tab's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    /// The tab became the active one in its window
    Activated(u32),
    /// The tab finished loading a page
    NavigationComplete(u32),
    /// The tab was closed
    Removed(u32),
}

impl TabEvent {
    pub fn tab_id(&self) -> u32 {
        match *self {
            Self::Activated(id) | Self::NavigationComplete(id) | Self::Removed(id) => id,
        }
    }
}

/// Message inside one tab, between the page and its content relay
#[derive(Debug, Clone, PartialEq)]
pub enum PageMessage {
    /// Page → content: a captured event
    CustomEvent(CustomEventPayload),
    /// Content → page: dispatch this again
    Replay(ReplayRequest),
}
