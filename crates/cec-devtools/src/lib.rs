//! cec DevTools
//!
//! The plumbing around locators: a capture hook in the page, a content
//! relay per tab, a background that buffers events and drives the badge,
//! and the panel model that filters, exports and replays them.
//!
//! Contexts talk over `smol` channels and never share memory; only
//! serialized payloads and locator strings cross between them.

pub mod background;
pub mod badge;
pub mod buffer;
pub mod capture;
pub mod messages;
pub mod panel;
pub mod payload;
pub mod relay;
pub mod settings;

pub use background::{Background, Envelope};
pub use badge::{BadgeState, IconSet};
pub use buffer::{EventBuffer, MAX_BUFFER};
pub use capture::{CaptureHook, INJECTED_KEY, build_payload, drain_replays, install, replay};
pub use messages::{PageMessage, ReplayRequest, Response, RuntimeMessage, TabEvent, TabInfo};
pub use panel::{EventRow, Panel};
pub use payload::{CustomEventPayload, Initiator};
pub use relay::{Clipboard, ContentRelay, MemoryClipboard};
pub use settings::{Settings, SettingsStore, TabFilters};

use std::path::PathBuf;

/// DevTools error
#[derive(Debug, thiserror::Error)]
pub enum DevToolsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Channel to {0} closed")]
    ChannelClosed(&'static str),

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),
}

/// Milliseconds since the Unix epoch
pub(crate) fn current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
