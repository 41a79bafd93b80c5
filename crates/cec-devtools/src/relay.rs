//! Content relay
//!
//! One per tab. Forwards captured events from the page to the background
//! while capture is on, and carries panel requests (replay, clipboard)
//! back into the page.

use smol::channel::{Receiver, Sender, TrySendError};

use crate::DevToolsError;
use crate::background::Envelope;
use crate::messages::{PageMessage, Response, RuntimeMessage, TabInfo};
use crate::payload::CustomEventPayload;
use crate::settings::Settings;

/// Somewhere to put copied text
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), DevToolsError>;
}

/// Clipboard kept in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last text written
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), DevToolsError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Relay between one page and the background
pub struct ContentRelay<C: Clipboard = MemoryClipboard> {
    tab: TabInfo,
    capture_enabled: bool,
    to_background: Sender<Envelope>,
    to_page: Sender<PageMessage>,
    clipboard: C,
}

impl<C: Clipboard> ContentRelay<C> {
    pub fn new(
        tab: TabInfo,
        settings: &Settings,
        to_background: Sender<Envelope>,
        to_page: Sender<PageMessage>,
        clipboard: C,
    ) -> Self {
        Self {
            tab,
            capture_enabled: settings.capture_enabled,
            to_background,
            to_page,
            clipboard,
        }
    }

    pub fn tab(&self) -> &TabInfo {
        &self.tab
    }

    pub fn is_capture_enabled(&self) -> bool {
        self.capture_enabled
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Forward one captured event.
    /// Returns `false` when capture is off and the event was discarded.
    pub fn forward(&self, payload: CustomEventPayload) -> Result<bool, DevToolsError> {
        if !self.capture_enabled {
            tracing::trace!(event_type = %payload.event_type, "capture off, event discarded");
            return Ok(false);
        }
        let envelope = Envelope::new(RuntimeMessage::TrackEvent { payload }, self.tab.clone());
        match self.to_background.try_send(envelope) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("background queue full, event dropped");
                Ok(false)
            }
            Err(TrySendError::Closed(_)) => Err(DevToolsError::ChannelClosed("background")),
        }
    }

    fn on_page_message(&self, message: PageMessage) -> Result<bool, DevToolsError> {
        match message {
            PageMessage::CustomEvent(payload) => self.forward(payload),
            PageMessage::Replay(_) => {
                tracing::debug!("replay request from the page ignored");
                Ok(false)
            }
        }
    }

    /// Forward everything the page has posted so far.
    /// Returns the number of events sent to the background.
    pub fn relay_pending(&self, from_page: &Receiver<PageMessage>) -> Result<usize, DevToolsError> {
        let mut forwarded = 0;
        while let Ok(message) = from_page.try_recv() {
            if self.on_page_message(message)? {
                forwarded += 1;
            }
        }
        Ok(forwarded)
    }

    /// Forward page messages until the page goes away
    pub async fn relay_page(&self, from_page: Receiver<PageMessage>) -> Result<usize, DevToolsError> {
        let mut forwarded = 0;
        while let Ok(message) = from_page.recv().await {
            if self.on_page_message(message)? {
                forwarded += 1;
            }
        }
        tracing::debug!(tab = ?self.tab.id, forwarded, "page closed");
        Ok(forwarded)
    }

    /// Handle a runtime message addressed to this tab
    pub fn handle_message(&mut self, message: RuntimeMessage) -> Option<Response> {
        match message {
            RuntimeMessage::CaptureToggle { enabled } => {
                self.capture_enabled = enabled != Some(false);
                tracing::debug!(enabled = self.capture_enabled, "capture toggled");
                None
            }
            RuntimeMessage::ReplayCustomEvent { payload } => {
                match self.to_page.try_send(PageMessage::Replay(payload)) {
                    Ok(()) => Some(Response::ok()),
                    Err(err) => {
                        tracing::warn!(%err, "replay not delivered");
                        Some(Response::failed(err))
                    }
                }
            }
            RuntimeMessage::CopyToClipboard { payload } => match self.clipboard.write_text(&payload) {
                Ok(()) => Some(Response::ok()),
                Err(err) => {
                    tracing::warn!(%err, "clipboard write failed");
                    Some(Response::failed(err))
                }
            },
            other => {
                tracing::trace!(kind = other.kind(), "content relay ignores message");
                None
            }
        }
    }
}
