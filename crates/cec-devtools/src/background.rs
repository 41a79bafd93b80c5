//! Background
//!
//! Receives captured events from every tab, keeps the bounded backlog,
//! maintains per-tab badges and the toolbar icon, and broadcasts events to
//! connected panels.

use std::collections::BTreeMap;

use smol::channel::{self, Receiver, Sender};

use crate::badge::{BadgeState, IconSet};
use crate::buffer::EventBuffer;
use crate::messages::{Response, RuntimeMessage, TabEvent, TabInfo};
use crate::settings::Settings;

/// A runtime message with its sender and an optional reply slot
#[derive(Debug)]
pub struct Envelope {
    pub message: RuntimeMessage,
    pub sender: TabInfo,
    pub reply: Option<Sender<Response>>,
}

impl Envelope {
    /// Fire-and-forget message
    pub fn new(message: RuntimeMessage, sender: TabInfo) -> Self {
        Self {
            message,
            sender,
            reply: None,
        }
    }

    /// Message expecting a reply on the returned receiver
    pub fn request(message: RuntimeMessage, sender: TabInfo) -> (Self, Receiver<Response>) {
        let (tx, rx) = channel::bounded(1);
        let envelope = Self {
            message,
            sender,
            reply: Some(tx),
        };
        (envelope, rx)
    }
}

/// Background state
#[derive(Debug)]
pub struct Background {
    buffer: EventBuffer,
    capture_enabled: bool,
    badges: BTreeMap<u32, BadgeState>,
    icon: IconSet,
    panels: Vec<Sender<RuntimeMessage>>,
}

impl Background {
    pub fn new(settings: &Settings) -> Self {
        Self {
            buffer: EventBuffer::new(),
            capture_enabled: settings.capture_enabled,
            badges: BTreeMap::new(),
            icon: IconSet::new(settings.capture_enabled),
            panels: Vec::new(),
        }
    }

    /// Open a channel to a new panel
    pub fn connect_panel(&mut self) -> Receiver<RuntimeMessage> {
        let (tx, rx) = channel::unbounded();
        self.panels.push(tx);
        rx
    }

    pub fn buffer(&self) -> &EventBuffer {
        &self.buffer
    }

    pub fn is_capture_enabled(&self) -> bool {
        self.capture_enabled
    }

    /// Current badge of a tab
    pub fn badge(&self, tab_id: u32) -> Option<&BadgeState> {
        self.badges.get(&tab_id)
    }

    /// Current toolbar icon
    pub fn icon(&self) -> &IconSet {
        &self.icon
    }

    /// Handle one message; returns the reply for request messages
    pub fn handle(&mut self, message: RuntimeMessage, sender: &TabInfo) -> Option<Response> {
        match message {
            RuntimeMessage::TrackEvent { mut payload } => {
                payload.tab_id = sender.id;
                payload.tab_url = sender.url.clone();
                tracing::debug!(
                    event_type = %payload.event_type,
                    tab = ?sender.id,
                    "background received event"
                );

                let dropped = self.buffer.push(payload.clone());
                if dropped > 0 {
                    tracing::debug!(dropped, "event buffer full, dropped oldest");
                }
                if let Some(tab_id) = sender.id {
                    self.update_badge(tab_id);
                }
                self.broadcast(RuntimeMessage::ShowEvent { payload });
                None
            }
            RuntimeMessage::BacklogRequest => {
                let payload = self.buffer.snapshot();
                self.broadcast(RuntimeMessage::BacklogResponse { payload });
                None
            }
            RuntimeMessage::CountRequest => Some(Response::Count {
                count: self.buffer.len(),
            }),
            RuntimeMessage::CaptureToggle { enabled } => {
                self.set_capture_enabled(enabled != Some(false));
                None
            }
            RuntimeMessage::ClearCustomEvents { tab_id } => {
                match tab_id {
                    Some(tab_id) => self.buffer.clear_tab(tab_id),
                    None => self.buffer.clear(),
                }
                self.refresh_badges();
                None
            }
            other => {
                tracing::trace!(kind = other.kind(), "background ignores message");
                None
            }
        }
    }

    /// Switch capture on or off: new icon, recoloured badges
    pub fn set_capture_enabled(&mut self, enabled: bool) {
        self.capture_enabled = enabled;
        self.icon = IconSet::new(enabled);
        self.refresh_badges();
    }

    /// Recompute the badge of one tab
    pub fn update_badge(&mut self, tab_id: u32) {
        let badge = BadgeState::new(self.buffer.count_for_tab(tab_id), self.capture_enabled);
        self.badges.insert(tab_id, badge);
    }

    /// Keep badges in step with the browser's tabs.
    ///
    /// Switching to a tab or finishing a load redraws its badge; a closed
    /// tab loses its badge.
    pub fn on_tab_event(&mut self, event: TabEvent) {
        tracing::trace!(?event, "tab event");
        match event {
            TabEvent::Activated(tab_id) | TabEvent::NavigationComplete(tab_id) => {
                self.update_badge(tab_id)
            }
            TabEvent::Removed(tab_id) => self.forget_tab(tab_id),
        }
    }

    fn forget_tab(&mut self, tab_id: u32) {
        self.badges.remove(&tab_id);
    }

    fn refresh_badges(&mut self) {
        let tabs: Vec<u32> = self.badges.keys().copied().collect();
        for tab_id in tabs {
            self.update_badge(tab_id);
        }
    }

    /// Send to every panel, dropping panels that went away
    fn broadcast(&mut self, message: RuntimeMessage) {
        self.panels.retain(|panel| match panel.try_send(message.clone()) {
            Ok(()) => true,
            Err(err) => {
                if err.is_full() {
                    tracing::warn!(kind = message.kind(), "panel queue full, message dropped");
                }
                !err.is_closed()
            }
        });
    }

    /// Serve messages until every sender is gone, then hand back the state
    pub async fn run(mut self, inbox: Receiver<Envelope>) -> Self {
        while let Ok(envelope) = inbox.recv().await {
            let kind = envelope.message.kind();
            let response = self.handle(envelope.message, &envelope.sender);
            if let (Some(reply), Some(response)) = (envelope.reply, response) {
                if reply.send(response).await.is_err() {
                    tracing::debug!(kind, "requester gone before reply");
                }
            }
        }
        tracing::debug!("background inbox closed");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::{CAPTURING_COLOR, PAUSED_COLOR};
    use crate::payload::CustomEventPayload;
    use serde_json::json;

    fn track(background: &mut Background, tab: &TabInfo, event_type: &str) {
        let payload = CustomEventPayload::new(event_type, json!({}), 1);
        background.handle(RuntimeMessage::TrackEvent { payload }, tab);
    }

    #[test]
    fn test_events_tagged_with_tab() {
        let mut background = Background::new(&Settings::default());
        let panel = background.connect_panel();
        let tab = TabInfo::new(4, "https://shop.example/");
        track(&mut background, &tab, "cart:add");

        let Ok(RuntimeMessage::ShowEvent { payload }) = panel.try_recv() else {
            panic!("panel did not receive the event");
        };
        assert_eq!(payload.tab_id, Some(4));
        assert_eq!(payload.tab_url.as_deref(), Some("https://shop.example/"));
        assert_eq!(background.buffer().len(), 1);
    }

    #[test]
    fn test_badge_counts_per_tab() {
        let mut background = Background::new(&Settings::default());
        let a = TabInfo::new(1, "https://a.example/");
        let b = TabInfo::new(2, "https://b.example/");
        for _ in 0..3 {
            track(&mut background, &a, "x");
        }
        track(&mut background, &b, "y");

        assert_eq!(background.badge(1).unwrap().text, "3");
        assert_eq!(background.badge(2).unwrap().text, "1");
        assert_eq!(background.badge(1).unwrap().background, CAPTURING_COLOR);
    }

    #[test]
    fn test_toggle_recolours_badges_and_icon() {
        let mut background = Background::new(&Settings::default());
        let tab = TabInfo::new(1, "https://a.example/");
        track(&mut background, &tab, "x");

        background.handle(RuntimeMessage::CaptureToggle { enabled: Some(false) }, &TabInfo::default());
        assert_eq!(background.badge(1).unwrap().background, PAUSED_COLOR);
        assert_eq!(background.icon().path(16), Some("icons/icon-16-gray.png"));

        background.handle(RuntimeMessage::CaptureToggle { enabled: None }, &TabInfo::default());
        assert!(background.is_capture_enabled());
    }

    #[test]
    fn test_backlog_and_count() {
        let mut background = Background::new(&Settings::default());
        let tab = TabInfo::new(1, "https://a.example/");
        track(&mut background, &tab, "one");
        track(&mut background, &tab, "two");

        let panel = background.connect_panel();
        background.handle(RuntimeMessage::BacklogRequest, &TabInfo::default());
        let Ok(RuntimeMessage::BacklogResponse { payload }) = panel.try_recv() else {
            panic!("no backlog");
        };
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[1].event_type, "two");

        assert_eq!(
            background.handle(RuntimeMessage::CountRequest, &TabInfo::default()),
            Some(Response::Count { count: 2 })
        );
    }

    #[test]
    fn test_clear_resets_badge() {
        let mut background = Background::new(&Settings::default());
        let tab = TabInfo::new(1, "https://a.example/");
        track(&mut background, &tab, "x");

        background.handle(RuntimeMessage::ClearCustomEvents { tab_id: Some(1) }, &TabInfo::default());
        assert!(background.buffer().is_empty());
        assert!(!background.badge(1).unwrap().is_visible());
    }

    #[test]
    fn test_tab_events_drive_badges() {
        let mut background = Background::new(&Settings::default());
        let tab = TabInfo::new(5, "https://a.example/");
        track(&mut background, &tab, "x");
        track(&mut background, &tab, "y");

        background.on_tab_event(TabEvent::Activated(6));
        assert!(!background.badge(6).unwrap().is_visible());

        background.set_capture_enabled(false);
        background.on_tab_event(TabEvent::NavigationComplete(5));
        assert_eq!(background.badge(5).unwrap().text, "2");
        assert_eq!(background.badge(5).unwrap().background, PAUSED_COLOR);

        background.on_tab_event(TabEvent::Removed(5));
        assert_eq!(background.badge(5), None);
        assert_eq!(TabEvent::Removed(5).tab_id(), 5);

        // Closing a tab keeps its events in the backlog
        assert_eq!(background.buffer().len(), 2);
    }

    #[test]
    fn test_closed_panel_is_dropped() {
        let mut background = Background::new(&Settings::default());
        drop(background.connect_panel());
        track(&mut background, &TabInfo::new(1, "https://a.example/"), "x");
        assert!(background.panels.is_empty());
    }

    #[test]
    fn test_run_answers_requests() {
        let (inbox_tx, inbox_rx) = channel::unbounded();
        let tab = TabInfo::new(9, "https://a.example/");
        let payload = CustomEventPayload::new("x", json!(null), 1);
        inbox_tx
            .try_send(Envelope::new(RuntimeMessage::TrackEvent { payload }, tab))
            .unwrap();
        let (request, reply) = Envelope::request(RuntimeMessage::CountRequest, TabInfo::default());
        inbox_tx.try_send(request).unwrap();
        drop(inbox_tx);

        let background = smol::block_on(Background::new(&Settings::default()).run(inbox_rx));
        assert_eq!(reply.try_recv(), Ok(Response::Count { count: 1 }));
        assert_eq!(background.badge(9).unwrap().text, "1");
    }
}
