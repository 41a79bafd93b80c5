//! Panel model
//!
//! State behind the devtools panel of one inspected tab: the event list,
//! type and detail filters, preserve-log, export and the copy/replay
//! actions. Rendering is left to the caller; rows carry display strings.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use smol::channel::Receiver;

use crate::DevToolsError;
use crate::messages::{ReplayRequest, RuntimeMessage};
use crate::payload::CustomEventPayload;
use crate::settings::{Settings, TabFilters};

/// Placeholder for missing cells
const MISSING: &str = "—";

/// Panel state for one inspected tab
#[derive(Debug, Clone, Default)]
pub struct Panel {
    inspected_tab: Option<u32>,
    events: Vec<CustomEventPayload>,
    filters: TabFilters,
    preserve_log: bool,
    event_types: BTreeSet<String>,
}

impl Panel {
    /// Panel for `inspected_tab`, restoring its saved filters and preserve-log
    pub fn new(inspected_tab: Option<u32>, settings: &Settings) -> Self {
        let (filters, preserve_log) = match inspected_tab {
            Some(tab_id) => (settings.filters(tab_id), settings.preserve_log(tab_id)),
            None => (TabFilters::default(), false),
        };
        Self {
            inspected_tab,
            events: Vec::new(),
            filters,
            preserve_log,
            event_types: BTreeSet::new(),
        }
    }

    pub fn inspected_tab(&self) -> Option<u32> {
        self.inspected_tab
    }

    /// Message announcing the panel to the background
    pub fn ready_message() -> RuntimeMessage {
        RuntimeMessage::BacklogRequest
    }

    /// Apply a message from the background.
    /// Returns whether the event list changed.
    pub fn handle_message(&mut self, message: RuntimeMessage) -> bool {
        match message {
            RuntimeMessage::ShowEvent { payload } => {
                if !self.accepts(&payload) {
                    return false;
                }
                self.add_event(payload);
                true
            }
            RuntimeMessage::BacklogResponse { payload } => {
                self.clear_local();
                for event in payload {
                    if self.accepts(&event) {
                        self.add_event(event);
                    }
                }
                tracing::debug!(events = self.events.len(), "panel backlog loaded");
                true
            }
            other => {
                tracing::trace!(kind = other.kind(), "panel ignores message");
                false
            }
        }
    }

    /// Apply every message queued for the panel
    pub fn pump(&mut self, inbox: &Receiver<RuntimeMessage>) -> usize {
        let mut changed = 0;
        while let Ok(message) = inbox.try_recv() {
            if self.handle_message(message) {
                changed += 1;
            }
        }
        changed
    }

    fn accepts(&self, payload: &CustomEventPayload) -> bool {
        match self.inspected_tab {
            Some(tab_id) => payload.tab_id == Some(tab_id),
            None => true,
        }
    }

    pub fn add_event(&mut self, payload: CustomEventPayload) {
        self.event_types.insert(payload.event_type.clone());
        self.events.push(payload);
    }

    /// All events, oldest first
    pub fn events(&self) -> &[CustomEventPayload] {
        &self.events
    }

    pub fn filters(&self) -> &TabFilters {
        &self.filters
    }

    pub fn set_type_filter(&mut self, filter: impl Into<String>) {
        self.filters.event_type = filter.into();
    }

    pub fn set_detail_filter(&mut self, filter: impl Into<String>) {
        self.filters.detail = filter.into();
    }

    /// Both filters as case-insensitive substrings; detail matches its compact JSON
    pub fn matches_filter(&self, payload: &CustomEventPayload) -> bool {
        contains_ignore_case(&payload.event_type, &self.filters.event_type)
            && contains_ignore_case(&payload.detail_json(), &self.filters.detail)
    }

    /// Events passing the filters
    pub fn visible_events(&self) -> Vec<&CustomEventPayload> {
        self.events.iter().filter(|e| self.matches_filter(e)).collect()
    }

    /// Distinct event types seen, sorted
    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.event_types.iter().map(String::as_str)
    }

    /// "Export filtered" only makes sense with a filter set
    pub fn can_export_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn preserve_log(&self) -> bool {
        self.preserve_log
    }

    pub fn set_preserve_log(&mut self, preserve: bool) {
        self.preserve_log = preserve;
    }

    /// The inspected page navigated.
    /// Returns whether the events were cleared.
    pub fn on_navigated(&mut self) -> bool {
        if self.preserve_log {
            return false;
        }
        self.clear_local();
        true
    }

    /// Clear the list; the returned message clears the background too
    pub fn clear(&mut self) -> RuntimeMessage {
        self.clear_local();
        RuntimeMessage::ClearCustomEvents {
            tab_id: self.inspected_tab,
        }
    }

    fn clear_local(&mut self) {
        self.events.clear();
        self.event_types.clear();
    }

    /// Events as a pretty JSON array, all or only the visible ones
    pub fn export_json(&self, filtered: bool) -> Result<String, DevToolsError> {
        let events: Vec<&CustomEventPayload> = if filtered {
            self.visible_events()
        } else {
            self.events.iter().collect()
        };
        Ok(serde_json::to_string_pretty(&events)?)
    }

    /// `custom-events[-filtered]-<ISO time>.json`
    pub fn export_file_name(filtered: bool, at: DateTime<Utc>) -> String {
        let stamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        if filtered {
            format!("custom-events-filtered-{stamp}.json")
        } else {
            format!("custom-events-{stamp}.json")
        }
    }

    /// Snippet that dispatches the event again from a console
    pub fn copy_command(payload: &CustomEventPayload) -> String {
        let event_type = serde_json::Value::String(payload.event_type.clone());
        format!(
            "window.dispatchEvent(new CustomEvent({event_type}, {{\n  detail: {}\n}}));",
            payload.detail_pretty()
        )
    }

    /// Message putting the copy command on the clipboard
    pub fn copy_message(payload: &CustomEventPayload) -> RuntimeMessage {
        RuntimeMessage::CopyToClipboard {
            payload: Self::copy_command(payload),
        }
    }

    /// Message asking the page to dispatch `payload` again
    pub fn replay_message(payload: &CustomEventPayload) -> RuntimeMessage {
        RuntimeMessage::ReplayCustomEvent {
            payload: ReplayRequest::from(payload),
        }
    }

    /// Remember this tab's filters and preserve-log
    pub fn save_to(&self, settings: &mut Settings) {
        let Some(tab_id) = self.inspected_tab else {
            return;
        };
        settings.preserve_log_by_tab.insert(tab_id, self.preserve_log);
        settings.filters_by_tab.insert(tab_id, self.filters.clone());
    }

    /// Display rows of the visible events, in local time
    pub fn rows(&self) -> Vec<EventRow> {
        self.visible_events()
            .into_iter()
            .map(EventRow::from_payload)
            .collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// One table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    /// `HH:MM:SS`
    pub time: String,
    pub event_type: String,
    /// Compact JSON
    pub detail: String,
    /// Locator, or a dash
    pub target: String,
    /// Whether the target is an element that can be revealed
    pub inspectable: bool,
    /// `file:line`, or a dash
    pub initiator: String,
    /// Full `url:line:column` for tooltips
    pub initiator_title: Option<String>,
}

impl EventRow {
    pub fn from_payload(payload: &CustomEventPayload) -> Self {
        Self::in_zone(payload, &Local)
    }

    /// Row with the time shown in `zone`
    pub fn in_zone<Tz>(payload: &CustomEventPayload, zone: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let time = i64::try_from(payload.time)
            .ok()
            .and_then(|ms| zone.timestamp_millis_opt(ms).single())
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        let inspectable = payload
            .target_selector
            .as_deref()
            .is_some_and(|selector| selector != cec_locator::WINDOW && selector != cec_locator::DOCUMENT);

        Self {
            time,
            event_type: payload.event_type.clone(),
            detail: payload.detail_json(),
            target: payload
                .target_selector
                .clone()
                .unwrap_or_else(|| MISSING.to_string()),
            inspectable,
            initiator: payload
                .initiator
                .as_ref()
                .map(|i| i.label())
                .unwrap_or_else(|| MISSING.to_string()),
            initiator_title: payload.initiator.as_ref().map(|i| i.location()),
        }
    }
}
