//! DOM Events
//!
//! Custom events, listeners, and the dispatch interceptor hook.

use crate::{Document, EventTarget};
use serde_json::Value;

/// A custom event carrying arbitrary JSON detail
#[derive(Debug, Clone)]
pub struct CustomEvent {
    pub event_type: String,
    pub detail: Value,
    pub bubbles: bool,
    pub composed: bool,
    pub cancelable: bool,
    /// Call-site stack text recorded by the script engine, if any
    pub stack: Option<String>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl CustomEvent {
    /// Create a non-bubbling custom event
    pub fn new(event_type: impl Into<String>, detail: Value) -> Self {
        Self {
            event_type: event_type.into(),
            detail,
            bubbles: false,
            composed: false,
            cancelable: false,
            stack: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Let the event bubble to ancestors
    pub fn bubbling(mut self) -> Self {
        self.bubbles = true;
        self
    }

    /// Let the event cross shadow boundaries while bubbling
    pub fn composed(mut self) -> Self {
        self.composed = true;
        self
    }

    /// Allow `prevent_default`
    pub fn cancelable(mut self) -> Self {
        self.cancelable = true;
        self
    }

    /// Attach the call-site stack text
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Listener callback; receives the event and the current target
pub type EventListener = Box<dyn FnMut(&mut CustomEvent, EventTarget)>;

/// Observes every custom event dispatched through a window before any
/// listener runs. Observers get read-only access to the document.
pub trait DispatchInterceptor {
    fn observe(&mut self, document: &Document, target: EventTarget, event: &CustomEvent);
}
