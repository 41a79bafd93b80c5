//! Capture hook
//!
//! Runs in the page. Observes every custom event the page dispatches,
//! records where it was aimed and who sent it, and posts the payload to the
//! content relay. Also performs replays the relay sends back.

use cec_dom::{CustomEvent, DispatchInterceptor, Document, DomTree, EventTarget, Window};
use smol::channel::Sender;

use crate::current_time_ms;
use crate::messages::{PageMessage, ReplayRequest};
use crate::payload::{CustomEventPayload, Initiator};

/// Window flag marking the hook as installed
pub const INJECTED_KEY: &str = "__cec_injected";

/// Dispatch interceptor posting captured events to the content relay
pub struct CaptureHook {
    to_content: Sender<PageMessage>,
}

impl CaptureHook {
    pub fn new(to_content: Sender<PageMessage>) -> Self {
        Self { to_content }
    }
}

impl DispatchInterceptor for CaptureHook {
    fn observe(&mut self, document: &Document, target: EventTarget, event: &CustomEvent) {
        let payload = build_payload(document.tree(), target, event, current_time_ms());

        match &payload.initiator {
            Some(initiator) => tracing::info!(
                event_type = %payload.event_type,
                detail = %payload.detail,
                target = payload.target_tag.as_deref().unwrap_or("window"),
                initiator = %initiator.location(),
                "Custom Event"
            ),
            None => tracing::info!(
                event_type = %payload.event_type,
                detail = %payload.detail,
                target = payload.target_tag.as_deref().unwrap_or("window"),
                "Custom Event"
            ),
        }

        // The page's own dispatch goes ahead whatever happens here
        if let Err(err) = self.to_content.try_send(PageMessage::CustomEvent(payload)) {
            if err.is_full() {
                tracing::warn!(
                    capacity = ?self.to_content.capacity(),
                    "content relay queue full, dropping captured event"
                );
            } else {
                tracing::debug!(%err, "content relay not listening");
            }
        }
    }
}

/// Describe one dispatch as a payload
pub fn build_payload(
    tree: &DomTree,
    target: EventTarget,
    event: &CustomEvent,
    time: u64,
) -> CustomEventPayload {
    let mut payload = CustomEventPayload::new(event.event_type.clone(), event.detail.clone(), time);
    payload.target_selector = cec_locator::generate(tree, target);
    payload.target_tag = target
        .node()
        .and_then(|node| tree.tag_name(node))
        .map(str::to_ascii_uppercase);
    payload.initiator = event.stack.as_deref().and_then(Initiator::from_stack);
    payload
}

/// Install the capture hook on `window` once.
/// Returns `false` if it was already there.
pub fn install(window: &mut Window, to_content: Sender<PageMessage>) -> bool {
    let installed = window.install_interceptor(INJECTED_KEY, Box::new(CaptureHook::new(to_content)));
    if installed {
        tracing::debug!(url = window.document().url(), "capture hook installed");
    }
    installed
}

/// Dispatch a replayed event at the target its locator resolves to.
/// Returns the target used.
pub fn replay(window: &mut Window, request: &ReplayRequest) -> EventTarget {
    let target = cec_locator::resolve(window.tree(), request.target_selector.as_deref());
    tracing::debug!(event_type = %request.event_type, ?target, "replaying event");
    window.dispatch_event(
        target,
        CustomEvent::new(request.event_type.clone(), request.detail.clone()),
    );
    target
}

/// Perform every replay the content relay has queued for this page
pub fn drain_replays(window: &mut Window, from_content: &smol::channel::Receiver<PageMessage>) -> usize {
    let mut replayed = 0;
    while let Ok(message) = from_content.try_recv() {
        match message {
            PageMessage::Replay(request) => {
                replay(window, &request);
                replayed += 1;
            }
            PageMessage::CustomEvent(_) => {
                tracing::debug!("ignoring captured event on the page side");
            }
        }
    }
    replayed
}
