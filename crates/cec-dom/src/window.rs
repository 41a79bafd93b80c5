//! Window - the global scope of one page
//!
//! Owns the document, listener registrations and dispatch interceptors.

use crate::{CustomEvent, DispatchInterceptor, Document, DomTree, EventListener, EventTarget, NodeId};

struct Registration {
    target: EventTarget,
    event_type: String,
    callback: EventListener,
}

/// Global scope of a page
pub struct Window {
    document: Document,
    listeners: Vec<Registration>,
    interceptors: Vec<(String, Box<dyn DispatchInterceptor>)>,
}

impl Window {
    /// Wrap a document in a fresh global scope
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: Vec::new(),
            interceptors: Vec::new(),
        }
    }

    /// The page document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The page document, mutably
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Shortcut to the document tree
    pub fn tree(&self) -> &DomTree {
        self.document.tree()
    }

    /// Install a dispatch interceptor once per `key`.
    /// Returns `false` (and drops `interceptor`) if the key is taken.
    pub fn install_interceptor(
        &mut self,
        key: &str,
        interceptor: Box<dyn DispatchInterceptor>,
    ) -> bool {
        if self.has_interceptor(key) {
            tracing::debug!(key, "interceptor already installed");
            return false;
        }
        self.interceptors.push((key.to_string(), interceptor));
        true
    }

    /// Whether an interceptor is installed under `key`
    pub fn has_interceptor(&self, key: &str) -> bool {
        self.interceptors.iter().any(|(k, _)| k == key)
    }

    /// Register a listener for `event_type` on `target`
    pub fn add_event_listener(
        &mut self,
        target: EventTarget,
        event_type: &str,
        callback: EventListener,
    ) {
        self.listeners.push(Registration {
            target,
            event_type: event_type.to_string(),
            callback,
        });
    }

    /// Dispatch `event` to `target`. Interceptors observe it first, then
    /// listeners run along the propagation path.
    /// Returns `false` if a listener prevented the default action.
    pub fn dispatch_event(&mut self, target: EventTarget, mut event: CustomEvent) -> bool {
        for (_, interceptor) in self.interceptors.iter_mut() {
            interceptor.observe(&self.document, target, &event);
        }

        for current in self.propagation_path(target, &event) {
            for reg in self.listeners.iter_mut() {
                if reg.target == current && reg.event_type == event.event_type {
                    (reg.callback)(&mut event, current);
                }
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        !event.is_default_prevented()
    }

    fn propagation_path(&self, target: EventTarget, event: &CustomEvent) -> Vec<EventTarget> {
        let mut path = vec![target];
        let EventTarget::Node(start) = target else {
            return path;
        };
        if !event.bubbles {
            return path;
        }

        let tree = self.document.tree();
        let mut current = start;
        loop {
            let next = match tree.parent(current) {
                Some(parent) => parent,
                None => match tree.host(current) {
                    Some(host) if event.composed => host,
                    _ => break,
                },
            };
            path.push(EventTarget::Node(next));
            current = next;
        }
        if current == NodeId::ROOT {
            path.push(EventTarget::Window);
        }
        path
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("url", &self.document.url())
            .field("listeners", &self.listeners.len())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}
