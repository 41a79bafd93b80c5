//! Event targets
//!
//! The global scope is not a node, so targets are either the window or a
//! node of the window's document (the document itself included).

use crate::NodeId;

/// Something an event can be dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The global scope object
    Window,
    /// A node; `NodeId::ROOT` is the document
    Node(NodeId),
}

impl EventTarget {
    /// The document root as a target
    pub const DOCUMENT: EventTarget = EventTarget::Node(NodeId::ROOT);

    /// Is this the global scope?
    pub fn is_window(self) -> bool {
        matches!(self, Self::Window)
    }

    /// Is this the document root?
    pub fn is_document(self) -> bool {
        self == Self::DOCUMENT
    }

    /// Node id, if the target is a node
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Window => None,
        }
    }
}

impl From<NodeId> for EventTarget {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}
