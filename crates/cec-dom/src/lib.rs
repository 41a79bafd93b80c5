//! cec DOM - Document Object Model
//!
//! Arena-based DOM tree with shadow roots, plus the window-level
//! custom-event dispatch that capture and replay hook into.

mod document;
mod events;
mod interner;
mod node;
mod operations;
mod shadow;
mod target;
mod tree;
mod window;

pub use document::Document;
pub use events::{CustomEvent, DispatchInterceptor, EventListener};
pub use interner::{InternedString, StringInterner};
pub use node::{Attribute, ElementData, Node, NodeData, NodeType};
pub use operations::{DomError, DomResult};
pub use shadow::{ShadowRootData, ShadowRootMode};
pub use target::EventTarget;
pub use tree::DomTree;
pub use window::Window;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document)
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check whether this id refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    pub(crate) fn some(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}
