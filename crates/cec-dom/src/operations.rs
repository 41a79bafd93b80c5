//! DOM Node Operations
//!
//! Errors raised by tree mutation.

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NotFound(NodeId),
    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("Hierarchy request error")]
    HierarchyRequest,
    /// Invalid node type for this operation
    #[error("Invalid node type")]
    InvalidNodeType,
    /// Node is not a child of the given parent
    #[error("Node is not a child")]
    NotAChild,
    /// Element already hosts a shadow root
    #[error("Element already hosts a shadow root")]
    ShadowRootExists,
    /// Every name id is taken
    #[error("String interner is full")]
    InternerFull,
}
