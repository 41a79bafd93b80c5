//! Scoped queries
//!
//! `querySelector`-style lookups rooted at a document or shadow root.

use cec_dom::{DomTree, NodeId};

use crate::{CssError, parse_selector_list};

/// First element under `scope`, in tree order, that matches `selector`
pub fn query_selector(
    tree: &DomTree,
    scope: NodeId,
    selector: &str,
) -> Result<Option<NodeId>, CssError> {
    let list = parse_selector_list(selector)?;
    Ok(tree.descendants(scope).find(|&el| list.matches(tree, el)))
}

/// First element under `scope` matching `selector` with its leftmost
/// compound on a child of `scope`, as `:scope > selector` would
pub fn query_selector_anchored(
    tree: &DomTree,
    scope: NodeId,
    selector: &str,
) -> Result<Option<NodeId>, CssError> {
    let list = parse_selector_list(selector)?;
    Ok(tree
        .descendants(scope)
        .find(|&el| list.matches_anchored(tree, el, scope)))
}

/// All elements under `scope`, in tree order, that match `selector`
pub fn query_selector_all(
    tree: &DomTree,
    scope: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>, CssError> {
    let list = parse_selector_list(selector)?;
    Ok(tree
        .descendants(scope)
        .filter(|&el| list.matches(tree, el))
        .collect())
}

/// Whether `element` matches `selector`
pub fn matches(tree: &DomTree, element: NodeId, selector: &str) -> Result<bool, CssError> {
    Ok(parse_selector_list(selector)?.matches(tree, element))
}
