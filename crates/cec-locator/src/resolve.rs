//! Locator resolution
//!
//! Each scope is queried in turn, starting at the document and entering
//! the open shadow root of every matched host.

use cec_css::parse_selector_list;
use cec_dom::{DomTree, EventTarget, NodeId};

use crate::grammar::Locator;
use crate::ResolveError;

/// Resolve `locator`, falling back to the window on any failure.
///
/// `None` means the capture side had no target and resolves to the window
/// without a warning.
pub fn resolve(tree: &DomTree, locator: Option<&str>) -> EventTarget {
    match try_resolve(tree, locator) {
        Ok(target) => target,
        Err(err) => {
            tracing::warn!(
                locator = locator.unwrap_or_default(),
                error = %err,
                "Could not resolve locator, falling back to window"
            );
            EventTarget::Window
        }
    }
}

/// Resolve `locator`, reporting why it failed
pub fn try_resolve(tree: &DomTree, locator: Option<&str>) -> Result<EventTarget, ResolveError> {
    let Some(text) = locator else {
        return Ok(EventTarget::Window);
    };
    let locator: Locator = text.parse()?;
    resolve_locator(tree, &locator)
}

/// Resolve an already parsed locator
pub fn resolve_locator(tree: &DomTree, locator: &Locator) -> Result<EventTarget, ResolveError> {
    let path = match locator {
        Locator::Window => return Ok(EventTarget::Window),
        Locator::Document => return Ok(EventTarget::DOCUMENT),
        Locator::Element(path) => path,
    };

    let Some((target, hosts)) = path.scopes().split_last() else {
        return Ok(EventTarget::Window);
    };

    let mut root = tree.root();
    for (index, selector) in hosts.iter().enumerate() {
        let host = find(tree, root, index, selector)?;
        root = tree
            .shadow_root(host)
            .ok_or_else(|| ResolveError::MissingShadowRoot {
                selector: selector.clone(),
            })?;
        tracing::trace!(scope = index, ?root, "entered shadow root");
    }

    let element = find(tree, root, hosts.len(), target)?;
    Ok(EventTarget::Node(element))
}

/// First match of `selector` in the tree under `root`.
///
/// A chain starting at a child of `root` wins over matches that start deeper,
/// so a generated chain finds only its own element. Other selectors fall back
/// to the first match anywhere in the scope.
fn find(tree: &DomTree, root: NodeId, scope: usize, selector: &str) -> Result<NodeId, ResolveError> {
    let list = parse_selector_list(selector)?;
    tree.descendants(root)
        .find(|&el| list.matches_anchored(tree, el, root))
        .or_else(|| tree.descendants(root).find(|&el| list.matches(tree, el)))
        .ok_or_else(|| ResolveError::NoMatch {
            scope,
            selector: selector.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocatorError;
    use cec_dom::{Document, ShadowRootMode};

    #[test]
    fn test_special_targets() {
        let doc = Document::default();
        let tree = doc.tree();
        assert_eq!(resolve(tree, None), EventTarget::Window);
        assert_eq!(resolve(tree, Some("window")), EventTarget::Window);
        assert_eq!(resolve(tree, Some("document")), EventTarget::DOCUMENT);
    }

    #[test]
    fn test_hand_written_selector() {
        let mut doc = Document::default();
        let body = doc.body();
        let tree = doc.tree_mut();
        let button = tree.create_element("button").unwrap();
        tree.set_attribute(button, "class", "buy").unwrap();
        tree.append_child(body, button).unwrap();

        assert_eq!(resolve(tree, Some("button.buy")), EventTarget::Node(button));
    }

    #[test]
    fn test_error_kinds() {
        let mut doc = Document::default();
        let body = doc.body();
        let tree = doc.tree_mut();
        let host = tree.create_element("x-plain").unwrap();
        tree.append_child(body, host).unwrap();

        assert_eq!(
            try_resolve(tree, Some("")),
            Err(ResolveError::Malformed(LocatorError::Empty))
        );
        assert!(matches!(
            try_resolve(tree, Some("p[")),
            Err(ResolveError::Malformed(LocatorError::Unclosed { delimiter: '[' }))
        ));
        assert!(matches!(
            try_resolve(tree, Some("p >")),
            Err(ResolveError::InvalidSelector(_))
        ));
        assert_eq!(
            try_resolve(tree, Some("section")),
            Err(ResolveError::NoMatch {
                scope: 0,
                selector: "section".into()
            })
        );
        assert_eq!(
            try_resolve(tree, Some("x-plain:shadow-root span")),
            Err(ResolveError::MissingShadowRoot {
                selector: "x-plain".into()
            })
        );
    }

    #[test]
    fn test_extreme_nth_child_falls_back() {
        let doc = Document::default();
        let body = doc.body();
        let tree = doc.tree();
        assert_eq!(
            resolve(tree, Some("body:nth-child(2n-2147483648)")),
            EventTarget::Window
        );
        assert_eq!(
            resolve(tree, Some("html > body:nth-child(2n-2147483648)")),
            EventTarget::Window
        );
        assert_eq!(
            resolve(tree, Some("body:nth-child(-n+2147483647)")),
            EventTarget::Node(body)
        );
    }

    #[test]
    fn test_closed_shadow_root_is_not_entered() {
        let mut doc = Document::default();
        let body = doc.body();
        let tree = doc.tree_mut();
        let host = tree.create_element("x-vault").unwrap();
        tree.append_child(body, host).unwrap();
        let shadow = tree.attach_shadow(host, ShadowRootMode::Closed).unwrap();
        let inner = tree.create_element("b").unwrap();
        tree.append_child(shadow, inner).unwrap();

        assert!(matches!(
            try_resolve(tree, Some("x-vault:shadow-root b")),
            Err(ResolveError::MissingShadowRoot { .. })
        ));
        assert_eq!(resolve(tree, Some("x-vault:shadow-root b")), EventTarget::Window);
    }
}
