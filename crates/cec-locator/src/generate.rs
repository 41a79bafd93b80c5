//! Locator generation
//!
//! Walks from an element up to the document, one segment per element,
//! starting a new scope each time the walk leaves a shadow tree through
//! its host.

use cec_dom::{DomTree, EventTarget, NodeId};

use crate::grammar::{Locator, ShadowPath, escape_attribute_value};

/// Locator string for `target`, or `None` when the target is neither the
/// window, the document, nor an element
pub fn generate(tree: &DomTree, target: EventTarget) -> Option<String> {
    generate_locator(tree, target).map(|locator| locator.to_string())
}

/// Structured form of [`generate`]
pub fn generate_locator(tree: &DomTree, target: EventTarget) -> Option<Locator> {
    let element = match target {
        EventTarget::Window => return Some(Locator::Window),
        EventTarget::Node(NodeId::ROOT) => return Some(Locator::Document),
        EventTarget::Node(id) if tree.is_element(id) => id,
        EventTarget::Node(_) => return None,
    };

    // Innermost scope first, each scope's segments target first
    let mut scopes: Vec<Vec<String>> = vec![Vec::new()];
    let mut current = element;
    loop {
        if let Some(scope) = scopes.last_mut() {
            scope.push(element_segment(tree, current));
        }

        let Some(parent) = tree.parent(current) else {
            break;
        };
        if tree.is_element(parent) {
            current = parent;
        } else if let Some(host) = tree.host(parent) {
            scopes.push(Vec::new());
            current = host;
        } else {
            break;
        }
    }

    let scopes = scopes.into_iter().rev().map(|mut segments| {
        segments.reverse();
        segments.join(" > ")
    });
    ShadowPath::new(scopes).ok().map(Locator::Element)
}

/// Selector for one element inside its own tree scope.
///
/// An id that is unique in the scope gives `[id="..."]`; anything else is
/// `tag:nth-child(k)` with `k` counted over the parent's element children.
pub fn element_segment(tree: &DomTree, element: NodeId) -> String {
    if let Some(id) = tree.get_attribute(element, "id") {
        if !id.is_empty() && is_unique_id(tree, element, id) {
            return format!(r#"[id="{}"]"#, escape_attribute_value(id));
        }
    }

    let tag = tree.tag_name(element).unwrap_or("*");
    match tree.element_index(element) {
        Some(index) => format!("{tag}:nth-child({index})"),
        None => tag.to_string(),
    }
}

fn is_unique_id(tree: &DomTree, element: NodeId, id: &str) -> bool {
    let scope = tree.root_node(element);
    !tree
        .descendants(scope)
        .any(|other| other != element && tree.get_attribute(other, "id") == Some(id))
}
