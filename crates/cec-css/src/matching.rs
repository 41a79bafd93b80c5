//! Selector Matching
//!
//! Right-to-left matching against a `DomTree`. Combinators only follow
//! element parents and element siblings, so a match never leaves the tree
//! scope (document or shadow root) the element lives in.

use cec_dom::{DomTree, NodeData, NodeId};

use crate::selectors::{
    Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorComponent, SelectorList,
    SelectorPart,
};

/// Structural facts about one element, computed once per match attempt
struct ElementContext<'a> {
    tree: &'a DomTree,
    node: NodeId,
    tag_name: &'a str,
    id: Option<&'a str>,
    classes: &'a [String],
    /// Index among siblings (1-based)
    sibling_index: usize,
    /// Total element siblings, self included
    sibling_count: usize,
    /// Index among same-type siblings (1-based)
    type_index: usize,
    is_root: bool,
}

impl<'a> ElementContext<'a> {
    fn new(tree: &'a DomTree, node: NodeId) -> Option<Self> {
        let elem = tree.get(node)?.as_element()?;
        let tag_name = tree.interner().get(elem.name);

        let mut sibling_index = 1;
        let mut sibling_count = 1;
        let mut type_index = 1;
        if let Some(parent) = tree.parent(node) {
            sibling_count = 0;
            let mut seen_self = false;
            for sibling in tree.element_children(parent) {
                sibling_count += 1;
                if sibling == node {
                    seen_self = true;
                    sibling_index = sibling_count;
                } else if !seen_self && tree.tag_name(sibling) == Some(tag_name) {
                    type_index += 1;
                }
            }
        }

        Some(Self {
            tree,
            node,
            tag_name,
            id: elem.id.as_deref(),
            classes: &elem.classes,
            sibling_index,
            sibling_count,
            type_index,
            is_root: tree.parent(node) == Some(NodeId::ROOT),
        })
    }

    fn is_empty(&self) -> bool {
        !self.tree.children(self.node).any(|(_, child)| match &child.data {
            NodeData::Element(_) => true,
            NodeData::Text(text) => !text.is_empty(),
            _ => false,
        })
    }
}

impl SelectorList {
    /// Whether any selector in the list matches `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.0.iter().any(|complex| complex.matches(tree, node))
    }

    /// Like [`matches`](Self::matches), with the leftmost compound of the
    /// selector matched only among the element children of `scope`
    /// (`:scope > selector`)
    pub fn matches_anchored(&self, tree: &DomTree, node: NodeId, scope: NodeId) -> bool {
        self.0
            .iter()
            .any(|complex| complex.matches_anchored(tree, node, scope))
    }
}

impl ComplexSelector {
    /// Whether this selector matches `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.parts.len() {
            0 => false,
            n => match_from(tree, node, &self.parts, n - 1, None),
        }
    }

    /// Whether this selector matches `node` with its leftmost compound on a
    /// child of `scope`
    pub fn matches_anchored(&self, tree: &DomTree, node: NodeId, scope: NodeId) -> bool {
        match self.parts.len() {
            0 => false,
            n => match_from(tree, node, &self.parts, n - 1, Some(scope)),
        }
    }
}

fn match_from(
    tree: &DomTree,
    node: NodeId,
    parts: &[SelectorPart],
    idx: usize,
    anchor: Option<NodeId>,
) -> bool {
    let Some(ctx) = ElementContext::new(tree, node) else {
        return false;
    };
    if !match_compound(&parts[idx].compound, &ctx) {
        return false;
    }
    if idx == 0 {
        return anchor.is_none_or(|scope| tree.parent(node) == Some(scope));
    }

    match parts[idx].combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => tree
            .parent_element(node)
            .is_some_and(|parent| match_from(tree, parent, parts, idx - 1, anchor)),
        Combinator::Descendant => {
            let mut cursor = tree.parent_element(node);
            while let Some(ancestor) = cursor {
                if match_from(tree, ancestor, parts, idx - 1, anchor) {
                    return true;
                }
                cursor = tree.parent_element(ancestor);
            }
            false
        }
        Combinator::NextSibling => tree
            .previous_element_sibling(node)
            .is_some_and(|sibling| match_from(tree, sibling, parts, idx - 1, anchor)),
        Combinator::SubsequentSibling => {
            let mut cursor = tree.previous_element_sibling(node);
            while let Some(sibling) = cursor {
                if match_from(tree, sibling, parts, idx - 1, anchor) {
                    return true;
                }
                cursor = tree.previous_element_sibling(sibling);
            }
            false
        }
    }
}

fn match_compound(compound: &CompoundSelector, ctx: &ElementContext) -> bool {
    compound
        .components
        .iter()
        .all(|component| match_component(component, ctx))
}

/// Match a selector component against an element
fn match_component(component: &SelectorComponent, ctx: &ElementContext) -> bool {
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => ctx.tag_name.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(id) => ctx.id == Some(id.as_str()),
        SelectorComponent::Class(class) => ctx.classes.iter().any(|c| c == class),
        SelectorComponent::Attribute(attr) => {
            attr.matches(ctx.tree.get_attribute(ctx.node, &attr.name))
        }
        SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(pseudo, ctx),
    }
}

/// Match a pseudo-class against an element
fn match_pseudo_class(pseudo: &PseudoClass, ctx: &ElementContext) -> bool {
    match pseudo {
        PseudoClass::Root => ctx.is_root,
        PseudoClass::Empty => ctx.is_empty(),
        PseudoClass::FirstChild => ctx.sibling_index == 1,
        PseudoClass::LastChild => ctx.sibling_index == ctx.sibling_count,
        PseudoClass::OnlyChild => ctx.sibling_count == 1,
        PseudoClass::NthChild(expr) => expr.matches(ctx.sibling_index as i32),
        PseudoClass::NthLastChild(expr) => {
            let from_end = ctx.sibling_count - ctx.sibling_index + 1;
            expr.matches(from_end as i32)
        }
        PseudoClass::NthOfType(expr) => expr.matches(ctx.type_index as i32),
        PseudoClass::Not(inner) => !match_compound(inner, ctx),
    }
}
