//! Comprehensive tests for cec-css
//!
//! Queries over documents with shadow roots, comments and escaped ids.

use cec_css::{CssError, matches, parse_selector_list, query_selector, query_selector_all};
use cec_dom::{Document, NodeId, ShadowRootMode};

/// body > main > (comment, p#intro, comment, p.note, x-card[shadow: div > button, button])
fn page() -> (Document, Vec<NodeId>) {
    let mut doc = Document::default();
    let body = doc.body();
    let tree = doc.tree_mut();

    let main = tree.create_element("main").unwrap();
    tree.append_child(body, main).unwrap();

    let c1 = tree.create_comment("first");
    tree.append_child(main, c1).unwrap();
    let intro = tree.create_element("p").unwrap();
    tree.set_attribute(intro, "id", "intro").unwrap();
    tree.append_child(main, intro).unwrap();
    let c2 = tree.create_comment("second");
    tree.append_child(main, c2).unwrap();
    let note = tree.create_element("p").unwrap();
    tree.set_attribute(note, "class", "note muted").unwrap();
    tree.append_child(main, note).unwrap();
    let card = tree.create_element("x-card").unwrap();
    tree.append_child(main, card).unwrap();

    let shadow = tree.attach_shadow(card, ShadowRootMode::Open).unwrap();
    let wrapper = tree.create_element("div").unwrap();
    tree.append_child(shadow, wrapper).unwrap();
    let inner = tree.create_element("button").unwrap();
    tree.append_child(wrapper, inner).unwrap();
    let outer = tree.create_element("button").unwrap();
    tree.append_child(shadow, outer).unwrap();

    (doc, vec![main, intro, note, card, shadow, wrapper, inner, outer])
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn test_document_query_skips_shadow_content() {
    let (doc, _) = page();
    let tree = doc.tree();
    assert!(query_selector_all(tree, tree.root(), "button").unwrap().is_empty());
}

#[test]
fn test_shadow_query_in_tree_order() {
    let (doc, ids) = page();
    let tree = doc.tree();
    let shadow = ids[4];
    assert_eq!(
        query_selector_all(tree, shadow, "button").unwrap(),
        vec![ids[6], ids[7]]
    );
}

#[test]
fn test_child_chain_picks_exact_level() {
    let (doc, ids) = page();
    let tree = doc.tree();
    let shadow = ids[4];

    // A descendant query matches the nested button first
    assert_eq!(query_selector(tree, shadow, "button").unwrap(), Some(ids[6]));
    // The top-level button is the second element child of the shadow root
    assert_eq!(
        query_selector(tree, shadow, "button:nth-child(2)").unwrap(),
        Some(ids[7])
    );
    assert_eq!(
        query_selector(tree, shadow, "div:nth-child(1) > button:nth-child(1)").unwrap(),
        Some(ids[6])
    );
}

#[test]
fn test_combinators_do_not_cross_host() {
    let (doc, ids) = page();
    let tree = doc.tree();
    assert!(!matches(tree, ids[5], "x-card > div").unwrap());
    assert!(!matches(tree, ids[6], "main button").unwrap());
}

// ============================================================================
// Structural selectors
// ============================================================================

#[test]
fn test_nth_child_counts_elements_only() {
    let (doc, ids) = page();
    let tree = doc.tree();
    assert!(matches(tree, ids[2], "p:nth-child(2)").unwrap());
    assert!(matches(tree, ids[3], "x-card:nth-child(3)").unwrap());
    assert!(matches(tree, ids[3], "main > :last-child").unwrap());
}

#[test]
fn test_document_element_path() {
    let (doc, ids) = page();
    let tree = doc.tree();
    let found = query_selector(
        tree,
        tree.root(),
        "html:nth-child(1) > body:nth-child(2) > main:nth-child(1) > p:nth-child(2)",
    )
    .unwrap();
    assert_eq!(found, Some(ids[2]));
}

#[test]
fn test_class_and_nth_of_type() {
    let (doc, ids) = page();
    let tree = doc.tree();
    assert_eq!(query_selector(tree, tree.root(), ".muted").unwrap(), Some(ids[2]));
    assert_eq!(
        query_selector(tree, tree.root(), "p:nth-of-type(2)").unwrap(),
        Some(ids[2])
    );
    assert_eq!(
        query_selector(tree, tree.root(), "p:not(.note)").unwrap(),
        Some(ids[1])
    );
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_attribute_id_with_special_characters() {
    let mut doc = Document::default();
    let body = doc.body();
    let tree = doc.tree_mut();
    let el = tree.create_element("span").unwrap();
    tree.set_attribute(el, "id", r#"odd "quoted" \ :shadow-root id"#).unwrap();
    tree.append_child(body, el).unwrap();

    let selector = r#"[id="odd \"quoted\" \\ :shadow-root id"]"#;
    assert_eq!(query_selector(tree, tree.root(), selector).unwrap(), Some(el));
}

#[test]
fn test_selector_list_matches_either() {
    let (doc, ids) = page();
    let tree = doc.tree();
    let list = parse_selector_list("#missing, #intro").unwrap();
    assert!(list.matches(tree, ids[1]));
}

#[test]
fn test_invalid_and_unsupported_selectors() {
    let (doc, _) = page();
    let tree = doc.tree();
    assert!(matches!(
        query_selector(tree, tree.root(), "p["),
        Err(CssError::InvalidSelector { .. })
    ));
    assert!(matches!(
        query_selector(tree, tree.root(), "x-card:shadow-root"),
        Err(CssError::Unsupported { .. })
    ));
}
