//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the cec arena DOM.

use cec_dom::{Document, DomTree, NodeId, ShadowRootMode};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlError;

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut document = Document::empty(url);
        self.convert_node(&dom.document, document.tree_mut(), NodeId::ROOT)?;
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    fn convert_children(
        &self,
        handle: &Handle,
        tree: &mut DomTree,
        parent: NodeId,
    ) -> Result<(), HtmlError> {
        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, parent)?;
        }
        Ok(())
    }

    /// Convert an RcDom node and its subtree under `parent`
    fn convert_node(
        &self,
        handle: &Handle,
        tree: &mut DomTree,
        parent: NodeId,
    ) -> Result<(), HtmlError> {
        match &handle.data {
            RcNodeData::Document => self.convert_children(handle, tree, parent)?,
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if !text.trim().is_empty() {
                    let id = tree.create_text(&text);
                    tree.append_child(parent, id)?;
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let attrs = attrs.borrow();
                let tag: &str = &name.local;

                if tag == "template" {
                    let mode = attrs
                        .iter()
                        .find(|a| a.name.local.as_ref() == "shadowrootmode")
                        .and_then(|a| ShadowRootMode::parse(&a.value));
                    let contents = template_contents.borrow();

                    // Declarative shadow root: the template is replaced by a
                    // shadow root on its parent element
                    if let (Some(mode), Some(contents)) = (mode, contents.as_ref()) {
                        if tree.is_element(parent) && tree.attached_shadow_root(parent).is_none() {
                            let shadow = tree.attach_shadow(parent, mode)?;
                            return self.convert_children(contents, tree, shadow);
                        }
                        tracing::debug!(?parent, "ignoring declarative shadow root");
                    }
                }

                let id = tree.create_element(tag)?;
                for attr in attrs.iter() {
                    tree.set_attribute(id, &attr.name.local, &attr.value)?;
                }
                tree.append_child(parent, id)?;

                // Inert template content is not part of the tree
                if tag != "template" {
                    self.convert_children(handle, tree, id)?;
                }
            }
            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {}
        }
        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}
