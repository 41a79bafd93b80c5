//! DOM Tree (arena-based allocation)
//!
//! Every node of a page, including the contents of its shadow trees, lives
//! in one arena. Node 0 is the document.

use crate::{
    DomError, DomResult, Node, NodeData, NodeId, ShadowRootData, ShadowRootMode, StringInterner,
};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            interner: StringInterner::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Name interner
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Name interner, mutably
    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a detached element. Tag names are stored lowercase.
    pub fn create_element(&mut self, tag: &str) -> DomResult<NodeId> {
        let name = self.interner.intern(&tag.to_ascii_lowercase())?;
        Ok(self.push(Node::element(name)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text.to_string()))
    }

    /// Attach a shadow root to `host`
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> DomResult<NodeId> {
        let existing = self
            .node(host)?
            .as_element()
            .ok_or(DomError::InvalidNodeType)?
            .shadow_root;
        if existing.is_valid() {
            return Err(DomError::ShadowRootExists);
        }

        let shadow = self.push(Node::shadow_root(ShadowRootData::new(host, mode)));
        if let Some(elem) = self.get_mut(host).and_then(Node::as_element_mut) {
            elem.shadow_root = shadow;
        }
        tracing::debug!(?host, ?mode, "attached shadow root");
        Ok(shadow)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        match self.node(parent)?.data {
            NodeData::Document | NodeData::Element(_) | NodeData::ShadowRoot(_) => {}
            _ => return Err(DomError::HierarchyRequest),
        }
        match self.node(child)?.data {
            NodeData::Document | NodeData::ShadowRoot(_) => return Err(DomError::InvalidNodeType),
            _ => {}
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }

        self.detach(child);

        let last = self.nodes[parent.0 as usize].last_child;
        {
            let node = &mut self.nodes[child.0 as usize];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.0 as usize].next_sibling = child;
        } else {
            self.nodes[parent.0 as usize].first_child = child;
        }
        self.nodes[parent.0 as usize].last_child = child;
        Ok(child)
    }

    /// Remove `child` from `parent`. The subtree stays in the arena but is
    /// no longer reachable from the document.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(child)
    }

    fn detach(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[child.0 as usize];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }
        if prev.is_valid() {
            self.nodes[prev.0 as usize].next_sibling = next;
        } else {
            self.nodes[parent.0 as usize].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.0 as usize].prev_sibling = prev;
        } else {
            self.nodes[parent.0 as usize].last_child = prev;
        }
        let node = &mut self.nodes[child.0 as usize];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Shadow-including inclusive ancestor check
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id).or_else(|| self.host(id));
        }
        false
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        let local = name.to_ascii_lowercase();
        let interned = self.interner.intern(&local)?;
        let elem = self
            .get_mut(element)
            .ok_or(DomError::NotFound(element))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;
        elem.set_attr(interned, &local, value.to_string());
        Ok(())
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> DomResult<Option<String>> {
        let local = name.to_ascii_lowercase();
        let Some(interned) = self.interner.lookup(&local) else {
            return Ok(None);
        };
        let elem = self
            .get_mut(element)
            .ok_or(DomError::NotFound(element))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;
        Ok(elem.remove_attr(interned, &local))
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Get an attribute value
    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        let interned = self.interner.lookup(&name.to_ascii_lowercase())?;
        self.get(element)?.as_element()?.get_attr(interned)
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, element: NodeId) -> Option<&str> {
        let elem = self.get(element)?.as_element()?;
        Some(self.interner.get(elem.name))
    }

    /// Is this node an element?
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Parent node of any kind (element, document or shadow root)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.some()
    }

    /// Parent node, only if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    /// Host element of a shadow root
    pub fn host(&self, shadow: NodeId) -> Option<NodeId> {
        Some(self.get(shadow)?.as_shadow_root()?.host)
    }

    /// Open shadow root of an element. Closed roots are not exposed.
    pub fn shadow_root(&self, element: NodeId) -> Option<NodeId> {
        let shadow = self.attached_shadow_root(element)?;
        self.get(shadow)?
            .as_shadow_root()
            .filter(|s| s.is_open())
            .map(|_| shadow)
    }

    /// Shadow root of an element regardless of mode
    pub fn attached_shadow_root(&self, element: NodeId) -> Option<NodeId> {
        self.get(element)?.as_element()?.shadow_root.some()
    }

    /// Top of the tree this node belongs to: the document, a shadow root,
    /// or the top of a detached subtree
    pub fn root_node(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Whether the node is reachable from the document, through any
    /// number of shadow hosts
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut root = self.root_node(id);
        loop {
            if root == NodeId::ROOT {
                return true;
            }
            match self.host(root) {
                Some(host) => root = self.root_node(host),
                None => return false,
            }
        }
    }

    /// Child nodes of any kind
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Element children only
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
    }

    /// Previous sibling that is an element
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?.prev_sibling;
        while current.is_valid() {
            if self.is_element(current) {
                return Some(current);
            }
            current = self.get(current)?.prev_sibling;
        }
        None
    }

    /// Next sibling that is an element
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?.next_sibling;
        while current.is_valid() {
            if self.is_element(current) {
                return Some(current);
            }
            current = self.get(current)?.next_sibling;
        }
        None
    }

    /// 1-based position among the parent's element children.
    /// Text and comment siblings are not counted.
    pub fn element_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.element_children(parent)
            .position(|child| child == id)
            .map(|pos| pos + 1)
    }

    /// Elements below `scope` in tree order, excluding `scope` itself.
    /// Shadow trees of descendants are not entered.
    pub fn descendants(&self, scope: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            scope,
            next: self.get(scope).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.some()?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over the elements of a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    scope: NodeId,
    next: NodeId,
}

impl Descendants<'_> {
    fn advance(&self, from: NodeId) -> NodeId {
        let Some(node) = self.tree.get(from) else {
            return NodeId::NONE;
        };
        if node.first_child.is_valid() {
            return node.first_child;
        }
        let mut current = from;
        while current != self.scope {
            let Some(node) = self.tree.get(current) else {
                return NodeId::NONE;
            };
            if node.next_sibling.is_valid() {
                return node.next_sibling;
            }
            current = node.parent;
            if !current.is_valid() {
                return NodeId::NONE;
            }
        }
        NodeId::NONE
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let id = self.next.some()?;
            self.next = self.advance(id);
            if self.tree.is_element(id) {
                return Some(id);
            }
        }
    }
}
