pub mod parser;

use std::collections::{BTreeMap, HashMap};

/// Tag of a released arena slot.
const FREE_TAG: &str = "#free";

/// Handle to a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// A single page node.
///
/// Classes are kept apart from the attribute map so class toggles never have
/// to re-split the `class` string; inline style is a property map so CSS
/// custom properties (`--orb-rotation`) can be written individually.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub node_type: NodeType,
    pub attributes: HashMap<String, String>,
    pub classes: Vec<String>,
    pub style: BTreeMap<String, String>,
    pub text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl DomNode {
    fn new(tag: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            tag: tag.into(),
            node_type,
            attributes: HashMap::new(),
            classes: Vec::new(),
            style: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Mutable page tree the orb docks into.
///
/// `remove` only detaches a node (and its subtree) from the root, so it can
/// be re-inserted later. `drop_subtree` releases the slots for reuse; ids of
/// dropped nodes must not be used afterwards.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<DomNode>,
    free: Vec<NodeId>,
    root: NodeId,
    body: NodeId,
    pub title: String,
}

impl Document {
    /// Empty document with `<html><head/><body/></html>`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![DomNode::new("#document", NodeType::Document)],
            free: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            title: String::new(),
        };
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(doc.root, html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc.body = body;
        doc
    }

    /// Build from a pre-populated arena (used by the parser).
    pub(crate) fn from_parts(nodes: Vec<DomNode>, root: NodeId, body: NodeId, title: String) -> Self {
        Self {
            nodes,
            free: Vec::new(),
            root,
            body,
            title,
        }
    }

    pub(crate) fn push_node(nodes: &mut Vec<DomNode>, node: DomNode) -> NodeId {
        nodes.push(node);
        NodeId(nodes.len() - 1)
    }

    pub(crate) fn raw_element(tag: &str) -> DomNode {
        DomNode::new(tag, NodeType::Element)
    }

    pub(crate) fn raw_text(text: &str) -> DomNode {
        let mut node = DomNode::new("", NodeType::Text);
        node.text = text.to_string();
        node
    }

    pub(crate) fn raw_document() -> DomNode {
        DomNode::new("#document", NodeType::Document)
    }

    pub(crate) fn link(nodes: &mut [DomNode], parent: NodeId, child: NodeId) {
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut DomNode {
        &mut self.nodes[id.0]
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node = DomNode::new(tag, NodeType::Element);
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => Self::push_node(&mut self.nodes, node),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Detach `id` from its current parent, if any.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Detach `id` and release it with all its descendants.
    pub fn drop_subtree(&mut self, id: NodeId) {
        if id == self.root || id == self.body {
            log::warn!("refusing to drop the document root or body");
            return;
        }
        if self.nodes[id.0].tag == FREE_TAG {
            return;
        }
        self.remove(id);
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = std::mem::replace(&mut self.nodes[cur.0], DomNode::new(FREE_TAG, NodeType::Element));
            stack.extend(node.children);
            self.free.push(cur);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        Self::link(&mut self.nodes, parent, child);
    }

    /// Insert `child` into `parent` right before `reference`.
    /// Falls back to appending when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.remove(child);
        let pos = self.nodes[parent.0].children.iter().position(|c| *c == reference);
        self.nodes[child.0].parent = Some(parent);
        match pos {
            Some(i) => self.nodes[parent.0].children.insert(i, child),
            None => self.nodes[parent.0].children.push(child),
        }
    }

    /// Insert `child` as the next sibling of `reference`.
    /// Returns false when `reference` is detached.
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> bool {
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        self.remove(child);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == reference)
            .map(|i| i + 1)
            .unwrap_or(self.nodes[parent.0].children.len());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos, child);
        true
    }

    /// Whether the node is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.nodes[cur.0].parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Depth-first walk over connected nodes.
    fn find(&self, pred: impl Fn(&DomNode) -> bool) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.node_type == NodeType::Element && pred(node) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(|n| n.attr("id") == Some(id))
    }

    /// First connected element carrying `class`.
    pub fn query_class(&self, class: &str) -> Option<NodeId> {
        self.find(|n| n.has_class(class))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.nodes[id.0].attributes.insert(name.to_string(), value.to_string());
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0].attr(name)
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        self.nodes[id.0].attributes.remove(name);
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let node = &mut self.nodes[id.0];
        if !node.has_class(class) {
            node.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.nodes[id.0].classes.retain(|c| c != class);
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes[id.0].has_class(class)
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        self.nodes[id.0].style.insert(property.to_string(), value.to_string());
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.nodes[id.0].style.get(property).map(|s| s.as_str())
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text = text.to_string();
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.0].text
    }

    /// Drop every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.nodes[id.0].children.clone() {
            self.drop_subtree(child);
        }
    }

    /// Nodes currently holding a slot, attached or not.
    pub fn allocated_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Total number of nodes reachable from the root.
    pub fn connected_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.nodes[id.0].children.iter().copied());
        }
        count
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
