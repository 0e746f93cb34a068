// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DOM Node types

use std::collections::HashMap;

use super::document::Document;
use super::element::Element;

/// Index of a node inside its document's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Get the raw arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Document node
    Document,
    /// Element node (like <div>, <p>, etc.)
    Element,
    /// Text node
    Text,
    /// Comment node
    Comment,
    /// Document type node (<!DOCTYPE>)
    DocumentType,
}

/// Internal node data
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Node type
    pub node_type: NodeType,
    /// Tag name, lowercase (for elements)
    pub tag_name: Option<String>,
    /// Text content (for text/comment nodes)
    pub text: Option<String>,
    /// Attributes, keyed by lowercase name (for elements)
    pub attributes: HashMap<String, String>,
    /// Parent node ID
    pub parent: Option<NodeId>,
    /// Child node IDs in document order
    pub children: Vec<NodeId>,
}

impl NodeData {
    fn blank(node_type: NodeType) -> Self {
        Self {
            node_type,
            tag_name: None,
            text: None,
            attributes: HashMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a new element node data
    pub fn element(tag_name: impl Into<String>) -> Self {
        let mut data = Self::blank(NodeType::Element);
        data.tag_name = Some(tag_name.into().to_lowercase());
        data
    }

    /// Create a new text node data
    pub fn text(content: impl Into<String>) -> Self {
        let mut data = Self::blank(NodeType::Text);
        data.text = Some(content.into());
        data
    }

    /// Create a new comment node data
    pub fn comment(content: impl Into<String>) -> Self {
        let mut data = Self::blank(NodeType::Comment);
        data.text = Some(content.into());
        data
    }

    /// Create a doctype node data
    pub fn doctype() -> Self {
        Self::blank(NodeType::DocumentType)
    }

    /// Create a new document node data
    pub fn document() -> Self {
        Self::blank(NodeType::Document)
    }
}

/// A borrowed reference to a node in a document
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    /// Node ID
    pub id: NodeId,
    doc: &'a Document,
}

impl<'a> Node<'a> {
    pub(crate) fn new(id: NodeId, doc: &'a Document) -> Self {
        Self { id, doc }
    }

    fn data(&self) -> &'a NodeData {
        self.doc.node_data(self.id)
    }

    /// The document this node belongs to
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Get the node type
    pub fn node_type(&self) -> NodeType {
        self.data().node_type
    }

    /// Get the tag name in lowercase
    pub fn local_name(&self) -> Option<&'a str> {
        self.data().tag_name.as_deref()
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Check if has an attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.data()
            .attributes
            .contains_key(&name.to_ascii_lowercase())
    }

    /// Get all attributes
    pub fn attributes(&self) -> &'a HashMap<String, String> {
        &self.data().attributes
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.node_type() {
            NodeType::Text => out.push_str(self.data().text.as_deref().unwrap_or("")),
            NodeType::Element | NodeType::Document => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
            _ => {}
        }
    }

    /// Get parent node
    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|id| Node::new(id, self.doc))
    }

    /// Get child nodes
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let doc = self.doc;
        self.data().children.iter().map(move |&id| Node::new(id, doc))
    }

    /// Get previous sibling
    pub fn prev_sibling(&self) -> Option<Node<'a>> {
        let parent = self.parent()?;
        let siblings = &parent.data().children;
        let pos = siblings.iter().position(|&id| id == self.id)?;
        pos.checked_sub(1).map(|p| Node::new(siblings[p], self.doc))
    }

    /// Get next sibling
    pub fn next_sibling(&self) -> Option<Node<'a>> {
        let parent = self.parent()?;
        let siblings = &parent.data().children;
        let pos = siblings.iter().position(|&id| id == self.id)?;
        siblings.get(pos + 1).map(|&id| Node::new(id, self.doc))
    }

    /// View this node as an element
    pub fn as_element(&self) -> Option<Element<'a>> {
        Element::new(*self)
    }

    /// All descendant elements in document (pre-)order
    pub fn descendants(&self) -> Vec<Element<'a>> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Element<'a>>) {
        for child in self.children() {
            if let Some(elem) = child.as_element() {
                out.push(elem);
            }
            child.collect_descendants(out);
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.doc, other.doc)
    }
}

impl Eq for Node<'_> {}
