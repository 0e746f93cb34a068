// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Document representation
//!
//! A parsed page is a plain value: an arena of nodes plus the page URL and
//! cookie string the scanner would otherwise read from a live browser.

use std::path::Path;

use url::Url;

use super::element::Element;
use super::node::{Node, NodeData, NodeId};
use super::selector::Selector;
use crate::error::Result;

/// HTML Document representation
#[derive(Debug, Clone)]
pub struct Document {
    /// Document URL
    pub url: Option<Url>,
    /// Document title
    title: String,
    /// Raw `document.cookie` string
    cookie: String,
    /// Node arena, root at index 0
    nodes: Vec<NodeData>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            url: None,
            title: String::new(),
            cookie: String::new(),
            nodes: vec![NodeData::document()],
        }
    }

    /// Create a document with URL
    pub fn with_url(url: Url) -> Self {
        let mut doc = Self::new();
        doc.url = Some(url);
        doc
    }

    /// Load and parse a saved HTML page
    pub fn from_file(path: impl AsRef<Path>, url: Option<Url>) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        super::parse_html_with_url(&html, url)
    }

    /// Attach the page's cookie string
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = cookie.into();
        self
    }

    /// Get document URL as string
    pub fn url_string(&self) -> Option<String> {
        self.url.as_ref().map(|u| u.to_string())
    }

    /// Get document title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set document title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Raw cookie string, as `document.cookie` would report it
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Get the root node
    pub fn root(&self) -> Node<'_> {
        Node::new(NodeId(0), self)
    }

    pub(crate) fn node_data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    /// Append a node under `parent`, returning its ID
    pub(crate) fn append(&mut self, parent: NodeId, mut data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        data.parent = Some(parent);
        self.nodes.push(data);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Number of nodes in the arena (including the document node)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Query selector - find first matching element
    pub fn query_selector(&self, selector: &str) -> Option<Element<'_>> {
        let sel = Selector::parse(selector).ok()?;
        self.root().descendants().into_iter().find(|e| sel.matches(e))
    }

    /// Query selector all - find all matching elements in document order
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self
                .root()
                .descendants()
                .into_iter()
                .filter(|e| sel.matches(e))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<Element<'_>> {
        self.root()
            .descendants()
            .into_iter()
            .find(|e| e.id() == Some(id))
    }

    /// Get all forms
    pub fn forms(&self) -> Vec<Element<'_>> {
        self.query_selector_all("form")
    }

    /// Get all meta tags
    pub fn metas(&self) -> Vec<Element<'_>> {
        self.query_selector_all("meta")
    }

    /// Get all form controls
    pub fn inputs(&self) -> Vec<Element<'_>> {
        self.query_selector_all("input, textarea, select")
    }

    /// Get the <body> element
    pub fn body(&self) -> Option<Element<'_>> {
        self.query_selector("body")
    }

    /// Get all text content
    pub fn text_content(&self) -> String {
        self.root().text_content()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use std::io::Write;

    #[test]
    fn test_document_creation() {
        let doc = Document::new();
        assert!(doc.url.is_none());
        assert!(doc.title().is_empty());
        assert!(doc.cookie().is_empty());
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_query_selector() {
        let doc = parse_html("<html><body><div id='test'>Hello</div></body></html>").unwrap();
        let elem = doc.get_element_by_id("test");
        assert!(elem.is_some());
        assert_eq!(elem.unwrap().text_content(), "Hello");
    }

    #[test]
    fn test_cookie_attached() {
        let doc = parse_html("<p>x</p>").unwrap().with_cookie("sid=abc; theme=dark");
        assert_eq!(doc.cookie(), "sid=abc; theme=dark");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "<html><head><title>Saved</title></head><body><form></form></body></html>"
        )
        .unwrap();

        let url = Url::parse("https://example.com/saved").unwrap();
        let doc = Document::from_file(file.path(), Some(url.clone())).unwrap();
        assert_eq!(doc.title(), "Saved");
        assert_eq!(doc.url, Some(url));
        assert_eq!(doc.forms().len(), 1);
    }
}
