// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Element-specific DOM operations

use lazy_static::lazy_static;
use regex::Regex;

use super::node::Node;
use super::selector::Selector;

lazy_static! {
    static ref DISPLAY_NONE: Regex = Regex::new(r"(?i)(^|;)\s*display\s*:\s*none\s*(!important)?\s*(;|$)").unwrap();
}

/// Element node with extended operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    /// Inner node reference
    pub node: Node<'a>,
}

impl<'a> Element<'a> {
    /// Create a new element from a node
    pub fn new(node: Node<'a>) -> Option<Self> {
        if node.is_element() {
            Some(Self { node })
        } else {
            None
        }
    }

    /// Get the tag name (uppercase)
    pub fn tag_name(&self) -> String {
        self.local_name().to_uppercase()
    }

    /// Get local name (lowercase)
    pub fn local_name(&self) -> &'a str {
        self.node.local_name().unwrap_or_default()
    }

    /// Get element ID
    pub fn id(&self) -> Option<&'a str> {
        self.node.get_attribute("id")
    }

    /// Get class list
    pub fn class_list(&self) -> Vec<&'a str> {
        self.node
            .get_attribute("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Check if element has a class
    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().iter().any(|c| *c == class)
    }

    /// Get the parent element
    pub fn parent_element(&self) -> Option<Element<'a>> {
        self.node.parent().and_then(Element::new)
    }

    /// Ancestor elements, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> {
        std::iter::successors(self.parent_element(), |e| e.parent_element())
    }

    /// Get child elements (only element nodes)
    pub fn children(&self) -> Vec<Element<'a>> {
        self.node.children().filter_map(Element::new).collect()
    }

    /// Query selector - find first matching descendant
    pub fn query_selector(&self, selector: &str) -> Option<Element<'a>> {
        let sel = Selector::parse(selector).ok()?;
        self.node.descendants().into_iter().find(|e| sel.matches(e))
    }

    /// Query selector all - find all matching descendants in document order
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element<'a>> {
        match Selector::parse(selector) {
            Ok(sel) => self
                .node
                .descendants()
                .into_iter()
                .filter(|e| sel.matches(e))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Check if element matches a selector
    pub fn matches(&self, selector: &str) -> bool {
        Selector::parse(selector)
            .map(|sel| sel.matches(self))
            .unwrap_or(false)
    }

    /// Get closest ancestor (or self) matching selector
    pub fn closest(&self, selector: &str) -> Option<Element<'a>> {
        let sel = Selector::parse(selector).ok()?;
        std::iter::once(*self)
            .chain(self.ancestors())
            .find(|e| sel.matches(e))
    }

    /// Current value for form controls
    ///
    /// Inputs report their `value` attribute, textareas their text, selects
    /// the selected option (or the first option when none is selected).
    pub fn value(&self) -> Option<String> {
        match self.local_name() {
            "input" => self.get_attribute("value").map(String::from),
            "textarea" => Some(self.text_content()),
            "select" => {
                let options = self.query_selector_all("option");
                options
                    .iter()
                    .find(|o| o.has_attribute("selected"))
                    .or_else(|| options.first())
                    .map(|o| {
                        o.get_attribute("value")
                            .map(String::from)
                            .unwrap_or_else(|| o.text_content().trim().to_string())
                    })
            }
            _ => None,
        }
    }

    /// Check if checkbox/radio is checked
    pub fn checked(&self) -> bool {
        self.has_attribute("checked")
    }

    /// Check if element is disabled
    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
    }

    /// Get href for links
    pub fn href(&self) -> Option<&'a str> {
        self.get_attribute("href")
    }

    /// Whether the element itself is hidden by markup (`hidden` attribute or
    /// inline `display: none`)
    pub fn is_hidden_by_markup(&self) -> bool {
        self.has_attribute("hidden")
            || self
                .get_attribute("style")
                .map(|s| DISPLAY_NONE.is_match(s))
                .unwrap_or(false)
    }
}

impl<'a> std::ops::Deref for Element<'a> {
    type Target = Node<'a>;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}
