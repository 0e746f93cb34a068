// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! API-looking links and buttons

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom::{Document, Element};

/// Maximum number of characters of link text kept
pub const MAX_LINK_TEXT: usize = 50;

/// Conventional endpoints tried when a page exposes nothing else
const FALLBACK_ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/api/users", "Users API"),
    ("GET", "/api/data", "Data API"),
    ("GET", "/api/search", "Search API"),
    ("POST", "/graphql", "GraphQL endpoint"),
];

/// Where an endpoint came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSource {
    Anchor,
    Button,
    /// Conventional endpoint guess
    Guess,
}

/// Endpoint detected on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointLink {
    /// Target URL, absolute when the page URL is known
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Trimmed display text
    pub text: String,
    /// Origin of the link
    pub source: LinkSource,
}

impl EndpointLink {
    /// Build from an anchor or button, if it points at an API-like URL
    pub fn from_element(element: &Element<'_>, page_url: Option<&Url>) -> Option<Self> {
        let source = match element.local_name() {
            "a" => LinkSource::Anchor,
            "button" => LinkSource::Button,
            _ => return None,
        };

        let target = ["href", "data-url", "data-endpoint"]
            .iter()
            .filter_map(|attr| element.get_attribute(attr))
            .map(str::trim)
            .find(|value| looks_like_api(value))?;

        let method = element
            .get_attribute("data-method")
            .map(|m| m.trim().to_uppercase())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "GET".to_string());

        Some(Self {
            url: absolutize(target, page_url),
            method,
            text: truncate_text(&element.text_content()),
            source,
        })
    }
}

/// Whether a URL looks like an API endpoint
pub fn looks_like_api(target: &str) -> bool {
    target.contains("api") || target.contains("/v1/")
}

/// Find API-looking anchors and buttons in document order
///
/// Duplicate `(method, url)` pairs keep their first occurrence.
pub fn detect_links(doc: &Document) -> Vec<EndpointLink> {
    let page_url = doc.url.as_ref();
    let mut seen = HashSet::new();

    doc.query_selector_all("a, button")
        .iter()
        .filter_map(|e| EndpointLink::from_element(e, page_url))
        .filter(|link| seen.insert((link.method.clone(), link.url.clone())))
        .collect()
}

/// Conventional endpoint guesses, resolved against the page origin
pub fn fallback_endpoints(page_url: Option<&Url>) -> Vec<EndpointLink> {
    FALLBACK_ENDPOINTS
        .iter()
        .map(|(method, path, text)| EndpointLink {
            url: absolutize(path, page_url),
            method: method.to_string(),
            text: text.to_string(),
            source: LinkSource::Guess,
        })
        .collect()
}

fn absolutize(target: &str, page_url: Option<&Url>) -> String {
    page_url
        .and_then(|base| base.join(target).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| target.to_string())
}

fn truncate_text(text: &str) -> String {
    text.trim().chars().take(MAX_LINK_TEXT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html_with_url;

    fn doc(html: &str) -> Document {
        parse_html_with_url(html, Some(Url::parse("https://app.example.com/dash/home").unwrap()))
            .unwrap()
    }

    #[test]
    fn test_detects_api_links() {
        let doc = doc(
            r#"
            <a href="/api/orders">Orders</a>
            <a href="/about">About us</a>
            <a href="https://svc.example.com/v1/status">Status</a>
            <button data-endpoint="/api/orders/export" data-method="post">Export</button>
            <button data-url="/plain">Nothing</button>
        "#,
        );

        let links = detect_links(&doc);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].url, "https://app.example.com/api/orders");
        assert_eq!(links[0].method, "GET");
        assert_eq!(links[0].source, LinkSource::Anchor);
        assert_eq!(links[1].url, "https://svc.example.com/v1/status");
        assert_eq!(links[2].method, "POST");
        assert_eq!(links[2].source, LinkSource::Button);
        assert_eq!(links[2].text, "Export");
    }

    #[test]
    fn test_duplicates_removed() {
        let doc = doc(
            r#"<a href="/api/items">Items</a><a href="/api/items">Items again</a>
               <a href="/api/items" data-method="DELETE">Delete</a>"#,
        );
        let links = detect_links(&doc);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].text, "Items");
        assert_eq!(links[1].method, "DELETE");
    }

    #[test]
    fn test_text_truncated() {
        let long = "word ".repeat(40);
        let doc = doc(&format!(r#"<a href="/api/x">  {}  </a>"#, long));
        let links = detect_links(&doc);
        assert_eq!(links[0].text.chars().count(), MAX_LINK_TEXT);
        assert!(links[0].text.starts_with("word word"));
    }

    #[test]
    fn test_text_trimmed_not_collapsed() {
        let doc = doc("<a href=\"/api/x\">\n  Load\n    more  </a>");
        let links = detect_links(&doc);
        assert_eq!(links[0].text, "Load\n    more");
    }

    #[test]
    fn test_fallback_endpoints() {
        let url = Url::parse("https://app.example.com/deep/path?q=1").unwrap();
        let guesses = fallback_endpoints(Some(&url));

        assert_eq!(guesses.len(), 4);
        assert_eq!(guesses[0].url, "https://app.example.com/api/users");
        assert_eq!(guesses[3].url, "https://app.example.com/graphql");
        assert_eq!(guesses[3].method, "POST");
        assert!(guesses.iter().all(|g| g.source == LinkSource::Guess));

        let relative = fallback_endpoints(None);
        assert_eq!(relative[1].url, "/api/data");
    }
}
