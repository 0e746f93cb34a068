// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTML parser using html5ever

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use url::Url;

use super::document::Document;
use super::node::{NodeData, NodeId};
use crate::error::{Error, Result};

/// Parse HTML string into a Document
pub fn parse_html(html: &str) -> Result<Document> {
    parse_html_with_url(html, None)
}

/// Parse HTML string with a base URL
pub fn parse_html_with_url(html: &str, url: Option<Url>) -> Result<Document> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| Error::HtmlParse(e.to_string()))?;

    let mut doc = match url {
        Some(u) => Document::with_url(u),
        None => Document::new(),
    };

    // Convert html5ever DOM into our arena
    let root = doc.root().id;
    for child in dom.document.children.borrow().iter() {
        convert_node(&mut doc, child, root);
    }

    let title = doc.query_selector("title").map(|t| t.text_content());
    if let Some(title) = title {
        doc.set_title(title.trim());
    }

    Ok(doc)
}

fn convert_node(doc: &mut Document, handle: &Handle, parent_id: NodeId) {
    let data = match handle.data {
        RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return,
        RcNodeData::Doctype { .. } => NodeData::doctype(),
        RcNodeData::Text { ref contents } => {
            let text = contents.borrow().to_string();
            if text.trim().is_empty() && text.len() > 1 {
                // Skip whitespace-only text nodes (but keep single spaces)
                return;
            }
            NodeData::text(text)
        }
        RcNodeData::Comment { ref contents } => NodeData::comment(contents.to_string()),
        RcNodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let mut data = NodeData::element(name.local.to_string());
            for attr in attrs.borrow().iter() {
                data.attributes.insert(
                    attr.name.local.to_string().to_ascii_lowercase(),
                    attr.value.to_string(),
                );
            }
            data
        }
    };

    let node_id = doc.append(parent_id, data);

    for child in handle.children.borrow().iter() {
        convert_node(doc, child, node_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_html() {
        let doc = parse_html("<html><body><p>Hello</p></body></html>").unwrap();
        assert!(doc.body().is_some());
        assert_eq!(doc.query_selector("p").unwrap().text_content(), "Hello");
    }

    #[test]
    fn test_parse_with_attributes() {
        let doc = parse_html("<div ID=\"test\" class=\"foo bar\">content</div>").unwrap();
        let div = doc.query_selector("div").unwrap();
        assert_eq!(div.get_attribute("id"), Some("test"));
        assert!(div.has_class("foo"));
    }

    #[test]
    fn test_parse_complex_html() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head>
                <title> Test Page </title>
                <meta name="csrf-token" content="abc">
            </head>
            <body>
                <div id="container">
                    <h1>Hello World</h1>
                    <a href="https://example.com">Link</a>
                </div>
            </body>
            </html>
        "#;
        let url = Url::parse("https://example.com/page").unwrap();
        let doc = parse_html_with_url(html, Some(url)).unwrap();

        assert_eq!(doc.title(), "Test Page");
        assert_eq!(doc.url_string().as_deref(), Some("https://example.com/page"));
        assert_eq!(doc.metas().len(), 1);

        let h1 = doc.query_selector("h1").unwrap();
        assert_eq!(h1.text_content(), "Hello World");
    }

    #[test]
    fn test_forms() {
        let html = r#"
            <form id="login" action="/login" method="post">
                <input type="text" name="username">
                <input type="password" name="password">
                <button type="submit">Login</button>
            </form>
        "#;
        let doc = parse_html(html).unwrap();

        assert_eq!(doc.forms().len(), 1);
        assert_eq!(doc.inputs().len(), 2);
    }
}
