// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DOM engine for HTML parsing and querying
//!
//! Pages are parsed once by html5ever into an immutable arena so the scanner
//! works on a consistent snapshot with no browser attached.

mod document;
mod element;
mod node;
mod parser;
mod selector;

pub use document::Document;
pub use element::Element;
pub use node::{Node, NodeData, NodeId, NodeType};
pub use parser::{parse_html, parse_html_with_url};
pub use selector::Selector;
