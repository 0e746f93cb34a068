// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Formcast - Form-to-Request Inference
//!
//! Scans an HTML page for forms and API-looking links and turns them into
//! editable HTTP request suggestions, then dispatches the edited request with
//! a hard timeout and a normalised response envelope.
//!
//! ## Features
//!
//! - Pure-value DOM: html5ever-parsed arena document with CSS selectors
//! - Form scanning: fields, hidden inputs, labels, CSRF tokens, modal/AJAX context
//! - Body format classification: JSON / multipart / url-encoded / none
//! - Request synthesis with page headers, cookies and sample values
//! - Never-empty detection: failures degrade to canned suggestions
//! - Assisted generation: a completions provider drafts a request from the page
//! - Dispatcher: timeout cancellation, provider bearer injection, typed errors
//!
//! ## Example
//!
//! ```rust,no_run
//! use formcast::{detect_from_html, Dispatcher, EditorMessage, EditorState};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let html = r#"<form action="/login" method="post"><input name="email"></form>"#;
//!     let detection = detect_from_html(html, "https://example.com/", "");
//!
//!     let state = EditorState::new()
//!         .update(EditorMessage::SuggestionsLoaded(detection.suggestions))?
//!         .update(EditorMessage::SelectSuggestion(0))?;
//!
//!     let spec = state.draft.to_spec(Duration::from_secs(30))?;
//!     let reply = Dispatcher::new()?.dispatch_reply(&spec, None).await;
//!     println!("{}", serde_json::to_string_pretty(&reply)?);
//!
//!     Ok(())
//! }
//! ```

pub mod dom;
pub mod error;
pub mod http;
pub mod page;
pub mod suggest;

// Re-exports for convenience

// DOM
pub use dom::{parse_html, parse_html_with_url, Document, Element, Node};

// Errors
pub use error::{Error, ErrorContext, ErrorKind, Result};

// Page scanning
pub use page::{analyze_page, scan_document, PageAnalysis, PageContext, PageScan};
pub use page::{EndpointLink, FieldDescriptor, FieldType, FormDescriptor};

// Suggestions
pub use suggest::{classify_body, classify_form, sample_value, BodyFormat};
pub use suggest::{detect_from_html, detect_suggestions, DetectionResponse};
pub use suggest::{EditorMessage, EditorState, RequestDraft};
pub use suggest::{Assistant, KeyValue, RequestSuggestion, Synthesizer};

// HTTP
pub use http::{DispatchConfig, DispatchReply, Dispatcher, HttpRequestSpec, HttpResponseEnvelope};

/// Formcast version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
