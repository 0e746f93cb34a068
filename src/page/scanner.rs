// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page scanner
//!
//! Walks a parsed document once and returns plain, serialisable descriptors.

use serde::Serialize;
use tracing::{debug, warn};

use super::form::FormDescriptor;
use super::link::{detect_links, fallback_endpoints, EndpointLink};
use crate::dom::Document;

/// Result of scanning a page for request candidates
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageScan {
    pub forms: Vec<FormDescriptor>,
    pub api_endpoints: Vec<EndpointLink>,
}

impl PageScan {
    /// Whether nothing was found (fallback guesses do not count)
    pub fn is_guesswork(&self) -> bool {
        self.forms.is_empty()
            && self
                .api_endpoints
                .iter()
                .all(|l| l.source == super::link::LinkSource::Guess)
    }
}

/// Fuller page summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub url: Option<String>,
    pub title: String,
    pub forms: Vec<FormDescriptor>,
    pub total_forms: usize,
    pub total_inputs: usize,
}

/// Scan a document for forms and API-looking links
///
/// A page with neither yields the conventional endpoint guesses.
pub fn scan_document(doc: &Document) -> PageScan {
    let forms = scan_forms(doc);
    let mut api_endpoints = detect_links(doc);

    for link in &api_endpoints {
        debug!("Endpoint link: {} {}", link.method, link.url);
    }

    if forms.is_empty() && api_endpoints.is_empty() {
        debug!("No forms or endpoint links found, using conventional guesses");
        api_endpoints = fallback_endpoints(doc.url.as_ref());
    }

    PageScan {
        forms,
        api_endpoints,
    }
}

/// Summarise a page: URL, title and all extracted forms
pub fn analyze_page(doc: &Document) -> PageAnalysis {
    let forms = scan_forms(doc);

    PageAnalysis {
        url: doc.url_string(),
        title: doc.title().to_string(),
        total_forms: forms.len(),
        total_inputs: doc.inputs().len(),
        forms,
    }
}

/// Extract every form with at least one field
///
/// A form that fails extraction is kept as a minimal descriptor.
pub fn scan_forms(doc: &Document) -> Vec<FormDescriptor> {
    let page_url = doc.url.as_ref();
    let mut forms = Vec::new();

    for (index, element) in doc.forms().iter().enumerate() {
        match FormDescriptor::from_element(element, index, page_url) {
            Ok(form) if form.field_count() == 0 => {
                debug!("Skipping form {} without fields", index);
            }
            Ok(form) => {
                debug!(
                    "Form {}: {} {} ({} fields, {} hidden)",
                    index,
                    form.method,
                    form.action_url,
                    form.fields.len(),
                    form.hidden_fields.len()
                );
                forms.push(form);
            }
            Err(e) => {
                warn!("Form {} could not be processed: {}", index, e);
                forms.push(FormDescriptor::minimal(element, index, page_url));
            }
        }
    }

    forms
}
