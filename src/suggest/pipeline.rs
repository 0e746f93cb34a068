// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Detection pipeline: scan, extract context, synthesize
//!
//! Detection is best-effort. Failures degrade to canned suggestions and are
//! reported through `message`, never as an unsuccessful response.

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use url::Url;

use super::format::BodyFormat;
use super::synth::{Candidate, KeyValue, RequestSuggestion, Synthesizer};
use crate::dom::{parse_html_with_url, Document};
use crate::error::{Error, Result};
use crate::page::context::PageContext;
use crate::page::scanner::scan_document;

/// Upper bound on returned suggestions
pub const MAX_SUGGESTIONS: usize = 5;

/// Public test API used for canned suggestions
pub const CANNED_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Result of running detection on a page
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResponse {
    pub success: bool,
    pub suggestions: Vec<RequestSuggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Detect request suggestions on a parsed page
///
/// Always returns between one and [`MAX_SUGGESTIONS`] suggestions.
pub fn detect_suggestions(doc: &Document) -> DetectionResponse {
    match run_pipeline(doc) {
        Ok(suggestions) => {
            info!("Detected {} request suggestions", suggestions.len());
            DetectionResponse {
                success: true,
                suggestions,
                message: None,
            }
        }
        Err(e) => degraded(e),
    }
}

/// Parse raw HTML for `page_url` and detect suggestions
pub fn detect_from_html(html: &str, page_url: &str, cookie: &str) -> DetectionResponse {
    let doc = Url::parse(page_url)
        .map_err(Error::from)
        .and_then(|url| parse_html_with_url(html, Some(url)));

    match doc {
        Ok(doc) => detect_suggestions(&doc.with_cookie(cookie)),
        Err(e) => degraded(e),
    }
}

fn run_pipeline(doc: &Document) -> Result<Vec<RequestSuggestion>> {
    let scan = scan_document(doc);
    let context = PageContext::extract(doc);
    let synth = Synthesizer::new(&context);

    let candidates = scan
        .forms
        .iter()
        .map(Candidate::Form)
        .chain(scan.api_endpoints.iter().map(Candidate::Link))
        .take(MAX_SUGGESTIONS);

    let mut suggestions = Vec::new();
    for (index, candidate) in candidates.enumerate() {
        suggestions.push(synth.synthesize(candidate, index)?);
    }

    if suggestions.is_empty() {
        suggestions.extend(canned_suggestions());
    }
    suggestions.truncate(MAX_SUGGESTIONS);

    Ok(suggestions)
}

fn degraded(error: Error) -> DetectionResponse {
    warn!("Detection failed, using canned suggestion: {}", error);
    DetectionResponse {
        success: true,
        suggestions: vec![canned_get()],
        message: Some(format!("Detection failed: {}", error)),
    }
}

fn canned_get() -> RequestSuggestion {
    RequestSuggestion {
        method: "GET".to_string(),
        url: format!("{}/posts/1", CANNED_BASE_URL),
        headers: vec![KeyValue::new("Accept", "application/json")],
        params: Vec::new(),
        body: String::new(),
        body_format: BodyFormat::None,
        description: "Sample GET request against a public test API".to_string(),
        has_file_uploads: false,
        is_ajax: false,
        csrf_token: None,
    }
}

/// Generic GET and POST suggestions against the public test API
pub fn canned_suggestions() -> Vec<RequestSuggestion> {
    let body = json!({
        "title": "Sample post",
        "body": "Created from a suggested request",
        "userId": 1,
    });

    vec![
        RequestSuggestion {
            url: format!("{}/posts", CANNED_BASE_URL),
            description: "List posts from a public test API".to_string(),
            ..canned_get()
        },
        RequestSuggestion {
            method: "POST".to_string(),
            url: format!("{}/posts", CANNED_BASE_URL),
            headers: vec![KeyValue::new("Content-Type", "application/json")],
            body: serde_json::to_string_pretty(&body).unwrap_or_default(),
            body_format: BodyFormat::Json,
            description: "Create a post on a public test API".to_string(),
            ..canned_get()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_form_and_link_suggestions() {
        let html = r#"
            <form id="login" action="/login" method="post">
                <input name="user"><input type="password" name="pass">
            </form>
            <a href="/api/me">Profile</a>
        "#;

        let response = detect_from_html(html, "https://example.com/", "");
        assert!(response.success);
        assert!(response.message.is_none());
        assert_eq!(response.suggestions.len(), 2);
        assert_eq!(response.suggestions[0].url, "https://example.com/login");
        assert_eq!(response.suggestions[1].url, "https://example.com/api/me");
    }

    #[test]
    fn test_capped_at_five() {
        let forms: String = (0..8)
            .map(|i| format!(r#"<form action="/f{}" method="post"><input name="x"></form>"#, i))
            .collect();

        let response = detect_from_html(&forms, "https://example.com/", "");
        assert_eq!(response.suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(response.suggestions[4].url, "https://example.com/f4");
    }

    #[test]
    fn test_empty_page_uses_guesses() {
        let response = detect_from_html("<p>Nothing here</p>", "https://example.com/a/b", "");
        assert!(response.success);
        assert_eq!(response.suggestions.len(), 4);
        assert!(response.suggestions.iter().all(|s| !s.description.is_empty()));
        assert_eq!(response.suggestions[3].url, "https://example.com/graphql");
        assert_eq!(response.suggestions[3].method, "POST");
    }

    #[test]
    fn test_failure_degrades_to_canned_get() {
        // No page URL and no action: nothing to submit to
        let doc = parse_html(r#"<form method="post"><input name="q"></form>"#).unwrap();
        let response = detect_suggestions(&doc);

        assert!(response.success);
        assert_eq!(response.suggestions.len(), 1);
        assert_eq!(response.suggestions[0].method, "GET");
        assert!(response.suggestions[0].url.starts_with(CANNED_BASE_URL));
        assert!(response.message.unwrap().contains("no resolvable action"));
    }

    #[test]
    fn test_bad_page_url_degrades() {
        let response = detect_from_html("<form></form>", "not a url", "");
        assert!(response.success);
        assert_eq!(response.suggestions.len(), 1);
        assert!(response.message.is_some());
    }

    #[test]
    fn test_cookie_carried_into_headers() {
        let response = detect_from_html(
            r#"<form method="post" action="/x"><input name="a"></form>"#,
            "https://example.com/",
            "session=s1",
        );
        assert_eq!(response.suggestions[0].header("Cookie"), Some("session=s1"));
    }

    #[test]
    fn test_canned_suggestions() {
        let canned = canned_suggestions();
        assert_eq!(canned.len(), 2);
        assert_eq!(canned[0].method, "GET");
        assert_eq!(canned[1].method, "POST");
        assert_eq!(canned[1].reclassify().unwrap(), BodyFormat::Json);
    }

    #[test]
    fn test_serialized_shape() {
        let response = detect_from_html("<p></p>", "https://example.com/", "");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("message").is_none());
        assert_eq!(json["suggestions"][0]["bodyFormat"], "none");
    }
}
