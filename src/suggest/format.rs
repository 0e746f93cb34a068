// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request body format classification

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::page::form::{FormDescriptor, MULTIPART, URLENCODED};

lazy_static! {
    static ref URLENCODED_SHAPE: Regex =
        Regex::new(r"^[^=&\s]+=[^&\s]*(&[^=&\s]+=[^&\s]*)*$").unwrap();
}

/// Wire encoding of a request body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyFormat {
    Json,
    Multipart,
    UrlEncoded,
    #[default]
    None,
}

impl BodyFormat {
    /// Content type implied by the format
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            BodyFormat::Json => Some("application/json"),
            BodyFormat::Multipart => Some(MULTIPART),
            BodyFormat::UrlEncoded => Some(URLENCODED),
            BodyFormat::None => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyFormat::Json => "json",
            BodyFormat::Multipart => "multipart",
            BodyFormat::UrlEncoded => "url-encoded",
            BodyFormat::None => "none",
        }
    }
}

impl fmt::Display for BodyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Methods that do not carry a form body
pub fn is_bodyless(method: &str) -> bool {
    method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("DELETE")
}

/// Whether a URL looks like a script-facing endpoint
pub fn is_ajax_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default().to_ascii_lowercase();
    path.contains("/api/")
        || path.contains("/ajax/")
        || path.ends_with(".json")
        || path.ends_with("/json")
}

/// AJAX heuristic for forms
///
/// `has_ajax_attr` is true when the form carries `data-remote`, `data-ajax`
/// or `data-async`.
pub fn is_ajax_candidate(has_ajax_attr: bool, class: &str, action_url: &str) -> bool {
    let class = class.to_ascii_lowercase();
    has_ajax_attr
        || ["ajax", "remote", "async"].iter().any(|k| class.contains(k))
        || is_ajax_url(action_url)
}

/// Pick the body format for a form (first match wins)
pub fn classify_form(form: &FormDescriptor) -> BodyFormat {
    if form.has_file_field() || form.is_multipart() {
        return BodyFormat::Multipart;
    }

    // Bodyless forms keep their fields on the query string
    if is_bodyless(&form.method) {
        return BodyFormat::None;
    }

    let nested = form
        .all_fields()
        .any(|f| f.name.contains('[') || f.name.contains('.'));
    if form.context.is_ajax && nested {
        BodyFormat::Json
    } else {
        BodyFormat::UrlEncoded
    }
}

/// Classify an existing raw body
///
/// A declared `Content-Type` is trusted over sniffing. Declared JSON that
/// does not parse, and non-empty bodies that match no known shape, are
/// errors.
pub fn classify_body(method: &str, content_type: Option<&str>, body: &str) -> Result<BodyFormat> {
    let declared = content_type
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty());

    match declared {
        None if is_bodyless(method) => return Ok(BodyFormat::None),
        Some(ct) if ct.contains("json") => {
            if !body.trim().is_empty() {
                serde_json::from_str::<serde_json::Value>(body).map_err(|e| {
                    Error::parse(format!("Declared JSON body is not valid JSON: {}", e))
                })?;
            }
            return Ok(BodyFormat::Json);
        }
        Some(ct) if ct.starts_with("multipart/") => return Ok(BodyFormat::Multipart),
        Some(ct) if ct.contains("x-www-form-urlencoded") => return Ok(BodyFormat::UrlEncoded),
        _ => {}
    }

    let body = body.trim();
    if body.is_empty() {
        return Ok(BodyFormat::None);
    }
    if serde_json::from_str::<serde_json::Value>(body).is_ok() {
        return Ok(BodyFormat::Json);
    }
    if URLENCODED_SHAPE.is_match(body) {
        return Ok(BodyFormat::UrlEncoded);
    }
    if has_multipart_markers(body) {
        return Ok(BodyFormat::Multipart);
    }

    Err(Error::parse("Request body matches no known format"))
}

fn has_multipart_markers(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("content-disposition")
        && (lower.contains("boundary") || body.lines().any(|l| l.starts_with("--")))
}
