// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request synthesis
//!
//! Turns a scanned form or endpoint link plus the page context into an
//! editable [`RequestSuggestion`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::format::{classify_body, classify_form, is_ajax_url, BodyFormat};
use super::sample::sample_value;
use crate::error::{Error, Result};
use crate::http::multipart::FormPart;
use crate::page::context::{PageContext, CSRF_HEADER};
use crate::page::form::{FieldDescriptor, FieldType, FormDescriptor};
use crate::page::link::{EndpointLink, LinkSource};

/// Editable header or parameter row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }

    /// Blank, enabled row
    pub fn empty() -> Self {
        Self::new("", "")
    }
}

/// Synthesized request draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSuggestion {
    pub method: String,
    pub url: String,
    pub headers: Vec<KeyValue>,
    pub params: Vec<KeyValue>,
    pub body: String,
    pub body_format: BodyFormat,
    pub description: String,
    pub has_file_uploads: bool,
    pub is_ajax: bool,
    pub csrf_token: Option<String>,
}

impl RequestSuggestion {
    /// Enabled header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.enabled && h.key.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Re-derive the body format from the declared content type and body
    pub fn reclassify(&self) -> Result<BodyFormat> {
        classify_body(&self.method, self.header("Content-Type"), &self.body)
    }
}

/// Something a suggestion can be built from
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    Form(&'a FormDescriptor),
    Link(&'a EndpointLink),
}

/// Builds suggestions against one page context
pub struct Synthesizer<'a> {
    context: &'a PageContext,
}

impl<'a> Synthesizer<'a> {
    pub fn new(context: &'a PageContext) -> Self {
        Self { context }
    }

    /// Build a suggestion; `index` is the candidate's position in the output
    pub fn synthesize(&self, candidate: Candidate<'_>, index: usize) -> Result<RequestSuggestion> {
        let suggestion = match candidate {
            Candidate::Form(form) => self.from_form(form, index)?,
            Candidate::Link(link) => self.from_link(link)?,
        };
        debug!(
            "Suggestion {}: {} {} ({})",
            index, suggestion.method, suggestion.url, suggestion.body_format
        );
        Ok(suggestion)
    }

    fn from_form(&self, form: &FormDescriptor, index: usize) -> Result<RequestSuggestion> {
        if form.action_url.is_empty() {
            return Err(Error::detection(format!(
                "Form {} has no resolvable action URL",
                form.index
            )));
        }

        let format = classify_form(form);
        let csrf_token = form
            .csrf_token
            .as_ref()
            .map(|t| t.value.clone())
            .filter(|v| !v.is_empty())
            .or_else(|| self.context.csrf_token().map(String::from));

        let mut params = Vec::new();
        let body = match format {
            BodyFormat::Multipart => multipart_preview(form)?,
            BodyFormat::UrlEncoded => form
                .all_fields()
                .map(|f| format!("{}={}", encode_component(&f.name), encode_component(&field_value(f))))
                .collect::<Vec<_>>()
                .join("&"),
            BodyFormat::Json => serde_json::to_string_pretty(&json_body(form))?,
            BodyFormat::None => {
                params = form
                    .all_fields()
                    .map(|f| KeyValue::new(&f.name, field_value(f)))
                    .collect();
                String::new()
            }
        };

        Ok(RequestSuggestion {
            method: form.method.clone(),
            url: form.action_url.clone(),
            headers: self.headers(format.content_type(), csrf_token.as_deref()),
            params,
            body,
            body_format: format,
            description: describe_form(form, index),
            has_file_uploads: form.context.has_file_upload,
            is_ajax: form.context.is_ajax,
            csrf_token,
        })
    }

    fn from_link(&self, link: &EndpointLink) -> Result<RequestSuggestion> {
        let method = link.method.to_uppercase();
        let carries_body = matches!(method.as_str(), "POST" | "PUT" | "PATCH");

        let (format, body, params) = if carries_body {
            let sample = json!({
                "name": sample_value(&FieldType::Text, "name"),
                "email": sample_value(&FieldType::Email, "email"),
            });
            (BodyFormat::Json, serde_json::to_string_pretty(&sample)?, Vec::new())
        } else if method == "GET" {
            let params = vec![
                KeyValue::disabled("page", "1"),
                KeyValue::disabled("limit", "10"),
                KeyValue::disabled("search", ""),
            ];
            (BodyFormat::None, String::new(), params)
        } else {
            (BodyFormat::None, String::new(), Vec::new())
        };

        let csrf_token = self.context.csrf_token().map(String::from);
        let label = if link.text.is_empty() { &link.url } else { &link.text };
        let description = match link.source {
            LinkSource::Guess => format!("Guessed endpoint: {} {}", method, link.url),
            _ => format!("{} endpoint from page link: {}", method, label),
        };

        Ok(RequestSuggestion {
            headers: self.headers(format.content_type(), csrf_token.as_deref()),
            method,
            url: link.url.clone(),
            params,
            body,
            body_format: format,
            description,
            has_file_uploads: false,
            is_ajax: is_ajax_url(&link.url),
            csrf_token,
        })
    }

    /// Content type first, then page headers, CSRF token, cookies
    fn headers(&self, content_type: Option<&str>, csrf_token: Option<&str>) -> Vec<KeyValue> {
        let mut headers = Vec::new();

        if let Some(ct) = content_type {
            headers.push(KeyValue::new("Content-Type", ct));
        }

        for (name, value) in self.context.required_headers.iter() {
            if name.eq_ignore_ascii_case("Content-Type") || name.eq_ignore_ascii_case(CSRF_HEADER) {
                continue;
            }
            headers.push(KeyValue::new(name, value));
        }

        if let Some(token) = csrf_token {
            headers.push(KeyValue::new(CSRF_HEADER, token));
        }

        if !self.context.cookies.is_empty() {
            headers.push(KeyValue::new("Cookie", &self.context.cookies));
        }

        headers
    }
}

/// Value sent for a field: markup value, `on` for toggles, else a sample
pub fn field_value(field: &FieldDescriptor) -> String {
    if let Some(value) = field.value() {
        return value.to_string();
    }
    match field.field_type {
        FieldType::Checkbox | FieldType::Radio => "on".to_string(),
        _ => sample_value(&field.field_type, &field.name),
    }
}

/// Percent-encode like `encodeURIComponent`
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn multipart_preview(form: &FormDescriptor) -> Result<String> {
    let mut parts: Vec<FormPart> = form
        .all_fields()
        .map(|f| {
            let value = if f.field_type == FieldType::File {
                String::new()
            } else {
                field_value(f)
            };
            FormPart::new(&f.name, value, f.field_type.as_str())
        })
        .collect();
    parts.push(FormPart::new("", "", "text"));

    Ok(serde_json::to_string_pretty(&parts)?)
}

fn json_body(form: &FormDescriptor) -> Value {
    let mut body = Map::new();

    for field in form.all_fields() {
        let value = json_value(field);

        match field.name.find('[').filter(|&pos| pos > 0) {
            Some(pos) => {
                let prefix = field.name[..pos].to_string();
                match body.get_mut(&prefix) {
                    Some(Value::Array(items)) => items.push(value),
                    Some(existing) => {
                        let first = existing.take();
                        *existing = Value::Array(vec![first, value]);
                    }
                    None => {
                        body.insert(prefix, Value::Array(vec![value]));
                    }
                }
            }
            None => {
                body.insert(field.name.clone(), value);
            }
        }
    }

    Value::Object(body)
}

fn json_value(field: &FieldDescriptor) -> Value {
    let raw = field_value(field);

    if field.field_type.is_numeric() {
        if let Ok(n) = raw.trim().parse::<i64>() {
            return Value::from(n);
        }
        if let Some(n) = raw.trim().parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Value::Number(n);
        }
    }

    if field.field_type == FieldType::Checkbox {
        return Value::Bool(raw == "on" || raw == "true");
    }

    Value::String(raw)
}

fn describe_form(form: &FormDescriptor, index: usize) -> String {
    let label = form
        .id
        .as_deref()
        .or(form.name.as_deref())
        .map(|n| format!("\"{}\"", n))
        .unwrap_or_else(|| format!("#{}", index + 1));

    let mut description = format!(
        "{} form {} with {} field{}",
        form.method,
        label,
        form.fields.len(),
        if form.fields.len() == 1 { "" } else { "s" }
    );
    if !form.hidden_fields.is_empty() {
        description.push_str(&format!(" and {} hidden", form.hidden_fields.len()));
    }

    let mut flags = Vec::new();
    if form.context.is_modal {
        flags.push("from modal");
    }
    if form.context.has_file_upload {
        flags.push("file upload");
    }
    if form.context.is_ajax {
        flags.push("AJAX");
    }
    if form.csrf_token.is_some() {
        flags.push("CSRF protected");
    }
    if !flags.is_empty() {
        description.push_str(&format!(" ({})", flags.join(", ")));
    }

    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html_with_url, Document};
    use crate::page::scanner::scan_document;
    use url::Url;

    fn page(html: &str) -> Document {
        let url = Url::parse("https://example.com/signup").unwrap();
        parse_html_with_url(html, Some(url)).unwrap()
    }

    fn first_suggestion(doc: &Document) -> RequestSuggestion {
        let scan = scan_document(doc);
        let context = PageContext::extract(doc);
        let candidate = match scan.forms.first() {
            Some(form) => Candidate::Form(form),
            None => Candidate::Link(&scan.api_endpoints[0]),
        };
        Synthesizer::new(&context).synthesize(candidate, 0).unwrap()
    }

    #[test]
    fn test_urlencoded_form_scenario() {
        let doc = page(
            r#"<form action="/submit" method="POST">
                <input type="email" name="email">
                <input type="hidden" name="csrf_token" value="abc123">
            </form>"#,
        );

        let s = first_suggestion(&doc);
        assert_eq!(s.method, "POST");
        assert_eq!(s.url, "https://example.com/submit");
        assert_eq!(s.body_format, BodyFormat::UrlEncoded);
        assert_eq!(s.body, "csrf_token=abc123&email=user%40example.com");
        assert_eq!(s.header("Content-Type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(s.header("X-CSRF-TOKEN"), Some("abc123"));
        assert_eq!(s.csrf_token.as_deref(), Some("abc123"));
        assert!(s.params.is_empty());
        assert!(s.description.contains("1 hidden"));
    }

    #[test]
    fn test_urlencoded_round_trip() {
        let doc = page(
            r#"<form method="post">
                <input name="q" value="a&b=c d+e">
                <input name="ünï" value="100% sure">
                <input type="checkbox" name="agree">
            </form>"#,
        );

        let s = first_suggestion(&doc);
        let decoded: Vec<(String, String)> = url::form_urlencoded::parse(s.body.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(
            decoded,
            vec![
                ("q".to_string(), "a&b=c d+e".to_string()),
                ("ünï".to_string(), "100% sure".to_string()),
                ("agree".to_string(), "on".to_string()),
            ]
        );
    }

    #[test]
    fn test_header_order() {
        let doc = page(r#"<meta name="csrf-token" content="meta-tok"><form method="post"><input name="q"></form>"#)
            .with_cookie("sid=42");

        let s = first_suggestion(&doc);
        let keys: Vec<_> = s.headers.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "Content-Type",
                "X-Requested-With",
                "Accept",
                "Cache-Control",
                "Referer",
                "Origin",
                "X-CSRF-TOKEN",
                "Cookie"
            ]
        );
        assert_eq!(s.header("X-CSRF-TOKEN"), Some("meta-tok"));
        assert_eq!(s.header("Cookie"), Some("sid=42"));
    }

    #[test]
    fn test_form_token_beats_meta_token() {
        let doc = page(
            r#"<meta name="csrf-token" content="meta-tok">
               <form method="post"><input type="hidden" name="authenticity_token" value="form-tok"></form>"#,
        );
        let s = first_suggestion(&doc);
        assert_eq!(s.header("X-CSRF-TOKEN"), Some("form-tok"));
        assert_eq!(s.headers.iter().filter(|h| h.key == CSRF_HEADER).count(), 1);
    }

    #[test]
    fn test_get_form_uses_params() {
        let doc = page(r#"<form action="/search"><input type="search" name="q"><input name="lang" value="en"></form>"#);
        let s = first_suggestion(&doc);

        assert_eq!(s.method, "GET");
        assert_eq!(s.body_format, BodyFormat::None);
        assert!(s.body.is_empty());
        assert!(s.header("Content-Type").is_none());
        assert_eq!(s.params, vec![KeyValue::new("q", "search query"), KeyValue::new("lang", "en")]);
    }

    #[test]
    fn test_ajax_get_form_keeps_nested_fields_on_query() {
        use crate::suggest::editor::RequestDraft;
        use std::time::Duration;

        let doc = page(r#"<form action="/api/search"><input name="filter[q]" value="rust"></form>"#);
        let s = first_suggestion(&doc);

        assert!(s.is_ajax);
        assert_eq!(s.method, "GET");
        assert_eq!(s.body_format, BodyFormat::None);
        assert!(s.body.is_empty());
        assert_eq!(s.params, vec![KeyValue::new("filter[q]", "rust")]);

        let spec = RequestDraft::from(s).to_spec(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&spec.url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("filter[q]".to_string(), "rust".to_string())]);
        assert!(spec.body.is_none());
    }

    #[test]
    fn test_multipart_preview() {
        let doc = page(
            r#"<form method="post" action="/upload">
                <input type="file" name="avatar">
                <input name="caption" value="Me">
                <input type="hidden" name="_token" value="t">
            </form>"#,
        );

        let s = first_suggestion(&doc);
        assert_eq!(s.body_format, BodyFormat::Multipart);
        assert!(s.has_file_uploads);
        assert_eq!(s.header("Content-Type"), Some("multipart/form-data"));

        let parts = crate::http::multipart::parse_preview(&s.body).unwrap();
        let keys: Vec<_> = parts.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["_token", "avatar", "caption", ""]);
        assert_eq!(parts[1].field_type, "file");
        assert_eq!(parts[2].value, "Me");
    }

    #[test]
    fn test_json_body_coercion() {
        let doc = page(
            r#"<form method="post" action="/api/profile">
                <input type="number" name="user.age" value="31">
                <input type="range" name="volume">
                <input type="checkbox" name="newsletter" value="true">
                <input type="checkbox" name="terms" value="yes">
                <input type="checkbox" name="tags[]" value="rust">
                <input type="checkbox" name="tags[]" value="web">
                <input name="user[name]">
            </form>"#,
        );

        let s = first_suggestion(&doc);
        assert_eq!(s.body_format, BodyFormat::Json);
        assert!(s.is_ajax);

        let body: Value = serde_json::from_str(&s.body).unwrap();
        assert_eq!(body["user.age"], json!(31));
        assert_eq!(body["volume"], json!(50));
        assert_eq!(body["newsletter"], json!(true));
        assert_eq!(body["terms"], json!(false));
        assert_eq!(body["tags"], json!([false, false]));
        assert_eq!(body["user"], json!(["John Doe"]));
        assert_eq!(s.reclassify().unwrap(), BodyFormat::Json);
    }

    #[test]
    fn test_link_suggestions() {
        let doc = page(
            r#"<a href="/api/items">List items</a>
               <button data-url="/api/items" data-method="post">Create</button>"#,
        );
        let scan = scan_document(&doc);
        let context = PageContext::extract(&doc);
        let synth = Synthesizer::new(&context);

        let get = synth.synthesize(Candidate::Link(&scan.api_endpoints[0]), 0).unwrap();
        assert_eq!(get.body_format, BodyFormat::None);
        assert_eq!(get.params.len(), 3);
        assert!(get.params.iter().all(|p| !p.enabled));
        assert!(get.is_ajax);
        assert!(get.description.contains("List items"));

        let post = synth.synthesize(Candidate::Link(&scan.api_endpoints[1]), 1).unwrap();
        assert_eq!(post.method, "POST");
        assert_eq!(post.body_format, BodyFormat::Json);
        assert_eq!(post.header("Content-Type"), Some("application/json"));
        let body: Value = serde_json::from_str(&post.body).unwrap();
        assert_eq!(body, json!({"name": "John Doe", "email": "user@example.com"}));
    }

    #[test]
    fn test_form_without_url_fails() {
        let doc = crate::dom::parse_html(r#"<form method="post"><input name="q"></form>"#).unwrap();
        let scan = scan_document(&doc);
        let context = PageContext::extract(&doc);
        let err = Synthesizer::new(&context)
            .synthesize(Candidate::Form(&scan.forms[0]), 0)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Detection);
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(encode_component("(it's)~*!"), "(it's)~*!");
        assert_eq!(encode_component("é"), "%C3%A9");
    }
}
