// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request editing state
//!
//! The editor is a plain value advanced by messages: suggestions arrive, one
//! is selected into the draft, the draft is edited, and finally turned into
//! an [`HttpRequestSpec`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::format::BodyFormat;
use super::synth::{KeyValue, RequestSuggestion};
use crate::error::{Error, Result};
use crate::http::multipart;
use crate::http::request::HttpRequestSpec;

/// The request currently being edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub method: String,
    pub url: String,
    pub headers: Vec<KeyValue>,
    pub params: Vec<KeyValue>,
    pub body: String,
    pub body_format: BodyFormat,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            url: String::new(),
            headers: Vec::new(),
            params: Vec::new(),
            body: String::new(),
            body_format: BodyFormat::None,
        }
    }
}

impl From<RequestSuggestion> for RequestDraft {
    fn from(s: RequestSuggestion) -> Self {
        let method = if s.method.trim().is_empty() {
            "POST".to_string()
        } else {
            s.method
        };
        Self {
            method,
            url: s.url,
            headers: s.headers,
            params: s.params,
            body: s.body,
            body_format: s.body_format,
        }
    }
}

impl RequestDraft {
    /// Build the dispatch request
    ///
    /// Scheme-less URLs get `https://`. Enabled params with a key are set on
    /// the query string, enabled headers with a key become the header map,
    /// and a multipart preview body is encoded for the wire.
    pub fn to_spec(&self, timeout: Duration) -> Result<HttpRequestSpec> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(Error::other("Request URL is empty"));
        }
        let mut url = Url::parse(&with_scheme(raw))?;

        let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        for param in self.params.iter().filter(|p| p.enabled && !p.key.is_empty()) {
            match pairs.iter_mut().find(|(k, _)| *k == param.key) {
                Some(pair) => pair.1 = param.value.clone(),
                None => pairs.push((param.key.clone(), param.value.clone())),
            }
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().clear().extend_pairs(&pairs);
        }

        let mut headers: BTreeMap<String, String> = self
            .headers
            .iter()
            .filter(|h| h.enabled && !h.key.trim().is_empty())
            .map(|h| (h.key.trim().to_string(), h.value.clone()))
            .collect();

        let mut spec = HttpRequestSpec::new(&self.method, url.to_string()).timeout(timeout);

        if spec.permits_body() && !self.body.trim().is_empty() {
            let body = if self.body_format == BodyFormat::Multipart {
                let encoded = multipart::encode(&multipart::parse_preview(&self.body)?);
                headers.retain(|k, _| !k.eq_ignore_ascii_case("Content-Type"));
                headers.insert("Content-Type".to_string(), encoded.content_type());
                encoded.body
            } else {
                self.body.clone()
            };
            spec.body = Some(body);
        }
        spec.headers = headers;

        Ok(spec)
    }

    /// Overlay a suggestion: a blank method or URL keeps the current one,
    /// headers are upserted by name, and the body is replaced
    pub fn merge(&mut self, s: RequestSuggestion) {
        if !s.method.trim().is_empty() {
            self.method = s.method.trim().to_uppercase();
        }
        if !s.url.trim().is_empty() {
            self.url = s.url;
        }
        for header in s.headers {
            match self
                .headers
                .iter_mut()
                .find(|h| h.key.eq_ignore_ascii_case(&header.key))
            {
                Some(existing) => *existing = header,
                None => self.headers.push(header),
            }
        }
        self.body = s.body;
        self.body_format = s.body_format;
    }
}

fn with_scheme(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Editor input
#[derive(Debug, Clone, PartialEq)]
pub enum EditorMessage {
    /// Replace the suggestion list
    SuggestionsLoaded(Vec<RequestSuggestion>),
    /// Copy a suggestion into the draft
    SelectSuggestion(usize),
    /// Overlay an assisted suggestion on the current draft
    MergeSuggestion(RequestSuggestion),
    SetMethod(String),
    SetUrl(String),
    SetBody(String),
    SetBodyFormat(BodyFormat),
    AddHeader,
    UpdateHeader(usize, KeyValue),
    RemoveHeader(usize),
    AddParam,
    UpdateParam(usize, KeyValue),
    RemoveParam(usize),
    /// Pretty-print the JSON body
    FormatJson,
}

/// Draft plus pending suggestions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub draft: RequestDraft,
    pub suggestions: Vec<RequestSuggestion>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one message, producing the next state
    pub fn update(mut self, msg: EditorMessage) -> Result<Self> {
        match msg {
            EditorMessage::SuggestionsLoaded(suggestions) => self.suggestions = suggestions,
            EditorMessage::SelectSuggestion(index) => {
                if index >= self.suggestions.len() {
                    return Err(Error::other(format!("No suggestion at index {}", index)));
                }
                let chosen = self.suggestions.swap_remove(index);
                self.draft = RequestDraft::from(chosen);
                self.suggestions.clear();
            }
            EditorMessage::MergeSuggestion(suggestion) => self.draft.merge(suggestion),
            EditorMessage::SetMethod(method) => self.draft.method = method.trim().to_uppercase(),
            EditorMessage::SetUrl(url) => {
                if self.draft.params.is_empty() {
                    if let Ok(parsed) = Url::parse(&with_scheme(url.trim())) {
                        self.draft.params = parsed
                            .query_pairs()
                            .map(|(k, v)| KeyValue::new(k, v))
                            .collect();
                    }
                }
                self.draft.url = url;
            }
            EditorMessage::SetBody(body) => self.draft.body = body,
            EditorMessage::SetBodyFormat(format) => self.draft.body_format = format,
            EditorMessage::AddHeader => self.draft.headers.push(KeyValue::empty()),
            EditorMessage::UpdateHeader(index, row) => *row_mut(&mut self.draft.headers, index)? = row,
            EditorMessage::RemoveHeader(index) => {
                row_mut(&mut self.draft.headers, index)?;
                self.draft.headers.remove(index);
            }
            EditorMessage::AddParam => self.draft.params.push(KeyValue::empty()),
            EditorMessage::UpdateParam(index, row) => *row_mut(&mut self.draft.params, index)? = row,
            EditorMessage::RemoveParam(index) => {
                row_mut(&mut self.draft.params, index)?;
                self.draft.params.remove(index);
            }
            EditorMessage::FormatJson => {
                let value: serde_json::Value = serde_json::from_str(&self.draft.body)
                    .map_err(|e| Error::parse(format!("Invalid JSON: {}", e)))?;
                self.draft.body = serde_json::to_string_pretty(&value)?;
            }
        }
        Ok(self)
    }
}

fn row_mut(rows: &mut [KeyValue], index: usize) -> Result<&mut KeyValue> {
    rows.get_mut(index)
        .ok_or_else(|| Error::other(format!("No row at index {}", index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::suggest::pipeline::canned_suggestions;

    fn loaded() -> EditorState {
        EditorState::new()
            .update(EditorMessage::SuggestionsLoaded(canned_suggestions()))
            .unwrap()
    }

    #[test]
    fn test_select_suggestion() {
        let state = loaded().update(EditorMessage::SelectSuggestion(1)).unwrap();
        assert_eq!(state.draft.method, "POST");
        assert_eq!(state.draft.body_format, BodyFormat::Json);
        assert!(state.suggestions.is_empty());

        assert!(loaded().update(EditorMessage::SelectSuggestion(9)).is_err());
    }

    #[test]
    fn test_merge_suggestion_keeps_blank_fields() {
        let state = EditorState::new()
            .update(EditorMessage::SetMethod("patch".into()))
            .and_then(|s| s.update(EditorMessage::SetUrl("https://api.example.com/me".into())))
            .and_then(|s| s.update(EditorMessage::AddHeader))
            .and_then(|s| s.update(EditorMessage::UpdateHeader(0, KeyValue::new("accept", "text/html"))))
            .unwrap();

        let assisted = crate::suggest::assist::parse_suggestion(
            r#"{"headers": {"Accept": "application/json", "X-Trace": "1"}, "body": {"name": "Ada"}}"#,
        )
        .unwrap();
        let state = state.update(EditorMessage::MergeSuggestion(assisted)).unwrap();

        assert_eq!(state.draft.method, "PATCH");
        assert_eq!(state.draft.url, "https://api.example.com/me");
        assert_eq!(
            state.draft.headers,
            vec![KeyValue::new("Accept", "application/json"), KeyValue::new("X-Trace", "1")]
        );
        assert_eq!(state.draft.body_format, BodyFormat::Json);
        assert!(state.draft.body.contains("\"name\": \"Ada\""));
    }

    #[test]
    fn test_blank_method_defaults_to_post() {
        let mut suggestion = canned_suggestions().remove(0);
        suggestion.method = String::new();
        assert_eq!(RequestDraft::from(suggestion).method, "POST");
    }

    #[test]
    fn test_set_url_seeds_params() {
        let state = EditorState::new()
            .update(EditorMessage::SetUrl("api.example.com/items?page=2&q=shoes".into()))
            .unwrap();
        assert_eq!(
            state.draft.params,
            vec![KeyValue::new("page", "2"), KeyValue::new("q", "shoes")]
        );

        // Existing params are left alone
        let state = state
            .update(EditorMessage::SetUrl("https://api.example.com/other?x=1".into()))
            .unwrap();
        assert_eq!(state.draft.params.len(), 2);
    }

    #[test]
    fn test_header_and_param_editing() {
        let state = EditorState::new()
            .update(EditorMessage::AddHeader)
            .and_then(|s| s.update(EditorMessage::UpdateHeader(0, KeyValue::new("X-A", "1"))))
            .and_then(|s| s.update(EditorMessage::AddHeader))
            .and_then(|s| s.update(EditorMessage::RemoveHeader(1)))
            .and_then(|s| s.update(EditorMessage::AddParam))
            .and_then(|s| s.update(EditorMessage::UpdateParam(0, KeyValue::disabled("p", "v"))))
            .unwrap();

        assert_eq!(state.draft.headers, vec![KeyValue::new("X-A", "1")]);
        assert_eq!(state.draft.params, vec![KeyValue::disabled("p", "v")]);
        assert!(state.clone().update(EditorMessage::RemoveParam(3)).is_err());
    }

    #[test]
    fn test_format_json() {
        let state = EditorState::new()
            .update(EditorMessage::SetBody(r#"{"a":1,"b":[true]}"#.into()))
            .and_then(|s| s.update(EditorMessage::FormatJson))
            .unwrap();
        assert_eq!(state.draft.body, "{\n  \"a\": 1,\n  \"b\": [\n    true\n  ]\n}");

        let err = state
            .update(EditorMessage::SetBody("{oops".into()))
            .and_then(|s| s.update(EditorMessage::FormatJson))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_to_spec() {
        let draft = RequestDraft {
            method: "POST".into(),
            url: "example.com/search?q=old".into(),
            headers: vec![
                KeyValue::new("Content-Type", "application/json"),
                KeyValue::disabled("X-Off", "1"),
                KeyValue::new("", "orphan"),
            ],
            params: vec![
                KeyValue::new("q", "new"),
                KeyValue::new("page", "2"),
                KeyValue::disabled("limit", "10"),
            ],
            body: "{}".into(),
            body_format: BodyFormat::Json,
        };

        let spec = draft.to_spec(Duration::from_secs(5)).unwrap();
        assert_eq!(spec.url, "https://example.com/search?q=new&page=2");
        assert_eq!(spec.headers.len(), 1);
        assert_eq!(spec.body.as_deref(), Some("{}"));
        assert_eq!(spec.timeout_ms, 5000);
    }

    #[test]
    fn test_to_spec_drops_body_for_get() {
        let draft = RequestDraft {
            url: "https://example.com".into(),
            body: "ignored".into(),
            ..Default::default()
        };
        assert!(draft.to_spec(Duration::from_secs(1)).unwrap().body.is_none());
        assert!(RequestDraft::default().to_spec(Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_to_spec_encodes_multipart() {
        let draft = RequestDraft {
            method: "POST".into(),
            url: "https://example.com/upload".into(),
            headers: vec![KeyValue::new("content-type", "multipart/form-data")],
            params: Vec::new(),
            body: r#"[{"key":"caption","value":"hi","type":"text"},{"key":"","value":"","type":"text"}]"#
                .into(),
            body_format: BodyFormat::Multipart,
        };

        let spec = draft.to_spec(Duration::from_secs(1)).unwrap();
        let content_type = spec.header_value("Content-Type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(spec.headers.len(), 1);
        let body = spec.body.unwrap();
        assert!(body.contains("name=\"caption\"\r\n\r\nhi\r\n"));
    }
}
