// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Dispatch response types

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// Response body: parsed JSON or raw text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Decode a body according to its content type
    ///
    /// A response that claims JSON but does not parse is an error, not text.
    pub fn decode(content_type: Option<&str>, body: &Bytes) -> Result<Self> {
        let is_json = content_type
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("application/json") || ct.contains("+json")
            })
            .unwrap_or(false);

        if is_json && !body.is_empty() {
            return serde_json::from_slice(body)
                .map(ResponseBody::Json)
                .map_err(|e| Error::parse(format!("Invalid JSON response: {}", e)));
        }

        Ok(ResponseBody::Text(String::from_utf8_lossy(body).into_owned()))
    }

    pub fn is_json(&self) -> bool {
        matches!(self, ResponseBody::Json(_))
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(s) => Some(s),
            ResponseBody::Json(_) => None,
        }
    }
}

/// Normalised dispatch result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponseEnvelope {
    /// Status code
    pub status: u16,
    /// Canonical reason phrase
    pub status_text: String,
    /// Response headers (repeated headers joined with `, `)
    pub headers: BTreeMap<String, String>,
    /// Decoded body
    pub body: ResponseBody,
    /// URL after redirects
    pub final_url: String,
    /// Time from send to fully read body
    pub elapsed_ms: u64,
    /// When the response completed
    pub received_at: DateTime<Utc>,
}

impl HttpResponseEnvelope {
    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Flatten a reqwest header map
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    flat
}

/// Wire envelope: success or a structured error, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DispatchReply {
    Success {
        status: u16,
        #[serde(rename = "statusText")]
        status_text: String,
        headers: BTreeMap<String, String>,
        data: ResponseBody,
        url: String,
    },
    Failure {
        error: bool,
        message: String,
        status: u16,
        kind: ErrorKind,
    },
}

impl DispatchReply {
    /// Build the reply for a dispatch outcome
    pub fn from_result(result: Result<HttpResponseEnvelope>) -> Self {
        match result {
            Ok(response) => response.into(),
            Err(e) => e.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DispatchReply::Failure { .. })
    }
}

impl From<HttpResponseEnvelope> for DispatchReply {
    fn from(r: HttpResponseEnvelope) -> Self {
        DispatchReply::Success {
            status: r.status,
            status_text: r.status_text,
            headers: r.headers,
            data: r.body,
            url: r.final_url,
        }
    }
}

impl From<Error> for DispatchReply {
    fn from(e: Error) -> Self {
        let kind = e.kind();
        let message = match (&e, kind) {
            (_, ErrorKind::Timeout) => "Request timeout".to_string(),
            (_, ErrorKind::Network) => "Network error or CORS issue".to_string(),
            (Error::Configuration(msg), _) => msg.clone(),
            (Error::Parse(msg), _) => msg.clone(),
            _ => {
                let text = e.to_string();
                if text.trim().is_empty() {
                    "Request failed".to_string()
                } else {
                    text
                }
            }
        };

        DispatchReply::Failure {
            error: true,
            message,
            status: 0,
            kind,
        }
    }
}
