// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Dispatch request description

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default dispatch timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Final, serialisable request handed to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequestSpec {
    /// Request method
    pub method: String,
    /// Absolute request URL
    pub url: String,
    /// Request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request body, sent only for methods that carry one
    #[serde(default)]
    pub body: Option<String>,
    /// Timeout in milliseconds
    #[serde(rename = "timeout", default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl HttpRequestSpec {
    /// Create a new request with the default timeout
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into().to_uppercase(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    /// Timeout as a duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Header value (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header is present (case-insensitive)
    pub fn has_header(&self, name: &str) -> bool {
        self.header_value(name).is_some()
    }

    /// Whether the method conventionally carries a body
    pub fn permits_body(&self) -> bool {
        matches!(self.method.to_uppercase().as_str(), "POST" | "PUT" | "PATCH")
    }

    /// Body that will actually be sent
    pub fn effective_body(&self) -> Option<&str> {
        if self.permits_body() {
            self.body.as_deref()
        } else {
            None
        }
    }

    /// Parsed method
    pub fn parsed_method(&self) -> Result<Method> {
        Method::from_bytes(self.method.trim().to_uppercase().as_bytes())
            .map_err(|_| Error::parse(format!("Invalid HTTP method: {}", self.method)))
    }

    /// Parsed URL
    pub fn parsed_url(&self) -> Result<Url> {
        Ok(Url::parse(self.url.trim())?)
    }

    /// Headers as a reqwest header map; invalid entries are rejected
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| Error::parse(format!("Invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::parse(format!("Invalid value for header '{}': {}", name, e)))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req = HttpRequestSpec::new("post", "https://example.com/items");
        assert_eq!(req.method, "POST");
        assert_eq!(req.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(req.permits_body());
    }

    #[test]
    fn test_body_only_for_body_methods() {
        let get = HttpRequestSpec::get("https://example.com").body("ignored");
        assert_eq!(get.effective_body(), None);

        let patch = HttpRequestSpec::new("PATCH", "https://example.com").body("{}");
        assert_eq!(patch.effective_body(), Some("{}"));

        let delete = HttpRequestSpec::new("DELETE", "https://example.com").body("x");
        assert_eq!(delete.effective_body(), None);
    }

    #[test]
    fn test_header_lookup() {
        let req = HttpRequestSpec::get("https://example.com").header("Authorization", "Bearer x");
        assert!(req.has_header("authorization"));
        assert_eq!(req.header_map().unwrap().len(), 1);

        let bad = HttpRequestSpec::get("https://example.com").header("bad header", "v");
        assert!(bad.header_map().is_err());
    }

    #[test]
    fn test_wire_shape() {
        let req: HttpRequestSpec = serde_json::from_str(
            r#"{"method":"GET","url":"https://example.com","headers":{"Accept":"*/*"},"timeout":1}"#,
        )
        .unwrap();
        assert_eq!(req.timeout_duration(), Duration::from_millis(1));
        assert!(req.body.is_none());

        let minimal: HttpRequestSpec =
            serde_json::from_str(r#"{"method":"GET","url":"https://example.com"}"#).unwrap();
        assert_eq!(minimal.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(minimal.headers.is_empty());
    }

    #[test]
    fn test_invalid_method() {
        let req = HttpRequestSpec::new("GE T", "https://example.com");
        assert!(req.parsed_method().is_err());
    }
}
