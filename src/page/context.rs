// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page-level request context
//!
//! Cookies, meta tags, CSRF-looking tokens and the baseline headers a
//! same-page XHR would carry.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::dom::Document;

/// Header used to echo anti-forgery tokens
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// Meta names that carry the page's anti-forgery token
const CSRF_META_NAMES: &[&str] = &["csrf-token", "_token"];

/// Ordered, case-insensitive header list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a header value (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing an existing one in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Remove a header
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.0.remove(pos).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for HeaderList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Page-level metadata used when synthesizing requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    /// Raw cookie string
    pub cookies: String,
    /// Meta `name`/`property` → `content`
    pub meta_tags: BTreeMap<String, String>,
    /// CSRF-looking meta values
    pub auth_tokens: BTreeMap<String, String>,
    /// Headers a same-page request would send
    pub required_headers: HeaderList,
}

impl PageContext {
    /// Extract context from a document
    pub fn extract(doc: &Document) -> Self {
        let mut ctx = Self {
            cookies: doc.cookie().to_string(),
            ..Default::default()
        };

        for meta in doc.metas() {
            let Some(name) = meta
                .get_attribute("name")
                .or_else(|| meta.get_attribute("property"))
                .filter(|n| !n.is_empty())
            else {
                continue;
            };
            let content = meta.get_attribute("content").unwrap_or_default();

            let lower = name.to_ascii_lowercase();
            if lower.contains("csrf") || lower.contains("token") {
                ctx.auth_tokens.insert(name.to_string(), content.to_string());
            }
            ctx.meta_tags.insert(name.to_string(), content.to_string());
        }

        let headers = &mut ctx.required_headers;
        headers.insert("Content-Type", crate::page::form::URLENCODED);
        headers.insert("X-Requested-With", "XMLHttpRequest");
        headers.insert("Accept", "application/json, text/javascript, */*; q=0.01");
        headers.insert("Cache-Control", "no-cache");

        if let Some(url) = doc.url.as_ref() {
            headers.insert("Referer", url.as_str());
            let origin = url.origin();
            if origin.is_tuple() {
                headers.insert("Origin", origin.ascii_serialization());
            }
        }

        let csrf = ctx.meta_tags.iter().find(|(name, value)| {
            !value.is_empty() && CSRF_META_NAMES.iter().any(|m| name.eq_ignore_ascii_case(m))
        });
        if let Some((_, token)) = csrf {
            ctx.required_headers.insert(CSRF_HEADER, token.clone());
        }

        debug!(
            "Page context: {} meta tags, {} auth tokens, {} headers",
            ctx.meta_tags.len(),
            ctx.auth_tokens.len(),
            ctx.required_headers.len()
        );

        ctx
    }

    /// Meta-derived CSRF token, if any
    pub fn csrf_token(&self) -> Option<&str> {
        self.required_headers.get(CSRF_HEADER)
    }
}
