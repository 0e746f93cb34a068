// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Completion-assisted request generation
//!
//! Describes a scanned page, or a free-text request description, to the
//! chat-completions provider and turns the JSON object it answers with
//! (`{method, url, headers, body}`) into a [`RequestSuggestion`].

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::format::{is_ajax_url, BodyFormat};
use super::synth::{KeyValue, RequestSuggestion};
use crate::error::{Error, Result};
use crate::http::dispatcher::Dispatcher;
use crate::http::request::HttpRequestSpec;
use crate::http::response::{HttpResponseEnvelope, ResponseBody};
use crate::page::context::CSRF_HEADER;
use crate::page::scanner::PageAnalysis;

/// System prompt for page-derived requests
pub const PAGE_SYSTEM_PROMPT: &str =
    "Generate API requests from webpage analysis. Return only JSON.";

/// System prompt for free-text requests
pub const PROMPT_SYSTEM_PROMPT: &str = "You are an API expert. Help create API requests based on \
     user descriptions. Return only valid JSON with method, url, headers, and body fields.";

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"```(?:json)?\n?").unwrap();
}

/// Sampling settings for one completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Sampling {
    /// Settings for page-derived requests
    pub const PAGE: Sampling = Sampling {
        max_tokens: 800,
        temperature: 0.3,
    };

    /// Settings for free-text requests
    pub const PROMPT: Sampling = Sampling {
        max_tokens: 500,
        temperature: 0.7,
    };
}

/// Prompt describing a scanned page
pub fn page_prompt(analysis: &PageAnalysis) -> String {
    let forms = analysis
        .forms
        .iter()
        .map(|form| {
            let fields = form
                .all_fields()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("Action: {} {}, Fields: {}", form.method, form.action_url, fields)
        })
        .collect::<Vec<_>>()
        .join("; ");

    let inputs = analysis
        .forms
        .iter()
        .flat_map(|form| form.all_fields())
        .map(|f| format!("{}: {}", f.name, f.field_type.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Analyze this webpage and generate an API request:\n\
         PAGE: {}\n\
         URL: {}\n\
         FORMS: {}\n\
         INPUTS: {}\n\n\
         Generate JSON with: method, url, headers, body",
        analysis.title,
        analysis.url.as_deref().unwrap_or_default(),
        forms,
        inputs
    )
}

/// Message content of the first completion choice
pub fn completion_content(response: &HttpResponseEnvelope) -> Result<&str> {
    let body = response
        .body
        .as_json()
        .ok_or_else(|| Error::parse("Completion response is not JSON"))?;

    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .ok_or_else(|| Error::parse("Completion response has no message content"))
}

/// Parse completion text into a suggestion
///
/// Markdown code fences are stripped first. A missing method is left blank so
/// the caller decides the default; a non-string body is pretty-printed JSON.
pub fn parse_suggestion(content: &str) -> Result<RequestSuggestion> {
    let cleaned = CODE_FENCE.replace_all(content, "");
    let value: Value = serde_json::from_str(cleaned.trim())
        .map_err(|e| Error::parse(format!("Completion is not a JSON request: {}", e)))?;
    let Value::Object(request) = value else {
        return Err(Error::parse("Completion JSON is not an object"));
    };

    let method = request
        .get("method")
        .and_then(Value::as_str)
        .map(|m| m.trim().to_uppercase())
        .unwrap_or_default();
    let url = request
        .get("url")
        .and_then(Value::as_str)
        .map(|u| u.trim().to_string())
        .unwrap_or_default();

    let headers = match request.get("headers") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, value)| match value {
                Value::String(s) => KeyValue::new(name, s),
                other => KeyValue::new(name, other.to_string()),
            })
            .collect(),
        Some(_) => return Err(Error::parse("Completion headers must be an object")),
    };

    let body = match request.get("body") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => serde_json::to_string_pretty(other)?,
    };

    let target = [method.as_str(), url.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut suggestion = RequestSuggestion {
        description: format!("Assisted request: {}", target),
        is_ajax: is_ajax_url(&url),
        method,
        url,
        headers,
        params: Vec::new(),
        body,
        body_format: BodyFormat::None,
        has_file_uploads: false,
        csrf_token: None,
    };
    suggestion.csrf_token = suggestion.header(CSRF_HEADER).map(String::from);
    suggestion.body_format = suggestion.reclassify().unwrap_or_else(|e| {
        debug!("Assisted body kept as raw text: {}", e);
        BodyFormat::None
    });

    Ok(suggestion)
}

/// Generates suggestions through the completions provider
pub struct Assistant<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> Assistant<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Chat-completions request for one system/user exchange
    pub fn completion_request(&self, system: &str, prompt: &str, sampling: Sampling) -> Result<HttpRequestSpec> {
        let config = self.dispatcher.config();
        let body = json!({
            "model": config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "max_tokens": sampling.max_tokens,
            "temperature": sampling.temperature,
        });

        Ok(HttpRequestSpec::new("POST", config.provider_endpoint(COMPLETIONS_PATH))
            .header("Content-Type", "application/json")
            .timeout(config.default_timeout)
            .body(serde_json::to_string(&body)?))
    }

    /// Completion request describing a scanned page
    pub fn page_request(&self, analysis: &PageAnalysis) -> Result<HttpRequestSpec> {
        self.completion_request(PAGE_SYSTEM_PROMPT, &page_prompt(analysis), Sampling::PAGE)
    }

    /// Completion request for a free-text description
    pub fn prompt_request(&self, prompt: &str) -> Result<HttpRequestSpec> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::other("Describe the request to generate"));
        }
        self.completion_request(PROMPT_SYSTEM_PROMPT, prompt, Sampling::PROMPT)
    }

    /// Suggest a request for a scanned page
    pub async fn suggest_for_page(
        &self,
        analysis: &PageAnalysis,
        api_key: Option<&str>,
    ) -> Result<RequestSuggestion> {
        if analysis.total_forms == 0 && analysis.total_inputs == 0 {
            return Err(Error::detection("No forms detected on this page"));
        }
        let spec = self.page_request(analysis)?;
        self.complete(&spec, api_key).await
    }

    /// Suggest a request from a free-text description
    pub async fn suggest_from_prompt(&self, prompt: &str, api_key: Option<&str>) -> Result<RequestSuggestion> {
        let spec = self.prompt_request(prompt)?;
        self.complete(&spec, api_key).await
    }

    async fn complete(&self, spec: &HttpRequestSpec, api_key: Option<&str>) -> Result<RequestSuggestion> {
        info!("Requesting completion from {}", spec.url);
        let response = self.dispatcher.dispatch(spec, api_key).await?;

        if !response.is_success() {
            let detail = provider_error(&response);
            return Err(match response.status {
                401 | 403 => Error::config(format!(
                    "Provider rejected the API key ({}): {}",
                    response.status, detail
                )),
                status => Error::other(format!("Provider error ({}): {}", status, detail)),
            });
        }

        let suggestion = parse_suggestion(completion_content(&response)?)?;
        debug!("Assisted suggestion: {} {}", suggestion.method, suggestion.url);
        Ok(suggestion)
    }
}

fn provider_error(response: &HttpResponseEnvelope) -> String {
    match &response.body {
        ResponseBody::Json(value) => value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| value.to_string()),
        ResponseBody::Text(text) => text.clone(),
    }
}
