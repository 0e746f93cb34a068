// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request dispatcher
//!
//! Sends one [`HttpRequestSpec`] with a hard deadline and normalises the
//! response. No retries; every failure maps onto a stable error kind.

use std::time::Instant;

use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::config::DispatchConfig;
use super::request::HttpRequestSpec;
use super::response::{flatten_headers, DispatchReply, HttpResponseEnvelope, ResponseBody};
use crate::error::{Error, ErrorContext, Result};

const AUTHORIZATION: &str = "Authorization";

/// Executes request specs
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Create a dispatcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(DispatchConfig::default())
    }

    /// Create a dispatcher with custom configuration
    pub fn with_config(config: DispatchConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(Policy::limited(10))
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Get dispatcher configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Apply provider credentials
    ///
    /// Requests to a provider host without an `Authorization` header get a
    /// bearer token from `api_key`, else from the configuration. With neither,
    /// this fails before anything touches the network.
    pub fn prepare(&self, spec: &HttpRequestSpec, api_key: Option<&str>) -> Result<HttpRequestSpec> {
        let url = spec.parsed_url()?;
        let mut spec = spec.clone();

        if spec.timeout_ms == 0 {
            spec.timeout_ms = self.config.default_timeout.as_millis() as u64;
        }

        let Some(host) = url.host_str() else {
            return Ok(spec);
        };
        if !self.config.is_provider_host(host) || spec.has_header(AUTHORIZATION) {
            return Ok(spec);
        }

        let key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or(self.config.api_key.as_deref())
            .ok_or_else(|| {
                Error::config(format!(
                    "API key required for {}. Pass --api-key or set {}",
                    host,
                    super::config::ENV_API_KEY
                ))
            })?;

        debug!("Injecting bearer token for provider host {}", host);
        spec.headers
            .insert(AUTHORIZATION.to_string(), format!("Bearer {}", key));
        Ok(spec)
    }

    /// Send a request and normalise the response
    pub async fn dispatch(
        &self,
        spec: &HttpRequestSpec,
        api_key: Option<&str>,
    ) -> Result<HttpResponseEnvelope> {
        let spec = self.prepare(spec, api_key)?;
        let method = spec.parsed_method()?;
        let url = spec.parsed_url()?;

        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .headers(spec.header_map()?);

        if let Some(body) = spec.effective_body() {
            debug!("Request body ({} bytes): {}", body.len(), body);
            builder = builder.body(body.to_string());
        } else if spec.body.is_some() {
            debug!("Dropping body for {} request", method);
        }

        info!("{} {}", method, url);
        let start = Instant::now();

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let final_url = response.url().to_string();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, Error>((status, final_url, headers, body))
        };

        let (status, final_url, headers, body) =
            match tokio::time::timeout(spec.timeout_duration(), exchange).await {
                Ok(result) => result.map_err(transport_error).with_url(url.as_str())?,
                Err(_) => {
                    warn!("{} {} timed out after {}ms", method, url, spec.timeout_ms);
                    return Err(Error::timeout_with_url("dispatch", spec.timeout_ms, url.as_str()));
                }
            };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!("{} {} -> {} ({}ms)", method, url, status.as_u16(), elapsed_ms);

        let headers = flatten_headers(&headers);
        let content_type = headers.get("content-type").map(String::as_str);
        let body = ResponseBody::decode(content_type, &body)?;
        debug!("Response body is {}", if body.is_json() { "JSON" } else { "text" });

        Ok(HttpResponseEnvelope {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            final_url,
            elapsed_ms,
            received_at: chrono::Utc::now(),
        })
    }

    /// Send a request and fold the outcome into the wire envelope
    pub async fn dispatch_reply(&self, spec: &HttpRequestSpec, api_key: Option<&str>) -> DispatchReply {
        DispatchReply::from_result(self.dispatch(spec, api_key).await)
    }

    /// Send independent requests concurrently; results keep input order
    pub async fn dispatch_all(
        &self,
        specs: &[HttpRequestSpec],
        api_key: Option<&str>,
    ) -> Vec<Result<HttpResponseEnvelope>> {
        let futures: Vec<_> = specs.iter().map(|s| self.dispatch(s, api_key)).collect();
        futures::future::join_all(futures).await
    }

    /// Request that validates a provider API key
    pub fn credential_check(&self, api_key: &str) -> Result<HttpRequestSpec> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::config("API key is empty"));
        }

        Ok(HttpRequestSpec::get(self.config.provider_endpoint("/v1/models"))
            .header(AUTHORIZATION, format!("Bearer {}", api_key)))
    }

    /// Check whether a provider API key is accepted
    ///
    /// A rejected key is `Ok(false)`; transport failures are errors.
    pub async fn verify_credentials(&self, api_key: &str) -> Result<bool> {
        let spec = self.credential_check(api_key)?;
        let response = self.dispatch(&spec, None).await?;
        if !response.is_success() {
            warn!("Provider rejected API key: {} {}", response.status, response.status_text);
        }
        Ok(response.is_success())
    }
}

fn transport_error(error: Error) -> Error {
    match error {
        Error::Http(e) if !e.is_timeout() => Error::network(e.to_string()),
        other => other,
    }
}
