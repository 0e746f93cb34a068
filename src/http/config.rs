// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Dispatcher configuration

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Environment variable holding the provider API key
pub const ENV_API_KEY: &str = "FORMCAST_API_KEY";

/// Environment variable overriding the default timeout (milliseconds)
pub const ENV_TIMEOUT_MS: &str = "FORMCAST_TIMEOUT_MS";

/// Environment variable overriding the provider base URL
pub const ENV_PROVIDER_URL: &str = "FORMCAST_PROVIDER_URL";

/// Environment variable overriding the completion model
pub const ENV_MODEL: &str = "FORMCAST_MODEL";

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("formcast/", env!("CARGO_PKG_VERSION"));

/// Hosts that receive an injected bearer token
pub const DEFAULT_PROVIDER_HOSTS: &[&str] = &["api.openai.com"];

/// Base URL of the chat-completions provider
pub const DEFAULT_PROVIDER_URL: &str = "https://api.openai.com";

/// Completion model used for assisted requests
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Dispatcher configuration
#[derive(Clone)]
pub struct DispatchConfig {
    /// Provider API key, injected as `Authorization: Bearer` for provider hosts
    pub api_key: Option<String>,
    /// Hosts (and their subdomains) that need the API key
    pub provider_hosts: Vec<String>,
    /// Provider base URL for completions and key checks
    pub provider_url: String,
    /// Completion model
    pub model: String,
    /// Timeout used when a request does not carry one
    pub default_timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Accept invalid TLS certificates
    pub accept_invalid_certs: bool,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider_hosts: DEFAULT_PROVIDER_HOSTS.iter().map(|h| h.to_string()).collect(),
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            default_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
            proxy: None,
        }
    }
}

impl fmt::Debug for DispatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider_hosts", &self.provider_hosts)
            .field("provider_url", &self.provider_url)
            .field("model", &self.model)
            .field("default_timeout", &self.default_timeout)
            .field("user_agent", &self.user_agent)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl DispatchConfig {
    /// Create a new dispatcher config
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `FORMCAST_API_KEY`, `FORMCAST_TIMEOUT_MS`, `FORMCAST_PROVIDER_URL`
    /// and `FORMCAST_MODEL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            config.api_key = Some(key.trim().to_string());
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                Error::config(format!("{} must be a number of milliseconds, got '{}'", ENV_TIMEOUT_MS, raw))
            })?;
            config.default_timeout = Duration::from_millis(ms);
        }

        if let Some(url) = lookup(ENV_PROVIDER_URL).filter(|u| !u.trim().is_empty()) {
            config = config.provider_url(url);
        }

        if let Some(model) = lookup(ENV_MODEL).filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }

        Ok(config)
    }

    /// Set the provider API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Add a provider host
    pub fn provider_host(mut self, host: impl Into<String>) -> Self {
        self.provider_hosts.push(host.into());
        self
    }

    /// Replace the provider host list
    pub fn provider_hosts(mut self, hosts: Vec<String>) -> Self {
        self.provider_hosts = hosts;
        self
    }

    /// Set the provider base URL; its host becomes a provider host
    pub fn provider_url(mut self, url: impl Into<String>) -> Self {
        self.provider_url = url.into().trim().trim_end_matches('/').to_string();
        if let Some(host) = Url::parse(&self.provider_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        {
            if !self.is_provider_host(&host) {
                self.provider_hosts.push(host);
            }
        }
        self
    }

    /// Set the completion model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Provider endpoint at `path`
    pub fn provider_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.provider_url, path.trim_start_matches('/'))
    }

    /// Set default timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Accept invalid TLS certificates (dangerous!)
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Whether `host` is a provider host or one of its subdomains
    pub fn is_provider_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.provider_hosts.iter().any(|p| {
            let p = p.to_ascii_lowercase();
            host == p || host.ends_with(&format!(".{}", p))
        })
    }
}
