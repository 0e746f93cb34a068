// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for formcast
//!
//! Every failure maps onto a small, stable [`ErrorKind`] so callers on the far
//! side of a serialization boundary can react without parsing messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for formcast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for formcast
#[derive(Error, Debug)]
pub enum Error {
    /// A required credential or setting is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation exceeded its deadline
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// Transport-level failure (DNS, TLS, refused connection, CORS-style rejection)
    #[error("Network error: {reason}")]
    Network { reason: String, url: Option<String> },

    /// HTTP client failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Malformed content where a structured format was declared or expected
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTML parsing failed
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// Selector parsing error
    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    /// Page scan or suggestion synthesis failed
    #[error("Detection error: {0}")]
    Detection(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Stable error taxonomy exposed across the dispatch boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Timeout,
    Network,
    Parse,
    Detection,
    Other,
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: None,
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(reason: S) -> Self {
        Error::Network {
            reason: reason.into(),
            url: None,
        }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a detection error
    pub fn detection<S: Into<String>>(msg: S) -> Self {
        Error::Detection(msg.into())
    }

    /// Create a selector error
    pub fn selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Selector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Collapse this error onto the stable taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            Error::Network { .. } | Error::Http(_) | Error::Url(_) => ErrorKind::Network,
            Error::Parse(_) => ErrorKind::Parse,
            Error::HtmlParse(_) | Error::Selector { .. } | Error::Detection(_) => {
                ErrorKind::Detection
            }
            Error::Serialization(_) | Error::Io(_) | Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url: Some(u), .. } => Some(u),
            Error::Network { url: Some(u), .. } => Some(u),
            Error::Http(e) => e.url().map(|u| u.as_str()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add URL context to error
    fn with_url(self, url: &str) -> Result<T>;

    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_url(self, url: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Timeout {
                operation,
                duration_ms,
                ..
            } => Error::Timeout {
                operation,
                duration_ms,
                url: Some(url.to_string()),
            },
            Error::Network { reason, .. } => Error::Network {
                reason,
                url: Some(url.to_string()),
            },
            other => other,
        })
    }

    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Detection(inner) => Error::Detection(format!("{}: {}", msg, inner)),
            other => Error::Other(format!("{}: {}", msg, other)),
        })
    }
}
