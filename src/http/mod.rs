// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP dispatch layer
//!
//! Executes edited request drafts with a hard timeout, provider credential
//! injection and response normalisation.

pub mod config;
pub mod dispatcher;
pub mod multipart;
pub mod request;
pub mod response;

pub use config::{DispatchConfig, DEFAULT_USER_AGENT};
pub use dispatcher::Dispatcher;
pub use multipart::{FormPart, MultipartBody};
pub use request::{HttpRequestSpec, DEFAULT_TIMEOUT_MS};
pub use response::{DispatchReply, HttpResponseEnvelope, ResponseBody};

