// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page scanning
//!
//! Extracts forms, API-looking links and page-level request context from a
//! parsed [`Document`](crate::dom::Document).

pub mod context;
pub mod form;
pub mod link;
pub mod scanner;

pub use context::{HeaderList, PageContext, CSRF_HEADER};
pub use form::{CsrfToken, FieldDescriptor, FieldType, FormContext, FormDescriptor};
pub use link::{EndpointLink, LinkSource};
pub use scanner::{analyze_page, scan_document, scan_forms, PageAnalysis, PageScan};
