// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request suggestions
//!
//! Classifies body formats, generates sample values and synthesizes editable
//! request drafts from scanned forms and links, optionally with help from a
//! completions provider.

pub mod assist;
pub mod editor;
pub mod format;
pub mod pipeline;
pub mod sample;
pub mod synth;

pub use assist::{parse_suggestion, Assistant};
pub use editor::{EditorMessage, EditorState, RequestDraft};
pub use format::{classify_body, classify_form, BodyFormat};
pub use pipeline::{detect_from_html, detect_suggestions, DetectionResponse, MAX_SUGGESTIONS};
pub use sample::sample_value;
pub use synth::{Candidate, KeyValue, RequestSuggestion, Synthesizer};
