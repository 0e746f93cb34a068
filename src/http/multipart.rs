// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! multipart/form-data encoding
//!
//! Suggestions carry multipart bodies as an editable JSON preview (a list of
//! [`FormPart`]); the real encoding happens right before dispatch.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// One editable multipart entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPart {
    pub key: String,
    #[serde(default)]
    pub value: String,
    /// Field type of the originating control (`file` parts become uploads)
    #[serde(rename = "type", default = "default_part_type")]
    pub field_type: String,
}

fn default_part_type() -> String {
    "text".to_string()
}

impl FormPart {
    pub fn new(key: impl Into<String>, value: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            field_type: field_type.into(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.field_type.eq_ignore_ascii_case("file")
    }
}

/// Encoded multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    pub boundary: String,
    pub body: String,
}

impl MultipartBody {
    /// `Content-Type` header value including the boundary
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Parse a JSON preview body into parts
pub fn parse_preview(preview: &str) -> Result<Vec<FormPart>> {
    serde_json::from_str(preview)
        .map_err(|e| Error::parse(format!("Invalid multipart preview: {}", e)))
}

/// Encode parts with a fresh boundary
pub fn encode(parts: &[FormPart]) -> MultipartBody {
    encode_with_boundary(parts, fresh_boundary(parts))
}

/// Random boundary that occurs in no part key or value
fn fresh_boundary(parts: &[FormPart]) -> String {
    loop {
        let boundary = format!("----formcast{}", Uuid::new_v4().simple());
        if !parts.iter().any(|p| p.key.contains(&boundary) || p.value.contains(&boundary)) {
            return boundary;
        }
    }
}

/// Encode parts; entries with an empty key are skipped
pub fn encode_with_boundary(parts: &[FormPart], boundary: impl Into<String>) -> MultipartBody {
    let boundary = boundary.into();
    let mut body = String::new();

    for part in parts.iter().filter(|p| !p.key.trim().is_empty()) {
        body.push_str(&format!("--{}\r\n", boundary));
        if part.is_file() {
            let filename = if part.value.is_empty() { "upload.bin" } else { &part.value };
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape_quoted(&part.key),
                escape_quoted(filename)
            ));
            body.push_str("Content-Type: application/octet-stream\r\n\r\n\r\n");
        } else {
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape_quoted(&part.key)
            ));
            body.push_str(&part.value);
            body.push_str("\r\n");
        }
    }
    body.push_str(&format!("--{}--\r\n", boundary));

    MultipartBody { boundary, body }
}

fn escape_quoted(s: &str) -> String {
    s.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_parts() {
        let parts = vec![
            FormPart::new("_token", "abc", "hidden"),
            FormPart::new("caption", "Hello", "text"),
            FormPart::new("avatar", "", "file"),
            FormPart::new("", "", "text"),
        ];

        let encoded = encode_with_boundary(&parts, "XYZ");
        assert_eq!(encoded.content_type(), "multipart/form-data; boundary=XYZ");
        assert_eq!(
            encoded.body,
            "--XYZ\r\nContent-Disposition: form-data; name=\"_token\"\r\n\r\nabc\r\n\
             --XYZ\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nHello\r\n\
             --XYZ\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"upload.bin\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn test_parse_preview() {
        let parts = parse_preview(r#"[{"key":"a","value":"1","type":"text"},{"key":"b"}]"#).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].field_type, "text");
        assert!(parts[1].value.is_empty());

        assert!(parse_preview("a=1").is_err());
    }

    #[test]
    fn test_quotes_escaped() {
        let encoded = encode_with_boundary(&[FormPart::new("we\"ird", "v", "text")], "b");
        assert!(encoded.body.contains("name=\"we%22ird\""));
    }

    #[test]
    fn test_fresh_boundaries() {
        let encoded = encode(&[FormPart::new("a", "1", "text")]);
        assert!(encoded.boundary.starts_with("----formcast"));
        assert_eq!(encoded.boundary.len(), "----formcast".len() + 32);
        assert!(encoded.body.ends_with(&format!("--{}--\r\n", encoded.boundary)));

        let other = encode(&[FormPart::new("a", "1", "text")]);
        assert_ne!(encoded.boundary, other.boundary);
    }

    #[test]
    fn test_boundary_absent_from_values() {
        let parts = vec![
            FormPart::new("a", "----formcast", "text"),
            FormPart::new("----formcast0", "x", "text"),
        ];
        let encoded = encode(&parts);
        assert!(parts
            .iter()
            .all(|p| !p.key.contains(&encoded.boundary) && !p.value.contains(&encoded.boundary)));
        assert_eq!(encoded.body.matches(&format!("--{}\r\n", encoded.boundary)).count(), 2);
    }
}
