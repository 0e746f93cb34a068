// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Placeholder values for fields without one

use crate::page::form::FieldType;

/// Name fragments checked in order; the first match wins
const NAME_RULES: &[(&[&str], &str)] = &[
    (&["email"], "user@example.com"),
    (&["name"], "John Doe"),
    (&["phone"], "+1-555-123-4567"),
    (&["age"], "25"),
    (&["url", "website"], "https://example.com"),
    (&["password"], "SecurePass123!"),
    (&["username"], "johndoe"),
    (&["id"], "12345"),
    (&["date"], "2024-01-15"),
    (&["time"], "14:30"),
];

/// Generic fallback sample
pub const GENERIC_SAMPLE: &str = "sample value";

/// Plausible value for a field, from its name first and its type second
///
/// Deterministic and never empty.
pub fn sample_value(field_type: &FieldType, name: &str) -> String {
    let name = name.to_lowercase();

    NAME_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| name.contains(n)))
        .map(|(_, value)| *value)
        .unwrap_or_else(|| type_sample(field_type))
        .to_string()
}

fn type_sample(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Email => "user@example.com",
        FieldType::Password => "SecurePass123!",
        FieldType::Tel => "+1-555-123-4567",
        FieldType::Url => "https://example.com",
        FieldType::Number => "42",
        FieldType::Date => "2024-01-15",
        FieldType::Time => "14:30",
        FieldType::DatetimeLocal => "2024-01-15T14:30",
        FieldType::Color => "#3366ff",
        FieldType::Range => "50",
        FieldType::Search => "search query",
        _ => GENERIC_SAMPLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rules_take_priority() {
        assert_eq!(sample_value(&FieldType::Text, "contact_email"), "user@example.com");
        assert_eq!(sample_value(&FieldType::Number, "Age"), "25");
        assert_eq!(sample_value(&FieldType::Text, "website"), "https://example.com");
        assert_eq!(sample_value(&FieldType::Text, "user_id"), "12345");
        assert_eq!(sample_value(&FieldType::Password, "password"), "SecurePass123!");
        assert_eq!(sample_value(&FieldType::Text, "start_time"), "14:30");
    }

    #[test]
    fn test_rule_order() {
        // "username" contains "name", which is checked first
        assert_eq!(sample_value(&FieldType::Text, "username"), "John Doe");
        // "email" precedes "name"
        assert_eq!(sample_value(&FieldType::Text, "email_name"), "user@example.com");
        assert_eq!(sample_value(&FieldType::Text, "birthdate"), "2024-01-15");
    }

    #[test]
    fn test_type_defaults() {
        assert_eq!(sample_value(&FieldType::Number, "qty"), "42");
        assert_eq!(sample_value(&FieldType::Color, "bg"), "#3366ff");
        assert_eq!(sample_value(&FieldType::Range, "vol"), "50");
        assert_eq!(sample_value(&FieldType::DatetimeLocal, "when"), "2024-01-15T14:30");
        assert_eq!(sample_value(&FieldType::Search, "q"), "search query");
        assert_eq!(sample_value(&FieldType::Tel, "mobile"), "+1-555-123-4567");
        assert_eq!(sample_value(&FieldType::Other("week".into()), "w"), GENERIC_SAMPLE);
    }

    #[test]
    fn test_never_empty() {
        let types = [
            FieldType::Text,
            FieldType::Checkbox,
            FieldType::File,
            FieldType::Hidden,
            FieldType::Select,
            FieldType::Textarea,
            FieldType::Other(String::new()),
        ];
        for t in &types {
            for name in ["", "x", "field_3", "Ünïcødé"] {
                assert!(!sample_value(t, name).is_empty());
            }
        }
    }
}
