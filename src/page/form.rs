// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form extraction
//!
//! Turns a `<form>` element into a [`FormDescriptor`]: resolved action URL,
//! method, encoding, the visible and hidden controls, a CSRF token candidate
//! and some context about where the form sits on the page.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom::Element;
use crate::error::Result;
use crate::suggest::format::is_ajax_candidate;

lazy_static! {
    static ref CSRF_NAME: Regex = Regex::new(r"(?i)csrf|token").unwrap();
}

/// Default form encoding
pub const URLENCODED: &str = "application/x-www-form-urlencoded";

/// Multipart form encoding
pub const MULTIPART: &str = "multipart/form-data";

/// Input control type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Number,
    Checkbox,
    Radio,
    File,
    Hidden,
    Tel,
    Url,
    Date,
    Time,
    DatetimeLocal,
    Color,
    Range,
    Search,
    Select,
    Textarea,
    Submit,
    Button,
    Reset,
    /// Any other `type` attribute value, lowercased
    Other(String),
}

impl FieldType {
    /// Determine the type of a form control element
    pub fn of_element(element: &Element<'_>) -> Self {
        match element.local_name() {
            "select" => FieldType::Select,
            "textarea" => FieldType::Textarea,
            _ => element
                .get_attribute("type")
                .map(FieldType::from)
                .unwrap_or(FieldType::Text),
        }
    }

    /// The HTML `type` string
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::File => "file",
            FieldType::Hidden => "hidden",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DatetimeLocal => "datetime-local",
            FieldType::Color => "color",
            FieldType::Range => "range",
            FieldType::Search => "search",
            FieldType::Select => "select",
            FieldType::Textarea => "textarea",
            FieldType::Submit => "submit",
            FieldType::Button => "button",
            FieldType::Reset => "reset",
            FieldType::Other(s) => s,
        }
    }

    /// Controls that trigger actions rather than carry data
    pub fn is_action(&self) -> bool {
        matches!(self, FieldType::Submit | FieldType::Button | FieldType::Reset)
    }

    /// Controls whose value is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Range)
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => FieldType::Text,
            "email" => FieldType::Email,
            "password" => FieldType::Password,
            "number" => FieldType::Number,
            "checkbox" => FieldType::Checkbox,
            "radio" => FieldType::Radio,
            "file" => FieldType::File,
            "hidden" => FieldType::Hidden,
            "tel" => FieldType::Tel,
            "url" => FieldType::Url,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "datetime-local" => FieldType::DatetimeLocal,
            "color" => FieldType::Color,
            "range" => FieldType::Range,
            "search" => FieldType::Search,
            "select" => FieldType::Select,
            "textarea" => FieldType::Textarea,
            "submit" => FieldType::Submit,
            "button" => FieldType::Button,
            "reset" => FieldType::Reset,
            other => FieldType::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        FieldType::from(s.as_str())
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One form control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Field name (falls back to id, then `field_N`)
    pub name: String,
    /// Control type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Placeholder text
    pub placeholder: Option<String>,
    /// Value present in the markup
    pub current_value: Option<String>,
    /// Whether the field is required
    pub required: bool,
    /// Best-effort associated label text
    pub label: Option<String>,
    /// Whether the field is hidden from the user
    pub is_hidden: bool,
}

impl FieldDescriptor {
    /// Markup value, if present and non-empty
    pub fn value(&self) -> Option<&str> {
        self.current_value.as_deref().filter(|v| !v.is_empty())
    }

    /// Whether the name uses bracket notation (`tags[]`, `user[name]`)
    pub fn is_bracketed(&self) -> bool {
        self.name.contains('[')
    }
}

/// Anti-forgery token found in a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfToken {
    pub name: String,
    pub value: String,
}

/// Where and how a form is presented
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContext {
    /// Form lives inside a modal/dialog
    pub is_modal: bool,
    /// Form has a file input
    pub has_file_upload: bool,
    /// Form looks like it is submitted by script
    pub is_ajax: bool,
    /// Neither the form nor an ancestor is hidden
    pub is_visible: bool,
    /// Label of the first submit control
    pub submit_button: Option<String>,
}

/// Extracted form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDescriptor {
    /// Position on page (document order)
    pub index: usize,
    /// Form ID attribute
    pub id: Option<String>,
    /// Form name attribute
    pub name: Option<String>,
    /// Absolute action URL
    pub action_url: String,
    /// HTTP method, uppercase
    pub method: String,
    /// Encoding type
    pub enctype: String,
    /// Visible fields
    pub fields: Vec<FieldDescriptor>,
    /// Hidden fields
    pub hidden_fields: Vec<FieldDescriptor>,
    /// CSRF token candidate
    pub csrf_token: Option<CsrfToken>,
    /// Presentation context
    pub context: FormContext,
}

impl FormDescriptor {
    /// Extract a form from a DOM element
    pub fn from_element(form: &Element<'_>, index: usize, page_url: Option<&Url>) -> Result<Self> {
        let action_url = resolve_action(form.get_attribute("action"), page_url)?;
        let fields = extract_fields(form);

        let has_file_upload = fields.iter().any(|f| f.field_type == FieldType::File);
        let csrf_token = fields
            .iter()
            .find(|f| CSRF_NAME.is_match(&f.name))
            .map(|f| CsrfToken {
                name: f.name.clone(),
                value: f.current_value.clone().unwrap_or_default(),
            });

        let enctype = if has_file_upload {
            MULTIPART.to_string()
        } else {
            form_enctype(form)
        };

        let context = FormContext {
            is_modal: is_in_modal(form),
            has_file_upload,
            is_ajax: is_ajax_form(form, &action_url),
            is_visible: !form.is_hidden_by_markup()
                && !form.ancestors().any(|a| a.is_hidden_by_markup()),
            submit_button: submit_label(form),
        };

        let (hidden_fields, fields): (Vec<_>, Vec<_>) =
            fields.into_iter().partition(|f| f.is_hidden);

        Ok(Self {
            index,
            id: form.id().map(String::from),
            name: form.get_attribute("name").map(String::from),
            action_url,
            method: form_method(form),
            enctype,
            fields,
            hidden_fields,
            csrf_token,
            context,
        })
    }

    /// Descriptor for a form that could not be processed: no fields, best-effort
    /// action and method
    pub fn minimal(form: &Element<'_>, index: usize, page_url: Option<&Url>) -> Self {
        let action_url = resolve_action(form.get_attribute("action"), page_url).unwrap_or_else(
            |_| {
                form.get_attribute("action")
                    .map(String::from)
                    .unwrap_or_default()
            },
        );

        Self {
            index,
            id: form.id().map(String::from),
            name: form.get_attribute("name").map(String::from),
            action_url,
            method: form_method(form),
            enctype: form_enctype(form),
            fields: Vec::new(),
            hidden_fields: Vec::new(),
            csrf_token: None,
            context: FormContext {
                is_visible: true,
                ..Default::default()
            },
        }
    }

    /// Hidden fields first, then visible fields
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.hidden_fields.iter().chain(self.fields.iter())
    }

    /// Total number of fields
    pub fn field_count(&self) -> usize {
        self.fields.len() + self.hidden_fields.len()
    }

    /// Whether any field is a file input
    pub fn has_file_field(&self) -> bool {
        self.all_fields().any(|f| f.field_type == FieldType::File)
    }

    /// Whether the declared encoding is multipart
    pub fn is_multipart(&self) -> bool {
        self.enctype.to_ascii_lowercase().starts_with(MULTIPART)
    }
}

/// Resolve a form action against the page
///
/// Missing or empty actions submit to the page itself; relative actions are
/// resolved against the page origin.
pub fn resolve_action(action: Option<&str>, page_url: Option<&Url>) -> Result<String> {
    let action = action.map(str::trim).unwrap_or("");

    if action.is_empty() {
        return Ok(page_url.map(|u| u.to_string()).unwrap_or_default());
    }

    match Url::parse(action) {
        Ok(url) => Ok(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => match page_url {
            Some(page) => {
                let origin = Url::parse(&page.origin().ascii_serialization())
                    .unwrap_or_else(|_| page.clone());
                Ok(origin.join(action)?.to_string())
            }
            None => Ok(action.to_string()),
        },
        Err(e) => Err(e.into()),
    }
}

/// Form submission method; anything other than POST submits as GET
fn form_method(form: &Element<'_>) -> String {
    match form.get_attribute("method") {
        Some(m) if m.trim().eq_ignore_ascii_case("post") => "POST".to_string(),
        _ => "GET".to_string(),
    }
}

fn form_enctype(form: &Element<'_>) -> String {
    form.get_attribute("enctype")
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| URLENCODED.to_string())
}

fn extract_fields(form: &Element<'_>) -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut position = 0;

    for control in form.query_selector_all("input, select, textarea") {
        let field_type = FieldType::of_element(&control);
        if field_type.is_action() {
            continue;
        }
        position += 1;

        let name = control
            .get_attribute("name")
            .or_else(|| control.id())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("field_{}", position));

        let field = FieldDescriptor {
            is_hidden: field_type == FieldType::Hidden || is_hidden_control(&control, form),
            name,
            placeholder: control.get_attribute("placeholder").map(String::from),
            current_value: control.value(),
            required: control.has_attribute("required"),
            label: find_label(&control),
            field_type,
        };

        if field.is_bracketed() {
            fields.push(field);
            continue;
        }

        match by_name.get(&field.name) {
            // Radio group: the checked option carries the value
            Some(&existing) if field.field_type == FieldType::Radio => {
                if control.checked() {
                    fields[existing].current_value = field.current_value;
                }
            }
            Some(_) => {}
            None => {
                by_name.insert(field.name.clone(), fields.len());
                fields.push(field);
            }
        }
    }

    fields
}

fn is_hidden_control(control: &Element<'_>, form: &Element<'_>) -> bool {
    control.is_hidden_by_markup()
        || control
            .ancestors()
            .take_while(|a| a != form)
            .any(|a| a.is_hidden_by_markup())
}

fn find_label(control: &Element<'_>) -> Option<String> {
    let by_for = control.id().and_then(|id| {
        control
            .document()
            .query_selector_all("label")
            .into_iter()
            .find(|l| l.get_attribute("for") == Some(id))
    });

    by_for
        .or_else(|| control.closest("label"))
        .map(|l| l.text_content())
        .or_else(|| control.get_attribute("aria-label").map(String::from))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

fn is_in_modal(form: &Element<'_>) -> bool {
    std::iter::once(*form).chain(form.ancestors()).any(|e| {
        let role = e.get_attribute("role").unwrap_or_default();
        let class = e.get_attribute("class").unwrap_or_default().to_lowercase();
        e.local_name() == "dialog"
            || role.eq_ignore_ascii_case("dialog")
            || role.eq_ignore_ascii_case("alertdialog")
            || ["modal", "dialog", "popup"].iter().any(|k| class.contains(k))
    })
}

fn is_ajax_form(form: &Element<'_>, action_url: &str) -> bool {
    let has_attr = ["data-remote", "data-ajax", "data-async"]
        .iter()
        .any(|a| form.has_attribute(a));
    is_ajax_candidate(has_attr, form.get_attribute("class").unwrap_or_default(), action_url)
}

fn submit_label(form: &Element<'_>) -> Option<String> {
    form.query_selector_all("button, input")
        .into_iter()
        .find_map(|control| {
            let kind = control.get_attribute("type").unwrap_or_default().to_ascii_lowercase();
            let label = match (control.local_name(), kind.as_str()) {
                ("button", "" | "submit") => control.text_content(),
                ("input", "submit" | "image") => control
                    .get_attribute("value")
                    .or_else(|| control.get_attribute("alt"))
                    .unwrap_or("Submit")
                    .to_string(),
                _ => return None,
            };
            Some(label.trim().to_string())
        })
        .filter(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, parse_html_with_url};

    fn page() -> Url {
        Url::parse("https://shop.example.com/account/settings?tab=1").unwrap()
    }

    fn first_form(html: &str) -> FormDescriptor {
        let url = page();
        let doc = parse_html_with_url(html, Some(url.clone())).unwrap();
        let form = doc.query_selector("form").unwrap();
        FormDescriptor::from_element(&form, 0, Some(&url)).unwrap()
    }

    #[test]
    fn test_form_extraction() {
        let form = first_form(
            r#"
            <form id="login" action="/login" method="post">
                <input type="hidden" name="_csrf" value="token123">
                <label for="email">Email address</label>
                <input type="email" id="email" name="email" required>
                <input type="password" name="password" required>
                <button type="submit">Log in</button>
            </form>
        "#,
        );

        assert_eq!(form.id.as_deref(), Some("login"));
        assert_eq!(form.method, "POST");
        assert_eq!(form.action_url, "https://shop.example.com/login");
        assert_eq!(form.enctype, URLENCODED);
        assert_eq!(form.fields.len(), 2);
        assert_eq!(form.hidden_fields.len(), 1);
        assert_eq!(
            form.csrf_token,
            Some(CsrfToken {
                name: "_csrf".into(),
                value: "token123".into()
            })
        );
        assert_eq!(form.fields[0].label.as_deref(), Some("Email address"));
        assert!(form.fields[0].required);
        assert_eq!(form.context.submit_button.as_deref(), Some("Log in"));
        assert!(form.context.is_visible);
        assert!(!form.context.is_modal);
    }

    #[test]
    fn test_action_defaults_to_page_url() {
        let form = first_form(r#"<form><input name="q"></form>"#);
        assert_eq!(form.action_url, page().to_string());
        assert_eq!(form.method, "GET");
    }

    #[test]
    fn test_method_is_get_or_post() {
        assert_eq!(first_form(r#"<form method=" Post "><input name="q"></form>"#).method, "POST");
        assert_eq!(first_form(r#"<form method="delete"><input name="q"></form>"#).method, "GET");
        assert_eq!(first_form(r#"<form method="dialog"><input name="q"></form>"#).method, "GET");
    }

    #[test]
    fn test_relative_action_resolves_against_origin() {
        let form = first_form(r#"<form action="save"><input name="q"></form>"#);
        assert_eq!(form.action_url, "https://shop.example.com/save");

        let form = first_form(r#"<form action="https://api.other.com/v1/items"><input name="q"></form>"#);
        assert_eq!(form.action_url, "https://api.other.com/v1/items");
    }

    #[test]
    fn test_invalid_action_is_an_error() {
        let url = page();
        let doc = parse_html(r#"<form action="http://[broken"><input name="q"></form>"#).unwrap();
        let form = doc.query_selector("form").unwrap();

        assert!(FormDescriptor::from_element(&form, 0, Some(&url)).is_err());

        let minimal = FormDescriptor::minimal(&form, 0, Some(&url));
        assert_eq!(minimal.field_count(), 0);
        assert_eq!(minimal.action_url, "http://[broken");
    }

    #[test]
    fn test_file_input_forces_multipart() {
        let form = first_form(
            r#"<form method="post" enctype="application/x-www-form-urlencoded">
                <input type="file" name="avatar"><input name="caption">
            </form>"#,
        );
        assert_eq!(form.enctype, MULTIPART);
        assert!(form.context.has_file_upload);
        assert!(form.is_multipart());
    }

    #[test]
    fn test_buttons_excluded_and_names_fall_back() {
        let form = first_form(
            r#"<form>
                <input type="submit" value="Go">
                <input type="reset">
                <input type="button" value="Cancel">
                <input id="nick">
                <input placeholder="anonymous">
            </form>"#,
        );

        let names: Vec<_> = form.all_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["nick", "field_2"]);
        assert_eq!(form.context.submit_button.as_deref(), Some("Go"));
    }

    #[test]
    fn test_hidden_detection() {
        let form = first_form(
            r#"<form>
                <input name="a" style="display: none">
                <input name="b" hidden>
                <div style="display:none"><input name="c"></div>
                <input type="hidden" name="d">
                <input name="e">
            </form>"#,
        );

        let hidden: Vec<_> = form.hidden_fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(hidden, vec!["a", "b", "c", "d"]);
        assert_eq!(form.fields.len(), 1);
    }

    #[test]
    fn test_radio_groups_and_bracket_names() {
        let form = first_form(
            r#"<form>
                <input type="radio" name="plan" value="free">
                <input type="radio" name="plan" value="pro" checked>
                <input type="checkbox" name="tags[]" value="a">
                <input type="checkbox" name="tags[]" value="b">
                <input name="email"><input name="email">
            </form>"#,
        );

        let names: Vec<_> = form.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["plan", "tags[]", "tags[]", "email"]);
        assert_eq!(form.fields[0].current_value.as_deref(), Some("pro"));
    }

    #[test]
    fn test_modal_and_ajax_context() {
        let form = first_form(
            r#"<div class="Modal-Container"><form data-remote="true" action="/comments">
                <textarea name="body"></textarea>
            </form></div>"#,
        );
        assert!(form.context.is_modal);
        assert!(form.context.is_ajax);

        let form = first_form(r#"<dialog><form action="/api/notes"><input name="n"></form></dialog>"#);
        assert!(form.context.is_modal);
        assert!(form.context.is_ajax);
    }

    #[test]
    fn test_invisible_form() {
        let form = first_form(r#"<div hidden><form><input name="q"></form></div>"#);
        assert!(!form.context.is_visible);
    }

    #[test]
    fn test_field_type_serde() {
        let json = serde_json::to_string(&FieldType::DatetimeLocal).unwrap();
        assert_eq!(json, "\"datetime-local\"");
        let parsed: FieldType = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(parsed, FieldType::Other("week".into()));
    }
}
