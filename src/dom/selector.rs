// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSS Selector parsing and matching
//!
//! Covers the subset the page scanner needs: type, id, class and attribute
//! selectors, descendant and child combinators, and comma-separated groups.

use crate::error::{Error, Result};

use super::element::Element;

/// A parsed selector group (`a, b > c`)
#[derive(Debug, Clone)]
pub struct Selector {
    alternatives: Vec<ComplexSelector>,
}

/// A chain of compound selectors joined by combinators
///
/// Stored right-to-left: `compounds[0]` is the subject.
#[derive(Debug, Clone)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    /// Combinator between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

/// Combinator between selector parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant (space)
    Descendant,
    /// Child (>)
    Child,
}

type Compound = Vec<SelectorPart>;

/// A part of a compound selector
#[derive(Debug, Clone)]
pub enum SelectorPart {
    /// Universal selector (*)
    Universal,
    /// Tag name
    Tag(String),
    /// ID selector (#id)
    Id(String),
    /// Class selector (.class)
    Class(String),
    /// Attribute selector ([attr], [attr=value], etc.)
    Attribute(AttributeSelector),
}

/// Attribute selector
#[derive(Debug, Clone)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: Option<AttributeOperator>,
    pub value: Option<String>,
    pub case_insensitive: bool,
}

/// Attribute selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// [attr=value] - exact match
    Equals,
    /// [attr~=value] - word in space-separated list
    Includes,
    /// [attr^=value] - starts with
    Prefix,
    /// [attr$=value] - ends with
    Suffix,
    /// [attr*=value] - contains substring
    Substring,
}

impl Selector {
    /// Parse a CSS selector string
    pub fn parse(selector: &str) -> Result<Self> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Err(Error::selector(selector, "empty selector"));
        }

        let mut parser = SelectorParser::new(trimmed);
        let mut alternatives = vec![parser.parse_complex()?];
        while parser.eat(',') {
            alternatives.push(parser.parse_complex()?);
        }
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(Error::selector(selector, format!("unexpected '{}'", c)));
        }

        Ok(Self { alternatives })
    }

    /// Check if an element matches this selector
    pub fn matches(&self, element: &Element<'_>) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }
}

impl ComplexSelector {
    fn matches(&self, element: &Element<'_>) -> bool {
        if !compound_matches(&self.compounds[0], element) {
            return false;
        }
        self.match_from(1, *element)
    }

    /// Match `compounds[index..]` against the ancestors of `current`
    fn match_from(&self, index: usize, current: Element<'_>) -> bool {
        let Some(compound) = self.compounds.get(index) else {
            return true;
        };

        match self.combinators[index - 1] {
            Combinator::Child => match current.parent_element() {
                Some(parent) => {
                    compound_matches(compound, &parent) && self.match_from(index + 1, parent)
                }
                None => false,
            },
            Combinator::Descendant => current
                .ancestors()
                .any(|a| compound_matches(compound, &a) && self.match_from(index + 1, a)),
        }
    }
}

fn compound_matches(parts: &[SelectorPart], element: &Element<'_>) -> bool {
    parts.iter().all(|part| match part {
        SelectorPart::Universal => true,
        SelectorPart::Tag(tag) => element.local_name().eq_ignore_ascii_case(tag),
        SelectorPart::Id(id) => element.id() == Some(id.as_str()),
        SelectorPart::Class(class) => element.has_class(class),
        SelectorPart::Attribute(attr) => attribute_matches(attr, element),
    })
}

fn attribute_matches(attr: &AttributeSelector, element: &Element<'_>) -> bool {
    let Some(value) = element.get_attribute(&attr.name) else {
        return false;
    };

    let (Some(op), Some(target)) = (&attr.operator, &attr.value) else {
        return true; // Just checking existence
    };

    let (value, target) = if attr.case_insensitive {
        (value.to_lowercase(), target.to_lowercase())
    } else {
        (value.to_string(), target.clone())
    };

    match op {
        AttributeOperator::Equals => value == target,
        AttributeOperator::Includes => value.split_whitespace().any(|w| w == target),
        AttributeOperator::Prefix => !target.is_empty() && value.starts_with(&target),
        AttributeOperator::Suffix => !target.is_empty() && value.ends_with(&target),
        AttributeOperator::Substring => !target.is_empty() && value.contains(&target),
    }
}

/// Simple recursive-descent selector parser
struct SelectorParser {
    input: Vec<char>,
    pos: usize,
    source: String,
}

impl SelectorParser {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            source: input.to_string(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::selector(self.source.clone(), reason)
    }

    /// Parse compounds until a comma or end of input
    fn parse_complex(&mut self) -> Result<ComplexSelector> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();

        self.skip_whitespace();
        compounds.push(self.parse_compound()?);

        loop {
            let had_space = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.advance();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            }
            compounds.push(self.parse_compound()?);
        }

        // Matching walks from the subject outwards
        compounds.reverse();
        combinators.reverse();
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut parts = Vec::new();

        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    self.advance();
                    parts.push(SelectorPart::Id(self.read_identifier()?));
                }
                '.' => {
                    self.advance();
                    parts.push(SelectorPart::Class(self.read_identifier()?));
                }
                '[' => parts.push(SelectorPart::Attribute(self.parse_attribute()?)),
                '*' => {
                    self.advance();
                    parts.push(SelectorPart::Universal);
                }
                c if c.is_alphabetic() || c == '_' || c == '-' => {
                    let tag = self.read_identifier()?;
                    parts.push(SelectorPart::Tag(tag.to_lowercase()));
                }
                _ => break,
            }
        }

        if parts.is_empty() {
            return Err(self.error("expected selector"));
        }
        Ok(parts)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector> {
        self.advance(); // [
        self.skip_whitespace();
        let name = self.read_identifier()?.to_lowercase();
        self.skip_whitespace();

        let operator = match self.peek() {
            Some(']') => None,
            Some('=') => Some(AttributeOperator::Equals),
            Some('~') => Some(AttributeOperator::Includes),
            Some('^') => Some(AttributeOperator::Prefix),
            Some('$') => Some(AttributeOperator::Suffix),
            Some('*') => Some(AttributeOperator::Substring),
            _ => return Err(self.error("invalid attribute operator")),
        };

        let mut value = None;
        let mut case_insensitive = false;
        if let Some(op) = operator {
            self.advance();
            if op != AttributeOperator::Equals && !self.eat_char('=') {
                return Err(self.error("expected '='"));
            }
            self.skip_whitespace();
            value = Some(self.read_value()?);
            self.skip_whitespace();
            if matches!(self.peek(), Some('i') | Some('I')) {
                self.advance();
                case_insensitive = true;
                self.skip_whitespace();
            }
        }

        if !self.eat_char(']') {
            return Err(self.error("expected ']'"));
        }

        Ok(AttributeSelector {
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    fn read_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let mut result = String::new();
                loop {
                    match self.advance() {
                        Some(c) if c == quote => return Ok(result),
                        Some(c) => result.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
            }
            _ => self.read_identifier(),
        }
    }

    fn read_identifier(&mut self) -> Result<String> {
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                result.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if result.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(result)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn eat_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip whitespace, then consume `expected` if present
    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        self.eat_char(expected)
    }

    /// Returns whether any whitespace was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }
}
