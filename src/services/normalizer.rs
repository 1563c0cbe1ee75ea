//! Turns one member's raw survey answers into a flat list of category tokens.
//!
//! Multi-select answers may arrive either as JSON arrays or as list literals
//! stored in a single string (`"['Italian', 'Thai']"`). A literal that cannot be
//! parsed is kept as one token so a single corrupt field never drops the rest
//! of the member's answers.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::models::{Dimension, FieldValue, RawPreferenceSet};

/// Multi-select answer meaning "no positive preference"
pub const NO_PREFERENCE_SENTINEL: &str = "None of the below";

/// Dietary answers that express the absence of a restriction
pub const DIETARY_EXCLUSIONS: [&str; 2] = ["Non-Vegetarian", "No Preference"];

/// Why a stringified list could not be read
#[derive(Debug, Error, PartialEq)]
pub enum ListParseError {
    #[error("value does not start with '['")]
    NotAList,
    #[error("list or string literal is not terminated")]
    Unterminated,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("trailing characters after the closing ']'")]
    TrailingCharacters,
}

/// Parses a list literal of quoted strings, e.g. `['Coffee', "Tea"]`
pub fn parse_list_literal(raw: &str) -> Result<Vec<String>, ListParseError> {
    let inner = raw
        .trim()
        .strip_prefix('[')
        .ok_or(ListParseError::NotAList)?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        skip_whitespace(&mut chars);
        match chars.next() {
            None => return Err(ListParseError::Unterminated),
            Some(']') => break,
            Some(quote @ ('\'' | '"')) => {
                items.push(read_quoted(&mut chars, quote)?);
                skip_whitespace(&mut chars);
                match chars.next() {
                    Some(',') => continue,
                    Some(']') => break,
                    None => return Err(ListParseError::Unterminated),
                    Some(other) => return Err(ListParseError::UnexpectedChar(other)),
                }
            }
            Some(other) => return Err(ListParseError::UnexpectedChar(other)),
        }
    }

    if chars.any(|c| !c.is_whitespace()) {
        return Err(ListParseError::TrailingCharacters);
    }

    Ok(items)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> Result<String, ListParseError> {
    let mut value = String::new();
    loop {
        match chars.next() {
            None => return Err(ListParseError::Unterminated),
            Some('\\') => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some(escaped) => value.push(escaped),
                None => return Err(ListParseError::Unterminated),
            },
            Some(c) if c == quote => return Ok(value),
            Some(c) => value.push(c),
        }
    }
}

/// Labels dropped from one survey dimension before aggregation
#[derive(Debug, Clone, PartialEq)]
struct DimensionRule {
    dimension: Dimension,
    exclusions: Vec<String>,
}

impl DimensionRule {
    fn excludes(&self, token: &str) -> bool {
        self.exclusions.iter().any(|e| e == token)
    }
}

/// Applies the exclusion table to raw answers
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<DimensionRule>,
    dietary_exclusions: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Canonical table: every positive dimension drops the sentinel only
    pub fn new() -> Self {
        let rules = Dimension::POSITIVE
            .iter()
            .map(|dimension| DimensionRule {
                dimension: *dimension,
                exclusions: vec![NO_PREFERENCE_SENTINEL.to_string()],
            })
            .collect();

        Self {
            rules,
            dietary_exclusions: DIETARY_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Variant table that also drops the given eating-time labels
    pub fn with_eating_time_exclusions<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(rule) = self
            .rules
            .iter_mut()
            .find(|r| r.dimension == Dimension::UsualEatingTime)
        {
            rule.exclusions.extend(labels.into_iter().map(Into::into));
        }
        self
    }

    /// Flattens one member's answers into category tokens
    pub fn normalize(&self, raw: &RawPreferenceSet) -> Vec<String> {
        let mut tokens = Vec::new();

        for rule in &self.rules {
            let Some(value) = raw.field(rule.dimension) else {
                continue;
            };
            tokens.extend(
                expand(value, rule.dimension)
                    .into_iter()
                    .filter(|token| !rule.excludes(token)),
            );
        }

        if let Some(dietary) = raw.dietary_preference.as_deref() {
            if !dietary.is_empty() && !self.dietary_exclusions.iter().any(|e| e == dietary) {
                tokens.push(dietary.to_string());
            }
        }

        tokens
    }

    /// Concatenates every member's tokens into the group bag
    pub fn group_bag(&self, members: &[RawPreferenceSet]) -> Vec<String> {
        members.iter().flat_map(|raw| self.normalize(raw)).collect()
    }
}

fn expand(value: &FieldValue, dimension: Dimension) -> Vec<String> {
    match value {
        FieldValue::Many(values) => values.clone(),
        FieldValue::One(value) if value.is_empty() => Vec::new(),
        FieldValue::One(value) if value.starts_with('[') => match parse_list_literal(value) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(
                    dimension = %dimension,
                    error = %e,
                    "Malformed list answer, keeping it as a single label"
                );
                vec![value.clone()]
            }
        },
        FieldValue::One(value) => vec![value.clone()],
    }
}
