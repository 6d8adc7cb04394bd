//! Canonical role-label list.
//!
//! Corpus files carry predicted roles as serialized sequence literals
//! (`['Hero', 'Victim']`), sometimes as JSON arrays, sets or a bare label.
//! Everything is normalized here into one ordered, duplicate-free list so
//! nothing downstream has to care about the source shape.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

/// Why a sequence literal could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleParseError {
    #[error("Not a sequence literal: {0}")]
    NotASequence(String),

    #[error("Unterminated string literal at byte {0}")]
    UnterminatedString(usize),

    #[error("Unexpected character {found:?} at byte {at}")]
    Unexpected { found: char, at: usize },
}

/// Ordered, duplicate-free list of role labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RoleList(Vec<String>);

impl RoleList {
    /// Build from labels, dropping blanks and later duplicates
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into().trim().to_string();
            if !label.is_empty() && !out.contains(&label) {
                out.push(label);
            }
        }
        Self(out)
    }

    /// Parse a corpus field, falling back to a single bare label
    pub fn from_field(raw: &str) -> Self {
        match Self::parse_literal(raw) {
            Ok(list) => list,
            Err(RoleParseError::NotASequence(_)) => Self::new([raw]),
            Err(e) => {
                warn!(field = raw, error = %e, "Malformed role literal, keeping it as one label");
                Self::new([raw])
            }
        }
    }

    /// Parse a list, tuple or set literal with quoted string items
    pub fn parse_literal(raw: &str) -> Result<Self, RoleParseError> {
        let trimmed = raw.trim();

        if trimmed == "set()" {
            return Ok(Self::default());
        }

        if trimmed.starts_with('[') {
            if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
                return Ok(Self::new(items));
            }
        }

        let close = match trimmed.chars().next() {
            Some('[') => ']',
            Some('(') => ')',
            Some('{') => '}',
            _ => return Err(RoleParseError::NotASequence(trimmed.to_string())),
        };

        let bytes = trimmed.as_bytes();
        let mut items = Vec::new();
        let mut i = 1;
        let mut expect_item = true;

        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let Some(&b) = bytes.get(i) else {
                return Err(RoleParseError::NotASequence(trimmed.to_string()));
            };

            match b {
                b'\'' | b'"' if expect_item => {
                    let (item, next) = read_quoted(trimmed, i)?;
                    items.push(item);
                    i = next;
                    expect_item = false;
                }
                b',' if !expect_item => {
                    i += 1;
                    expect_item = true;
                }
                _ if b as char == close => {
                    if i + 1 != bytes.len() {
                        return Err(unexpected(trimmed, i + 1));
                    }
                    break;
                }
                _ => return Err(unexpected(trimmed, i)),
            }
        }

        Ok(Self::new(items))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Order-insensitive comparison
    pub fn same_set(&self, other: &RoleList) -> bool {
        let a: BTreeSet<&str> = self.0.iter().map(String::as_str).collect();
        let b: BTreeSet<&str> = other.0.iter().map(String::as_str).collect();
        a == b
    }

    /// Labels joined with ", " for display
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }

    /// Python-style list literal, as written to response files
    pub fn to_literal(&self) -> String {
        let items: Vec<String> = self
            .0
            .iter()
            .map(|s| format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")))
            .collect();
        format!("[{}]", items.join(", "))
    }
}

fn unexpected(text: &str, at: usize) -> RoleParseError {
    let found = text[at..].chars().next().unwrap_or(' ');
    RoleParseError::Unexpected { found, at }
}

/// Read a quoted string starting at `start`, returning it and the index after the closing quote
fn read_quoted(text: &str, start: usize) -> Result<(String, usize), RoleParseError> {
    let mut chars = text[start..].char_indices();
    let quote = match chars.next() {
        Some((_, q)) => q,
        None => return Err(RoleParseError::UnterminatedString(start)),
    };

    let mut out = String::new();
    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, other)) => out.push(other),
                None => return Err(RoleParseError::UnterminatedString(start)),
            },
            c if c == quote => return Ok((out, start + offset + c.len_utf8())),
            c => out.push(c),
        }
    }

    Err(RoleParseError::UnterminatedString(start))
}

impl fmt::Display for RoleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl<'a> IntoIterator for &'a RoleList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for RoleList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_literal())
    }
}

impl<'de> Deserialize<'de> for RoleList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_field(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_list_literal() {
        let roles = RoleList::parse_literal("['Protagonist', 'Guardian']").unwrap();
        assert_eq!(roles.as_slice(), ["Protagonist", "Guardian"]);
    }

    #[test]
    fn test_json_and_set_literals() {
        let json = RoleList::parse_literal(r#"["Victim", "Martyr"]"#).unwrap();
        assert_eq!(json.as_slice(), ["Victim", "Martyr"]);

        let set = RoleList::parse_literal("{'Saboteur'}").unwrap();
        assert_eq!(set.as_slice(), ["Saboteur"]);

        let tuple = RoleList::parse_literal("('Rebel',)").unwrap();
        assert_eq!(tuple.as_slice(), ["Rebel"]);

        assert!(RoleList::parse_literal("set()").unwrap().is_empty());
        assert!(RoleList::parse_literal("[]").unwrap().is_empty());
    }

    #[test]
    fn test_escaped_quote_inside_label() {
        let roles = RoleList::parse_literal(r"['People\'s Hero', 'Spy']").unwrap();
        assert_eq!(roles.as_slice(), ["People's Hero", "Spy"]);
    }

    #[test]
    fn test_duplicates_dropped_in_order() {
        let roles = RoleList::parse_literal("['B', 'A', 'B']").unwrap();
        assert_eq!(roles.as_slice(), ["B", "A"]);
    }

    #[test]
    fn test_bare_string_field() {
        let roles = RoleList::from_field("Instigator");
        assert_eq!(roles.as_slice(), ["Instigator"]);
        assert!(RoleList::from_field("   ").is_empty());
    }

    #[test]
    fn test_malformed_literal_falls_back() {
        assert!(RoleList::parse_literal("['Hero'").is_err());
        let roles = RoleList::from_field("['Hero'");
        assert_eq!(roles.len(), 1);
    }

    #[test]
    fn test_same_set_ignores_order() {
        let a = RoleList::new(["A", "B"]);
        let b = RoleList::new(["B", "A"]);
        let c = RoleList::new(["A"]);
        assert!(a.same_set(&b));
        assert!(!a.same_set(&c));
    }

    #[test]
    fn test_literal_output_reparses() {
        let roles = RoleList::new(["Tyrant", "O'Brien's Foe"]);
        let literal = roles.to_literal();
        assert_eq!(literal, r"['Tyrant', 'O\'Brien\'s Foe']");
        assert_eq!(RoleList::parse_literal(&literal).unwrap(), roles);
    }
}
