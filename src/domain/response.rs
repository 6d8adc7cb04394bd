//! Evaluator responses.
//!
//! A response is immutable once submitted. Answer values serialize to the
//! same labels the evaluation form shows, so response files stay readable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::roles::RoleList;

/// An answer string that doesn't match any option
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {value}")]
pub struct InvalidAnswer {
    pub field: &'static str,
    pub value: String,
}

/// Does the annotation make sense?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MakesSense {
    Yes,
    No,
    Unsure,
}

/// What is wrong with the annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Issue {
    #[serde(rename = "Incorrect entity")]
    IncorrectEntity,
    #[serde(rename = "Incorrect fine-grained roles")]
    IncorrectRoles,
    #[serde(rename = "Not applicable")]
    NotApplicable,
}

/// How many of several predicted labels are correct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelCount {
    One,
    Two,
    #[serde(rename = "Three or more")]
    ThreeOrMore,
    #[serde(rename = "Not applicable")]
    NotApplicable,
}

/// Confidence on a 1-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Confidence {
    type Error = InvalidAnswer;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidAnswer {
                field: "confidence",
                value: value.to_string(),
            })
        }
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl FromStr for Confidence {
    type Err = InvalidAnswer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s.trim().parse().map_err(|_| InvalidAnswer {
            field: "confidence",
            value: s.to_string(),
        })?;
        Self::try_from(value)
    }
}

impl MakesSense {
    pub const ALL: [MakesSense; 3] = [MakesSense::Yes, MakesSense::No, MakesSense::Unsure];

    pub fn label(self) -> &'static str {
        match self {
            MakesSense::Yes => "Yes",
            MakesSense::No => "No",
            MakesSense::Unsure => "Unsure",
        }
    }
}

impl Issue {
    pub const ALL: [Issue; 3] = [Issue::IncorrectEntity, Issue::IncorrectRoles, Issue::NotApplicable];

    pub fn label(self) -> &'static str {
        match self {
            Issue::IncorrectEntity => "Incorrect entity",
            Issue::IncorrectRoles => "Incorrect fine-grained roles",
            Issue::NotApplicable => "Not applicable",
        }
    }
}

impl LabelCount {
    pub const ALL: [LabelCount; 4] = [
        LabelCount::One,
        LabelCount::Two,
        LabelCount::ThreeOrMore,
        LabelCount::NotApplicable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LabelCount::One => "One",
            LabelCount::Two => "Two",
            LabelCount::ThreeOrMore => "Three or more",
            LabelCount::NotApplicable => "Not applicable",
        }
    }
}

/// Accepts an option's 1-based position or its label (case-insensitive)
fn pick<T: Copy>(field: &'static str, options: &[T], label: fn(T) -> &'static str, s: &str) -> Result<T, InvalidAnswer> {
    let s = s.trim();
    if let Ok(n) = s.parse::<usize>() {
        if let Some(opt) = n.checked_sub(1).and_then(|i| options.get(i)) {
            return Ok(*opt);
        }
    }
    options
        .iter()
        .copied()
        .find(|o| label(*o).eq_ignore_ascii_case(s))
        .ok_or_else(|| InvalidAnswer {
            field,
            value: s.to_string(),
        })
}

impl FromStr for MakesSense {
    type Err = InvalidAnswer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        pick("makes_sense", &Self::ALL, Self::label, s)
    }
}

impl FromStr for Issue {
    type Err = InvalidAnswer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        pick("issues", &Self::ALL, Self::label, s)
    }
}

impl FromStr for LabelCount {
    type Err = InvalidAnswer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        pick("multi_labels", &Self::ALL, Self::label, s)
    }
}

impl fmt::Display for MakesSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for LabelCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Form answers for one unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub makes_sense: MakesSense,
    pub issues: Option<Issue>,
    pub multi_labels: Option<LabelCount>,
    pub confidence: Confidence,
}

impl Answers {
    pub fn new(makes_sense: MakesSense, confidence: Confidence) -> Self {
        Self {
            makes_sense,
            issues: None,
            multi_labels: None,
            confidence,
        }
    }

    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.issues = Some(issue);
        self
    }

    pub fn with_label_count(mut self, count: LabelCount) -> Self {
        self.multi_labels = Some(count);
        self
    }
}

/// One submitted judgment, as written to response files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub session_name: String,
    pub timestamp: DateTime<Utc>,
    pub article_id: String,
    pub lang: String,
    pub segment_id: Option<String>,
    pub entity_mention: String,
    pub main_role: String,
    pub predicted_roles: RoleList,
    /// Set when a single label is judged on its own
    pub judged_role: Option<String>,
    pub makes_sense: MakesSense,
    pub issues: Option<Issue>,
    pub multi_labels: Option<LabelCount>,
    pub confidence: Confidence,
}
