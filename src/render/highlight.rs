//! Entity highlighting.
//!
//! Offsets are character offsets with an inclusive end, so the mention of a
//! span is `text[start..end_inclusive + 1]` counted in characters. Spans are
//! expected not to overlap; a span that overlaps an earlier one or falls
//! outside the text is left unhighlighted and logged.

use tracing::warn;

use super::markup::Markup;
use crate::domain::RoleList;

/// Visual state of a highlighted span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanState {
    /// No comparison labels supplied
    Plain,
    /// Primary and comparison labels are the same set
    Match,
    /// Primary and comparison labels differ
    Mismatch,
}

/// A labeled character range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end_inclusive: usize,
    pub labels: RoleList,
    /// Labels to diff against (e.g. gold roles)
    pub comparison: Option<RoleList>,
}

impl Span {
    pub fn new(start: usize, end_inclusive: usize, labels: RoleList) -> Self {
        Self {
            start,
            end_inclusive,
            labels,
            comparison: None,
        }
    }

    pub fn compared_with(mut self, comparison: RoleList) -> Self {
        self.comparison = Some(comparison);
        self
    }

    pub fn state(&self) -> SpanState {
        match &self.comparison {
            None => SpanState::Plain,
            Some(other) if self.labels.same_set(other) => SpanState::Match,
            Some(_) => SpanState::Mismatch,
        }
    }

    /// Text shown in the label marker
    pub fn label_text(&self) -> String {
        match &self.comparison {
            None => self.labels.joined(),
            Some(other) => format!("pred: {} ⇄ gold: {}", self.labels.joined(), other.joined()),
        }
    }
}

/// Render `text` with every span highlighted
pub fn render<M: Markup>(text: &str, spans: &[Span], markup: &M) -> String {
    // Byte index of every character boundary, plus the end of the text
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;

    let mut ordered: Vec<&Span> = spans.iter().collect();
    ordered.sort_by_key(|s| s.start);

    let mut out = String::with_capacity(text.len() * 2);
    let mut last = 0usize;

    for span in ordered {
        if span.start > span.end_inclusive || span.end_inclusive >= char_len {
            warn!(
                start = span.start,
                end = span.end_inclusive,
                text_len = char_len,
                "Span outside text, not highlighted"
            );
            continue;
        }
        if span.start < last {
            warn!(start = span.start, previous_end = last, "Overlapping span, not highlighted");
            continue;
        }

        let end = span.end_inclusive + 1;
        out.push_str(&markup.escape(&text[bounds[last]..bounds[span.start]]));
        markup.entity(
            &mut out,
            &markup.escape(&text[bounds[span.start]..bounds[end]]),
            &markup.escape(&span.labels.joined()),
            &markup.escape(&span.label_text()),
            span.state(),
        );
        last = end;
    }

    out.push_str(&markup.escape(&text[bounds[last]..]));
    out
}
