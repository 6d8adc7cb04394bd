//! Navigation cursor over language -> segment -> article -> unit.
//!
//! The cursor only stores indices. Every operation that needs the shape of
//! the current segment takes `unit_counts`: the number of units of work in
//! each article of the segment, in segment order.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the cursor points within the current segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// A unit of work is waiting
    Unit {
        article_index: usize,
        entity_index: usize,
    },
    /// Every article of the segment has been consumed
    Complete,
}

/// Completed share of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// `completed / total` clamped to [0, 1]; an empty segment counts as done
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed as f64 / self.total as f64).clamp(0.0, 1.0)
    }
}

/// Evaluator position. Owned by the session handler and passed around explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationCursor {
    pub lang: String,
    pub segment_index: usize,
    pub article_index: usize,
    pub entity_index: usize,
}

impl NavigationCursor {
    /// Start of the first segment of `lang`
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            segment_index: 0,
            article_index: 0,
            entity_index: 0,
        }
    }

    /// Switch language; returns whether anything changed
    pub fn select_language(&mut self, lang: &str) -> bool {
        if self.lang == lang {
            return false;
        }
        debug!(from = %self.lang, to = lang, "Language switched, position reset");
        self.lang = lang.to_string();
        self.segment_index = 0;
        self.article_index = 0;
        self.entity_index = 0;
        true
    }

    /// Switch segment; returns whether anything changed
    pub fn select_segment(&mut self, segment_index: usize) -> bool {
        if self.segment_index == segment_index {
            return false;
        }
        debug!(from = self.segment_index, to = segment_index, "Segment switched, position reset");
        self.segment_index = segment_index;
        self.article_index = 0;
        self.entity_index = 0;
        true
    }

    pub fn is_complete(&self, unit_counts: &[usize]) -> bool {
        self.article_index >= unit_counts.len()
    }

    /// Roll past exhausted articles so the cursor rests on a valid unit or the end
    pub fn settle(&mut self, unit_counts: &[usize]) {
        while let Some(&count) = unit_counts.get(self.article_index) {
            if self.entity_index < count {
                break;
            }
            self.entity_index = 0;
            self.article_index += 1;
        }
    }

    /// Step past the current unit. A completed segment stays completed.
    pub fn advance(&mut self, unit_counts: &[usize]) -> Position {
        if self.is_complete(unit_counts) {
            return Position::Complete;
        }
        self.entity_index += 1;
        self.settle(unit_counts);
        self.position(unit_counts)
    }

    pub fn position(&self, unit_counts: &[usize]) -> Position {
        match unit_counts.get(self.article_index) {
            Some(&count) if self.entity_index < count => Position::Unit {
                article_index: self.article_index,
                entity_index: self.entity_index,
            },
            _ if self.is_complete(unit_counts) => Position::Complete,
            // Unsettled: treat as pointing at the next article's start
            _ => {
                let mut probe = self.clone();
                probe.settle(unit_counts);
                probe.position(unit_counts)
            }
        }
    }

    /// Units consumed so far in the current segment
    pub fn flattened(&self, unit_counts: &[usize]) -> usize {
        let prior: usize = unit_counts.iter().take(self.article_index).sum();
        let within = unit_counts
            .get(self.article_index)
            .map(|&count| self.entity_index.min(count))
            .unwrap_or(0);
        prior + within
    }

    pub fn progress(&self, unit_counts: &[usize]) -> Progress {
        let total: usize = unit_counts.iter().sum();
        Progress {
            completed: self.flattened(unit_counts).min(total),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolls_to_next_article() {
        let counts = [2, 1];
        let mut cursor = NavigationCursor::new("en");
        assert_eq!(
            cursor.advance(&counts),
            Position::Unit {
                article_index: 0,
                entity_index: 1
            }
        );
        assert_eq!(
            cursor.advance(&counts),
            Position::Unit {
                article_index: 1,
                entity_index: 0
            }
        );
        assert_eq!(cursor.advance(&counts), Position::Complete);
        assert_eq!(cursor.advance(&counts), Position::Complete);
        assert_eq!(cursor.article_index, 2);
    }

    #[test]
    fn test_empty_articles_are_skipped() {
        let counts = [1, 0, 1];
        let mut cursor = NavigationCursor::new("en");
        cursor.advance(&counts);
        assert_eq!(cursor.article_index, 2);
        assert_eq!(cursor.entity_index, 0);
    }

    #[test]
    fn test_switches_reset_position() {
        let mut cursor = NavigationCursor::new("en");
        cursor.article_index = 3;
        cursor.entity_index = 2;
        assert!(!cursor.select_language("en"));
        assert_eq!(cursor.article_index, 3);
        assert!(cursor.select_segment(1));
        assert_eq!((cursor.article_index, cursor.entity_index), (0, 0));

        cursor.article_index = 1;
        assert!(cursor.select_language("hi"));
        assert_eq!(cursor.segment_index, 0);
        assert_eq!((cursor.article_index, cursor.entity_index), (0, 0));
    }

    #[test]
    fn test_progress_fraction() {
        let counts = [5, 3, 4];
        let mut cursor = NavigationCursor::new("en");
        cursor.article_index = 1;
        cursor.entity_index = 2;
        let progress = cursor.progress(&counts);
        assert_eq!(progress.completed, 7);
        assert_eq!(progress.total, 12);

        cursor.article_index = 9;
        assert_eq!(cursor.progress(&counts).fraction(), 1.0);
        assert_eq!(NavigationCursor::new("en").progress(&[]).fraction(), 1.0);
    }

    #[test]
    fn test_position_of_unsettled_cursor() {
        let counts = [1, 2];
        let mut cursor = NavigationCursor::new("en");
        cursor.entity_index = 1;
        assert_eq!(
            cursor.position(&counts),
            Position::Unit {
                article_index: 1,
                entity_index: 0
            }
        );
    }
}
