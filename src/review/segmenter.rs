//! Splits a language's articles into size-balanced segments.
//!
//! Greedy single pass over articles in ascending id order. The overflow check
//! runs before the next article is added: if adding it would push the running
//! entity count past the per-segment target and the current segment already
//! holds an article, the segment is closed first. An article is never split,
//! so one article larger than the target forms an oversized segment alone.
//! The result can hold more segments than requested.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered, article-aligned chunk of work
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Article ids in ascending order
    pub article_ids: Vec<String>,
    /// Sum of entity rows over the segment's articles
    pub entity_count: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.article_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.article_ids.is_empty()
    }
}

/// `ceil(total_entities / target_segment_count)`
pub fn per_segment_target(total_entities: usize, target_segment_count: NonZeroUsize) -> usize {
    total_entities.div_ceil(target_segment_count.get())
}

/// Partition `(article_id, entity_count)` pairs into segments.
///
/// With no articles at all the result is a single empty segment.
pub fn segment(articles: &[(String, usize)], target_segment_count: NonZeroUsize) -> Vec<Segment> {
    let mut ordered: Vec<&(String, usize)> = articles.iter().collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0));

    let total: usize = ordered.iter().map(|(_, n)| n).sum();
    let target = per_segment_target(total, target_segment_count);

    let mut segments = Vec::new();
    let mut current = Segment::default();

    for (article_id, count) in ordered {
        if !current.is_empty() && current.entity_count + count > target {
            segments.push(std::mem::take(&mut current));
        }
        current.article_ids.push(article_id.clone());
        current.entity_count += count;
    }
    segments.push(current);

    debug!(
        articles = articles.len(),
        total_entities = total,
        per_segment_target = target,
        segments = segments.len(),
        "Segmented articles"
    );

    segments
}

/// Per-language requested segment counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentTargets(HashMap<String, usize>);

impl SegmentTargets {
    pub fn new(targets: HashMap<String, usize>) -> Self {
        Self(targets)
    }

    /// Requested count for a language; unlisted or zero means one segment
    pub fn for_lang(&self, lang: &str) -> NonZeroUsize {
        self.0
            .get(lang)
            .copied()
            .and_then(NonZeroUsize::new)
            .unwrap_or(NonZeroUsize::MIN)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &usize)> {
        self.0.iter()
    }
}

impl Default for SegmentTargets {
    /// Hand-tuned counts per language
    fn default() -> Self {
        Self(
            [("bg", 1), ("pt", 1), ("hi", 5), ("ru", 3), ("en", 4)]
                .into_iter()
                .map(|(lang, n)| (lang.to_string(), n))
                .collect(),
        )
    }
}
