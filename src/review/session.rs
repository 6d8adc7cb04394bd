//! One evaluator's review session.
//!
//! The session owns its cursor and the segmentation of every language. Each
//! interaction (language or segment choice, submission, skip) mutates the
//! session explicitly; `view()` recomputes what to show from that state.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::cursor::{NavigationCursor, Position, Progress};
use super::mode::{Question, ReviewMode, ReviewUnit};
use super::segmenter::{segment, Segment, SegmentTargets};
use crate::corpus::Corpus;
use crate::domain::{Answers, EntityRecord, ResponseRecord, RoleInfo, RoleList, Taxonomy};
use crate::render::{render, Markup, Span};
use crate::store::{Checkpoint, ResponseSink, SinkError};

/// Errors surfaced to the evaluator
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Corpus contains no languages")]
    EmptyCorpus,

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Segment {index} out of range for {lang} ({count} segments)")]
    SegmentOutOfRange {
        lang: String,
        index: usize,
        count: usize,
    },

    #[error("Segment already complete; choose another language or segment")]
    SegmentComplete,

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Workflow variant selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSettings {
    pub mode: ReviewMode,
    /// When false, each language is one segment
    pub segmented: bool,
    pub targets: SegmentTargets,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            mode: ReviewMode::default(),
            segmented: true,
            targets: SegmentTargets::default(),
        }
    }
}

/// Everything needed to show and answer the current unit
#[derive(Debug, Clone)]
pub struct UnitView<'a> {
    pub lang: String,
    pub segment_index: usize,
    pub segment_count: usize,
    pub segment_id: Option<String>,
    pub article_id: String,
    /// 1-based position of the article within the segment
    pub article_number: usize,
    pub article_total: usize,
    /// 1-based position of the unit within the article
    pub unit_number: usize,
    pub unit_total: usize,
    pub entity: &'a EntityRecord,
    pub judged_role: Option<&'a str>,
    pub roles: Vec<RoleInfo>,
    pub progress: Progress,
    pub questions: &'static [Question],
}

impl UnitView<'_> {
    /// Labels under review for this unit
    pub fn labels(&self) -> RoleList {
        match self.judged_role {
            Some(role) => RoleList::new([role]),
            None => self.entity.predicted_roles.clone(),
        }
    }

    /// Highlight span for the entity, if its offsets are usable
    pub fn span(&self) -> Option<Span> {
        let (start, end) = self.entity.char_span()?;
        let span = Span::new(start, end, self.labels());
        Some(match (&self.entity.gold_roles, self.judged_role) {
            (Some(gold), None) => span.compared_with(gold.clone()),
            _ => span,
        })
    }

    /// Article text with the entity highlighted
    pub fn highlighted<M: Markup>(&self, markup: &M) -> String {
        let spans: Vec<Span> = self.span().into_iter().collect();
        render(&self.entity.text, &spans, markup)
    }
}

/// What the evaluator sees next
#[derive(Debug, Clone)]
pub enum View<'a> {
    Unit(UnitView<'a>),
    Complete {
        lang: String,
        segment_index: usize,
        segment_count: usize,
        progress: Progress,
    },
}

pub struct ReviewSession<'a> {
    corpus: &'a Corpus,
    taxonomy: &'a Taxonomy,
    settings: ReviewSettings,
    evaluator: String,
    session_id: Uuid,
    cursor: NavigationCursor,
    plans: HashMap<String, Vec<Segment>>,
}

impl<'a> ReviewSession<'a> {
    /// Start at the first segment of the corpus's first language
    pub fn new(
        corpus: &'a Corpus,
        taxonomy: &'a Taxonomy,
        settings: ReviewSettings,
        evaluator: impl Into<String>,
    ) -> Result<Self, ReviewError> {
        let first_lang = corpus.languages().first().ok_or(ReviewError::EmptyCorpus)?;

        let plans = corpus
            .languages()
            .iter()
            .map(|lang| {
                let target = if settings.segmented {
                    settings.targets.for_lang(lang)
                } else {
                    NonZeroUsize::MIN
                };
                (lang.clone(), segment(&corpus.article_sizes(lang), target))
            })
            .collect();

        let session = Self {
            corpus,
            taxonomy,
            cursor: NavigationCursor::new(first_lang.clone()),
            settings,
            evaluator: evaluator.into(),
            session_id: Uuid::new_v4(),
            plans,
        };

        info!(
            evaluator = %session.evaluator,
            session_id = %session.session_id,
            mode = %session.settings.mode,
            "Review session started"
        );

        Ok(session)
    }

    pub fn evaluator(&self) -> &str {
        &self.evaluator
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn settings(&self) -> &ReviewSettings {
        &self.settings
    }

    pub fn cursor(&self) -> &NavigationCursor {
        &self.cursor
    }

    pub fn languages(&self) -> &[String] {
        self.corpus.languages()
    }

    /// Segmentation of a language
    pub fn segments(&self, lang: &str) -> Option<&[Segment]> {
        self.plans.get(lang).map(Vec::as_slice)
    }

    fn current_segments(&self) -> &[Segment] {
        self.segments(&self.cursor.lang).unwrap_or(&[])
    }

    fn current_segment(&self) -> Option<&Segment> {
        self.current_segments().get(self.cursor.segment_index)
    }

    fn segment_id(&self) -> Option<String> {
        self.settings
            .segmented
            .then(|| format!("{}-{}", self.cursor.lang, self.cursor.segment_index + 1))
    }

    /// Units of work per article of the current segment
    pub fn unit_counts(&self) -> Vec<usize> {
        let Some(segment) = self.current_segment() else {
            return Vec::new();
        };
        segment
            .article_ids
            .iter()
            .map(|id| {
                self.corpus
                    .entities(&self.cursor.lang, id)
                    .iter()
                    .map(|e| self.settings.mode.unit_count(e))
                    .sum()
            })
            .collect()
    }

    pub fn select_language(&mut self, lang: &str) -> Result<bool, ReviewError> {
        if !self.plans.contains_key(lang) {
            return Err(ReviewError::UnknownLanguage(lang.to_string()));
        }
        let changed = self.cursor.select_language(lang);
        let counts = self.unit_counts();
        self.cursor.settle(&counts);
        Ok(changed)
    }

    pub fn select_segment(&mut self, index: usize) -> Result<bool, ReviewError> {
        let count = self.current_segments().len();
        if index >= count {
            return Err(ReviewError::SegmentOutOfRange {
                lang: self.cursor.lang.clone(),
                index,
                count,
            });
        }
        let changed = self.cursor.select_segment(index);
        let counts = self.unit_counts();
        self.cursor.settle(&counts);
        Ok(changed)
    }

    pub fn progress(&self) -> Progress {
        self.cursor.progress(&self.unit_counts())
    }

    pub fn is_complete(&self) -> bool {
        self.cursor.is_complete(&self.unit_counts())
    }

    /// The current unit, or the completion state
    pub fn view(&self) -> View<'a> {
        let counts = self.unit_counts();
        let segment_count = self.current_segments().len();

        let (article_index, entity_index) = match self.cursor.position(&counts) {
            Position::Unit {
                article_index,
                entity_index,
            } => (article_index, entity_index),
            Position::Complete => return self.complete_view(&counts),
        };

        let Some(article_id) = self
            .current_segment()
            .and_then(|s| s.article_ids.get(article_index))
        else {
            return self.complete_view(&counts);
        };

        let corpus: &'a Corpus = self.corpus;
        let entities = corpus.entities(&self.cursor.lang, article_id);
        let units: Vec<ReviewUnit<'a>> = self.settings.mode.units(&entities);
        let Some(unit) = units.get(entity_index).copied() else {
            return self.complete_view(&counts);
        };

        let roles = match unit.judged_role {
            Some(role) => vec![self.taxonomy.describe(role)],
            None => unit
                .entity
                .predicted_roles
                .iter()
                .map(|role| self.taxonomy.describe(role))
                .collect(),
        };

        View::Unit(UnitView {
            lang: self.cursor.lang.clone(),
            segment_index: self.cursor.segment_index,
            segment_count,
            segment_id: self.segment_id(),
            article_id: article_id.clone(),
            article_number: article_index + 1,
            article_total: counts.len(),
            unit_number: entity_index + 1,
            unit_total: units.len(),
            entity: unit.entity,
            judged_role: unit.judged_role,
            roles,
            progress: self.cursor.progress(&counts),
            questions: self.settings.mode.questions(),
        })
    }

    fn complete_view(&self, counts: &[usize]) -> View<'a> {
        View::Complete {
            lang: self.cursor.lang.clone(),
            segment_index: self.cursor.segment_index,
            segment_count: self.current_segments().len(),
            progress: self.cursor.progress(counts),
        }
    }

    /// Record answers for the current unit and move on.
    ///
    /// If the durable append fails the response stays in the sink's session
    /// log, the error is returned and the cursor does not move.
    pub fn submit(&mut self, answers: Answers, sink: &mut ResponseSink) -> Result<View<'a>, ReviewError> {
        let View::Unit(unit) = self.view() else {
            return Err(ReviewError::SegmentComplete);
        };

        let answers = self.settings.mode.normalize(answers);
        let record = ResponseRecord {
            session_name: self.evaluator.clone(),
            timestamp: Utc::now(),
            article_id: unit.article_id.clone(),
            lang: unit.lang.clone(),
            segment_id: unit.segment_id.clone(),
            entity_mention: unit.entity.entity_mention.clone(),
            main_role: unit.entity.main_role.clone(),
            predicted_roles: unit.entity.predicted_roles.clone(),
            judged_role: unit.judged_role.map(str::to_string),
            makes_sense: answers.makes_sense,
            issues: answers.issues,
            multi_labels: answers.multi_labels,
            confidence: answers.confidence,
        };

        sink.submit(record)?;
        debug!(article_id = %unit.article_id, unit = unit.unit_number, "Response accepted");

        let counts = self.unit_counts();
        self.cursor.advance(&counts);
        Ok(self.view())
    }

    /// Move past the current unit without recording anything
    pub fn skip(&mut self) -> Result<View<'a>, ReviewError> {
        let counts = self.unit_counts();
        if self.cursor.is_complete(&counts) {
            return Err(ReviewError::SegmentComplete);
        }
        self.cursor.advance(&counts);
        Ok(self.view())
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            evaluator: self.evaluator.clone(),
            corpus_fingerprint: self.corpus.fingerprint().to_string(),
            mode: self.settings.mode,
            segmented: self.settings.segmented,
            cursor: self.cursor.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Resume from a checkpoint taken against the same corpus and settings
    pub fn restore(&mut self, checkpoint: &Checkpoint) -> bool {
        let segment_count = self
            .segments(&checkpoint.cursor.lang)
            .map(<[Segment]>::len)
            .unwrap_or(0);

        let usable = checkpoint.corpus_fingerprint == self.corpus.fingerprint()
            && checkpoint.mode == self.settings.mode
            && checkpoint.segmented == self.settings.segmented
            && checkpoint.cursor.segment_index < segment_count;

        if !usable {
            info!(evaluator = %checkpoint.evaluator, "Checkpoint does not match this corpus or settings, starting fresh");
            return false;
        }

        self.cursor = checkpoint.cursor.clone();
        let counts = self.unit_counts();
        self.cursor.settle(&counts);
        info!(
            lang = %self.cursor.lang,
            segment = self.cursor.segment_index,
            article = self.cursor.article_index,
            "Resumed from checkpoint"
        );
        true
    }
}
