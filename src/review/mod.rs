//! Review workflow.
//!
//! - segmenter: greedy article-aligned segmentation
//! - cursor: position within a segment and progress
//! - mode: per-entity or per-label units of work
//! - session: the evaluator-facing state machine

pub mod cursor;
pub mod mode;
pub mod segmenter;
pub mod session;

pub use cursor::{NavigationCursor, Position, Progress};
pub use mode::{Question, ReviewMode, ReviewUnit};
pub use segmenter::{per_segment_target, segment, Segment, SegmentTargets};
pub use session::{ReviewError, ReviewSession, ReviewSettings, UnitView, View};
