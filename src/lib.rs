//! rolecheck - Segmented human review of predicted entity roles
//!
//! Presents articles with one highlighted entity mention and its
//! model-predicted role labels, collects evaluator judgments and appends
//! them to per-language response files.
//!
//! # Architecture
//!
//! Work is walked deterministically: language -> segment -> article -> entity.
//! - Segments are article-aligned, size-balanced chunks of a language
//! - A navigation cursor advances monotonically as units are answered or skipped
//! - Responses are kept in an in-memory session log and appended to disk
//!
//! # Modules
//!
//! - `corpus`: CSV/JSON loading and the language/article index
//! - `domain`: Data structures (EntityRecord, RoleList, Taxonomy, ResponseRecord)
//! - `review`: Segmenter, NavigationCursor, review modes, ReviewSession
//! - `render`: Entity highlighting for HTML and terminal output
//! - `store`: Response sink and progress checkpoints
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # See how English is split into segments
//! rolecheck segments --lang en
//!
//! # Review segment 2 of Hindi
//! rolecheck review --name ana --lang hi --segment 2
//! ```

pub mod cli;
pub mod config;
pub mod corpus;
pub mod domain;
pub mod render;
pub mod review;
pub mod store;

// Re-export main types at crate root for convenience
pub use corpus::{Article, Corpus};
pub use domain::{Answers, EntityRecord, ResponseRecord, RoleList, Taxonomy};
pub use render::{render, HtmlMarkup, Markup, Span, SpanState, TerminalMarkup};
pub use review::{NavigationCursor, ReviewMode, ReviewSession, ReviewSettings, Segment, View};
pub use store::{ResponseSink, SinkError};
