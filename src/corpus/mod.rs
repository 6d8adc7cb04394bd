//! Corpus and taxonomy loading.
//!
//! - loader: CSV/JSON parsing into domain types
//! - index: language -> article -> entity grouping

pub mod index;
pub mod loader;

pub use index::{Article, Corpus};
pub use loader::{fingerprint, load_corpus, load_taxonomy, read_corpus, CorpusError};
