//! Domain types for rolecheck.
//!
//! This module contains the core data structures:
//! - EntityRecord: one (article, entity mention) row of the corpus
//! - RoleList: canonical ordered set of role labels
//! - Taxonomy: fine role reference data
//! - ResponseRecord: a submitted evaluator judgment

pub mod record;
pub mod response;
pub mod roles;
pub mod taxonomy;

// Re-export commonly used types
pub use record::EntityRecord;
pub use response::{Answers, Confidence, Issue, LabelCount, MakesSense, ResponseRecord};
pub use roles::RoleList;
pub use taxonomy::{RoleInfo, Taxonomy, TaxonomyEntry};
