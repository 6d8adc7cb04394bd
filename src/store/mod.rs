//! Persistence for responses and review positions.

pub mod progress;
pub mod sink;

pub use progress::{Checkpoint, ProgressStore};
pub use sink::{ResponseSink, SinkError};
