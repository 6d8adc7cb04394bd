//! Saved review positions.
//!
//! One JSON checkpoint per evaluator. A checkpoint only applies to the corpus
//! it was taken against (matched by fingerprint) and to the same review mode.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sink::file_component;
use crate::review::{NavigationCursor, ReviewMode};

/// Cursor snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub evaluator: String,
    pub corpus_fingerprint: String,
    pub mode: ReviewMode,
    pub segmented: bool,
    pub cursor: NavigationCursor,
    pub saved_at: DateTime<Utc>,
}

/// Directory of checkpoints
#[derive(Debug, Clone)]
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, evaluator: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_component(evaluator)))
    }

    pub fn load(&self, evaluator: &str) -> Result<Option<Checkpoint>> {
        let path = self.path_for(evaluator);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read checkpoint: {}", path.display()))?;
        let checkpoint = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse checkpoint: {}", path.display()))?;

        Ok(Some(checkpoint))
    }

    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create progress directory: {}", self.dir.display()))?;

        let path = self.path_for(&checkpoint.evaluator);
        let content = serde_json::to_string_pretty(checkpoint)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write checkpoint: {}", path.display()))?;

        debug!(path = %path.display(), "Saved checkpoint");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("progress"));
        assert!(store.load("ana").unwrap().is_none());

        let mut cursor = NavigationCursor::new("ru");
        cursor.segment_index = 2;
        cursor.entity_index = 1;
        let checkpoint = Checkpoint {
            evaluator: "ana".to_string(),
            corpus_fingerprint: "sha256:abc".to_string(),
            mode: ReviewMode::PerLabel,
            segmented: true,
            cursor,
            saved_at: Utc::now(),
        };
        store.save(&checkpoint).unwrap();

        assert_eq!(store.load("ana").unwrap(), Some(checkpoint));
    }
}
