//! Reads the entity-level corpus CSV and the taxonomy JSON.
//!
//! Parsing is side-effect free apart from logging. Malformed offsets and role
//! fields are tolerated here and surface later as unrenderable spans or
//! single-label role lists.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::index::Corpus;
use crate::domain::{EntityRecord, RoleList, Taxonomy, TaxonomyEntry};

/// Errors raised while loading reference data
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed corpus CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed taxonomy JSON in {path}: {source}")]
    Taxonomy {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Row shape of the corpus file; extra columns are ignored
#[derive(Debug, Deserialize)]
struct CorpusRow {
    article_id: String,
    lang: String,
    text: String,
    entity_mention: String,
    start_offset: String,
    end_offset: String,
    p_main_role: String,
    predicted_fine_margin: String,
    #[serde(default)]
    fine_grained_roles: Option<String>,
}

/// Offsets sometimes arrive as floats ("12.0"); anything else is invalid
fn coerce_offset(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}

impl CorpusRow {
    fn into_record(self, line: u64) -> EntityRecord {
        let start_offset = coerce_offset(&self.start_offset).unwrap_or_else(|| {
            warn!(line, value = %self.start_offset, "Unreadable start_offset");
            -1
        });
        let end_offset = coerce_offset(&self.end_offset).unwrap_or_else(|| {
            warn!(line, value = %self.end_offset, "Unreadable end_offset");
            -1
        });

        let gold_roles = self
            .fine_grained_roles
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(RoleList::from_field);

        EntityRecord {
            article_id: self.article_id,
            lang: self.lang,
            text: self.text,
            entity_mention: self.entity_mention,
            start_offset,
            end_offset,
            main_role: self.p_main_role,
            predicted_roles: RoleList::from_field(&self.predicted_fine_margin),
            gold_roles,
        }
    }
}

/// Parse corpus rows from any reader
pub fn read_corpus<R: Read>(reader: R) -> Result<Vec<EntityRecord>, CorpusError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut records = Vec::new();
    let mut invalid_spans = 0usize;

    for row in csv_reader.deserialize::<CorpusRow>() {
        let row = row?;
        let record = row.into_record(records.len() as u64 + 2);
        if record.char_span().is_none() {
            invalid_spans += 1;
        } else if !record.mention_matches() {
            debug!(
                article_id = %record.article_id,
                mention = %record.entity_mention,
                "Offsets do not select the recorded mention"
            );
        }
        records.push(record);
    }

    if invalid_spans > 0 {
        warn!(invalid_spans, "Corpus rows with out-of-range offsets will render unhighlighted");
    }

    Ok(records)
}

/// SHA-256 fingerprint of raw corpus bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Load and index the corpus file
pub fn load_corpus(path: &Path) -> Result<Corpus, CorpusError> {
    let bytes = std::fs::read(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = read_corpus(bytes.as_slice())?;
    let corpus = Corpus::new(records, fingerprint(&bytes));

    info!(
        path = %path.display(),
        records = corpus.len(),
        languages = corpus.languages().len(),
        "Loaded corpus"
    );

    Ok(corpus)
}

/// Load taxonomy.json
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, CorpusError> {
    let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let entries: Vec<TaxonomyEntry> =
        serde_json::from_str(&content).map_err(|source| CorpusError::Taxonomy {
            path: path.to_path_buf(),
            source,
        })?;

    let taxonomy = Taxonomy::new(entries);
    info!(path = %path.display(), roles = taxonomy.len(), "Loaded taxonomy");

    Ok(taxonomy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSV: &str = "article_id,lang,text,entity_mention,start_offset,end_offset,p_main_role,predicted_fine_margin,confidence\n\
a2,en,The quick fox,quick,4,8,Protagonist,\"['Hero', 'Guardian']\",0.9\n\
a1,en,Bad offsets,Bad,0,99,Antagonist,Spy,0.4\n\
a3,hi,Float offsets,Float,0.0,4.0,Innocent,\"[\"\"Victim\"\"]\",0.1\n";

    #[test]
    fn test_read_corpus_normalizes_roles() {
        let records = read_corpus(CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].predicted_roles.as_slice(), ["Hero", "Guardian"]);
        assert_eq!(records[1].predicted_roles.as_slice(), ["Spy"]);
        assert_eq!(records[2].predicted_roles.as_slice(), ["Victim"]);
        assert_eq!(records[0].main_role, "Protagonist");
    }

    #[test]
    fn test_bad_offsets_are_kept_but_unrenderable() {
        let records = read_corpus(CSV.as_bytes()).unwrap();
        assert!(records[1].char_span().is_none());
        assert_eq!(records[2].char_span(), Some((0, 4)));
    }

    #[test]
    fn test_gold_roles_column_optional() {
        let csv = "article_id,lang,text,entity_mention,start_offset,end_offset,p_main_role,predicted_fine_margin,fine_grained_roles\n\
a1,en,Some text,Some,0,3,Protagonist,['Hero'],['Hero']\n";
        let records = read_corpus(csv.as_bytes()).unwrap();
        assert_eq!(records[0].gold_roles, Some(RoleList::new(["Hero"])));
    }

    #[test]
    fn test_coerce_offset() {
        assert_eq!(coerce_offset("12"), Some(12));
        assert_eq!(coerce_offset(" 7.0 "), Some(7));
        assert_eq!(coerce_offset("7.5"), None);
        assert_eq!(coerce_offset("x"), None);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
        assert!(fingerprint(b"abc").starts_with("sha256:"));
    }

    #[test]
    fn test_load_corpus_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("combined_all.csv");
        std::fs::write(&path, CSV).unwrap();

        let corpus = load_corpus(&path).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.languages(), ["en", "hi"]);
        assert_eq!(corpus.fingerprint(), fingerprint(CSV.as_bytes()));
    }

    #[test]
    fn test_load_corpus_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.csv");

        match load_corpus(&path) {
            Err(CorpusError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn test_load_taxonomy_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taxonomy.json");
        std::fs::write(
            &path,
            r#"[{"fine_role":"Guardian","coarse_role":"Protagonist","description":"d","example":"e"},
                {"fine_role":"Spy","coarse_role":"Antagonist","description":"d","example":"e"}]"#,
        )
        .unwrap();

        let taxonomy = load_taxonomy(&path).unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.coarse_role_of("Spy"), Some("Antagonist"));
    }

    #[test]
    fn test_load_taxonomy_errors() {
        let temp = TempDir::new().unwrap();

        let missing = temp.path().join("missing.json");
        assert!(matches!(load_taxonomy(&missing), Err(CorpusError::Io { .. })));

        let malformed = temp.path().join("taxonomy.json");
        std::fs::write(&malformed, r#"{"fine_role": "Spy"}"#).unwrap();
        match load_taxonomy(&malformed) {
            Err(CorpusError::Taxonomy { path, .. }) => assert_eq!(path, malformed),
            other => panic!("expected Taxonomy error, got {:?}", other.map(|t| t.len())),
        }
    }
}
