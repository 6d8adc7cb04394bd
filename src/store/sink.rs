//! Response sink: in-memory session log plus append-only per-language CSV files.
//!
//! The in-memory log is appended first, so a failed durable write never loses
//! a response from the session export.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ResponseRecord;

/// Errors writing responses to disk
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to append response to {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode response row for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Existing header in {path} does not match response columns (found {found:?}, expected {expected:?})")]
    HeaderMismatch {
        path: PathBuf,
        found: String,
        expected: String,
    },

    #[error("Failed to write export {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Keep file names to a safe character set
pub(crate) fn file_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}

/// Accumulates responses for one session
#[derive(Debug)]
pub struct ResponseSink {
    responses_dir: PathBuf,
    log: Vec<ResponseRecord>,
}

impl ResponseSink {
    pub fn new(responses_dir: impl Into<PathBuf>) -> Self {
        Self {
            responses_dir: responses_dir.into(),
            log: Vec::new(),
        }
    }

    /// Durable file for a language (`responses_<lang>.csv`)
    pub fn responses_path(&self, lang: &str) -> PathBuf {
        self.responses_dir
            .join(format!("responses_{}.csv", file_component(lang)))
    }

    /// Responses submitted in this session, in submission order
    pub fn log(&self) -> &[ResponseRecord] {
        &self.log
    }

    /// Record a response in memory and append it to the language file
    pub fn submit(&mut self, record: ResponseRecord) -> Result<(), SinkError> {
        let path = self.responses_path(&record.lang);
        self.log.push(record);

        let record = &self.log[self.log.len() - 1];
        if let Err(e) = append_row(&path, record) {
            warn!(
                path = %path.display(),
                error = %e,
                "Durable append failed; response kept in session log"
            );
            return Err(e);
        }

        Ok(())
    }

    /// The whole session log as CSV text (header included)
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &self.log {
            writer.serialize(record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write the session log to `<dir>/<evaluator>_<session>.csv`
    pub fn export(&self, dir: &Path, evaluator: &str, session_id: Uuid) -> Result<PathBuf, SinkError> {
        let path = dir.join(format!(
            "{}_{}.csv",
            file_component(evaluator),
            session_id.simple()
        ));

        let csv = self.to_csv().map_err(|source| SinkError::Encode {
            path: path.clone(),
            source,
        })?;

        std::fs::create_dir_all(dir)
            .and_then(|_| std::fs::write(&path, csv))
            .map_err(|source| SinkError::Export {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), responses = self.log.len(), "Exported session log");
        Ok(path)
    }
}

/// Header fields of a CSV line, for comparison
fn header_fields(line: &[u8]) -> Option<csv::StringRecord> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(line);
    let fields = reader.records().next()?.ok();
    fields
}

/// Append one row, writing the header if the file is new or empty.
///
/// A non-empty file must already carry the `ResponseRecord` header; rows are
/// never appended under foreign columns.
fn append_row(path: &Path, record: &ResponseRecord) -> Result<(), SinkError> {
    let io_err = |source| SinkError::Append {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;

    // Lock is released when file is dropped
    file.lock_exclusive().map_err(io_err)?;
    let existing_len = file.metadata().map_err(io_err)?.len();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(record).map_err(|source| SinkError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = writer.into_inner().map_err(|e| io_err(e.into_error()))?;

    // First line is the header
    let split = bytes
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| i + 1);
    let (header, row) = bytes.split_at(split);

    let out = if existing_len == 0 {
        bytes.as_slice()
    } else {
        let mut first_line = String::new();
        BufReader::new(&file)
            .read_line(&mut first_line)
            .map_err(io_err)?;

        if header_fields(first_line.as_bytes()) != header_fields(header) {
            return Err(SinkError::HeaderMismatch {
                path: path.to_path_buf(),
                found: first_line.trim_end().to_string(),
                expected: String::from_utf8_lossy(header).trim_end().to_string(),
            });
        }
        row
    };

    file.write_all(out).map_err(io_err)?;
    file.flush().map_err(io_err)?;

    Ok(())
}
