//! Configuration for rolecheck.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ROLECHECK_HOME, ROLECHECK_CORPUS, ROLECHECK_TAXONOMY)
//! 2. Config file (.rolecheck/config.yaml)
//! 3. Defaults (corpus and taxonomy in the working directory, state in ~/.rolecheck)
//!
//! Config file discovery:
//! - Searches current directory and parents for .rolecheck/config.yaml
//! - Paths in config file are relative to the project root (parent of .rolecheck/)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::review::{ReviewMode, ReviewSettings, SegmentTargets};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const ENV_HOME: &str = "ROLECHECK_HOME";
pub const ENV_CORPUS: &str = "ROLECHECK_CORPUS";
pub const ENV_TAXONOMY: &str = "ROLECHECK_TAXONOMY";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (checkpoints, exports)
    pub home: Option<String>,
    /// Entity-level corpus CSV
    pub corpus: Option<String>,
    /// Taxonomy JSON
    pub taxonomy: Option<String>,
    /// Directory for responses_<lang>.csv
    pub responses: Option<String>,
    /// Directory for session exports
    pub exports: Option<String>,
    /// Directory for progress checkpoints
    pub progress: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewConfig {
    pub mode: Option<ReviewMode>,
    pub segmented: Option<bool>,
    /// Requested segment count per language
    pub segments: Option<HashMap<String, usize>>,
}

/// Resolved configuration with absolute or working-directory-relative paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub home: PathBuf,
    pub corpus: PathBuf,
    pub taxonomy: PathBuf,
    pub responses_dir: PathBuf,
    pub exports_dir: PathBuf,
    pub progress_dir: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub review: ReviewSettings,
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".rolecheck").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Combine defaults, an optional config file and environment lookups
fn resolve(
    default_home: PathBuf,
    file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let (config_file, paths, review) = match file {
        Some((path, parsed)) => (Some(path), parsed.paths, parsed.review),
        None => (None, PathsConfig::default(), ReviewConfig::default()),
    };

    // Project root is the parent of .rolecheck/
    let base_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let from_file = |value: &Option<String>| value.as_deref().map(|v| resolve_path(&base_dir, v));

    let home = env(ENV_HOME)
        .map(PathBuf::from)
        .or_else(|| from_file(&paths.home))
        .unwrap_or(default_home);

    let corpus = env(ENV_CORPUS)
        .map(PathBuf::from)
        .or_else(|| from_file(&paths.corpus))
        .unwrap_or_else(|| base_dir.join("combined_all.csv"));

    let taxonomy = env(ENV_TAXONOMY)
        .map(PathBuf::from)
        .or_else(|| from_file(&paths.taxonomy))
        .unwrap_or_else(|| base_dir.join("taxonomy.json"));

    let responses_dir = from_file(&paths.responses).unwrap_or_else(|| base_dir.clone());
    let exports_dir = from_file(&paths.exports).unwrap_or_else(|| home.join("exports"));
    let progress_dir = from_file(&paths.progress).unwrap_or_else(|| home.join("progress"));

    let defaults = ReviewSettings::default();
    let review = ReviewSettings {
        mode: review.mode.unwrap_or(defaults.mode),
        segmented: review.segmented.unwrap_or(defaults.segmented),
        targets: review
            .segments
            .map(SegmentTargets::new)
            .unwrap_or(defaults.targets),
    };

    ResolvedConfig {
        home,
        corpus,
        taxonomy,
        responses_dir,
        exports_dir,
        progress_dir,
        config_file,
        review,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".rolecheck");

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let file = match find_config_file(&cwd) {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    Ok(resolve(default_home, file, |key| std::env::var(key).ok()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
