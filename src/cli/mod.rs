//! Command-line interface for rolecheck.
//!
//! Provides commands for inspecting the corpus and its segmentation,
//! running an interactive review session, rendering highlighted articles
//! and checking saved progress.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{self, ResolvedConfig};
use crate::corpus::{load_corpus, Corpus};
use crate::render::{render, HtmlMarkup, Span};
use crate::review::{per_segment_target, segment, ReviewMode, ReviewSession, ReviewSettings};
use crate::store::ProgressStore;

pub mod review;

/// rolecheck - Segmented human review of predicted entity roles
#[derive(Parser, Debug)]
#[command(name = "rolecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List languages with article and entity counts
    Languages,

    /// Show how a language's articles are split into segments
    Segments {
        /// Language code
        #[arg(short, long)]
        lang: String,
    },

    /// Start an interactive review session
    Review(review::ReviewArgs),

    /// Render an article with all entity mentions highlighted as HTML
    Render {
        /// Language code
        #[arg(short, long)]
        lang: String,

        /// Article id
        #[arg(short, long)]
        article: String,

        /// Write a standalone HTML page here instead of printing the fragment
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show an evaluator's saved position and progress
    Progress {
        /// Evaluator name
        #[arg(short, long)]
        name: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Review mode for CLI (maps to ReviewMode)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Judge all predicted roles of an entity at once
    PerEntity,

    /// Judge each predicted role separately
    PerLabel,
}

impl From<ModeArg> for ReviewMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::PerEntity => ReviewMode::PerEntity,
            ModeArg::PerLabel => ReviewMode::PerLabel,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Languages => list_languages(),
            Commands::Segments { lang } => show_segments(&lang),
            Commands::Review(args) => review::execute_review(args),
            Commands::Render {
                lang,
                article,
                output,
            } => render_article(&lang, &article, output),
            Commands::Progress { name } => show_progress(&name),
            Commands::Config => show_config(),
        }
    }
}

/// Load the corpus named by the configuration
pub(crate) fn load_configured_corpus(cfg: &ResolvedConfig) -> Result<Corpus> {
    load_corpus(&cfg.corpus).with_context(|| format!("Failed to load corpus: {}", cfg.corpus.display()))
}

/// List languages in corpus order
fn list_languages() -> Result<()> {
    let cfg = config::config()?;
    let corpus = load_configured_corpus(cfg)?;

    if corpus.languages().is_empty() {
        println!("Corpus is empty");
        return Ok(());
    }

    println!("{:<8} {:>10} {:>10}", "LANG", "ARTICLES", "ENTITIES");
    println!("{}", "-".repeat(30));
    for lang in corpus.languages() {
        println!(
            "{:<8} {:>10} {:>10}",
            lang,
            corpus.article_sizes(lang).len(),
            corpus.entity_count(lang)
        );
    }

    Ok(())
}

/// Print the segmentation of one language
fn show_segments(lang: &str) -> Result<()> {
    let cfg = config::config()?;
    let corpus = load_configured_corpus(cfg)?;

    if !corpus.has_language(lang) {
        anyhow::bail!("Unknown language: {}", lang);
    }

    let target = if cfg.review.segmented {
        cfg.review.targets.for_lang(lang)
    } else {
        NonZeroUsize::MIN
    };
    let sizes = corpus.article_sizes(lang);
    let segments = segment(&sizes, target);

    println!(
        "{}: {} articles, {} entities, requested {} segment(s) of ~{} entities, got {}",
        lang,
        sizes.len(),
        corpus.entity_count(lang),
        target,
        per_segment_target(corpus.entity_count(lang), target),
        segments.len()
    );

    for (i, segment) in segments.iter().enumerate() {
        println!(
            "\nSegment {} ({} articles, {} entities)",
            i + 1,
            segment.len(),
            segment.entity_count
        );
        for id in &segment.article_ids {
            println!("  {} ({})", id, corpus.entities(lang, id).len());
        }
    }

    Ok(())
}

/// Render a whole article as HTML
fn render_article(lang: &str, article_id: &str, output: Option<PathBuf>) -> Result<()> {
    let cfg = config::config()?;
    let corpus = load_configured_corpus(cfg)?;

    let article = corpus
        .article(lang, article_id)
        .with_context(|| format!("Article not found: {} ({})", article_id, lang))?;

    let spans: Vec<Span> = article
        .entities
        .iter()
        .filter_map(|e| {
            let (start, end) = e.char_span()?;
            let span = Span::new(start, end, e.predicted_roles.clone());
            Some(match &e.gold_roles {
                Some(gold) => span.compared_with(gold.clone()),
                None => span,
            })
        })
        .collect();

    let fragment = render(article.text(), &spans, &HtmlMarkup);

    match output {
        Some(path) => {
            let page = HtmlMarkup.document(&format!("{} ({})", article_id, lang), &fragment);
            std::fs::write(&path, page)
                .with_context(|| format!("Failed to write HTML: {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", fragment),
    }

    Ok(())
}

/// Show saved checkpoint for an evaluator
fn show_progress(name: &str) -> Result<()> {
    let cfg = config::config()?;
    let store = ProgressStore::new(&cfg.progress_dir);

    let Some(checkpoint) = store.load(name)? else {
        println!("No saved progress for {}", name);
        return Ok(());
    };

    let corpus = load_configured_corpus(cfg)?;
    let taxonomy = Default::default();
    let settings = ReviewSettings {
        mode: checkpoint.mode,
        segmented: checkpoint.segmented,
        ..cfg.review.clone()
    };
    let mut session = ReviewSession::new(&corpus, &taxonomy, settings, name)?;

    println!("Evaluator: {}", checkpoint.evaluator);
    println!("Saved: {}", checkpoint.saved_at);
    println!("Mode: {}", checkpoint.mode);
    println!(
        "Position: {} segment {} article {} unit {}",
        checkpoint.cursor.lang,
        checkpoint.cursor.segment_index + 1,
        checkpoint.cursor.article_index + 1,
        checkpoint.cursor.entity_index + 1
    );

    if session.restore(&checkpoint) {
        let progress = session.progress();
        println!(
            "Progress: {}/{} ({:.0}%){}",
            progress.completed,
            progress.total,
            progress.fraction() * 100.0,
            if session.is_complete() { " - segment complete" } else { "" }
        );
    } else {
        println!("Checkpoint was taken against a different corpus or settings");
    }

    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Config file: {}", cfg.config_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(none)".to_string()));
    println!("Home: {}", cfg.home.display());
    println!("Corpus: {}", cfg.corpus.display());
    println!("Taxonomy: {}", cfg.taxonomy.display());
    println!("Responses: {}", cfg.responses_dir.display());
    println!("Exports: {}", cfg.exports_dir.display());
    println!("Progress: {}", cfg.progress_dir.display());
    println!("Mode: {}", cfg.review.mode);
    println!("Segmented: {}", cfg.review.segmented);

    let mut targets: Vec<_> = cfg.review.targets.iter().collect();
    targets.sort();
    for (lang, count) in targets {
        println!("  {}: {} segment(s)", lang, count);
    }

    Ok(())
}
