//! Interactive review loop.
//!
//! A line-oriented front end over `ReviewSession`: every action re-renders the
//! current view from session state, and the cursor is checkpointed after each
//! action so a later session can resume.

use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use super::{load_configured_corpus, ModeArg};
use crate::config;
use crate::corpus::load_taxonomy;
use crate::domain::{Answers, Confidence, Issue, LabelCount, MakesSense};
use crate::render::{HtmlMarkup, Markup, TerminalMarkup};
use crate::review::{Question, ReviewError, ReviewSession, UnitView, View};
use crate::store::{ProgressStore, ResponseSink};

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Evaluator name (recorded with every response)
    #[arg(short, long, env = "ROLECHECK_EVALUATOR")]
    pub name: String,

    /// Language to start in
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Segment to start in (1-based)
    #[arg(short, long)]
    pub segment: Option<NonZeroUsize>,

    /// Questioning mode (defaults to the configured mode)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Treat every language as a single segment
    #[arg(long)]
    pub no_segments: bool,

    /// Also write the highlighted article to this HTML file on every refresh
    #[arg(long)]
    pub html: Option<PathBuf>,
}

/// One evaluator command
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Answer,
    Skip,
    Language(String),
    /// 1-based segment number
    Segment(NonZeroUsize),
    Export,
    Help,
    Quit,
}

impl Action {
    fn parse(line: &str) -> Option<Action> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or("a");
        let arg = parts.next();

        match (verb, arg) {
            ("a" | "answer", _) => Some(Action::Answer),
            ("s" | "skip" | "n" | "next", _) => Some(Action::Skip),
            ("l" | "lang", Some(lang)) => Some(Action::Language(lang.to_string())),
            ("g" | "segment", Some(n)) => n.parse().ok().map(Action::Segment),
            ("e" | "export", _) => Some(Action::Export),
            ("?" | "h" | "help", _) => Some(Action::Help),
            ("q" | "quit" | "exit", _) => Some(Action::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "Commands:
  [enter] / a      answer the current item
  s / skip         continue to the next item without answering
  l <lang>         switch language
  g <n>            switch to segment n
  e / export       export this session's responses
  q / quit         leave (responses are already saved)";

/// Read one trimmed line; None on end of input
fn read_line(input: &mut impl BufRead, prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask until the answer parses; empty input picks `default` when there is one
fn ask<T: std::str::FromStr>(
    input: &mut impl BufRead,
    question: &str,
    options: &[&str],
    default: Option<T>,
) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    println!("\n{}", question);
    for (i, option) in options.iter().enumerate() {
        println!("  {}) {}", i + 1, option);
    }

    let mut default = default;
    loop {
        let Some(line) = read_line(input, "> ")? else {
            return Ok(None);
        };
        if line.is_empty() {
            if let Some(value) = default.take() {
                return Ok(Some(value));
            }
            continue;
        }
        match line.parse::<T>() {
            Ok(value) => return Ok(Some(value)),
            Err(e) => println!("{}", e),
        }
    }
}

/// Collect answers for the questions of the current unit
fn collect_answers(input: &mut impl BufRead, questions: &[Question]) -> Result<Option<Answers>> {
    let mut makes_sense = None;
    let mut issues = None;
    let mut multi_labels = None;
    let mut confidence = Confidence::default();

    for &question in questions {
        match question {
            Question::MakesSense => {
                let labels: Vec<_> = MakesSense::ALL.iter().map(|o| o.label()).collect();
                match ask::<MakesSense>(input, question.prompt(), &labels, None)? {
                    Some(v) => makes_sense = Some(v),
                    None => return Ok(None),
                }
            }
            Question::Issues => {
                let labels: Vec<_> = Issue::ALL.iter().map(|o| o.label()).collect();
                match ask::<Issue>(input, question.prompt(), &labels, Some(Issue::NotApplicable))? {
                    Some(v) => issues = Some(v),
                    None => return Ok(None),
                }
            }
            Question::LabelCount => {
                let labels: Vec<_> = LabelCount::ALL.iter().map(|o| o.label()).collect();
                match ask::<LabelCount>(
                    input,
                    question.prompt(),
                    &labels,
                    Some(LabelCount::NotApplicable),
                )? {
                    Some(v) => multi_labels = Some(v),
                    None => return Ok(None),
                }
            }
            Question::Confidence => {
                match ask::<Confidence>(input, question.prompt(), &[], Some(Confidence::default()))? {
                    Some(v) => confidence = v,
                    None => return Ok(None),
                }
            }
        }
    }

    let Some(makes_sense) = makes_sense else {
        return Ok(None);
    };
    Ok(Some(Answers {
        makes_sense,
        issues,
        multi_labels,
        confidence,
    }))
}

/// Mention and role details of a unit, stripped of terminal control sequences
fn unit_details(unit: &UnitView<'_>) -> String {
    let esc = |text: &str| TerminalMarkup.escape(text);

    let mut out = format!("Entity mention: {}\n", esc(&unit.entity.entity_mention));
    out.push_str(&format!("Main role: {}\n", esc(&unit.entity.main_role)));
    if let Some(role) = unit.judged_role {
        out.push_str(&format!("Judged role: {}\n", esc(role)));
    }
    out.push_str("Predicted fine-grained roles:\n");
    for info in &unit.roles {
        out.push_str(&format!("  - {} [{}]\n", esc(&info.fine_role), esc(&info.coarse_role)));
        out.push_str(&format!("      Description: {}\n", esc(&info.description)));
        out.push_str(&format!("      Example: {}\n", esc(&info.example)));
    }
    out
}

fn print_unit(unit: &UnitView<'_>) {
    println!("\n{}", "=".repeat(72));
    println!(
        "Language: {} | Segment {} of {} | Article {} of {} | Item {} of {} in this article | {:.0}% done",
        TerminalMarkup.escape(&unit.lang),
        unit.segment_index + 1,
        unit.segment_count,
        unit.article_number,
        unit.article_total,
        unit.unit_number,
        unit.unit_total,
        unit.progress.fraction() * 100.0
    );
    println!("{}\n", "=".repeat(72));
    println!("{}\n", unit.highlighted(&TerminalMarkup));
    print!("{}", unit_details(unit));
}

fn print_view(view: &View<'_>) {
    match view {
        View::Unit(unit) => print_unit(unit),
        View::Complete {
            lang,
            segment_index,
            segment_count,
            ..
        } => {
            println!(
                "\nYou've completed segment {} of {} for {}!",
                segment_index + 1,
                segment_count,
                lang
            );
            println!("Pick another segment (g <n>) or language (l <lang>), or quit.");
        }
    }
}

fn write_html(path: &Path, view: &View<'_>) -> Result<()> {
    let body = match view {
        View::Unit(unit) => unit.highlighted(&HtmlMarkup),
        View::Complete { lang, .. } => format!("Segment complete for {}", lang),
    };
    let page = HtmlMarkup.document("rolecheck review", &body);
    std::fs::write(path, page).with_context(|| format!("Failed to write HTML: {}", path.display()))
}

/// Run an interactive review session on stdin/stdout
pub fn execute_review(args: ReviewArgs) -> Result<()> {
    let cfg = config::config()?;
    let corpus = load_configured_corpus(cfg)?;
    let taxonomy = load_taxonomy(&cfg.taxonomy).unwrap_or_else(|e| {
        warn!(error = %e, "Taxonomy unavailable, role descriptions will be placeholders");
        Default::default()
    });

    let mut settings = cfg.review.clone();
    if let Some(mode) = args.mode {
        settings.mode = mode.into();
    }
    if args.no_segments {
        settings.segmented = false;
    }

    let mut session = ReviewSession::new(&corpus, &taxonomy, settings, args.name.clone())?;
    let progress_store = ProgressStore::new(&cfg.progress_dir);
    if let Some(checkpoint) = progress_store.load(&args.name)? {
        session.restore(&checkpoint);
    }
    if let Some(lang) = &args.lang {
        session.select_language(lang)?;
    }
    if let Some(n) = args.segment {
        session.select_segment(n.get() - 1)?;
    }

    let mut sink = ResponseSink::new(&cfg.responses_dir);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("Evaluator: {}", session.evaluator());
    println!("Languages: {}", session.languages().join(", "));
    println!("{}", HELP);

    loop {
        let view = session.view();
        print_view(&view);
        if let Some(path) = &args.html {
            write_html(path, &view)?;
        }

        let Some(line) = read_line(&mut input, "\n[a]nswer / [s]kip / l <lang> / g <n> / [e]xport / [q]uit > ")? else {
            break;
        };
        let Some(action) = Action::parse(&line) else {
            println!("Unknown command: {}", line);
            continue;
        };

        let outcome: Result<(), ReviewError> = match action {
            Action::Answer => {
                let View::Unit(unit) = &view else {
                    println!("Nothing left to answer in this segment.");
                    continue;
                };
                match collect_answers(&mut input, unit.questions)? {
                    Some(answers) => session.submit(answers, &mut sink).map(|_| println!("Response recorded!")),
                    None => break,
                }
            }
            Action::Skip => session.skip().map(|_| ()),
            Action::Language(lang) => session.select_language(&lang).map(|_| ()),
            Action::Segment(n) => session.select_segment(n.get() - 1).map(|_| ()),
            Action::Export => {
                match sink.export(&cfg.exports_dir, session.evaluator(), session.session_id()) {
                    Ok(path) => println!("Exported {} response(s) to {}", sink.log().len(), path.display()),
                    Err(e) => println!("Error: {}", e),
                }
                continue;
            }
            Action::Help => {
                println!("{}", HELP);
                continue;
            }
            Action::Quit => break,
        };

        if let Err(e) = outcome {
            println!("Error: {}", e);
        }

        if let Err(e) = progress_store.save(&session.checkpoint()) {
            warn!(error = %e, "Failed to save progress");
        }
    }

    if !sink.log().is_empty() {
        println!(
            "\n{} response(s) recorded this session. Use `e` during a session to export them.",
            sink.log().len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse(""), Some(Action::Answer));
        assert_eq!(Action::parse("skip"), Some(Action::Skip));
        assert_eq!(Action::parse("l hi"), Some(Action::Language("hi".to_string())));
        assert_eq!(Action::parse("g 3"), NonZeroUsize::new(3).map(Action::Segment));
        assert_eq!(Action::parse("g x"), None);
        assert_eq!(Action::parse("g 0"), None);
        assert_eq!(Action::parse("l"), None);
        assert_eq!(Action::parse("q"), Some(Action::Quit));
    }

    #[test]
    fn test_collect_per_entity_answers() {
        let questions = crate::review::ReviewMode::PerEntity.questions();
        let mut input = io::Cursor::new("maybe\n2\n\n3\n5\n");
        let answers = collect_answers(&mut input, questions).unwrap().unwrap();
        assert_eq!(answers.makes_sense, MakesSense::No);
        assert_eq!(answers.issues, Some(Issue::NotApplicable));
        assert_eq!(answers.multi_labels, Some(LabelCount::ThreeOrMore));
        assert_eq!(answers.confidence.value(), 5);
    }

    #[test]
    fn test_unit_details_strip_control_sequences() {
        use crate::domain::{EntityRecord, RoleInfo, RoleList};
        use crate::review::{Progress, ReviewMode};

        let entity = EntityRecord {
            article_id: "a1".to_string(),
            lang: "en".to_string(),
            text: "Boss speaks".to_string(),
            entity_mention: "Boss".to_string(),
            start_offset: 0,
            end_offset: 3,
            main_role: "\x1b[2JAntagonist".to_string(),
            predicted_roles: RoleList::new(["Tyrant"]),
            gold_roles: None,
        };
        let unit = UnitView {
            lang: "en".to_string(),
            segment_index: 0,
            segment_count: 1,
            segment_id: None,
            article_id: "a1".to_string(),
            article_number: 1,
            article_total: 1,
            unit_number: 1,
            unit_total: 1,
            entity: &entity,
            judged_role: Some("Tyrant\x1b[0m"),
            roles: vec![RoleInfo {
                fine_role: "Tyrant".to_string(),
                coarse_role: "Antagonist\x07".to_string(),
                description: "Rules \x1b]0;title\x07by force".to_string(),
                example: "A dictator".to_string(),
                known: true,
            }],
            progress: Progress { completed: 0, total: 1 },
            questions: ReviewMode::PerEntity.questions(),
        };

        let details = unit_details(&unit);
        assert!(!details.chars().any(|c| c.is_control() && c != '\n'));
        assert!(details.contains("Main role: [2JAntagonist"));
        assert!(details.contains("Judged role: Tyrant[0m"));
        assert!(details.contains("Description: Rules ]0;titleby force"));
    }

    #[test]
    fn test_segment_zero_rejected_on_command_line() {
        use clap::Parser;

        let parsed = crate::cli::Cli::try_parse_from(["rolecheck", "review", "--name", "ana", "--segment", "0"]);
        assert!(parsed.is_err());

        let parsed = crate::cli::Cli::try_parse_from(["rolecheck", "review", "--name", "ana", "--segment", "2"]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_collect_answers_end_of_input() {
        let questions = crate::review::ReviewMode::PerLabel.questions();
        let mut input = io::Cursor::new("1\n");
        assert!(collect_answers(&mut input, questions).unwrap().is_none());
    }
}
