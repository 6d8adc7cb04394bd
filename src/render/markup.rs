//! Markup targets for the highlighter.

use super::highlight::SpanState;

/// How highlighted text is written for one output medium.
///
/// `render` escapes every piece of literal text and label text through
/// `escape` before handing it to `entity`.
pub trait Markup {
    /// Neutralize characters that are significant in this medium
    fn escape(&self, text: &str) -> String;

    /// Write one highlighted mention followed by its label marker
    fn entity(&self, out: &mut String, mention: &str, labels: &str, label_text: &str, state: SpanState);
}

/// HTML fragments for embedding in a page
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMarkup;

impl HtmlMarkup {
    pub const STYLESHEET: &'static str = r#"<style>
.entity {
  background-color: #facc15;
  color: #111827;
  padding: 4px 8px;
  border-radius: 6px;
  font-weight: 600;
  font-size: 14px;
  margin: 2px 2px 6px 0;
  display: inline-block;
  box-shadow: 0 1px 2px rgba(0,0,0,0.2);
}
.entity-label {
  background-color: #0073e6;
  color: #ffffff;
  font-size: 13.5px;
  font-style: italic;
  padding: 2px 6px;
  border-radius: 4px;
  margin-left: 6px;
  display: inline-block;
}
.article-box {
  background-color: #fdfdfd;
  border-left: 6px solid #6366f1;
  padding: 1.25rem;
  border-radius: 10px;
  font-size: 17px;
  line-height: 1.75;
}
</style>"#;

    fn background(state: SpanState) -> &'static str {
        match state {
            SpanState::Plain => "#facc15",
            SpanState::Match => "#96f1b3",
            SpanState::Mismatch => "#d87575",
        }
    }

    fn class(state: SpanState) -> &'static str {
        match state {
            SpanState::Plain => "entity",
            SpanState::Match => "entity entity-match",
            SpanState::Mismatch => "entity entity-mismatch",
        }
    }

    /// Standalone page around a rendered fragment
    pub fn document(&self, title: &str, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}\n</head>\n<body>\n<div class='article-box'>{}</div>\n</body>\n</html>\n",
            self.escape(title),
            Self::STYLESHEET,
            body
        )
    }
}

impl Markup for HtmlMarkup {
    fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                c => out.push(c),
            }
        }
        out
    }

    fn entity(&self, out: &mut String, mention: &str, labels: &str, label_text: &str, state: SpanState) {
        out.push_str(&format!(
            "<span class='{}' data-labels='{}' style='background:{}'>{}</span><span class='entity-label'>{}</span>",
            Self::class(state),
            labels,
            Self::background(state),
            mention,
            label_text
        ));
    }
}

/// ANSI-colored text for the interactive terminal review
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalMarkup;

const RESET: &str = "\x1b[0m";

impl Markup for TerminalMarkup {
    fn escape(&self, text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect()
    }

    fn entity(&self, out: &mut String, mention: &str, _labels: &str, label_text: &str, state: SpanState) {
        let color = match state {
            SpanState::Plain => "\x1b[1;30;43m",
            SpanState::Match => "\x1b[1;30;42m",
            SpanState::Mismatch => "\x1b[1;37;41m",
        };
        out.push_str(&format!("{color}{mention}{RESET} \x1b[3;34m[{label_text}]{RESET}"));
    }
}
