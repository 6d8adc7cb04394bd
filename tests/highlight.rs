//! Highlighter Integration Tests
//!
//! Tests for inclusive offsets, escaping and comparison mode.

use rolecheck::render::{render, HtmlMarkup, Span, SpanState, TerminalMarkup};
use rolecheck::RoleList;

fn labels(items: &[&str]) -> RoleList {
    RoleList::new(items.iter().copied())
}

#[test]
fn test_inclusive_end_offset() {
    let text = "The quick fox";
    let html = render(text, &[Span::new(4, 8, labels(&["Hero"]))], &HtmlMarkup);
    assert!(html.contains(">quick</span>"));
    assert!(html.starts_with("The <span"));
    assert!(html.ends_with("</span> fox"));
}

#[test]
fn test_spec_example_offsets_five_to_nine() {
    // Characters 5..=9 of "The quick fox" are "uick " - the mention is the
    // slice [start, end_inclusive + 1)
    let text = "The quick fox";
    let expected: String = text.chars().skip(5).take(5).collect();
    let html = render(text, &[Span::new(5, 9, labels(&["X"]))], &HtmlMarkup);
    assert!(html.contains(&format!(">{}</span>", expected)));
}

#[test]
fn test_markup_characters_are_escaped() {
    let text = "a<b & c>d \"q\" 'r'";
    let html = render(
        text,
        &[Span::new(0, 2, labels(&["<script>", "A&B"]))],
        &HtmlMarkup,
    );

    assert!(!html.contains("<b"));
    assert!(!html.contains("<script>"));
    assert!(!html.contains(" & "));
    assert!(html.contains("a&lt;b"));
    assert!(html.contains("&amp;"));
    assert!(html.contains("&lt;script&gt;, A&amp;B"));
    assert!(html.contains("&quot;q&quot;"));
    assert!(html.contains("&#x27;r&#x27;"));
}

#[test]
fn test_comparison_match() {
    let span = Span::new(0, 2, labels(&["A"])).compared_with(labels(&["A"]));
    assert_eq!(span.state(), SpanState::Match);

    let html = render("Foo bar", &[span], &HtmlMarkup);
    assert!(html.contains("entity-match"));
    assert!(html.contains("#96f1b3"));
    assert!(!html.contains("entity-mismatch"));
}

#[test]
fn test_comparison_mismatch_shows_both_sets() {
    let span = Span::new(0, 2, labels(&["A"])).compared_with(labels(&["B"]));
    assert_eq!(span.state(), SpanState::Mismatch);

    let html = render("Foo bar", &[span], &HtmlMarkup);
    assert!(html.contains("entity-mismatch"));
    assert!(html.contains("#d87575"));
    assert!(html.contains("pred: A ⇄ gold: B"));
}

#[test]
fn test_comparison_ignores_label_order() {
    let span = Span::new(0, 0, labels(&["A", "B"])).compared_with(labels(&["B", "A"]));
    assert_eq!(span.state(), SpanState::Match);
}

#[test]
fn test_multiple_spans_keep_text_between() {
    let text = "Alice met Bob in Paris";
    let spans = [
        Span::new(17, 21, labels(&["Place"])),
        Span::new(0, 4, labels(&["Hero"])),
        Span::new(10, 12, labels(&["Spy"])),
    ];
    let out = render(text, &spans, &TerminalMarkup);

    let alice = out.find("Alice").unwrap();
    let bob = out.find("Bob").unwrap();
    let paris = out.find("Paris").unwrap();
    assert!(alice < bob && bob < paris);
    assert!(out.contains(" met "));
    assert!(out.contains(" in "));
}

#[test]
fn test_no_spans_is_escaped_text() {
    assert_eq!(render("x < y", &[], &HtmlMarkup), "x &lt; y");
    assert_eq!(render("", &[], &HtmlMarkup), "");
}
