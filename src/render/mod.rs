//! Entity highlighting renderer.
//!
//! `render` walks the text once, emitting escaped literal text between spans
//! and delegating the span markers to a `Markup` implementation.

pub mod highlight;
pub mod markup;

pub use highlight::{render, Span, SpanState};
pub use markup::{HtmlMarkup, Markup, TerminalMarkup};
