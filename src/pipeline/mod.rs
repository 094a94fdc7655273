//! Streaming transformation stages, each a lazy iterator-to-iterator adapter
//! pulling one line from upstream per line it emits downstream.

pub mod annotate;
pub mod arc;
pub mod augment;
pub mod clip;
pub mod dedup;
pub mod demarcation;
pub mod join;
pub mod linter;
pub mod preamble;
pub mod travel;
pub mod zclamp;

use crate::line::Line;

/// Strips every `N`-token from each line. Pure, order-preserving, stateless.
pub fn eliminate_line_numbers(lines: impl Iterator<Item = Line>) -> impl Iterator<Item = Line> {
    lines.map(|mut line| {
        let has_numbers: Vec<_> = line
            .tokens()
            .iter()
            .filter(|t| t.kind() == crate::lexer::TokenKind::LineNumber)
            .cloned()
            .collect();
        if !has_numbers.is_empty() {
            line.remove_by_token(&has_numbers);
        }
        line
    })
}

/// Raw text lines, lexed into [`Line`]s.
pub fn tokenize_to_line(lines: impl Iterator<Item = String>) -> impl Iterator<Item = Line> {
    lines.map(|s| Line::new(&s))
}
