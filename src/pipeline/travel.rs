//! `DetectTravelling`: injects a structured comment immediately before every
//! transition from cutting (Z ≤ 0) to travelling (Z > 0), recording the
//! pass's sequence number, deepest Z, and entry/exit lines.

use crate::lexer::{Token, TokenKind};
use crate::line::Line;

#[derive(Default)]
struct PassState {
    seq: u32,
    sub_seq: u32,
    z_max_negative: f64,
    entry_line: Option<String>,
    tool: String,
}

pub struct DetectTravelling<I: Iterator<Item = Line>> {
    inner: I,
    pass: PassState,
    was_cutting: bool,
    pending: Option<Line>,
}

impl<I: Iterator<Item = Line>> DetectTravelling<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            pass: PassState::default(),
            was_cutting: false,
            pending: None,
        }
    }
}

impl<I: Iterator<Item = Line>> Iterator for DetectTravelling<I> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if let Some(line) = self.pending.take() {
            return Some(line);
        }
        let line = self.inner.next()?;

        if let Some(t) = line.tokens().iter().find(|t| t.code() == 'T' && t.kind() == TokenKind::Code) {
            self.pass.tool = t.source().to_string();
        }

        let z = line
            .tokens()
            .iter()
            .find(|t| t.code() == 'Z' && t.kind() == TokenKind::Argument)
            .and_then(|t| t.value())
            .map(|v| v.value());

        if let Some(z) = z {
            let is_cutting = z <= 0.0;
            if is_cutting {
                self.pass.z_max_negative = self.pass.z_max_negative.min(z);
            }
            if self.was_cutting && !is_cutting {
                let exit = self
                    .pass
                    .entry_line
                    .clone()
                    .unwrap_or_default();
                self.pass.seq += 1;
                let marker = Line::from_tokens(vec![Token::comment(&format!(
                    "||Travelling||{}||{}||{}||{}||{}||>>{}>>{}>>||",
                    self.pass.seq,
                    self.pass.sub_seq,
                    0,
                    self.pass.z_max_negative,
                    self.pass.tool,
                    exit,
                    line.render(),
                ))]);
                self.pass.z_max_negative = 0.0;
                self.pending = Some(line);
                self.was_cutting = is_cutting;
                return Some(marker);
            }
            if is_cutting {
                self.pass.entry_line = Some(line.render());
            }
            self.was_cutting = is_cutting;
        }

        Some(line)
    }
}
