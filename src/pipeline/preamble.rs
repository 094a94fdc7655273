//! `InjectPreamble`: at the first motion-group token, dumps every
//! not-yet-emitted preamble declaration bracketed by marker comments and
//! ensures the vertical axis is clamped before the first move.

use crate::decimal::ExactNum;
use crate::lexer::Token;
use crate::line::Line;
use crate::modal::{ALL_MOTION, ModalContext};

pub struct InjectPreamble<I> {
    inner: I,
    ctx: ModalContext,
    vertical_clamp: f64,
    injected: bool,
    pending: std::collections::VecDeque<Line>,
}

impl<I: Iterator<Item = Line>> InjectPreamble<I> {
    pub fn new(inner: I, ctx: ModalContext, vertical_clamp: f64) -> Self {
        Self {
            inner,
            ctx,
            vertical_clamp,
            injected: false,
            pending: std::collections::VecDeque::new(),
        }
    }
}

impl<I: Iterator<Item = Line>> Iterator for InjectPreamble<I> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if let Some(line) = self.pending.pop_front() {
            return Some(line);
        }
        let line = self.inner.next()?;

        if !self.injected && ALL_MOTION.matches(&line) {
            self.injected = true;
            let pending: Vec<Line> = self
                .ctx
                .non_emitted_lines()
                .into_iter()
                .cloned()
                .collect();
            if !pending.is_empty() {
                self.pending
                    .push_back(Line::from_tokens(vec![Token::comment(
                        "Preamble completion by GCodeClean",
                    )]));
                for p in pending {
                    self.pending.push_back(p);
                }
                self.pending
                    .push_back(Line::from_tokens(vec![Token::comment(
                        "Preamble completed by GCodeClean",
                    )]));
            }
            self.pending.push_back(Line::from_tokens(vec![
                Token::command('G', ExactNum::parse("0").unwrap()),
                Token::argument('Z', ExactNum::from_f64(self.vertical_clamp, 4)),
            ]));
            self.ctx.mark_all_emitted();
            self.pending.push_back(line);
            return self.pending.pop_front();
        }

        self.ctx.update(line.clone(), true);
        Some(line)
    }
}
