//! `FileDemarcation`: strips leading blank lines, tracks the leading `%`,
//! lifts the cutter before the first stop command, comments out everything
//! after the first stop, and appends the correct postamble once the stream
//! ends.

use crate::decimal::ExactNum;
use crate::lexer::{Token, TokenKind};
use crate::line::Line;
use crate::modal;

pub struct Demarcation<I: Iterator<Item = Line>> {
    inner: std::iter::Peekable<I>,
    leading_terminator: bool,
    seen_first_non_blank: bool,
    stopped: bool,
    current_z: f64,
    vertical_clamp: f64,
    pending: std::collections::VecDeque<Line>,
    finished: bool,
}

impl<I: Iterator<Item = Line>> Demarcation<I> {
    pub fn new(inner: I, vertical_clamp: f64) -> Self {
        Self {
            inner: inner.peekable(),
            leading_terminator: false,
            seen_first_non_blank: false,
            stopped: false,
            current_z: 0.0,
            vertical_clamp,
            pending: std::collections::VecDeque::new(),
            finished: false,
        }
    }
}

impl<I: Iterator<Item = Line>> Iterator for Demarcation<I> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if let Some(line) = self.pending.pop_front() {
            return Some(line);
        }
        loop {
            let Some(line) = self.inner.next() else {
                if self.finished {
                    return None;
                }
                self.finished = true;
                return Some(postamble_line(self.leading_terminator, self.stopped));
            };

            if !self.seen_first_non_blank {
                if line.is_empty_or_whitespace() {
                    continue;
                }
                self.seen_first_non_blank = true;
                if line.is_file_terminator() {
                    self.leading_terminator = true;
                    continue;
                }
            }

            if line.is_file_terminator() {
                if self.inner.peek().is_none() {
                    // Trailing `%` with no leading one is discarded; with a
                    // leading one, it is subsumed into the postamble.
                    continue;
                }
                continue;
            }

            if self.stopped {
                // After the first stop, comment out everything else.
                let rendered = line.render();
                if rendered.is_empty() {
                    continue;
                }
                return Some(Line::from_tokens(vec![Token::comment(&rendered)]));
            }

            for t in line.tokens() {
                if t.code() == 'Z' && t.kind() == TokenKind::Argument {
                    if let Some(v) = t.value() {
                        self.current_z = v.value();
                    }
                }
            }

            if modal::ALL_STOP.matches(&line) {
                self.stopped = true;
                if self.current_z < 0.0 {
                    let lift = Line::from_tokens(vec![
                        Token::command('G', ExactNum::parse("0").unwrap()),
                        Token::argument('Z', ExactNum::from_f64(self.vertical_clamp, 4)),
                    ]);
                    self.pending.push_back(line);
                    return Some(lift);
                }
            }

            return Some(line);
        }
    }
}

fn postamble_line(leading_terminator: bool, stopped: bool) -> Line {
    let marker = Token::comment("Postamble completed by GCodeClean");
    let mut tokens = vec![marker];
    if !stopped {
        if leading_terminator {
            tokens.push(Token::file_terminator());
        } else {
            tokens.insert(0, Token::command('M', ExactNum::parse("30").unwrap()));
        }
    } else if leading_terminator {
        tokens.push(Token::file_terminator());
    }
    Line::from_tokens(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_blank_lines_stripped() {
        let input = vec![Line::new(""), Line::new("G1 X10")];
        let out: Vec<_> = Demarcation::new(input.into_iter(), 1.0).collect();
        assert_eq!(out[0].render(), "G1 X10");
    }

    #[test]
    fn appends_m30_postamble_when_no_stop_seen() {
        let input = vec![Line::new("G1 X10")];
        let out: Vec<_> = Demarcation::new(input.into_iter(), 1.0).collect();
        let last = out.last().unwrap();
        assert!(last.tokens().iter().any(|t| t.source() == "M30"));
    }

    #[test]
    fn lifts_z_before_stop_when_negative() {
        let input = vec![Line::new("G1 Z-5"), Line::new("M30")];
        let out: Vec<_> = Demarcation::new(input.into_iter(), 1.0).collect();
        assert!(out.iter().any(|l| l.render().contains("Z1")));
    }

    #[test]
    fn comments_out_lines_after_first_stop() {
        let input = vec![Line::new("M30"), Line::new("G1 X10")];
        let out: Vec<_> = Demarcation::new(input.into_iter(), 1.0).collect();
        let commented = out.iter().find(|l| l.render().contains("X10")).unwrap();
        assert_eq!(commented.tokens()[0].kind(), TokenKind::Comment);
    }
}
