//! `SingleCommandPerLine`: decomposes a multi-command line into a sequence
//! of single-command lines in machine execution order.

use crate::lexer::{Token, TokenKind};
use crate::line::Line;
use crate::modal;

/// The category a token belongs to for linter ordering purposes, in
/// execution order. Anything not recognised here is carried along with
/// whichever category claims it, or dropped if none does.
const CATEGORY_GROUPS: &[&modal::ModalGroup] = &[
    &modal::FEED_RATE_MODE,
    &modal::TOOL_CHANGE,
    &modal::SPINDLE_TURNING,
    &modal::COOLANT,
    &modal::OVERRIDE_ENABLING,
    &modal::DWELL,
    &modal::PLANE_SELECTION,
    &modal::LENGTH_UNITS,
    &modal::CUTTER_RADIUS_COMP,
    &modal::TOOL_LENGTH_OFFSET,
    &modal::COORDINATE_SYSTEM,
    &modal::PATH_CONTROL,
    &modal::DISTANCE_MODE,
    &modal::RETURN_MODE,
    &modal::HOME,
    &modal::CHANGE_COORD_SYS_DATA,
    &modal::COORD_SYS_OFFSET,
];

/// Splits each input line into a sequence of single-command output lines.
pub fn single_command_per_line(lines: impl Iterator<Item = Line>) -> impl Iterator<Item = Line> {
    lines.flat_map(split_line)
}

fn split_line(line: Line) -> Vec<Line> {
    let line_number = line
        .tokens()
        .iter()
        .find(|t| t.kind() == TokenKind::LineNumber)
        .cloned();
    let comments: Vec<Token> = line
        .tokens()
        .iter()
        .filter(|t| t.kind() == TokenKind::Comment)
        .cloned()
        .collect();

    let mut emitted: Vec<Vec<Token>> = Vec::new();

    // Feed-rate mode, then per-letter F/S/T, then the remaining grouped
    // categories in execution order.
    take_matching(&line, &modal::FEED_RATE_MODE, &mut emitted);
    for letter in ['F', 'S', 'T'] {
        take_letter(&line, letter, &mut emitted);
    }
    for group in &CATEGORY_GROUPS[1..] {
        take_matching(&line, group, &mut emitted);
    }

    // Motion: all Command(G) tokens not already claimed, plus their
    // arguments (G53 kept as a modifier alongside whichever motion it
    // qualifies).
    let claimed: std::collections::HashSet<Token> = emitted.iter().flatten().cloned().collect();
    let motion_tokens: Vec<Token> = line
        .tokens()
        .iter()
        .filter(|t| t.is_motion_command() && !modal::ALL_STOP.matches(&Line::from_tokens(vec![(*t).clone()])))
        .filter(|t| !claimed.contains(*t))
        .cloned()
        .collect();
    let arguments: Vec<Token> = line
        .tokens()
        .iter()
        .filter(|t| t.kind() == TokenKind::Argument)
        .cloned()
        .collect();
    if !motion_tokens.is_empty() {
        if arguments.is_empty() {
            // Motion command with no arguments is dropped.
        } else {
            let mut body = motion_tokens;
            body.extend(arguments);
            emitted.push(body);
        }
    } else if !arguments.is_empty() {
        // Bare arguments with no motion command (e.g. a parameter-only line)
        // still pass through.
        emitted.push(arguments);
    }

    // Stop group last.
    take_matching(&line, &modal::STOPPING, &mut emitted);

    let claimed: std::collections::HashSet<Token> = emitted.iter().flatten().cloned().collect();
    let leftover: Vec<Token> = line
        .tokens()
        .iter()
        .filter(|t| {
            !claimed.contains(*t)
                && !matches!(t.kind(), TokenKind::LineNumber | TokenKind::Comment)
        })
        .cloned()
        .collect();
    if !leftover.is_empty() {
        emitted.push(leftover);
    }

    if emitted.is_empty() {
        return vec![Line::from_tokens(
            line_number.into_iter().chain(comments).collect(),
        )];
    }

    let count = emitted.len();
    let mut out = Vec::with_capacity(count);
    for (i, mut tokens) in emitted.into_iter().enumerate() {
        if i == 0 {
            if let Some(n) = &line_number {
                tokens.push(n.clone());
            }
        }
        if i + 1 == count {
            tokens.extend(comments.iter().cloned());
        }
        out.push(Line::from_tokens(tokens));
    }
    out
}

fn take_matching(line: &Line, group: &modal::ModalGroup, emitted: &mut Vec<Vec<Token>>) {
    let toks: Vec<Token> = line
        .tokens()
        .iter()
        .filter(|t| t.kind() == TokenKind::Command && group.codes.contains(&t.source()))
        .cloned()
        .collect();
    if !toks.is_empty() {
        emitted.push(toks);
    }
}

fn take_letter(line: &Line, letter: char, emitted: &mut Vec<Vec<Token>>) {
    let toks: Vec<Token> = line
        .tokens()
        .iter()
        .filter(|t| t.code() == letter && t.kind() == TokenKind::Code)
        .cloned()
        .collect();
    if !toks.is_empty() {
        emitted.push(toks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_motion_and_mode_commands() {
        let line = Line::new("G90 G1 X10 Y20");
        let out = split_line(line);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].render(), "G90");
        assert_eq!(out[1].render(), "G1 X10 Y20");
    }

    #[test]
    fn motion_without_arguments_is_dropped() {
        let line = Line::new("G90 G1");
        let out = split_line(line);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].render(), "G90");
    }

    #[test]
    fn line_number_attached_to_first_line_only() {
        let line = Line::new("N10 G90 G1 X10");
        let out = split_line(line);
        assert!(out[0].has_line_number());
        assert!(!out[1].has_line_number());
    }

    #[test]
    fn feed_and_spindle_split_into_own_lines() {
        let line = Line::new("F100 S2000 M3");
        let out = split_line(line);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].render(), "F100");
        assert_eq!(out[1].render(), "S2000");
        assert_eq!(out[2].render(), "M3");
    }

    #[test]
    fn single_command_per_line_flattens_stream() {
        let input = vec![Line::new("G90 G1 X10"), Line::new("M3")];
        let out: Vec<_> = single_command_per_line(input.into_iter()).collect();
        assert_eq!(out.len(), 3);
    }
}
