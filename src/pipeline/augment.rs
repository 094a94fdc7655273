//! `Augment`: carries forward the most recently seen motion command and the
//! most recently seen X/Y/Z values, so later stages can rely on every
//! motion line carrying an explicit command and a full coordinate triple.

use crate::decimal::ExactNum;
use crate::lexer::{Token, TokenKind};
use crate::line::Line;

#[derive(Default, Clone)]
struct Carry {
    motion: Option<Token>,
    x: Option<ExactNum>,
    y: Option<ExactNum>,
    z: Option<ExactNum>,
}

/// For any line containing an X, Y, or Z argument: if it lacks a motion
/// command, prepends the remembered one; always re-emits X, Y, Z in that
/// order with any trailing I, J, K moved to the end.
pub fn augment(lines: impl Iterator<Item = Line>) -> impl Iterator<Item = Line> {
    let mut carry = Carry::default();
    lines.map(move |mut line| {
        if line.has_movement_command() {
            if let Some(t) = line.tokens().iter().find(|t| t.is_motion_command()) {
                carry.motion = Some(t.clone());
            }
        }
        for t in line.tokens() {
            match t.code() {
                'X' if t.kind() == TokenKind::Argument => carry.x = t.value().cloned(),
                'Y' if t.kind() == TokenKind::Argument => carry.y = t.value().cloned(),
                'Z' if t.kind() == TokenKind::Argument => carry.z = t.value().cloned(),
                _ => {}
            }
        }

        let has_xyz = line
            .tokens()
            .iter()
            .any(|t| t.kind() == TokenKind::Argument && matches!(t.code(), 'X' | 'Y' | 'Z'));
        if !has_xyz {
            return line;
        }

        if !line.has_movement_command() {
            if let Some(m) = carry.motion.clone() {
                line.prepend(m);
            }
        }

        let mut ijk = Vec::new();
        let mut rest = Vec::new();
        let mut xyz_tokens = Vec::new();
        for t in line.tokens() {
            match t.code() {
                'I' | 'J' | 'K' if t.kind() == TokenKind::Argument => ijk.push(t.clone()),
                'X' | 'Y' | 'Z' if t.kind() == TokenKind::Argument => {}
                _ => rest.push(t.clone()),
            }
        }
        if let Some(x) = &carry.x {
            xyz_tokens.push(Token::argument('X', x.clone()));
        }
        if let Some(y) = &carry.y {
            xyz_tokens.push(Token::argument('Y', y.clone()));
        }
        if let Some(z) = &carry.z {
            xyz_tokens.push(Token::argument('Z', z.clone()));
        }
        rest.extend(xyz_tokens);
        rest.extend(ijk);
        Line::from_tokens(rest)
    })
}
