//! `Clip`: rounds every numeric token to a precision derived from units and
//! per-letter rules.

use crate::decimal::ExactNum;
use crate::geometry::Units;
use crate::lexer::{Token, TokenKind};
use crate::line::Line;

fn precision_for(letter: char, units: Units, general_tolerance: f64) -> u32 {
    let tol_places = ExactNum::from_f64(general_tolerance, 6).decimal_places() as u32;
    match letter {
        'I' | 'J' | 'K' => match units {
            Units::Metric => 4,
            Units::Imperial => 5,
        },
        _ => tol_places,
    }
}

/// Rounds every numeric argument token to its letter-appropriate precision.
/// Idempotent: re-clipping an already-clipped line is a no-op.
pub fn clip(lines: impl Iterator<Item = Line>, units: Units, general_tolerance: f64) -> impl Iterator<Item = Line> {
    lines.map(move |line| {
        let tokens: Vec<Token> = line
            .tokens()
            .iter()
            .map(|t| {
                if t.kind() == TokenKind::Argument {
                    if let Some(v) = t.value() {
                        let places = precision_for(t.code(), units, general_tolerance);
                        return Token::argument(t.code(), v.rounded(places));
                    }
                }
                t.clone()
            })
            .collect();
        Line::from_tokens(tokens)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_coordinate_to_tolerance_precision() {
        let input = vec![Line::new("G1 X1.23456789")];
        let out: Vec<_> = clip(input.into_iter(), Units::Metric, 0.001).collect();
        assert_eq!(out[0].render(), "G1 X1.235");
    }

    #[test]
    fn arc_offsets_use_unit_dependent_precision() {
        let input = vec![Line::new("G2 X0 Y0 I1.23456789 J1.23456789")];
        let out: Vec<_> = clip(input.into_iter(), Units::Metric, 0.001).collect();
        assert!(out[0].render().contains("I1.2346"));
    }

    #[test]
    fn clip_is_idempotent() {
        let input = vec![Line::new("G1 X1.23456789")];
        let once: Vec<_> = clip(input.into_iter(), Units::Metric, 0.001).collect();
        let twice: Vec<_> = clip(once.clone().into_iter(), Units::Metric, 0.001).collect();
        assert_eq!(once, twice);
    }
}
