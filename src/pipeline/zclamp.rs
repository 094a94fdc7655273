//! `ZClamp`: clamps positive Z excursions to the configured vertical clamp
//! and adjusts rapid/linear motion accordingly.

use crate::decimal::ExactNum;
use crate::lexer::{Token, TokenKind};
use crate::line::Line;

#[derive(Default)]
struct Tracked {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    seen_simple_motion: bool,
}

pub fn zclamp(lines: impl Iterator<Item = Line>, vertical_clamp: f64) -> impl Iterator<Item = Line> {
    let mut prior = Tracked::default();
    lines.map(move |mut line| {
        let motion = line.tokens().iter().find(|t| t.is_motion_command()).map(Token::source).map(str::to_string);
        let z_tok = line
            .tokens()
            .iter()
            .find(|t| t.code() == 'Z' && t.kind() == TokenKind::Argument)
            .cloned();
        let x_tok = line.tokens().iter().find(|t| t.code() == 'X' && t.kind() == TokenKind::Argument).and_then(|t| t.value()).map(|v| v.value());
        let y_tok = line.tokens().iter().find(|t| t.code() == 'Y' && t.kind() == TokenKind::Argument).and_then(|t| t.value()).map(|v| v.value());

        if let (Some(z), Some(motion)) = (&z_tok, &motion) {
            let is_simple_motion = matches!(motion.as_str(), "G0" | "G1" | "G2" | "G3");
            if is_simple_motion {
                let z_val = z.value().map(|v| v.value()).unwrap_or(0.0);
                let prior_positive = prior.z.map(|v| v > 0.0).unwrap_or(false);
                let xy_unchanged = x_tok == prior.x && y_tok == prior.y;
                let is_first_motion = !prior.seen_simple_motion;

                if z_val > 0.0 {
                    let clamped = ExactNum::from_f64(vertical_clamp, z.value().map(|v| v.decimal_places() as u32).unwrap_or(4));
                    line.replace(z, Token::argument('Z', clamped));
                    if is_first_motion || prior_positive || xy_unchanged {
                        demote_to_rapid(&mut line);
                    }
                } else if z_val < 0.0 && motion == "G0" {
                    promote_to_linear(&mut line);
                }
                // z_val == 0.0 on a linear command: left alone (surface exit).
                prior.z = Some(z_val);
                prior.seen_simple_motion = true;
            }
        }
        if let Some(x) = x_tok {
            prior.x = Some(x);
        }
        if let Some(y) = y_tok {
            prior.y = Some(y);
        }
        line
    })
}

fn demote_to_rapid(line: &mut Line) {
    if let Some(g) = line.tokens().iter().find(|t| t.is_motion_command()).cloned() {
        line.replace(&g, Token::command('G', ExactNum::parse("0").unwrap()));
    }
}

fn promote_to_linear(line: &mut Line) {
    if let Some(g) = line.tokens().iter().find(|t| t.is_motion_command()).cloned() {
        line.replace(&g, Token::command('G', ExactNum::parse("1").unwrap()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_z_clamped() {
        let input = vec![Line::new("G1 X10 Z50")];
        let out: Vec<_> = zclamp(input.into_iter(), 2.0).collect();
        assert!(out[0].render().contains("Z2"));
    }

    #[test]
    fn first_motion_with_positive_z_demotes_to_rapid() {
        let input = vec![Line::new("G1 X0 Y0 Z5")];
        let out: Vec<_> = zclamp(input.into_iter(), 2.0).collect();
        assert_eq!(out[0].render(), "G0 X0 Y0 Z2");
    }

    #[test]
    fn negative_z_on_rapid_promotes_to_linear() {
        let input = vec![Line::new("G0 Z-5")];
        let out: Vec<_> = zclamp(input.into_iter(), 2.0).collect();
        assert!(out[0].render().starts_with("G1"));
    }

    #[test]
    fn repeated_positive_z_demotes_to_rapid() {
        let input = vec![Line::new("G1 X0 Y0 Z5"), Line::new("G1 X0 Y0 Z6")];
        let out: Vec<_> = zclamp(input.into_iter(), 2.0).collect();
        assert!(out[1].render().starts_with("G0"));
    }

    #[test]
    fn surface_exit_left_alone() {
        let input = vec![Line::new("G1 X10 Z0")];
        let out: Vec<_> = zclamp(input.into_iter(), 2.0).collect();
        assert!(out[0].render().starts_with("G1"));
    }
}
