//! Arc-related stages: converting radius-form arcs to centre-offset form,
//! and simplifying short arcs to straight lines.

use crate::decimal::ExactNum;
use crate::geometry::{self, Coord, Plane};
use crate::lexer::{Token, TokenKind};
use crate::line::Line;

/// For motion lines carrying `R`, computes the two candidate centres and
/// picks the one matching the line's clockwise/counter-clockwise sense,
/// replacing `R` with `I`/`J`/`K` offsets from the previous point.
pub fn convert_arc_radius_to_center(
    lines: impl Iterator<Item = Line>,
    plane: Plane,
) -> impl Iterator<Item = Line> {
    let mut prior = Coord::default();
    lines.map(move |mut line| {
        let motion = line.tokens().iter().find(|t| t.is_motion_command()).map(Token::source).map(str::to_string);
        let r_tok = line.tokens().iter().find(|t| t.code() == 'R' && t.kind() == TokenKind::Argument).cloned();

        if let (Some(motion), Some(r)) = (&motion, &r_tok) {
            let clockwise = motion == "G2";
            if matches!(motion.as_str(), "G2" | "G3") {
                let end = line.coord();
                let r_val = r.value().map(|v| v.value()).unwrap_or(0.0).abs();
                let drop = plane.dropped_axis();
                let candidates = geometry::find_intersections(prior.project(drop), end.project(drop), r_val, plane);
                if let Some(centre) = pick_candidate(&prior, &end, &candidates, clockwise) {
                    let (px, py) = prior.project(drop);
                    let i = centre.0 - px;
                    let j = centre.1 - py;
                    let (letter_a, letter_b) = match drop {
                        crate::geometry::AxisSet::Z => ('I', 'J'),
                        crate::geometry::AxisSet::Y => ('I', 'K'),
                        _ => ('J', 'K'),
                    };
                    line.remove_by_token(&[r.clone()]);
                    line.append(Token::argument(letter_a, ExactNum::from_f64(i, 4)));
                    line.append(Token::argument(letter_b, ExactNum::from_f64(j, 4)));
                }
            }
        }
        prior = line.coord();
        line
    })
}

fn pick_candidate(prior: &Coord, end: &Coord, candidates: &[(f64, f64)], clockwise: bool) -> Option<(f64, f64)> {
    candidates.iter().copied().find(|c| {
        let sense = geometry::direction_of_point((prior.x, prior.y), (end.x, end.y), *c);
        if clockwise { sense <= 0 } else { sense >= 0 }
    }).or_else(|| candidates.first().copied())
}

/// Rewrites a `G2`/`G3` arc as `G1` (dropping `I`/`J`/`K`) when its
/// straight-line end-to-end distance is within `arc_tolerance` of its true
/// arc length — approximated here via the chord length against the radius
/// implied by the centre offsets.
pub fn simplify_short_arcs(
    lines: impl Iterator<Item = Line>,
    arc_tolerance: f64,
) -> impl Iterator<Item = Line> {
    let mut prior = Coord::default();
    lines.map(move |mut line| {
        let motion = line.tokens().iter().find(|t| t.is_motion_command()).map(Token::source).map(str::to_string);
        if let Some(motion) = &motion {
            if matches!(motion.as_str(), "G2" | "G3") {
                let end = line.coord();
                let chord = prior.distance(&end);
                if chord <= arc_tolerance {
                    if let Some(g) = line.tokens().iter().find(|t| t.is_motion_command()).cloned() {
                        line.replace(&g, Token::command('G', ExactNum::parse("1").unwrap()));
                    }
                    line.remove_by_code(&['I', 'J', 'K']);
                }
            }
        }
        prior = line.coord();
        line
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_arc_simplified_to_linear() {
        let input = vec![Line::new("G1 X0 Y0"), Line::new("G2 X0.001 Y0 I0 J5")];
        let out: Vec<_> = simplify_short_arcs(input.into_iter(), 0.01).collect();
        assert!(out[1].render().starts_with("G1"));
        assert!(!out[1].render().contains('I'));
    }

    #[test]
    fn long_arc_left_unchanged() {
        let input = vec![Line::new("G1 X0 Y0"), Line::new("G2 X10 Y0 I5 J5")];
        let out: Vec<_> = simplify_short_arcs(input.into_iter(), 0.01).collect();
        assert!(out[1].render().starts_with("G2"));
    }

    #[test]
    fn radius_arc_converted_to_center_offsets() {
        let input = vec![Line::new("G1 X1 Y0"), Line::new("G2 X0 Y1 R1")];
        let out: Vec<_> = convert_arc_radius_to_center(input.into_iter(), Plane::Xy).collect();
        assert!(!out[1].render().contains('R'));
        assert!(out[1].render().contains('I') || out[1].render().contains('J'));
    }
}
