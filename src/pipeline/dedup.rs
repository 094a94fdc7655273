//! Deduplication stages: repeated tokens within a line, context-represented
//! tokens, repeated whole lines, collinear points, and circular-fit points.

use std::collections::HashSet;

use crate::geometry::{self, AxisSet, Coord, Plane};
use crate::line::Line;
use crate::lexer::{Token, TokenKind};
use crate::modal::ModalContext;

/// Removes tokens repeated within the same line (same source, by value),
/// keeping the first occurrence.
pub fn dedup_repeated_tokens(lines: impl Iterator<Item = Line>) -> impl Iterator<Item = Line> {
    lines.map(|line| {
        let mut seen: HashSet<Token> = HashSet::new();
        let mut kept = Vec::new();
        for t in line.tokens() {
            if seen.insert(t.clone()) {
                kept.push(t.clone());
            }
        }
        Line::from_tokens(kept)
    })
}

/// Removes tokens already represented by the running modal context; a line
/// whose remainder becomes empty is dropped entirely. The context is updated
/// (and marked emitted) only for lines that are forwarded.
pub struct DedupContext<I> {
    inner: I,
    ctx: ModalContext,
}

impl<I: Iterator<Item = Line>> DedupContext<I> {
    pub fn new(inner: I, ctx: ModalContext) -> Self {
        Self { inner, ctx }
    }

    pub fn into_context(self) -> ModalContext {
        self.ctx
    }
}

impl<I: Iterator<Item = Line>> Iterator for DedupContext<I> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        for line in self.inner.by_ref() {
            let redundant: Vec<Token> = line
                .tokens()
                .iter()
                .filter(|t| is_modally_represented(&self.ctx, t))
                .cloned()
                .collect();
            let mut remainder = line.clone();
            if !redundant.is_empty() {
                remainder.remove_by_token(&redundant);
            }
            if remainder.is_empty_or_whitespace() {
                continue;
            }
            self.ctx.update(remainder.clone(), true);
            return Some(remainder);
        }
        None
    }
}

fn is_modally_represented(ctx: &ModalContext, t: &Token) -> bool {
    if matches!(t.code(), 'F' | 'S' | 'T') && t.kind() == TokenKind::Code {
        return ctx.get_modal_state_letter(t.code()) == Some(t.source());
    }
    if t.kind() == TokenKind::Command {
        for group in crate::modal::ALL_GROUPS {
            if group.codes.contains(&t.source()) {
                return ctx.get_modal_state(group) == Some(t.source());
            }
        }
    }
    false
}

/// Drops a line equal to its immediate predecessor (equality ignores
/// line-number tokens, per [`Line`]'s `PartialEq`).
pub fn dedup_line(lines: impl Iterator<Item = Line>) -> impl Iterator<Item = Line> {
    let mut prev: Option<Line> = None;
    lines.filter(move |line| {
        let keep = prev.as_ref() != Some(line);
        if keep {
            prev = Some(line.clone());
        }
        keep
    })
}

/// Three-point collinearity test over a running window. `B` is dropped iff
/// `A`→`C` is compatible with `A`→`B`, all three share the same populated
/// axis set, `B` lies within the axis-wise bounding box of `A` and `C`, and
/// the altitude of `B` from chord `A`→`C` (via Heron's formula) is within
/// `tolerance`.
pub fn dedup_linear(lines: impl Iterator<Item = Line>, tolerance: f64) -> Vec<Line> {
    let lines: Vec<Line> = lines.collect();
    if lines.len() < 3 {
        return lines;
    }
    let mut out = Vec::with_capacity(lines.len());
    let mut a_idx = 0usize;
    out.push(lines[0].clone());
    let mut i = 1usize;
    while i + 1 < lines.len() {
        let a = &lines[a_idx];
        let b = &lines[i];
        let c = &lines[i + 1];
        if is_collinear_drop(a, b, c, tolerance) {
            i += 1;
            continue;
        }
        out.push(b.clone());
        a_idx = i;
        i += 1;
    }
    if i < lines.len() {
        out.push(lines[i].clone());
    }
    out
}

fn is_collinear_drop(a: &Line, b: &Line, c: &Line, tolerance: f64) -> bool {
    if !a.is_compatible(b) || !a.is_compatible(c) {
        return false;
    }
    let (ca, cb, cc) = (a.coord(), b.coord(), c.coord());
    if ca.set != cb.set || cb.set != cc.set {
        return false;
    }
    if !within_bounding_box(&ca, &cb, &cc) {
        return false;
    }
    altitude_from_chord(&ca, &cb, &cc) <= tolerance
}

fn within_bounding_box(a: &Coord, b: &Coord, c: &Coord) -> bool {
    let within = |lo: f64, hi: f64, v: f64| v >= lo.min(hi) - 1e-9 && v <= lo.max(hi) + 1e-9;
    within(a.x, c.x, b.x) && within(a.y, c.y, b.y) && within(a.z, c.z, b.z)
}

/// Altitude of `b` from the line through `a` and `c`, via Heron's formula:
/// area from the three side lengths, then `h = 2*area / base`.
fn altitude_from_chord(a: &Coord, b: &Coord, c: &Coord) -> f64 {
    let ab = a.distance(b);
    let bc = b.distance(c);
    let ac = a.distance(c);
    if ac < 1e-12 {
        return ab.max(bc);
    }
    let s = (ab + bc + ac) / 2.0;
    let area_sq = (s * (s - ab) * (s - bc) * (s - ac)).max(0.0);
    let area = area_sq.sqrt();
    2.0 * area / ac
}

/// Three-point circular-fit test: while a run of points shares a common
/// plane-dropped axis, fits a circle, and stays within `arc_tolerance` of
/// it, the interior points are dropped and replaced with a single `G2`/`G3`
/// arc at the end of the run.
pub fn dedup_linear_to_arc(lines: Vec<Line>, plane: Plane, arc_tolerance: f64) -> Vec<Line> {
    if lines.len() < 3 {
        return lines;
    }
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < lines.len() {
        if i + 2 >= lines.len() {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }
        let mut run_end = i + 2;
        let circle = geometry::find_circle(
            &lines[i].coord(),
            &lines[i + 1].coord(),
            &lines[i + 2].coord(),
            plane,
        );
        let Some(mut circle) = circle.filter(|c| c.radius > arc_tolerance) else {
            out.push(lines[i].clone());
            i += 1;
            continue;
        };
        if !chord_fits(&lines[i].coord(), &lines[i + 1].coord(), &circle, plane, arc_tolerance)
            || !chord_fits(&lines[i + 1].coord(), &lines[i + 2].coord(), &circle, plane, arc_tolerance)
        {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }
        while run_end + 1 < lines.len() {
            let next_circle = geometry::find_circle(
                &lines[run_end - 1].coord(),
                &lines[run_end].coord(),
                &lines[run_end + 1].coord(),
                plane,
            );
            match next_circle {
                Some(nc)
                    if (nc.centre.0 - circle.centre.0).abs() < arc_tolerance
                        && (nc.centre.1 - circle.centre.1).abs() < arc_tolerance
                        && (nc.radius - circle.radius).abs() < arc_tolerance =>
                {
                    circle = nc;
                    run_end += 1;
                }
                _ => break,
            }
        }
        out.push(lines[i].clone());
        out.push(build_arc_line(&lines[i].coord(), &lines[run_end].coord(), &circle, plane));
        i = run_end + 1;
    }
    out
}

fn chord_fits(a: &Coord, b: &Coord, circle: &geometry::Circle, plane: Plane, tolerance: f64) -> bool {
    let drop = plane.dropped_axis();
    let pa = a.project(drop);
    let pb = b.project(drop);
    let mid = ((pa.0 + pb.0) / 2.0, (pa.1 + pb.1) / 2.0);
    let dist_to_centre = geometry::distance_2d(mid, circle.centre);
    (dist_to_centre - circle.radius).abs() <= tolerance
}

fn build_arc_line(start: &Coord, end: &Coord, circle: &geometry::Circle, plane: Plane) -> Line {
    let drop = plane.dropped_axis();
    let (sx, sy) = start.project(drop);
    let g = if circle.clockwise { "G2" } else { "G3" };
    let gnum = crate::decimal::ExactNum::parse(&g[1..]).unwrap();
    let mut tokens = vec![Token::command('G', gnum)];
    let (ex, ey) = end.project(drop);
    match drop {
        AxisSet::Z => {
            tokens.push(Token::argument('X', crate::decimal::ExactNum::from_f64(ex, 4)));
            tokens.push(Token::argument('Y', crate::decimal::ExactNum::from_f64(ey, 4)));
            tokens.push(Token::argument('I', crate::decimal::ExactNum::from_f64(circle.centre.0 - sx, 4)));
            tokens.push(Token::argument('J', crate::decimal::ExactNum::from_f64(circle.centre.1 - sy, 4)));
        }
        _ => {
            tokens.push(Token::argument('X', crate::decimal::ExactNum::from_f64(ex, 4)));
            tokens.push(Token::argument('Y', crate::decimal::ExactNum::from_f64(ey, 4)));
            tokens.push(Token::argument('I', crate::decimal::ExactNum::from_f64(circle.centre.0 - sx, 4)));
            tokens.push(Token::argument('K', crate::decimal::ExactNum::from_f64(circle.centre.1 - sy, 4)));
        }
    }
    Line::from_tokens(tokens)
}

/// Omits "sticky" letters whose argument value hasn't changed since it was
/// last emitted; a line reduced to nothing is dropped.
pub fn dedup_select_tokens<'a>(
    lines: impl Iterator<Item = Line> + 'a,
    sticky: &'a [char],
) -> impl Iterator<Item = Line> + 'a {
    let mut last: std::collections::HashMap<char, Token> = std::collections::HashMap::new();
    lines.filter_map(move |line| {
        let mut drop = Vec::new();
        for t in line.tokens() {
            if sticky.contains(&t.code()) {
                if last.get(&t.code()) == Some(t) {
                    drop.push(t.clone());
                } else {
                    last.insert(t.code(), t.clone());
                }
            }
        }
        if drop.is_empty() {
            return Some(line);
        }
        let mut remainder = line;
        remainder.remove_by_token(&drop);
        if remainder.is_empty_or_whitespace() {
            None
        } else {
            Some(remainder)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_repeated_tokens_keeps_first_occurrence() {
        let line = Line::new("G1 X10 X10");
        let out: Vec<_> = dedup_repeated_tokens(vec![line].into_iter()).collect();
        assert_eq!(out[0].render(), "G1 X10");
    }

    #[test]
    fn dedup_line_drops_repeats() {
        let input = vec![Line::new("G1 X10"), Line::new("G1 X10"), Line::new("G1 X20")];
        let out: Vec<_> = dedup_line(input.into_iter()).collect();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn dedup_linear_drops_collinear_midpoint() {
        let input = vec![
            Line::new("G1 X0 Y0 Z0"),
            Line::new("G1 X5 Y0 Z0"),
            Line::new("G1 X10 Y0 Z0"),
        ];
        let out = dedup_linear(input.into_iter(), 0.001);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].render(), "G1 X0 Y0 Z0");
        assert_eq!(out[1].render(), "G1 X10 Y0 Z0");
    }

    #[test]
    fn dedup_linear_keeps_non_collinear_point() {
        let input = vec![
            Line::new("G1 X0 Y0 Z0"),
            Line::new("G1 X5 Y5 Z0"),
            Line::new("G1 X10 Y0 Z0"),
        ];
        let out = dedup_linear(input.into_iter(), 0.001);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn dedup_select_tokens_drops_unchanged_sticky_letter() {
        let input = vec![Line::new("G1 X10 F100"), Line::new("G1 X20 F100")];
        let out: Vec<_> = dedup_select_tokens(input.into_iter(), &['F']).collect();
        assert_eq!(out[1].render(), "G1 X20");
    }

    #[test]
    fn dedup_select_tokens_drops_line_reduced_to_nothing() {
        let input = vec![Line::new("F100"), Line::new("F100")];
        let out: Vec<_> = dedup_select_tokens(input.into_iter(), &['F']).collect();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn dedup_context_drops_redundant_feed() {
        let ctx = ModalContext::new();
        let input = vec![Line::new("F100"), Line::new("F100 X10")];
        let out: Vec<_> = DedupContext::new(input.into_iter(), ctx).collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].render(), "X10");
    }

    #[test]
    fn dedup_context_drops_fully_redundant_line() {
        let ctx = ModalContext::new();
        let input = vec![Line::new("G90"), Line::new("G90")];
        let out: Vec<_> = DedupContext::new(input.into_iter(), ctx).collect();
        assert_eq!(out.len(), 1);
    }
}
