//! `JoinLines`: renders each [`Line`] to text, joining tokens with a space
//! (or nothing, under "hard" minimisation) and collapsing runs of blank
//! lines to one.

use crate::line::Line;

pub fn join_lines(lines: impl Iterator<Item = Line>, drop_separators: bool) -> impl Iterator<Item = String> {
    let mut last_was_blank = false;
    lines.filter_map(move |line| {
        let rendered = if drop_separators {
            line.tokens().iter().map(|t| t.source().to_string()).collect::<String>()
        } else {
            line.render()
        };
        let is_blank = rendered.is_empty();
        if is_blank && last_was_blank {
            return None;
        }
        last_was_blank = is_blank;
        Some(rendered)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_tokens_with_space_by_default() {
        let input = vec![Line::new("G1 X10 Y20")];
        let out: Vec<_> = join_lines(input.into_iter(), false).collect();
        assert_eq!(out[0], "G1 X10 Y20");
    }

    #[test]
    fn drops_separators_under_hard_minimisation() {
        let input = vec![Line::new("G1 X10 Y20")];
        let out: Vec<_> = join_lines(input.into_iter(), true).collect();
        assert_eq!(out[0], "G1X10Y20");
    }

    #[test]
    fn collapses_consecutive_blank_lines() {
        let input = vec![Line::from_tokens(vec![]), Line::from_tokens(vec![]), Line::new("G1 X10")];
        let out: Vec<_> = join_lines(input.into_iter(), false).collect();
        assert_eq!(out.len(), 2);
    }
}
