//! Splits a cleaned stream into one file per cutting pass, at each
//! travel-divider boundary, so a later `merge` can reorder passes by
//! parsing their filenames.

use crate::lexer::patterns::TRAVEL_DIVIDER;
use crate::line::Line;

/// A single emitted cutting-pass file.
#[derive(Debug, Clone)]
pub struct SplitFile {
    pub filename: String,
    pub content: String,
}

/// Splits `lines` (the output of `clean`) into per-pass files. `tool` names
/// the tool family these passes belong to (the filename's leading segment).
pub fn split(lines: &[Line], tool: &str) -> Vec<SplitFile> {
    let preamble_end = lines
        .iter()
        .position(|l| l.render().contains("Preamble completed by"))
        .map(|i| i + 1)
        .unwrap_or(0);
    let preamble: Vec<&Line> = lines[..preamble_end].iter().collect();

    let divider_indices: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.tokens().iter().any(|t| {
            t.comment_text().map(|c| TRAVEL_DIVIDER.is_match(&format!("({c})"))).unwrap_or(false)
        }))
        .map(|(i, _)| i)
        .collect();

    let postamble_start = lines
        .iter()
        .rposition(|l| l.render().contains("Postamble completed by"))
        .unwrap_or(lines.len());
    let postamble: Vec<&Line> = lines[postamble_start..].iter().collect();

    let mut files = Vec::new();
    let mut segment_start = preamble_end;
    for (pass_id, &divider_idx) in divider_indices.iter().enumerate() {
        let segment = &lines[segment_start..=divider_idx];
        let (start, end) = pass_endpoints(segment);
        let filename = format!(
            "{tool}_{pass_id:04}_{}_{}_gcc.nc",
            format_xy(start),
            format_xy(end)
        );

        let mut body = String::new();
        for l in &preamble {
            body.push_str(&l.render());
            body.push('\n');
        }
        if pass_id > 0 {
            if let Some(prev) = lines.get(divider_indices[pass_id - 1]) {
                body.push_str(&prev.render());
                body.push('\n');
            }
        }
        for l in segment {
            body.push_str(&l.render());
            body.push('\n');
        }
        for l in &postamble {
            body.push_str(&l.render());
            body.push('\n');
        }

        files.push(SplitFile { filename, content: body });
        segment_start = divider_idx + 1;
    }
    files
}

fn pass_endpoints(segment: &[Line]) -> ((f64, f64), (f64, f64)) {
    let mut start = (0.0, 0.0);
    let mut end = (0.0, 0.0);
    let mut found_start = false;
    for l in segment {
        let c = l.coord();
        if c.has(crate::geometry::AxisSet::X) || c.has(crate::geometry::AxisSet::Y) {
            if !found_start {
                start = (c.x, c.y);
                found_start = true;
            }
            end = (c.x, c.y);
        }
    }
    (start, end)
}

fn format_xy((x, y): (f64, f64)) -> String {
    format!("X{}Y{}", crate::decimal::ExactNum::from_f64(x, 4), crate::decimal::ExactNum::from_f64(y, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_marker(text: &str) -> Line {
        Line::from_tokens(vec![crate::lexer::Token::comment(text)])
    }

    #[test]
    fn splits_into_one_file_per_divider() {
        let lines = vec![
            Line::new("(Preamble completed by GCodeClean)"),
            Line::new("G1 X0 Y0"),
            with_marker("||Travelling||1||0||0||-1||T1||>>G1 X0 Y0>>G0 X10 Y10>>||"),
            Line::new("G1 X20 Y20"),
            Line::new("(Postamble completed by GCodeClean)"),
        ];
        let files = split(&lines, "T1");
        assert_eq!(files.len(), 1);
        assert!(files[0].filename.starts_with("T1_0000_"));
    }

    #[test]
    fn no_dividers_yields_no_files() {
        let lines = vec![Line::new("G1 X0 Y0")];
        assert!(split(&lines, "T1").is_empty());
    }
}
