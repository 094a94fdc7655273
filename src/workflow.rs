//! Composes the pipeline stages into the `clean` workflow, in the mandated
//! order: per-line canonicalisation, file-framing, motion rewriting,
//! presentation, assembly.

use crate::config::Config;
use crate::geometry::Plane;
use crate::line::Line;
use crate::modal::ModalContext;
use crate::pipeline::{
    annotate::{annotate, AnnotationDictionary},
    arc::{convert_arc_radius_to_center, simplify_short_arcs},
    augment::augment,
    clip::clip,
    dedup::{dedup_line, dedup_linear, dedup_linear_to_arc, dedup_repeated_tokens, dedup_select_tokens, DedupContext},
    demarcation::Demarcation,
    eliminate_line_numbers,
    join::join_lines,
    linter::single_command_per_line,
    preamble::InjectPreamble,
    tokenize_to_line,
    travel::DetectTravelling,
};

/// Summary of a single `clean` run, returned alongside the cleaned output.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CleanReport {
    pub lines_read: usize,
    pub lines_written: usize,
    pub lines_dropped: usize,
}

/// Runs the full clean workflow over `input` lines, returning the cleaned
/// output lines and a [`CleanReport`].
pub fn clean(input: impl Iterator<Item = String>, cfg: &Config, annotation: Option<AnnotationDictionary>) -> (Vec<String>, CleanReport) {
    let plane = Plane::Xy;
    let input: Vec<String> = input.collect();
    let lines_read = input.len();

    // Per-line canonicalisation.
    let lines = tokenize_to_line(input.into_iter());
    let lines = eliminate_line_numbers(lines);
    let lines = dedup_repeated_tokens(lines);
    let lines = augment(lines);
    let lines = single_command_per_line(lines);
    let lines = DedupContext::new(lines, ModalContext::new());

    // File-framing.
    let lines: Vec<Line> = lines.collect();
    let lines = Demarcation::new(lines.into_iter(), cfg.vertical_clamp);
    let lines = InjectPreamble::new(lines, ModalContext::with_default_preamble(), cfg.vertical_clamp);

    // Motion rewriting.
    let lines = crate::pipeline::zclamp::zclamp(lines, cfg.vertical_clamp);
    let lines = convert_arc_radius_to_center(lines, plane);
    let lines = dedup_line(lines);
    let lines = simplify_short_arcs(lines, cfg.arc_tolerance);
    let lines: Vec<Line> = dedup_linear_to_arc(lines.collect(), plane, cfg.arc_tolerance);
    let lines = clip(lines.into_iter(), cfg.units.into(), cfg.general_tolerance);
    let lines = dedup_repeated_tokens(lines);
    let lines = dedup_line(lines);
    let lines = DetectTravelling::new(lines);
    let lines: Vec<Line> = dedup_linear(lines, cfg.general_tolerance);

    // Presentation.
    let sticky = cfg.sticky_letters();
    let lines: Vec<Line> = dedup_select_tokens(lines.into_iter(), &sticky).collect();
    let lines: Vec<Line> = match annotation {
        Some(dict) => annotate(lines.into_iter(), dict).collect(),
        None => lines,
    };

    // Assemble.
    let output: Vec<String> = join_lines(lines.into_iter(), cfg.minimisation.drops_separators()).collect();

    let report = CleanReport {
        lines_read,
        lines_written: output.len(),
        lines_dropped: lines_read.saturating_sub(output.len()),
    };
    (output, report)
}
