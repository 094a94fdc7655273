//! The modal-group catalogue and the running [`ModalContext`] that tracks
//! which line currently represents each group's active command.
//!
//! Generalizes the "cache the last emitted value per slot, return whether it
//! changed" shape into an ordered collection of whole lines, since this
//! crate's modal state must be replayable as text (for preamble injection)
//! rather than just queried as booleans.

use crate::line::Line;
use crate::lexer::TokenKind;

/// One named, immutable collection of mutually exclusive command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalGroup {
    pub name: &'static str,
    pub codes: &'static [&'static str],
}

macro_rules! group {
    ($name:expr, [$($code:expr),+ $(,)?]) => {
        ModalGroup { name: $name, codes: &[$($code),+] }
    };
}

pub static FEED_RATE_MODE: ModalGroup = group!("feed-rate-mode", ["G93", "G94"]);
pub static PLANE_SELECTION: ModalGroup = group!("plane-selection", ["G17", "G18", "G19"]);
pub static LENGTH_UNITS: ModalGroup = group!("length-units", ["G20", "G21"]);
pub static DISTANCE_MODE: ModalGroup = group!("distance-mode", ["G90", "G91"]);
pub static CUTTER_RADIUS_COMP: ModalGroup = group!("cutter-radius-comp", ["G40", "G41", "G42"]);
pub static TOOL_LENGTH_OFFSET: ModalGroup = group!("tool-length-offset", ["G43", "G49"]);
pub static COORDINATE_SYSTEM: ModalGroup = group!(
    "coordinate-system",
    ["G54", "G55", "G56", "G57", "G58", "G59", "G59.1", "G59.2", "G59.3"]
);
pub static PATH_CONTROL: ModalGroup = group!("path-control", ["G61", "G61.1", "G64"]);
pub static RETURN_MODE: ModalGroup = group!("return-mode", ["G98", "G99"]);
pub static SIMPLE_MOTION: ModalGroup = group!("simple-motion", ["G0", "G1", "G2", "G3"]);
pub static PROBE: ModalGroup = group!("probe", ["G38.2"]);
pub static CANNED_MOTION: ModalGroup = group!(
    "canned-motion",
    ["G80", "G81", "G82", "G83", "G84", "G85", "G86", "G87", "G88", "G89"]
);
pub static HOME: ModalGroup = group!("home", ["G28", "G30"]);
pub static CHANGE_COORD_SYS_DATA: ModalGroup = group!("change-coord-sys-data", ["G10"]);
pub static COORD_SYS_OFFSET: ModalGroup =
    group!("coord-sys-offset", ["G92", "G92.1", "G92.2", "G92.3"]);
pub static DWELL: ModalGroup = group!("dwell", ["G4"]);
pub static TOOL_CHANGE: ModalGroup = group!("tool-change", ["M6"]);
pub static SPINDLE_TURNING: ModalGroup = group!("spindle-turning", ["M3", "M4", "M5"]);
pub static COOLANT: ModalGroup = group!("coolant", ["M7", "M8", "M9"]);
pub static OVERRIDE_ENABLING: ModalGroup = group!("override-enabling", ["M48", "M49"]);
pub static PAUSING: ModalGroup = group!("pausing", ["M0", "M1", "M60"]);
pub static STOPPING: ModalGroup = group!("stopping", ["M2", "M30"]);

pub static ALL_MOTION: ModalGroup = group!(
    "all-motion",
    ["G0", "G1", "G2", "G3", "G38.2", "G80", "G81", "G82", "G83", "G84", "G85", "G86", "G87",
     "G88", "G89"]
);
pub static ALL_STOP: ModalGroup = group!("all-stop", ["M0", "M1", "M2", "M30", "M60"]);

/// The full catalogue, in the order the grouped pipeline stages iterate it.
pub static ALL_GROUPS: &[&ModalGroup] = &[
    &FEED_RATE_MODE,
    &TOOL_CHANGE,
    &SPINDLE_TURNING,
    &OVERRIDE_ENABLING,
    &PLANE_SELECTION,
    &LENGTH_UNITS,
    &CUTTER_RADIUS_COMP,
    &TOOL_LENGTH_OFFSET,
    &COORDINATE_SYSTEM,
    &PATH_CONTROL,
    &DISTANCE_MODE,
    &RETURN_MODE,
    &SIMPLE_MOTION,
    &PROBE,
    &CANNED_MOTION,
    &HOME,
    &CHANGE_COORD_SYS_DATA,
    &COORD_SYS_OFFSET,
    &DWELL,
    &COOLANT,
];

impl ModalGroup {
    /// True if `line` carries a command token matching one of this group's
    /// codes.
    pub fn matches(&self, line: &Line) -> bool {
        line.tokens().iter().any(|t| {
            t.kind() == TokenKind::Command && self.codes.contains(&t.source())
        })
    }
}

/// The default preamble every cleaned file begins with, per G21/G90/G94/G17/
/// G40/G49/G54/M3.
pub fn default_preamble() -> Vec<&'static str> {
    vec!["G21", "G90", "G94", "G17", "G40", "G49", "G54", "M3"]
}

/// One entry in a [`ModalContext`]: the representative line for whichever
/// group(s) it matches, plus whether it has already been written to output.
#[derive(Debug, Clone)]
struct Entry {
    line: Line,
    emitted: bool,
}

/// An ordered collection of *(line, emitted?)* pairs, at most one per modal
/// group, implementing the back-to-front replace/evict update rule.
#[derive(Debug, Clone, Default)]
pub struct ModalContext {
    entries: Vec<Entry>,
}

impl ModalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The starting context every file begins with, fully pending (not yet
    /// emitted).
    pub fn with_default_preamble() -> Self {
        let mut ctx = Self::new();
        for code in default_preamble() {
            let letter = code.chars().next().unwrap();
            let number = crate::decimal::ExactNum::parse(&code[1..]).unwrap();
            let token = crate::lexer::Token::command(letter, number);
            ctx.update(Line::from_tokens(vec![token]), false);
        }
        ctx
    }

    /// Updates the context with `line`: for every group it matches, traverse
    /// back-to-front; the first match is replaced in place, any further
    /// matches are removed. A line matching no group, and no per-letter slot,
    /// is appended as-is.
    pub fn update(&mut self, line: Line, emitted: bool) {
        let mut replaced_at: Option<usize> = None;
        let matches_any_group = ALL_GROUPS.iter().any(|g| g.matches(&line));
        let matches_letter_slot = line
            .tokens()
            .iter()
            .any(|t| matches!(t.code(), 'F' | 'S' | 'T') && t.kind() == TokenKind::Code);

        if matches_any_group || matches_letter_slot {
            let mut first_match = None;
            let mut to_remove = Vec::new();
            for (i, e) in self.entries.iter().enumerate().rev() {
                if Self::shares_slot(&line, &e.line) {
                    if first_match.is_none() {
                        first_match = Some(i);
                    } else {
                        to_remove.push(i);
                    }
                }
            }
            to_remove.sort_unstable_by(|a, b| b.cmp(a));
            for &i in &to_remove {
                self.entries.remove(i);
            }
            replaced_at = first_match.map(|fm| fm - to_remove.iter().filter(|&&i| i < fm).count());
        }

        match replaced_at {
            Some(i) => self.entries[i] = Entry { line, emitted },
            None => self.entries.push(Entry { line, emitted }),
        }
    }

    /// True if `a` and `b` represent the same modal group, or the same
    /// per-letter slot (F/S/T), and would therefore conflict in the context.
    fn shares_slot(a: &Line, b: &Line) -> bool {
        for group in ALL_GROUPS {
            if group.matches(a) && group.matches(b) {
                return true;
            }
        }
        for letter in ['F', 'S', 'T'] {
            let a_has = a.tokens().iter().any(|t| t.code() == letter && t.kind() == TokenKind::Code);
            let b_has = b.tokens().iter().any(|t| t.code() == letter && t.kind() == TokenKind::Code);
            if a_has && b_has {
                return true;
            }
        }
        false
    }

    /// The command token text currently representing `group`, if any.
    pub fn get_modal_state(&self, group: &ModalGroup) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| group.matches(&e.line))
            .and_then(|e| e.line.tokens().iter().find(|t| group.codes.contains(&t.source())))
            .map(|t| t.source())
    }

    /// The code token text currently representing per-letter slot `letter`
    /// (F, S, or T), if any.
    pub fn get_modal_state_letter(&self, letter: char) -> Option<&str> {
        self.entries
            .iter()
            .find_map(|e| e.line.tokens().iter().find(|t| t.code() == letter && t.kind() == TokenKind::Code))
            .map(|t| t.source())
    }

    /// Lines not yet marked emitted, in context order.
    pub fn non_emitted_lines(&self) -> Vec<&Line> {
        self.entries.iter().filter(|e| !e.emitted).map(|e| &e.line).collect()
    }

    /// Marks every entry as emitted.
    pub fn mark_all_emitted(&mut self) {
        for e in &mut self.entries {
            e.emitted = true;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
