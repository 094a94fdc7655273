//! Compiled-once regular expressions for the lexer, per the design note that
//! the lexer's patterns (and the travel-divider pattern used by `split`)
//! should be compiled a single time at startup rather than per line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a line that, once trimmed, is nothing but the file terminator.
pub static FULL_LINE_TERMINATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*%\s*$").unwrap());

/// Matches a line that, once trimmed, is a single parenthesised comment.
pub static FULL_LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\([^)]*\)\s*$").unwrap());

/// Matches a line that, once trimmed, is a single semicolon comment.
pub static FULL_LINE_SEMI_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*;.*$").unwrap());

/// Matches a line-number word anywhere in a line: `N` optionally followed by
/// whitespace, then 1-5 decimal digits.
pub static LINE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)N\s*(\d{1,5})").unwrap());

/// Matches one parenthesised comment.
pub static PAREN_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Matches a semicolon comment, which runs to the end of the (single
/// physical) line.
pub static SEMI_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r";.*$").unwrap());

/// The "word" pattern: a letter (or a `#`-run immediately followed by
/// `digits=`) followed by an optional sign and a decimal tail.
pub static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([A-Z]|#+\d{1,4}=)[+-]?((#+\d{1,4})|(\d*\.?\d*))").unwrap()
});

/// Matches a full parameter-set word: `#n=v`.
pub static PARAMETER_SET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#+(\d{1,4})=([+-]?\d*\.?\d*)$").unwrap());

/// Matches a travel-divider annotation comment emitted by [`crate::pipeline::travel`].
pub static TRAVEL_DIVIDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\|\|Travelling\|\|.*\|\|\d+\|\|.*>>.*>>\|\|\)$").unwrap()
});
