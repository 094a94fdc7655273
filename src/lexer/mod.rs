//! The lexer: turns one physical line of text into an ordered sequence of
//! [`Token`]s. Pure and total — malformed words are dropped, never raised as
//! errors.

pub mod patterns;
mod token;

pub use token::{Token, TokenKind};

use crate::decimal::ExactNum;
use patterns::{
    FULL_LINE_COMMENT, FULL_LINE_SEMI_COMMENT, FULL_LINE_TERMINATOR, LINE_NUMBER, PARAMETER_SET,
    PAREN_COMMENT, SEMI_COMMENT, WORD,
};

const SENTINEL: char = '\u{1}';

/// Lexes one physical line into tokens.
pub fn tokenize(line: &str) -> Vec<Token> {
    let trimmed = line.trim();

    if FULL_LINE_TERMINATOR.is_match(trimmed) {
        return vec![Token::file_terminator()];
    }
    if FULL_LINE_COMMENT.is_match(trimmed) {
        let inner = &trimmed[1..trimmed.len() - 1];
        return vec![Token::comment(inner.trim())];
    }
    if FULL_LINE_SEMI_COMMENT.is_match(trimmed) {
        let inner = trimmed.trim_start_matches(';').trim();
        return vec![Token::comment(inner)];
    }

    let mut residue = trimmed.to_string();
    let mut tokens = Vec::new();

    // Block-delete: a leading `/`, checked before line-number extraction so
    // it always lands first regardless of what follows.
    let has_block_delete = residue.starts_with('/');
    if has_block_delete {
        tokens.push(Token::block_delete());
        residue = residue[1..].to_string();
    }

    // Line-number: extracted from anywhere in the residue.
    let mut line_number_token = None;
    if let Some(caps) = LINE_NUMBER.captures(&residue) {
        let whole = caps.get(0).unwrap();
        if let Ok(n) = caps[1].parse::<u32>() {
            line_number_token = Some(Token::line_number(n));
        }
        residue.replace_range(whole.range(), "");
    }
    if let Some(t) = line_number_token {
        tokens.push(t);
    }

    // Extract comments (parenthesised or semicolon), substituting sentinels
    // so their relative order can be restored after whitespace removal.
    let mut comments: Vec<Token> = Vec::new();
    loop {
        let paren = PAREN_COMMENT.find(&residue);
        let semi = SEMI_COMMENT.find(&residue);
        let next = match (paren, semi) {
            (Some(p), Some(s)) => {
                if p.start() <= s.start() {
                    Some(p)
                } else {
                    Some(s)
                }
            }
            (Some(p), None) => Some(p),
            (None, Some(s)) => Some(s),
            (None, None) => None,
        };
        let Some(m) = next else { break };
        let text = m.as_str();
        let inner = if let Some(stripped) = text.strip_prefix(';') {
            stripped.trim().to_string()
        } else {
            text[1..text.len() - 1].trim().to_string()
        };
        comments.push(Token::comment(&inner));
        let range = m.range();
        residue.replace_range(range, &SENTINEL.to_string());
    }

    // Remove remaining whitespace, then split on sentinels to recover the
    // word-bearing segments in order.
    let collapsed: String = residue.chars().filter(|c| !c.is_whitespace()).collect();
    let mut comment_iter = comments.into_iter();
    let mut words: Vec<Token> = Vec::new();
    for segment in collapsed.split(SENTINEL) {
        for m in WORD.find_iter(segment) {
            if let Some(t) = classify_word(m.as_str()) {
                words.push(t);
            }
        }
        // A sentinel followed this segment (split() yields one extra empty
        // trailing segment when the string doesn't end with a sentinel, which
        // is harmless here since comment_iter simply runs dry).
        if let Some(c) = comment_iter.next() {
            words.push(c);
        }
    }
    // Any comments extracted but not placed (sentinel count mismatch, e.g. a
    // trailing comment with no following segment) are appended at the end.
    for c in comment_iter {
        words.push(c);
    }

    tokens.extend(words);
    tokens
}

/// Lexes a line and returns each token's exact source substring, for the
/// round-trip contract (`join(tokenise(line), " ")` reparses to the same
/// sequence).
pub fn tokenize_sources(line: &str) -> Vec<String> {
    tokenize(line).into_iter().map(|t| t.source().to_string()).collect()
}

/// Classifies one already-extracted, whitespace-free word. Returns `None`
/// for a malformed word, which the caller silently drops.
fn classify_word(word: &str) -> Option<Token> {
    if word.len() < 2 {
        return None;
    }
    let upper = word.to_ascii_uppercase();

    if let Some(caps) = PARAMETER_SET.captures(&upper) {
        let index: u32 = caps[1].parse().ok()?;
        let literal = &caps[2];
        let value = ExactNum::parse(literal)?;
        return Some(Token::parameter_set_literal(index, value, literal));
    }
    if upper.starts_with('#') {
        return None;
    }

    let letter = upper.chars().next()?;
    if !letter.is_ascii_alphabetic() {
        return None;
    }
    let tail = &upper[letter.len_utf8()..];
    let value = ExactNum::parse(tail)?;

    Some(match letter {
        'G' | 'M' => Token::command_literal(letter, value, tail),
        'F' | 'S' | 'T' => Token::code_word_literal(letter, value, tail),
        'A' | 'B' | 'C' | 'D' | 'H' | 'I' | 'J' | 'K' | 'L' | 'P' | 'R' | 'X' | 'Y' | 'Z' => {
            Token::argument_literal(letter, value, tail)
        }
        // Well-formed letter+number shape, but not a recognised letter:
        // kept as `Invalid` (not dropped) so the owning line can be flagged.
        _ => Token::invalid(&upper),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(line: &str) -> Vec<String> {
        tokenize_sources(line)
    }

    #[test]
    fn file_terminator_line() {
        assert_eq!(sources("%"), vec!["%"]);
    }

    #[test]
    fn full_line_comment() {
        assert_eq!(sources("(hello world)"), vec!["(hello world)"]);
    }

    #[test]
    fn full_line_semicolon_comment_normalized() {
        assert_eq!(sources("; hello world"), vec!["(hello world)"]);
    }

    #[test]
    fn simple_motion_line() {
        assert_eq!(sources("G1 X10 Y20"), vec!["G1", "X10", "Y20"]);
    }

    #[test]
    fn case_insensitive_and_whitespace_tolerant() {
        assert_eq!(sources("g1 x 10 y20"), vec!["G1", "X10", "Y20"]);
    }

    #[test]
    fn line_number_extracted_first() {
        let toks = tokenize("G1 X10 N20");
        assert_eq!(toks[0].kind(), TokenKind::LineNumber);
        assert_eq!(toks[0].source(), "N20");
    }

    #[test]
    fn block_delete_leads() {
        let toks = tokenize("/N10 G1 X1");
        assert_eq!(toks[0].kind(), TokenKind::BlockDelete);
        assert_eq!(toks[1].kind(), TokenKind::LineNumber);
    }

    #[test]
    fn inline_comment_preserved_in_position() {
        assert_eq!(
            sources("G1 X10 (cut) Y20"),
            vec!["G1", "X10", "(cut)", "Y20"]
        );
    }

    #[test]
    fn inline_semicolon_comment_normalized() {
        assert_eq!(sources("G1 X10 ; cut"), vec!["G1", "X10", "(cut)"]);
    }

    #[test]
    fn malformed_word_dropped() {
        assert_eq!(sources("G1 Q X10"), vec!["G1", "X10"]);
    }

    #[test]
    fn unrecognised_letter_kept_as_invalid() {
        let toks = tokenize("G1 Q5 X10");
        assert_eq!(
            toks.iter().map(|t| t.source()).collect::<Vec<_>>(),
            vec!["G1", "Q5", "X10"]
        );
        assert_eq!(toks[1].kind(), TokenKind::Invalid);
        assert!(!toks[1].is_valid());
    }

    #[test]
    fn single_letter_word_dropped() {
        assert_eq!(sources("G1 X"), vec!["G1"]);
    }

    #[test]
    fn parameter_set_word() {
        assert_eq!(sources("#100=5.5"), vec!["#100=5.5"]);
    }

    #[test]
    fn malformed_parameter_set_dropped() {
        assert_eq!(sources("#abc=5"), Vec::<String>::new());
    }

    #[test]
    fn empty_line_yields_no_tokens() {
        assert!(sources("   ").is_empty());
    }

    #[test]
    fn round_trip_on_valid_tokens() {
        let original = "G1 X10.5 Y-2.25 (cut here)";
        let once = tokenize_sources(original);
        let rejoined = once.join(" ");
        let twice = tokenize_sources(&rejoined);
        assert_eq!(once, twice);
    }

    #[test]
    fn value_normalizes_trailing_zeros() {
        let toks = tokenize("G1 X1.200");
        let x = toks.iter().find(|t| t.code() == 'X').unwrap();
        assert_eq!(x.value().unwrap().text(), "1.2");
    }

    #[test]
    fn source_preserves_trailing_zeros() {
        let toks = tokenize("G1 X1.200");
        let x = toks.iter().find(|t| t.code() == 'X').unwrap();
        assert_eq!(x.source(), "X1.200");
    }
}
