//! A [`Line`]: an ordered, canonicalised sequence of tokens with cached
//! status flags, generalizing a word-accumulating render builder into a
//! mutable, re-canonicalising container that a parsed program can be read
//! back out of as well as built up.

use crate::geometry::Coord;
use crate::lexer::{Token, TokenKind};

/// A single line of a G-code program.
#[derive(Debug, Clone)]
pub struct Line {
    tokens: Vec<Token>,
}

impl Line {
    /// Lexes `source` into tokens and canonicalises.
    pub fn new(source: &str) -> Self {
        Self::from_tokens(crate::lexer::tokenize(source))
    }

    /// Builds a line from an already-lexed token sequence, canonicalising
    /// their order.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut line = Self { tokens };
        line.canonicalise();
        line
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Re-establishes canonical order: block-delete first, line-number next,
    /// then all non-comment non-line-number tokens in insertion order, then
    /// comments last.
    fn canonicalise(&mut self) {
        let mut block_delete = Vec::new();
        let mut line_number = Vec::new();
        let mut body = Vec::new();
        let mut comments = Vec::new();
        for t in self.tokens.drain(..) {
            match t.kind() {
                TokenKind::BlockDelete => block_delete.push(t),
                TokenKind::LineNumber => line_number.push(t),
                TokenKind::Comment => comments.push(t),
                _ => body.push(t),
            }
        }
        self.tokens = block_delete;
        self.tokens.extend(line_number);
        self.tokens.extend(body);
        self.tokens.extend(comments);
    }

    pub fn prepend(&mut self, token: Token) {
        self.tokens.insert(0, token);
        self.canonicalise();
    }

    pub fn append(&mut self, token: Token) {
        self.tokens.push(token);
        self.canonicalise();
    }

    pub fn append_many(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.tokens.extend(tokens);
        self.canonicalise();
    }

    /// Removes every token whose classifying letter is in `letters`.
    pub fn remove_by_code(&mut self, letters: &[char]) {
        self.tokens.retain(|t| !letters.contains(&t.code()));
        self.canonicalise();
    }

    /// Removes every token equal (by value) to one in `targets`.
    pub fn remove_by_token(&mut self, targets: &[Token]) {
        self.tokens.retain(|t| !targets.contains(t));
        self.canonicalise();
    }

    /// Replaces every occurrence of `search` with `replacement`.
    pub fn replace(&mut self, search: &Token, replacement: Token) {
        for t in &mut self.tokens {
            if t == search {
                *t = replacement.clone();
            }
        }
        self.canonicalise();
    }

    pub fn is_file_terminator(&self) -> bool {
        self.tokens.len() == 1 && self.tokens[0].kind() == TokenKind::FileTerminator
    }

    pub fn is_empty_or_whitespace(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Every token is individually valid, and a file-terminator line carries
    /// no other tokens.
    pub fn is_valid(&self) -> bool {
        if self.tokens.iter().any(|t| t.kind() == TokenKind::FileTerminator) {
            return self.tokens.len() == 1;
        }
        self.tokens.iter().all(Token::is_valid)
    }

    pub fn has_block_delete(&self) -> bool {
        self.tokens.iter().any(|t| t.kind() == TokenKind::BlockDelete)
    }

    pub fn has_line_number(&self) -> bool {
        self.tokens.iter().any(|t| t.kind() == TokenKind::LineNumber)
    }

    /// Empty, terminator-only, or comments-only.
    pub fn is_not_command_code_or_arguments(&self) -> bool {
        !self.tokens.iter().any(|t| {
            matches!(
                t.kind(),
                TokenKind::Command | TokenKind::Code | TokenKind::Argument
            )
        })
    }

    pub fn is_arguments_only(&self) -> bool {
        let mut saw_argument = false;
        for t in &self.tokens {
            match t.kind() {
                TokenKind::Argument => saw_argument = true,
                TokenKind::BlockDelete | TokenKind::LineNumber | TokenKind::Comment => {}
                _ => return false,
            }
        }
        saw_argument
    }

    pub fn has_movement_command(&self) -> bool {
        self.tokens.iter().any(Token::is_motion_command)
    }

    /// Two lines are compatible iff their non-line-number token sequences
    /// have equal length, pairwise identical code letters, and every command
    /// (G/M) token pair is strictly equal.
    pub fn is_compatible(&self, other: &Line) -> bool {
        let a: Vec<&Token> = self
            .tokens
            .iter()
            .filter(|t| t.kind() != TokenKind::LineNumber)
            .collect();
        let b: Vec<&Token> = other
            .tokens
            .iter()
            .filter(|t| t.kind() != TokenKind::LineNumber)
            .collect();
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b.iter()).all(|(x, y)| {
            if x.code() != y.code() {
                return false;
            }
            if x.kind() == TokenKind::Command {
                return *x == *y;
            }
            true
        })
    }

    /// Projects the line's X/Y/Z argument tokens to a [`Coord`].
    pub fn coord(&self) -> Coord {
        Coord::from_tokens(&self.tokens)
    }

    /// Canonical rendering: all tokens, space-separated.
    pub fn render(&self) -> String {
        self.tokens
            .iter()
            .map(Token::source)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// "Simple" rendering: omits line-number and comment tokens.
    pub fn render_simple(&self) -> String {
        self.tokens
            .iter()
            .filter(|t| !matches!(t.kind(), TokenKind::LineNumber | TokenKind::Comment))
            .map(Token::source)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Equality ignores line-number tokens; hash follows equality.
impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        let a = self.tokens.iter().filter(|t| t.kind() != TokenKind::LineNumber);
        let b = other.tokens.iter().filter(|t| t.kind() != TokenKind::LineNumber);
        a.eq(b)
    }
}
impl Eq for Line {}

impl std::hash::Hash for Line {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for t in self.tokens.iter().filter(|t| t.kind() != TokenKind::LineNumber) {
            t.hash(state);
        }
    }
}
