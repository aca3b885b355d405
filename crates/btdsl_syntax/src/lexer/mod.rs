//! Lexer for BT-DSL.
//!
//! Handles tokenization including:
//! - Keywords and identifiers (`_` becomes the infer wildcard)
//! - Integer, float and string literals (with escape decoding)
//! - Operators and punctuation
//! - Line, nested block, doc (`///`) and module doc (`//!`) comments
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)
//! - `strings` - String scanning and escape decoding
//! - `numbers` - Numeric literal scanning
//!
//! ## Notes
//! - Lexing is total: malformed input produces diagnostics and `Error` tokens, never a failure.
//!   Every step consumes at least one character, so lexing always terminates.
//! - The token stream always ends with exactly one `Eof` token.

mod numbers;
mod strings;
pub mod tokens;

pub use strings::unescape;
pub use tokens::{Token, TokenKind, keyword_id};

use crate::diagnostics::{DiagnosticBag, codes};
use crate::source::{FileId, SourceRange};
use btdsl_core::lang::keywords::KeywordId;
use btdsl_core::lang::operators::OperatorId;
use btdsl_core::lang::punctuation::PunctuationId;

/// Lexer for BT-DSL source code.
pub struct Lexer<'src, 'bag> {
    source: &'src str,
    file: FileId,
    pos: usize,
    tokens: Vec<Token<'src>>,
    /// A line break was skipped since the last token.
    newline_pending: bool,
    diagnostics: &'bag mut DiagnosticBag,
}

impl<'src, 'bag> Lexer<'src, 'bag> {
    /// Create a new lexer for `source`, reporting problems into `diagnostics`.
    pub fn new(source: &'src str, file: FileId, diagnostics: &'bag mut DiagnosticBag) -> Self {
        Self {
            source,
            file,
            pos: 0,
            tokens: Vec::new(),
            newline_pending: false,
            diagnostics,
        }
    }

    /// Tokenize the entire source.
    pub fn tokenize(mut self) -> Vec<Token<'src>> {
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            self.scan_token();
        }
        let end = self.source.len();
        let mut eof = Token::new(TokenKind::Eof, "", SourceRange::empty_at(self.file, end));
        eof.newline_before = self.newline_pending;
        self.tokens.push(eof);
        self.tokens
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn range_from(&self, start: usize) -> SourceRange {
        SourceRange::new(self.file, start, self.pos)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.newline_pending |= c == '\n';
                self.advance();
            } else {
                break;
            }
        }
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return;
        };

        match c {
            '"' => self.scan_string(start),
            '0'..='9' => self.scan_number(start),
            _ if is_ident_start(c) => self.scan_identifier(start),
            '/' => self.scan_slash(start),
            _ => {
                self.advance();
                match c {
                    '+' => self.operator(start, OperatorId::Plus, &[('=', OperatorId::PlusEq)]),
                    '-' => self.operator(start, OperatorId::Minus, &[('=', OperatorId::MinusEq)]),
                    '*' => self.operator(start, OperatorId::Star, &[('=', OperatorId::StarEq)]),
                    '%' => self.operator(start, OperatorId::Percent, &[('=', OperatorId::PercentEq)]),
                    '=' => self.operator(start, OperatorId::Eq, &[('=', OperatorId::EqEq)]),
                    '!' => self.operator(start, OperatorId::Bang, &[('=', OperatorId::NotEq)]),
                    '<' => self.operator(start, OperatorId::Lt, &[('=', OperatorId::LtEq)]),
                    '>' => self.operator(start, OperatorId::Gt, &[('=', OperatorId::GtEq)]),
                    '&' => self.operator(start, OperatorId::Amp, &[('&', OperatorId::AndAnd)]),
                    '|' => self.operator(start, OperatorId::Pipe, &[('|', OperatorId::OrOr)]),
                    '^' => self.add_op(OperatorId::Caret, start),
                    ',' => self.add_punct(PunctuationId::Comma, start),
                    ':' => self.add_punct(PunctuationId::Colon, start),
                    ';' => self.add_punct(PunctuationId::Semi, start),
                    '?' => self.add_punct(PunctuationId::Question, start),
                    '@' => self.add_punct(PunctuationId::At, start),
                    '#' => self.add_punct(PunctuationId::Hash, start),
                    '(' => self.add_punct(PunctuationId::LParen, start),
                    ')' => self.add_punct(PunctuationId::RParen, start),
                    '[' => self.add_punct(PunctuationId::LBracket, start),
                    ']' => self.add_punct(PunctuationId::RBracket, start),
                    '{' => self.add_punct(PunctuationId::LBrace, start),
                    '}' => self.add_punct(PunctuationId::RBrace, start),
                    _ => self.scan_unknown(start),
                }
            }
        }
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        let source = self.source;
        let text = &source[start..self.pos];
        let mut token = Token::new(kind, text, self.range_from(start));
        token.newline_before = std::mem::take(&mut self.newline_pending);
        self.tokens.push(token);
    }

    fn add_op(&mut self, id: OperatorId, start: usize) {
        self.add_token(TokenKind::Operator(id), start);
    }

    fn add_punct(&mut self, id: PunctuationId, start: usize) {
        self.add_token(TokenKind::Punctuation(id), start);
    }

    /// Try to match a compound operator, falling back to the simple one.
    fn operator(&mut self, start: usize, simple: OperatorId, compounds: &[(char, OperatorId)]) {
        for (c, id) in compounds {
            if self.match_char(*c) {
                self.add_op(*id, start);
                return;
            }
        }
        self.add_op(simple, start);
    }

    // ========================================================================
    // Comments and `/`
    // ========================================================================

    fn scan_slash(&mut self, start: usize) {
        self.advance();
        if self.match_char('/') {
            self.scan_line_comment(start);
        } else if self.match_char('*') {
            self.scan_block_comment(start);
        } else if self.match_char('=') {
            self.add_op(OperatorId::SlashEq, start);
        } else {
            self.add_op(OperatorId::Slash, start);
        }
    }

    /// Scan the rest of a `//` comment. `////...` is an ordinary comment, not a doc comment.
    fn scan_line_comment(&mut self, start: usize) {
        let doc = if self.peek() == Some('/') && self.peek_next() != Some('/') {
            self.advance();
            Some(false)
        } else if self.peek() == Some('!') {
            self.advance();
            Some(true)
        } else {
            None
        };
        let body_start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        let Some(module) = doc else {
            return;
        };
        let body = self.source[body_start..self.pos].trim_end_matches('\r');
        let body = body.strip_prefix(' ').unwrap_or(body).to_string();
        let kind = if module {
            TokenKind::ModuleDoc(body)
        } else {
            TokenKind::DocComment(body)
        };
        self.add_token(kind, start);
    }

    /// Scan a (possibly nested) block comment after its opening `/*`.
    fn scan_block_comment(&mut self, start: usize) {
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                None => {
                    self.diagnostics
                        .report_error(SourceRange::new(self.file, start, start + 2), "unterminated block comment")
                        .with_code(codes::UNTERMINATED_COMMENT)
                        .with_label("comment starts here")
                        .with_help("close the comment with `*/`");
                    return;
                }
                Some('/') if self.match_char('*') => depth += 1,
                Some('*') if self.match_char('/') => depth -= 1,
                Some('\n') => self.newline_pending = true,
                Some(_) => {}
            }
        }
    }

    // ========================================================================
    // Identifiers and unknown characters
    // ========================================================================

    fn scan_identifier(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }

        let spelling = &self.source[start..self.pos];
        match keyword_id(spelling) {
            Some(KeywordId::Infer) => self.add_token(TokenKind::Infer, start),
            Some(id) => self.add_token(TokenKind::Keyword(id), start),
            None => self.add_token(TokenKind::Ident, start),
        }
    }

    /// Consume a maximal run of characters that cannot start any token.
    fn scan_unknown(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if starts_token(c) {
                break;
            }
            self.advance();
        }
        let source = self.source;
        let text = &source[start..self.pos];
        let message = if text.chars().count() == 1 {
            format!("unexpected character `{text}`")
        } else {
            format!("unexpected characters `{text}`")
        };
        self.diagnostics
            .report_error(self.range_from(start), message)
            .with_code(codes::UNEXPECTED_CHARACTER);
        self.add_token(TokenKind::Error, start);
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier (ASCII-only).
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (ASCII-only).
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Check if a character begins some token (or is whitespace separating tokens).
fn starts_token(c: char) -> bool {
    c.is_whitespace() || is_ident_continue(c) || c == '"' || "+-*/%=!<>&|^,:;?@#()[]{}".contains(c)
}

/// Lex `source` (the text of `file`) into a token stream ending in `Eof`.
///
/// This is a shorthand for `Lexer::new(source, file, diagnostics).tokenize()`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex_all<'src>(source: &'src str, file: FileId, diagnostics: &mut DiagnosticBag) -> Vec<Token<'src>> {
    Lexer::new(source, file, diagnostics).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceManager;
    use btdsl_core::lang::{keywords, operators, punctuation};

    fn lex(source: &str) -> (Vec<TokenKind>, DiagnosticBag) {
        let mut sm = SourceManager::new();
        let file = sm.add_file("t.bt", source);
        let mut bag = DiagnosticBag::new();
        let kinds = lex_all(source, file, &mut bag).into_iter().map(|t| t.kind).collect();
        (kinds, bag)
    }

    #[test]
    fn test_keyword_registry_parity() {
        for info in keywords::KEYWORDS {
            let (kinds, bag) = lex(info.canonical);
            assert!(bag.is_empty(), "{}", info.canonical);
            let expected = if info.id == KeywordId::Infer {
                TokenKind::Infer
            } else {
                TokenKind::Keyword(info.id)
            };
            assert_eq!(kinds, vec![expected, TokenKind::Eof], "{}", info.canonical);
        }
    }

    #[test]
    fn test_operator_registry_parity() {
        for info in operators::OPERATORS {
            let (kinds, bag) = lex(info.spelling);
            assert!(bag.is_empty(), "{}", info.spelling);
            assert_eq!(kinds, vec![TokenKind::Operator(info.id), TokenKind::Eof], "{}", info.spelling);
        }
    }

    #[test]
    fn test_punctuation_registry_parity() {
        for info in punctuation::PUNCTUATION {
            let (kinds, bag) = lex(info.canonical);
            assert!(bag.is_empty(), "{}", info.canonical);
            assert_eq!(kinds, vec![TokenKind::Punctuation(info.id), TokenKind::Eof], "{}", info.canonical);
        }
    }

    #[test]
    fn underscore_prefixed_names_are_identifiers() {
        let (kinds, _) = lex("_ _x x_");
        assert_eq!(kinds, vec![TokenKind::Infer, TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn comments_are_skipped_and_docs_kept() {
        let (kinds, bag) = lex("//! module\n/// item\n// plain\n//// plain too\n/* a /* nested */ b */ x");
        assert!(bag.is_empty());
        assert_eq!(
            kinds,
            vec![
                TokenKind::ModuleDoc("module".into()),
                TokenKind::DocComment("item".into()),
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_is_reported() {
        let (kinds, bag) = lex("/* /* */ never closed");
        assert_eq!(kinds, vec![TokenKind::Eof]);
        assert_eq!(bag.error_count(), 1);
    }

    #[test]
    fn unknown_runs_produce_one_error_each() {
        let (kinds, bag) = lex("a $$$ b . c");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Error,
                TokenKind::Ident,
                TokenKind::Error,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
        assert_eq!(bag.error_count(), 2);
        assert!(bag.iter().any(|d| d.message == "unexpected characters `$$$`"));
    }

    #[test]
    fn token_ranges_cover_their_text() {
        let source = "tree Main() { x += 1; }";
        let mut sm = SourceManager::new();
        let file = sm.add_file("t.bt", source);
        let mut bag = DiagnosticBag::new();
        for token in lex_all(source, file, &mut bag) {
            assert_eq!(&source[token.range.start..token.range.end], token.text);
        }
    }

    #[test]
    fn tokens_record_preceding_line_breaks() {
        let mut bag = DiagnosticBag::new();
        let tokens = lex_all("a b\n c /*\n*/ d", FileId::DETACHED, &mut bag);
        let flags: Vec<bool> = tokens.iter().map(|t| t.newline_before).collect();
        assert_eq!(flags, [false, false, true, true, false]);
    }

    #[test]
    fn non_ascii_text_does_not_split_characters() {
        let (kinds, bag) = lex("é x");
        assert_eq!(kinds, vec![TokenKind::Error, TokenKind::Ident, TokenKind::Eof]);
        assert_eq!(bag.error_count(), 1);
    }
}
