//! String literal scanning and escape decoding.
//!
//! Supported escapes: `\n \t \r \0 \b \f \\ \"` and `\u{HEX}` (1 to 6 hex digits, a Unicode scalar
//! value). A malformed escape is reported and dropped from the decoded string; decoding continues
//! with the next character.

use std::iter::Peekable;
use std::str::CharIndices;

use super::{Lexer, TokenKind};
use crate::diagnostics::{DiagnosticBag, codes};
use crate::source::{FileId, SourceRange};

const SUPPORTED_ESCAPES: &str = "supported escapes are `\\n`, `\\t`, `\\r`, `\\0`, `\\b`, `\\f`, `\\\\`, `\\\"` and `\\u{HEX}`";

impl<'src> Lexer<'src, '_> {
    /// Scan a string literal starting at the opening quote.
    pub(super) fn scan_string(&mut self, start: usize) {
        self.advance();
        let body_start = self.pos;
        let mut terminated = false;
        // A `\` cut off by the end of the line belongs to the unterminated-string error.
        let mut dangling_escape = false;
        let body_end = loop {
            match self.peek() {
                None | Some('\n') => break self.pos,
                Some('"') => {
                    let end = self.pos;
                    self.advance();
                    terminated = true;
                    break end;
                }
                Some('\\') => {
                    self.advance();
                    if matches!(self.peek(), Some(c) if c != '\n') {
                        self.advance();
                    } else {
                        dangling_escape = true;
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        };

        if !terminated {
            self.diagnostics
                .report_error(SourceRange::new(self.file, start, body_end), "unterminated string literal")
                .with_code(codes::UNTERMINATED_STRING)
                .with_label("string starts here")
                .with_help("add a closing `\"` before the end of the line");
        }

        let source = self.source;
        let decoded_end = if dangling_escape { body_end - 1 } else { body_end };
        let value = unescape(&source[body_start..decoded_end], self.file, body_start, self.diagnostics);
        self.add_token(TokenKind::String(value), start);
    }
}

/// Decode the escapes in `raw`, the body of a string literal.
///
/// `base_offset` is the byte offset of `raw` inside `file`, so diagnostics point at the escape itself.
///
/// ## Examples
/// ```rust
/// use btdsl_syntax::diagnostics::DiagnosticBag;
/// use btdsl_syntax::lexer::unescape;
/// use btdsl_syntax::source::FileId;
///
/// let mut bag = DiagnosticBag::new();
/// assert_eq!(unescape(r"a\tb\u{1F600}", FileId::DETACHED, 0, &mut bag), "a\tb\u{1F600}");
/// assert!(bag.is_empty());
/// ```
pub fn unescape(raw: &str, file: FileId, base_offset: usize, diagnostics: &mut DiagnosticBag) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let range = |end: usize| SourceRange::new(file, base_offset + start, base_offset + end);

        let Some((at, escape)) = chars.next() else {
            invalid_escape(diagnostics, range(raw.len()), "unterminated escape sequence".to_string(), None);
            break;
        };
        let after = at + escape.len_utf8();
        match escape {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'u' => match decode_unicode(&mut chars, after, raw.len()) {
                Ok(decoded) => out.push(decoded),
                Err((message, end)) => invalid_escape(diagnostics, range(end), message, None),
            },
            other => invalid_escape(
                diagnostics,
                range(after),
                format!("unknown escape sequence `\\{other}`"),
                Some(SUPPORTED_ESCAPES),
            ),
        }
    }
    out
}

/// Decode the `{HEX}` part of a `\u` escape. On failure returns the message and the end offset of the bad escape.
fn decode_unicode(chars: &mut Peekable<CharIndices<'_>>, u_end: usize, raw_len: usize) -> Result<char, (String, usize)> {
    if !matches!(chars.peek(), Some((_, '{'))) {
        return Err(("expected `{` after `\\u`".to_string(), u_end));
    }
    chars.next();

    let mut digits = String::new();
    let end = loop {
        match chars.next() {
            None => return Err(("unterminated unicode escape, expected `}`".to_string(), raw_len)),
            Some((at, '}')) => break at + 1,
            Some((_, d)) => digits.push(d),
        }
    };

    if digits.is_empty() {
        return Err(("empty unicode escape `\\u{}`".to_string(), end));
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err((format!("invalid hexadecimal digit `{bad}` in unicode escape"), end));
    }
    if digits.len() > 6 {
        return Err((format!("unicode escape `\\u{{{digits}}}` has more than 6 hex digits"), end));
    }
    let value = u32::from_str_radix(&digits, 16).map_err(|_| (format!("invalid unicode escape `\\u{{{digits}}}`"), end))?;
    if value > 0x10FFFF {
        return Err((
            format!("unicode escape `\\u{{{digits}}}` is out of range, the maximum is `10FFFF`"),
            end,
        ));
    }
    if (0xD800..=0xDFFF).contains(&value) {
        return Err((
            format!("unicode escape `\\u{{{digits}}}` is a surrogate codepoint, which is not a valid character"),
            end,
        ));
    }
    char::from_u32(value).ok_or_else(|| (format!("invalid unicode escape `\\u{{{digits}}}`"), end))
}

fn invalid_escape(diagnostics: &mut DiagnosticBag, range: SourceRange, message: String, help: Option<&str>) {
    let builder = diagnostics.report_error(range, message).with_code(codes::INVALID_ESCAPE);
    if let Some(help) = help {
        builder.with_help(help).emit();
    }
}
