//! Numeric literal scanning.
//!
//! - Decimal integers with `_` separators: `1_000`
//! - Hexadecimal `0xFF` and binary `0b1010` integers
//! - Floats with a fraction and/or exponent: `1.5`, `2e10`, `3.0E-2`
//!
//! Literals that do not fit `i64` are reported and lexed as `0` so parsing can continue.

use super::{Lexer, TokenKind};
use crate::diagnostics::codes;

impl Lexer<'_, '_> {
    pub(super) fn scan_number(&mut self, start: usize) {
        let rest = &self.source[start..];
        let radix = if rest.starts_with("0x") || rest.starts_with("0X") {
            Some((16, "hexadecimal"))
        } else if rest.starts_with("0b") || rest.starts_with("0B") {
            Some((2, "binary"))
        } else {
            None
        };

        match radix {
            Some((radix, name)) => self.scan_radix_number(start, radix, name),
            None => self.scan_decimal_number(start),
        }
    }

    fn scan_radix_number(&mut self, start: usize, radix: u32, name: &str) {
        self.pos += 2;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let source = self.source;
        let digits: String = source[start + 2..self.pos].chars().filter(|c| *c != '_').collect();

        let value = if digits.is_empty() {
            self.number_error(start, format!("missing digits after `{}`", &source[start..start + 2]));
            0
        } else if let Some(bad) = digits.chars().find(|c| !c.is_digit(radix)) {
            self.number_error(start, format!("invalid digit `{bad}` in {name} literal"));
            0
        } else {
            match i64::from_str_radix(&digits, radix) {
                Ok(value) => value,
                Err(_) => {
                    self.number_error(start, format!("integer literal is too large, the maximum is `{}`", i64::MAX));
                    0
                }
            }
        };
        self.add_token(TokenKind::Int(value), start);
    }

    fn scan_decimal_number(&mut self, start: usize) {
        self.consume_digits();
        let mut is_float = false;

        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            self.advance();
            self.consume_digits();
            is_float = true;
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let after = &self.source[self.pos + 1..];
            let exponent_len = match after.chars().next() {
                Some('+' | '-') if after[1..].starts_with(|c: char| c.is_ascii_digit()) => Some(2),
                Some(c) if c.is_ascii_digit() => Some(1),
                _ => None,
            };
            if let Some(len) = exponent_len {
                self.pos += len;
                self.consume_digits();
                is_float = true;
            }
        }

        let source = self.source;
        let cleaned: String = source[start..self.pos].chars().filter(|c| *c != '_').collect();
        if is_float {
            let value = cleaned.parse::<f64>().unwrap_or_else(|_| {
                self.number_error(start, "invalid float literal".to_string());
                0.0
            });
            self.add_token(TokenKind::Float(value), start);
        } else {
            let value = cleaned.parse::<i64>().unwrap_or_else(|_| {
                self.number_error(start, format!("integer literal is too large, the maximum is `{}`", i64::MAX));
                0
            });
            self.add_token(TokenKind::Int(value), start);
        }
    }

    fn consume_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '_') {
            self.advance();
        }
    }

    fn number_error(&mut self, start: usize, message: String) {
        let range = self.range_from(start);
        self.diagnostics.report_error(range, message).with_code(codes::INVALID_NUMBER);
    }
}
