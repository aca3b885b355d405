/// Token-stream helpers.
///
/// Peeking and consuming tokens, matching keywords/operators/punctuation, and range bookkeeping.
impl<'a, 'src> Parser<'a, 'src> {
    /// Return `true` if the current token is [`TokenKind::Eof`].
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Return the current token without consuming it.
    fn peek(&self) -> &'a Token<'src> {
        self.peek_at(0)
    }

    /// Return the token `n` positions ahead. Past the end this is the `Eof` token.
    fn peek_at(&self, n: usize) -> &'a Token<'src> {
        let tokens = self.tokens;
        &tokens[(self.pos + n).min(tokens.len() - 1)]
    }

    /// Consume the current token and return it. `Eof` is never consumed.
    fn advance(&mut self) -> &'a Token<'src> {
        let token = self.peek();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    fn check_op(&self, id: OperatorId) -> bool {
        self.peek().kind.is_operator(id)
    }

    fn check_ident(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident)
    }

    /// If the current token is the given punctuation, consume it and return `true`.
    fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// If the current token is the given operator, consume it and return `true`.
    fn match_op(&mut self, id: OperatorId) -> bool {
        if self.check_op(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Range of the most recently consumed token.
    fn prev_range(&self) -> SourceRange {
        match self.pos.checked_sub(1) {
            Some(index) => self.tokens[index].range,
            None => SourceRange::empty_at(self.file, 0),
        }
    }

    /// Range from the start of `start` to the end of the last consumed token.
    fn range_since(&self, start: SourceRange) -> SourceRange {
        let end = self.prev_range().end.max(start.end);
        SourceRange::new(self.file, start.start, end)
    }

    /// Intern an identifier token.
    fn ident_from(&mut self, token: &Token<'_>) -> Ident {
        Ident {
            name: self.arena.intern(token.text),
            range: token.range,
        }
    }

    /// Consume a port direction keyword, if present.
    fn direction(&mut self) -> Option<PortDirection> {
        let direction = self.peek().keyword_id().and_then(direction_for)?;
        self.advance();
        Some(direction)
    }

    /// Zero-width `Missing` expression at the current token.
    fn missing_expr(&mut self) -> ExprId {
        let range = SourceRange::empty_at(self.file, self.peek().range.start);
        self.arena.alloc_expr(Expr {
            kind: ExprKind::Missing,
            range,
        })
    }

    /// Zero-width `Missing` type at the current token.
    fn missing_type(&mut self) -> TypeId {
        let range = SourceRange::empty_at(self.file, self.peek().range.start);
        self.arena.alloc_type(TypeNode {
            kind: TypeKind::Missing,
            range,
        })
    }

    /// Claim the current position for a syntax error. Returns `false` if one was already reported here.
    fn first_error_here(&mut self) -> bool {
        if self.last_error_at == Some(self.pos) {
            return false;
        }
        self.last_error_at = Some(self.pos);
        true
    }

    /// Report "expected {what}, found ..." at the current token (once per position).
    fn error_expected(&mut self, what: &str, help: Option<&str>) {
        if !self.first_error_here() {
            return;
        }
        let found = self.peek();
        let builder = self
            .diagnostics
            .report_error(found.range, format!("expected {what}, found {}", found.describe()))
            .with_code(codes::EXPECTED_TOKEN)
            .with_label(format!("expected {what}"));
        if let Some(help) = help {
            builder.with_help(help);
        }
    }
}
