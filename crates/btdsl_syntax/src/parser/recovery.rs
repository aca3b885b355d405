/// Error recovery.
///
/// A failed `expect` runs in two phases: `classify_missing` reports the error and decides whether
/// anything should be skipped, then `synchronize` skips to the nearest token in a [`RecoverySet`].
/// Bracketed groups are skipped as a whole so recovery never stops inside a nested block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecoverySet(u16);

impl RecoverySet {
    const SEMI: Self = Self(1 << 0);
    const RBRACE: Self = Self(1 << 1);
    const RPAREN: Self = Self(1 << 2);
    const RBRACKET: Self = Self(1 << 3);
    const COMMA: Self = Self(1 << 4);
    const LBRACE: Self = Self(1 << 5);
    const GT: Self = Self(1 << 6);
    /// Any of [`keywords::RECOVERY_KEYWORDS`].
    const BOUNDARY: Self = Self(1 << 7);

    /// Inside a tree body.
    const STMT: Self = Self::SEMI.with(Self::RBRACE).with(Self::BOUNDARY);
    /// Between top-level declarations.
    const TOP: Self = Self::SEMI.with(Self::BOUNDARY);
    /// Inside a type.
    const TYPE: Self = Self::STMT
        .with(Self::COMMA)
        .with(Self::RPAREN)
        .with(Self::RBRACKET)
        .with(Self::GT)
        .with(Self::LBRACE);

    const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// `Eof` stops every set.
    fn contains(self, kind: &TokenKind) -> bool {
        let bit = match kind {
            TokenKind::Eof => return true,
            TokenKind::Punctuation(PunctuationId::Semi) => Self::SEMI,
            TokenKind::Punctuation(PunctuationId::RBrace) => Self::RBRACE,
            TokenKind::Punctuation(PunctuationId::RParen) => Self::RPAREN,
            TokenKind::Punctuation(PunctuationId::RBracket) => Self::RBRACKET,
            TokenKind::Punctuation(PunctuationId::Comma) => Self::COMMA,
            TokenKind::Punctuation(PunctuationId::LBrace) => Self::LBRACE,
            TokenKind::Operator(OperatorId::Gt) => Self::GT,
            TokenKind::Keyword(id) if keywords::is_recovery_keyword(*id) => Self::BOUNDARY,
            _ => return false,
        };
        self.0 & bit.0 != 0
    }
}

/// Outcome of `classify_missing`.
enum MissingRecovery {
    /// Pretend the token was there; skip nothing.
    InsertHere,
    /// Skip ahead with `synchronize`.
    Skip,
}

impl<'a, 'src> Parser<'a, 'src> {
    /// Consume the given punctuation or report it missing and recover.
    ///
    /// A `)` or `]` missing before a line break is reported at the end of the previous token and
    /// nothing is skipped. Otherwise the token is consumed if recovery stopped right at it.
    fn expect_punct(&mut self, id: PunctuationId, context: &str, recovery: RecoverySet) -> Option<SourceRange> {
        if self.check_punct(id) {
            return Some(self.advance().range);
        }
        let spelling = punctuation::as_str(id);
        let expected = format!("`{spelling}`");
        let insertion = matches!(id, PunctuationId::RParen | PunctuationId::RBracket).then_some(spelling);
        match self.classify_missing(&expected, context, insertion) {
            MissingRecovery::InsertHere => None,
            MissingRecovery::Skip => {
                self.synchronize(recovery);
                self.check_punct(id).then(|| self.advance().range)
            }
        }
    }

    /// Report the `)` of an open list as missing, without skipping anything.
    fn report_unclosed_list(&mut self, context: &str) {
        self.classify_missing("`)`", context, Some(")"));
    }

    /// Does the current token start a line that cannot continue an open `(` list?
    ///
    /// Between declarations only a declaration keyword qualifies. In a tree body so do `}`, doc
    /// comments, preconditions, node calls and assignments.
    fn starts_construct_on_new_line(&self, in_body: bool) -> bool {
        let token = self.peek();
        if !token.newline_before {
            return false;
        }
        match &token.kind {
            TokenKind::Keyword(id) => keywords::is_recovery_keyword(*id),
            TokenKind::DocComment(_) | TokenKind::Punctuation(PunctuationId::RBrace | PunctuationId::At) => in_body,
            TokenKind::Ident => {
                in_body
                    && (matches!(
                        self.peek_at(1).kind,
                        TokenKind::Punctuation(PunctuationId::LParen | PunctuationId::LBrace)
                    ) || self.is_assignment_ahead())
            }
            _ => false,
        }
    }

    /// Consume a statement terminator.
    ///
    /// When the next token starts a new line, the `;` is reported as missing at the end of the
    /// previous token and nothing is skipped.
    fn expect_semi(&mut self, context: &str, recovery: RecoverySet) -> Option<SourceRange> {
        if self.check_punct(PunctuationId::Semi) {
            return Some(self.advance().range);
        }
        match self.classify_missing("`;`", context, Some(";")) {
            MissingRecovery::InsertHere => None,
            MissingRecovery::Skip => {
                self.synchronize(recovery);
                self.match_punct(PunctuationId::Semi).then(|| self.prev_range())
            }
        }
    }

    fn expect_op(&mut self, id: OperatorId, context: &str, recovery: RecoverySet) -> Option<SourceRange> {
        if self.check_op(id) {
            return Some(self.advance().range);
        }
        let expected = format!("`{}`", operators::as_str(id));
        self.classify_missing(&expected, context, None);
        self.synchronize(recovery);
        self.check_op(id).then(|| self.advance().range)
    }

    /// Consume an identifier, or report and synchronize.
    fn expect_ident(&mut self, what: &str, recovery: RecoverySet) -> Option<Ident> {
        if self.check_ident() {
            let token = self.advance();
            return Some(self.ident_from(token));
        }
        let found = self.peek();
        let help = found
            .keyword_id()
            .map(|id| format!("`{}` is a reserved word and cannot be used as a name", keywords::as_str(id)));
        self.error_expected(what, help.as_deref());
        // A reserved word on the same line is taken as the intended name so parsing can continue.
        if help.is_some() && !found.newline_before {
            self.advance();
            return Some(self.ident_from(found));
        }
        self.synchronize(recovery);
        None
    }

    /// Report a missing token and decide how to recover.
    ///
    /// `insertion` is the text a fix-it would insert; it is only offered for terminators.
    fn classify_missing(&mut self, expected: &str, context: &str, insertion: Option<&str>) -> MissingRecovery {
        let found = self.peek();
        let insert_before_line_break = self.pos > 0 && found.newline_before;
        if let Some(text) = insertion.filter(|_| insert_before_line_break) {
            let at = SourceRange::empty_at(self.file, self.prev_range().end);
            if self.first_error_here() {
                self.diagnostics
                    .report_error(at, format!("expected {expected} {context}"))
                    .with_code(codes::EXPECTED_TOKEN)
                    .with_label(format!("expected {expected}"))
                    .with_fixit(at, text);
            }
            return MissingRecovery::InsertHere;
        }

        if self.first_error_here() {
            self.diagnostics
                .report_error(found.range, format!("expected {expected} {context}, found {}", found.describe()))
                .with_code(codes::EXPECTED_TOKEN)
                .with_label(format!("expected {expected}"));
        }
        MissingRecovery::Skip
    }

    /// Skip tokens until one in `recovery` (or `Eof`). Stray closers are consumed.
    fn synchronize(&mut self, recovery: RecoverySet) {
        loop {
            let token = self.peek();
            if recovery.contains(&token.kind) {
                return;
            }
            match token.punctuation_id() {
                Some(id) if punctuation::closer_for(id).is_some() => self.skip_balanced(),
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip a bracketed group starting at the current opener.
    ///
    /// Stops without consuming at a closer that does not match, leaving it for the enclosing
    /// construct.
    fn skip_balanced(&mut self) {
        let mut closers: Vec<PunctuationId> = Vec::new();
        loop {
            let token = self.peek();
            let Some(id) = token.punctuation_id() else {
                if self.is_at_end() {
                    return;
                }
                self.advance();
                continue;
            };
            if let Some(closer) = punctuation::closer_for(id) {
                closers.push(closer);
                self.advance();
                continue;
            }
            if matches!(id, PunctuationId::RParen | PunctuationId::RBracket | PunctuationId::RBrace) {
                if closers.last() != Some(&id) {
                    return;
                }
                closers.pop();
                self.advance();
                if closers.is_empty() {
                    return;
                }
                continue;
            }
            self.advance();
        }
    }

    /// Report a keyword borrowed from another language and skip the construct it introduces.
    ///
    /// The header, its block and (for conditionals) any `else` continuations are skipped, so the
    /// whole construct yields one diagnostic.
    fn skip_foreign_construct(&mut self, info: &ForeignKeywordInfo) {
        if self.first_error_here() {
            let range = self.peek().range;
            self.diagnostics
                .report_error(range, format!("`{}` is not supported in BT-DSL", info.spelling))
                .with_code(codes::UNSUPPORTED_KEYWORD)
                .with_label("unsupported keyword")
                .with_help(info.help);
        }
        self.advance();

        loop {
            self.skip_header();
            if !self.check_punct(PunctuationId::LBrace) {
                self.match_punct(PunctuationId::Semi);
                return;
            }
            self.skip_brace_block();
            let continues = info.shape == ForeignShape::Conditional
                && matches!(self.peek().kind, TokenKind::Ident)
                && self.peek().text == "else";
            if !continues {
                return;
            }
            self.advance();
        }
    }

    /// Skip a `{ ... }` block through its matching `}`, counting braces only.
    ///
    /// Foreign code can hold brackets that never balance; they must not end the skip early.
    fn skip_brace_block(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Punctuation(PunctuationId::LBrace) => depth += 1,
                TokenKind::Punctuation(PunctuationId::RBrace) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip to the `{`, `;` or `}` ending a construct header, stepping over bracketed groups.
    fn skip_header(&mut self) {
        loop {
            let token = self.peek();
            match &token.kind {
                TokenKind::Eof
                | TokenKind::Punctuation(PunctuationId::LBrace | PunctuationId::Semi | PunctuationId::RBrace) => return,
                TokenKind::Keyword(id) if keywords::is_recovery_keyword(*id) => return,
                TokenKind::Punctuation(PunctuationId::LParen | PunctuationId::LBracket) => self.skip_balanced(),
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Warn about doc comments with nothing to document.
    fn report_dangling_docs(&mut self, docs_range: Option<SourceRange>) {
        if let Some(range) = docs_range {
            self.diagnostics
                .report_warning(range, "doc comment does not document anything")
                .with_code(codes::DANGLING_DOC_COMMENT)
                .with_help("place `///` comments directly before a declaration, parameter or statement");
        }
    }
}
