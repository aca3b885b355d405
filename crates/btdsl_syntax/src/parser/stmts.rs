/// Statement parsing (tree bodies and compound-node children).
///
/// ```text
/// Stmt := Doc* Precondition* ( "var" .. ";" | "const" .. ";" | Assignment ";" | NodeStmt )
/// NodeStmt := Name "(" Args ")" ";"            // leaf
///           | Name ["(" Args ")"] "{" Stmt* "}" // compound
/// ```
impl<'a, 'src> Parser<'a, 'src> {
    /// Parse `{ Stmt* }`. The current token must be `{`.
    fn block(&mut self) -> Vec<StmtId> {
        let open = self.advance().range;
        let mut stmts = Vec::new();
        loop {
            match &self.peek().kind {
                TokenKind::Punctuation(PunctuationId::RBrace) => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    self.report_unclosed_block(open);
                    break;
                }
                // `var`/`const` start statements; the other boundary keywords mean a `}` is missing.
                TokenKind::Keyword(id)
                    if keywords::is_recovery_keyword(*id) && !matches!(id, KeywordId::Var | KeywordId::Const) =>
                {
                    self.report_unclosed_block(open);
                    break;
                }
                _ => {}
            }

            let before = self.pos;
            if let Some(stmt) = self.statement() {
                stmts.push(stmt);
            }
            if self.pos == before && !self.check_punct(PunctuationId::RBrace) {
                self.advance();
            }
        }
        stmts
    }

    fn report_unclosed_block(&mut self, open: SourceRange) {
        if !self.first_error_here() {
            return;
        }
        let found = self.peek();
        self.diagnostics
            .report_error(found.range, format!("expected `}}` to close the block, found {}", found.describe()))
            .with_code(codes::EXPECTED_TOKEN)
            .with_label("expected `}`")
            .with_secondary(open, "block opened here");
    }

    fn statement(&mut self) -> Option<StmtId> {
        let (docs, docs_range) = self.doc_comments();
        let preconditions = self.preconditions();

        let token = self.peek();
        let start = preconditions.first().map_or(token.range, |p| p.range);
        let kind = match &token.kind {
            TokenKind::Keyword(KeywordId::Var) => {
                let (name, ty, init) = self.var_parts(RecoverySet::STMT)?;
                StmtKind::BlackboardDecl { name, ty, init }
            }
            TokenKind::Keyword(KeywordId::Const) => {
                let (name, ty, value) = self.const_parts(RecoverySet::STMT)?;
                StmtKind::ConstDecl { name, ty, value }
            }
            TokenKind::Ident => {
                if let Some(info) = foreign::lookup(token.text) {
                    self.skip_foreign_construct(info);
                    return None;
                }
                if self.is_assignment_ahead() {
                    self.assignment()?
                } else {
                    self.node_stmt()?
                }
            }
            TokenKind::Punctuation(PunctuationId::RBrace) | TokenKind::Eof => {
                self.report_unattached(&preconditions, docs_range);
                return None;
            }
            TokenKind::Keyword(id) if keywords::is_recovery_keyword(*id) => {
                self.report_unattached(&preconditions, docs_range);
                return None;
            }
            _ => {
                self.error_expected(
                    "a statement",
                    Some("statements are node calls like `Action();`, assignments, or `var`/`const` declarations"),
                );
                self.synchronize(RecoverySet::STMT);
                self.match_punct(PunctuationId::Semi);
                return None;
            }
        };

        Some(self.arena.alloc_stmt(Stmt {
            kind,
            docs,
            preconditions,
            range: self.range_since(start),
        }))
    }

    /// Docs or preconditions followed by the end of a block.
    fn report_unattached(&mut self, preconditions: &[Precondition], docs_range: Option<SourceRange>) {
        match preconditions.first() {
            Some(first) => {
                self.diagnostics
                    .report_error(first.range, "precondition is not attached to a statement")
                    .with_code(codes::EXPECTED_TOKEN)
                    .with_label("nothing follows this precondition");
            }
            None => self.report_dangling_docs(docs_range),
        }
    }

    /// `@kind(condition)` entries before a statement. Unknown kinds are reported and dropped.
    fn preconditions(&mut self) -> Vec<Precondition> {
        let recovery = RecoverySet::STMT.with(RecoverySet::RPAREN);
        let mut preconditions = Vec::new();
        while self.check_punct(PunctuationId::At) {
            let start = self.advance().range;
            let Some(name) = self.expect_ident("a precondition name after `@`", recovery) else {
                self.match_punct(PunctuationId::RParen);
                continue;
            };
            let kind = policies::precondition_from_str(self.arena.resolve(name.name));
            if kind.is_none() {
                let message = format!("unknown precondition `{}`", self.arena.resolve(name.name));
                self.diagnostics
                    .report_error(name.range, message)
                    .with_code(codes::UNKNOWN_PRECONDITION)
                    .with_label("unknown precondition")
                    .with_help(format!("expected one of {}", policies::precondition_names()));
            }
            if self.expect_punct(PunctuationId::LParen, "after the precondition name", recovery).is_none() {
                continue;
            }
            let condition = self.expression();
            self.expect_punct(PunctuationId::RParen, "to close the precondition", recovery);
            if let Some(kind) = kind {
                preconditions.push(Precondition {
                    kind,
                    condition,
                    range: self.range_since(start),
                });
            }
        }
        preconditions
    }

    /// `name([..])* op=` ahead? Index groups are skipped by bracket depth.
    ///
    /// An assignment operator inside an index that is never closed (`x[1 = 2;`) also counts, so
    /// the missing `]` is what gets reported. The scan ends at `;`, `{` or `}`.
    fn is_assignment_ahead(&self) -> bool {
        let mut offset = 1;
        while self.peek_at(offset).kind.is_punctuation(PunctuationId::LBracket) {
            let mut depth = 0usize;
            loop {
                let token = self.peek_at(offset);
                offset += 1;
                match &token.kind {
                    TokenKind::Eof
                    | TokenKind::Punctuation(PunctuationId::Semi | PunctuationId::LBrace | PunctuationId::RBrace) => {
                        return false;
                    }
                    TokenKind::Punctuation(PunctuationId::LBracket) => depth += 1,
                    TokenKind::Punctuation(PunctuationId::RBracket) => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            break;
                        }
                    }
                    _ if token.operator_id().is_some_and(operators::is_assignment) => return true,
                    _ => {}
                }
            }
        }
        self.peek_at(offset).operator_id().is_some_and(operators::is_assignment)
    }

    /// `target[i].. op value;`
    fn assignment(&mut self) -> Option<StmtKind> {
        let token = self.advance();
        let target = self.ident_from(token);
        let mut indices = Vec::new();
        while self.match_punct(PunctuationId::LBracket) {
            indices.push(self.expression());
            if self.match_punct(PunctuationId::RBracket) {
                continue;
            }
            if self.peek().operator_id().is_some_and(operators::is_assignment) {
                self.error_expected("`]` to close the index", None);
                break;
            }
            self.expect_punct(
                PunctuationId::RBracket,
                "to close the index",
                RecoverySet::RBRACKET.with(RecoverySet::STMT),
            );
        }
        let Some(op) = self.peek().operator_id().and_then(assign_op_for) else {
            self.error_expected("an assignment operator", None);
            self.synchronize(RecoverySet::STMT);
            self.match_punct(PunctuationId::Semi);
            return None;
        };
        self.advance();
        let value = self.expression();
        self.expect_semi("after assignment", RecoverySet::STMT);
        Some(StmtKind::Assignment {
            target,
            indices,
            op,
            value,
        })
    }

    /// Leaf `Name(args);` or compound `Name[(args)] { children }`.
    fn node_stmt(&mut self) -> Option<StmtKind> {
        let token = self.advance();
        let callee = self.ident_from(token);
        let args = self.check_punct(PunctuationId::LParen).then(|| self.arguments());

        if self.check_punct(PunctuationId::LBrace) {
            let children = self.block();
            if self.check_punct(PunctuationId::Semi) {
                let semi = self.advance().range;
                self.diagnostics
                    .report_error(semi, "unexpected `;` after a node block")
                    .with_code(codes::INVALID_NODE_SHAPE)
                    .with_label("remove this `;`")
                    .with_help("a node is either a leaf call ending in `;` or a compound node with a `{ ... }` block")
                    .with_fixit(semi, "");
            }
            return Some(StmtKind::Node(NodeStmt {
                callee,
                args,
                children: Some(children),
            }));
        }

        if args.is_none() {
            let what = format!("`(` or `{{` after node name `{}`", token.text);
            self.error_expected(
                &what,
                Some("call a leaf node with `Name(...);` or open a compound node with `Name { ... }`"),
            );
            self.synchronize(RecoverySet::STMT);
            self.match_punct(PunctuationId::Semi);
            return None;
        }

        self.expect_semi("after node call", RecoverySet::STMT);
        Some(StmtKind::Node(NodeStmt {
            callee,
            args,
            children: None,
        }))
    }

    /// `( [name:] [direction] expr, ... )`. The current token must be `(`.
    ///
    /// Consumes the closing `)`. A list that breaks off where the next statement begins is
    /// reported once, as a missing `)` at the end of the previous line.
    fn arguments(&mut self) -> Vec<Argument> {
        const CLOSE: &str = "to close the argument list";
        self.advance();
        let recovery = RecoverySet::COMMA
            .with(RecoverySet::RPAREN)
            .with(RecoverySet::LBRACE)
            .with(RecoverySet::STMT);
        let mut args = Vec::new();

        loop {
            if self.match_punct(PunctuationId::RParen) {
                break;
            }
            if self.is_at_end() || self.starts_construct_on_new_line(true) {
                self.report_unclosed_list(CLOSE);
                break;
            }

            let start = self.peek().range;
            let name = if self.check_ident() && self.peek_at(1).kind.is_punctuation(PunctuationId::Colon) {
                let token = self.advance();
                self.advance();
                Some(self.ident_from(token))
            } else {
                None
            };
            let direction = self.direction();
            let value = self.expression();
            args.push(Argument {
                name,
                direction,
                value,
                range: self.range_since(start),
            });

            if self.match_punct(PunctuationId::Comma) {
                continue;
            }
            if self.match_punct(PunctuationId::RParen) {
                break;
            }
            if self.is_at_end() || self.starts_construct_on_new_line(true) {
                self.report_unclosed_list(CLOSE);
                break;
            }
            // One error covers the rest of the list; the `)` is taken if recovery lands on it.
            self.error_expected("`,` or `)` in argument list", None);
            self.synchronize(recovery);
            if !self.match_punct(PunctuationId::Comma) {
                self.match_punct(PunctuationId::RParen);
                break;
            }
        }
        args
    }
}
