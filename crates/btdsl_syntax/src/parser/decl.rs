/// Declaration parsing.
///
/// Top-level items: `import`, `extern` (nodes and types), `type`, `var`, `const` and `tree`, plus
/// the doc comments and `#[behavior(...)]` attribute that may precede them.
impl<'a, 'src> Parser<'a, 'src> {
    /// Leading `//!` lines of the file.
    fn module_docs(&mut self) -> Vec<String> {
        let mut docs = Vec::new();
        while let TokenKind::ModuleDoc(text) = &self.peek().kind {
            docs.push(text.clone());
            self.advance();
        }
        docs
    }

    /// `///` lines preceding an item, with their combined range. Misplaced `//!` lines are reported and dropped.
    fn doc_comments(&mut self) -> (Vec<String>, Option<SourceRange>) {
        let mut docs = Vec::new();
        let mut range: Option<SourceRange> = None;
        loop {
            let token = self.peek();
            match &token.kind {
                TokenKind::DocComment(text) => {
                    docs.push(text.clone());
                    range = Some(range.map_or(token.range, |r| r.merge(token.range)));
                }
                TokenKind::ModuleDoc(_) => {
                    self.diagnostics
                        .report_warning(token.range, "module doc comments are only allowed at the start of a file")
                        .with_code(codes::DANGLING_DOC_COMMENT)
                        .with_help("use `///` to document the item that follows");
                }
                _ => return (docs, range),
            }
            self.advance();
        }
    }

    fn declaration(&mut self) -> Option<DeclId> {
        let (docs, docs_range) = self.doc_comments();
        let attribute = if self.check_punct(PunctuationId::Hash) {
            Some(self.attribute())
        } else {
            None
        };

        let token = self.peek();
        if let Some(info) = foreign::lookup(token.text).filter(|_| matches!(token.kind, TokenKind::Ident)) {
            self.skip_foreign_construct(info);
            return None;
        }

        let parsed = match &token.kind {
            TokenKind::Keyword(KeywordId::Import) => self.import_decl(),
            TokenKind::Keyword(KeywordId::Extern) if self.peek_at(1).kind.is_keyword(KeywordId::Type) => {
                self.extern_type_decl()
            }
            TokenKind::Keyword(KeywordId::Extern) => {
                let behavior = attribute.and_then(|(behavior, _)| behavior);
                let parsed = self.extern_decl(behavior);
                return self.finish_decl(parsed, docs, attribute.map(|(_, range)| range));
            }
            TokenKind::Keyword(KeywordId::Type) => self.type_alias_decl(),
            TokenKind::Keyword(KeywordId::Var) => self.global_var_decl(),
            TokenKind::Keyword(KeywordId::Const) => self.global_const_decl(),
            TokenKind::Keyword(KeywordId::Tree) => self.tree_decl(),
            TokenKind::Eof => {
                if attribute.is_none() {
                    self.report_dangling_docs(docs_range);
                } else {
                    self.error_expected("an `extern` declaration after the attribute", None);
                }
                return None;
            }
            _ => {
                self.error_expected(
                    "a declaration",
                    Some("top-level items are `import`, `extern`, `type`, `var`, `const` and `tree`"),
                );
                self.synchronize(RecoverySet::BOUNDARY);
                return None;
            }
        };

        if let Some((_, range)) = attribute {
            self.diagnostics
                .report_error(range, "attributes are only allowed on `extern` node declarations")
                .with_code(codes::UNKNOWN_ATTRIBUTE)
                .with_label("not allowed here");
        }
        self.finish_decl(parsed, docs, None)
    }

    fn finish_decl(
        &mut self,
        parsed: Option<(DeclKind, SourceRange)>,
        docs: Vec<String>,
        attribute_range: Option<SourceRange>,
    ) -> Option<DeclId> {
        let (kind, range) = parsed?;
        let range = attribute_range.map_or(range, |attr| attr.merge(range));
        Some(self.arena.alloc_decl(Decl { kind, docs, range }))
    }

    /// Give up on the current declaration: skip to the next boundary and eat a trailing `;`.
    fn abandon_decl<T>(&mut self) -> Option<T> {
        self.synchronize(RecoverySet::TOP);
        self.match_punct(PunctuationId::Semi);
        None
    }

    /// `import "path";`
    fn import_decl(&mut self) -> Option<(DeclKind, SourceRange)> {
        let start = self.advance().range;
        let token = self.peek();
        let TokenKind::String(path) = &token.kind else {
            self.error_expected(
                "an import path string after `import`",
                Some("write imports as `import \"./other.bt\";`"),
            );
            return self.abandon_decl();
        };
        self.advance();
        let path = self.arena.intern(path);
        self.expect_semi("after import", RecoverySet::TOP);
        let decl = ImportDecl {
            path,
            path_range: token.range,
        };
        Some((DeclKind::Import(decl), self.range_since(start)))
    }

    /// `extern action Name(ports);`
    fn extern_decl(&mut self, behavior: Option<BehaviorAttr>) -> Option<(DeclKind, SourceRange)> {
        let start = self.advance().range;
        let Some(category) = self.peek().keyword_id().and_then(category_for) else {
            self.error_expected(
                "a node category after `extern`",
                Some("expected `action`, `condition`, `control`, `decorator`, `subtree` or `type`"),
            );
            return self.abandon_decl();
        };
        self.advance();

        let recovery = RecoverySet::TOP.with(RecoverySet::LBRACE);
        let Some(name) = self.expect_ident("a node name", recovery) else {
            return self.abandon_decl();
        };

        let mut ports = Vec::new();
        if self.expect_punct(PunctuationId::LParen, "after the node name", recovery).is_some() {
            ports = self.param_list("port");
        }
        self.expect_semi("after extern declaration", RecoverySet::TOP);

        let decl = ExternDecl {
            category,
            name,
            ports,
            behavior,
        };
        Some((DeclKind::Extern(decl), self.range_since(start)))
    }

    /// `extern type Name;`
    fn extern_type_decl(&mut self) -> Option<(DeclKind, SourceRange)> {
        let start = self.advance().range;
        self.advance();
        let Some(name) = self.expect_ident("a type name", RecoverySet::TOP) else {
            return self.abandon_decl();
        };
        self.expect_semi("after extern type declaration", RecoverySet::TOP);
        Some((DeclKind::ExternType { name }, self.range_since(start)))
    }

    /// `type Name = Type;`
    fn type_alias_decl(&mut self) -> Option<(DeclKind, SourceRange)> {
        let start = self.advance().range;
        let Some(name) = self.expect_ident("a type name", RecoverySet::TOP) else {
            return self.abandon_decl();
        };
        let ty = if self.expect_op(OperatorId::Eq, "in type alias", RecoverySet::TOP).is_some() {
            self.parse_type()
        } else {
            self.missing_type()
        };
        self.expect_semi("after type alias", RecoverySet::TOP);
        Some((DeclKind::TypeAlias { name, ty }, self.range_since(start)))
    }

    /// `var name[: Type][= init];` at module level.
    fn global_var_decl(&mut self) -> Option<(DeclKind, SourceRange)> {
        let start = self.peek().range;
        let (name, ty, init) = self.var_parts(RecoverySet::TOP)?;
        Some((DeclKind::GlobalVar { name, ty, init }, self.range_since(start)))
    }

    /// `const NAME[: Type] = value;` at module level.
    fn global_const_decl(&mut self) -> Option<(DeclKind, SourceRange)> {
        let start = self.peek().range;
        let (name, ty, value) = self.const_parts(RecoverySet::TOP)?;
        Some((DeclKind::GlobalConst { name, ty, value }, self.range_since(start)))
    }

    /// Shared by global and local `var`: name, optional type, optional initializer, `;`.
    fn var_parts(&mut self, recovery: RecoverySet) -> Option<(Ident, Option<TypeId>, Option<ExprId>)> {
        self.advance();
        let Some(name) = self.expect_ident("a variable name", recovery) else {
            self.match_punct(PunctuationId::Semi);
            return None;
        };
        let ty = self.match_punct(PunctuationId::Colon).then(|| self.parse_type());
        let init = self.match_op(OperatorId::Eq).then(|| self.expression());
        self.expect_semi("after variable declaration", recovery);
        Some((name, ty, init))
    }

    /// Shared by global and local `const`. A missing value becomes a `Missing` expression.
    fn const_parts(&mut self, recovery: RecoverySet) -> Option<(Ident, Option<TypeId>, ExprId)> {
        self.advance();
        let Some(name) = self.expect_ident("a constant name", recovery) else {
            self.match_punct(PunctuationId::Semi);
            return None;
        };
        let ty = self.match_punct(PunctuationId::Colon).then(|| self.parse_type());
        let value = if self.expect_op(OperatorId::Eq, "in constant declaration", recovery).is_some() {
            self.expression()
        } else {
            self.missing_expr()
        };
        self.expect_semi("after constant declaration", recovery);
        Some((name, ty, value))
    }

    /// `tree Name(params) { body }`
    fn tree_decl(&mut self) -> Option<(DeclKind, SourceRange)> {
        let start = self.advance().range;
        let recovery = RecoverySet::TOP.with(RecoverySet::LBRACE);
        let Some(name) = self.expect_ident("a tree name", recovery) else {
            if self.check_punct(PunctuationId::LBrace) {
                self.skip_balanced();
            }
            return None;
        };

        let mut params = Vec::new();
        if self.expect_punct(PunctuationId::LParen, "after the tree name", recovery).is_some() {
            params = self.param_list("parameter");
        }

        let body = if self.check_punct(PunctuationId::LBrace) {
            self.block()
        } else {
            self.classify_missing("`{`", "to start the tree body", None);
            self.synchronize(RecoverySet::TOP);
            Vec::new()
        };

        let decl = TreeDecl { name, params, body };
        Some((DeclKind::Tree(decl), self.range_since(start)))
    }

    /// Comma-separated `[docs] [direction] name: Type [= default]` entries, through the closing `)`.
    fn param_list(&mut self, what: &str) -> Vec<Param> {
        let recovery = RecoverySet::COMMA
            .with(RecoverySet::RPAREN)
            .with(RecoverySet::LBRACE)
            .with(RecoverySet::TOP);
        let close = format!("to close the {what} list");
        let mut params = Vec::new();

        loop {
            if self.match_punct(PunctuationId::RParen) {
                break;
            }
            if self.is_at_end() || self.starts_construct_on_new_line(false) {
                self.report_unclosed_list(&close);
                break;
            }

            let (docs, _) = self.doc_comments();
            let start = self.peek().range;
            let direction = self.direction();
            if let Some(name) = self.expect_ident(&format!("a {what} name"), recovery) {
                let context = format!("after {what} name `{}`", self.arena.resolve(name.name));
                let ty = if self.expect_punct(PunctuationId::Colon, &context, recovery).is_some() {
                    self.parse_type()
                } else {
                    self.missing_type()
                };
                let default = self.match_op(OperatorId::Eq).then(|| self.expression());
                params.push(Param {
                    docs,
                    direction,
                    name,
                    ty,
                    default,
                    range: self.range_since(start),
                });
            }

            if self.match_punct(PunctuationId::Comma) {
                continue;
            }
            if self.match_punct(PunctuationId::RParen) {
                break;
            }
            if self.is_at_end() || self.starts_construct_on_new_line(false) {
                self.report_unclosed_list(&close);
                break;
            }
            self.error_expected(&format!("`,` or `)` in {what} list"), None);
            self.synchronize(recovery);
            if !self.match_punct(PunctuationId::Comma) {
                self.match_punct(PunctuationId::RParen);
                break;
            }
        }
        params
    }

    /// `#[behavior(DataPolicy[, FlowPolicy])]`
    ///
    /// Returns the parsed attribute (if valid) and the attribute's full range.
    fn attribute(&mut self) -> (Option<BehaviorAttr>, SourceRange) {
        let start = self.advance().range;
        let recovery = RecoverySet::RBRACKET.with(RecoverySet::TOP);
        let behavior = self.attribute_body(recovery);
        if !self.match_punct(PunctuationId::RBracket) {
            self.expect_punct(PunctuationId::RBracket, "to close the attribute", recovery);
        }
        let range = self.range_since(start);
        (behavior.map(|(data, flow)| BehaviorAttr { data, flow, range }), range)
    }

    fn attribute_body(&mut self, recovery: RecoverySet) -> Option<(DataPolicy, FlowPolicy)> {
        self.expect_punct(PunctuationId::LBracket, "after `#`", recovery)?;
        let name = self.expect_ident("an attribute name", recovery)?;
        if self.arena.resolve(name.name) != policies::BEHAVIOR_ATTRIBUTE {
            let message = format!("unknown attribute `{}`", self.arena.resolve(name.name));
            self.diagnostics
                .report_error(name.range, message)
                .with_code(codes::UNKNOWN_ATTRIBUTE)
                .with_label("unknown attribute")
                .with_help("the only supported attribute is `#[behavior(DataPolicy, FlowPolicy)]`");
            self.synchronize(recovery);
            return None;
        }

        let inner = recovery.with(RecoverySet::RPAREN);
        self.expect_punct(PunctuationId::LParen, "after `behavior`", recovery)?;
        let data = self.policy_name("data policy", "`All`, `Any` or `None`", inner, policies::data_policy_from_str);
        let flow = if self.match_punct(PunctuationId::Comma) {
            self.policy_name("flow policy", "`Chained` or `Isolated`", inner, policies::flow_policy_from_str)
        } else {
            Some(policies::DEFAULT_FLOW_POLICY)
        };
        self.expect_punct(PunctuationId::RParen, "to close the behavior attribute", recovery);
        Some((data?, flow?))
    }

    fn policy_name<T>(
        &mut self,
        what: &str,
        choices: &str,
        recovery: RecoverySet,
        from_str: fn(&str) -> Option<T>,
    ) -> Option<T> {
        let name = self.expect_ident(&format!("a {what}"), recovery)?;
        let text = self.arena.resolve(name.name);
        let policy = from_str(text);
        if policy.is_none() {
            let message = format!("unknown {what} `{text}`");
            self.diagnostics
                .report_error(name.range, message)
                .with_code(codes::UNKNOWN_ATTRIBUTE)
                .with_label(format!("not a {what}"))
                .with_help(format!("expected {choices}"));
        }
        policy
    }
}
