/// Expression parsing.
///
/// Binary operators use precedence climbing driven by the operator registry
/// (`btdsl_core::lang::operators`). Unary operators bind tighter than any binary operator, and
/// postfix indexing / `as` casts bind tighter still.
///
/// ## Notes
/// - Equality and comparison operators are non-associative: `a < b < c` parses as `(a < b) < c`
///   but reports one error per chain.
impl<'a, 'src> Parser<'a, 'src> {
    fn expression(&mut self) -> ExprId {
        self.binary_expr(1)
    }

    fn binary_expr(&mut self, min_precedence: u8) -> ExprId {
        let mut lhs = self.unary_expr();
        let mut chain_reported = false;

        while let Some(id) = self.peek().operator_id() {
            let Some(op) = binary_op_for(id) else {
                break;
            };
            let info = operators::info_for(id);
            if info.precedence < min_precedence {
                break;
            }
            let op_range = self.advance().range;
            let rhs = self.binary_expr(info.precedence + 1);
            let range = self.arena.expr_range(lhs).merge(self.arena.expr_range(rhs));
            lhs = self.arena.alloc_expr(Expr {
                kind: ExprKind::Binary { op, lhs, rhs },
                range,
            });

            if info.associativity == Associativity::None && !chain_reported && self.continues_chain(info.precedence) {
                chain_reported = true;
                let next = self.peek().range;
                self.diagnostics
                    .report_error(next, "comparison operators cannot be chained")
                    .with_code(codes::NON_ASSOCIATIVE_CHAIN)
                    .with_label("second operator of the chain")
                    .with_secondary(op_range, "first operator")
                    .with_help("use parentheses and `&&` to spell out the intent, e.g. `(a < b) && (b < c)`");
            }
        }
        lhs
    }

    /// The next token is a binary operator at the same (non-associative) level.
    fn continues_chain(&self, precedence: u8) -> bool {
        self.peek()
            .operator_id()
            .filter(|id| binary_op_for(*id).is_some())
            .is_some_and(|id| operators::info_for(id).precedence == precedence)
    }

    fn unary_expr(&mut self) -> ExprId {
        let op = if self.check_op(OperatorId::Bang) {
            UnaryOp::Not
        } else if self.check_op(OperatorId::Minus) {
            UnaryOp::Neg
        } else {
            return self.postfix_expr();
        };
        let start = self.advance().range;
        let operand = self.unary_expr();
        let range = start.merge(self.arena.expr_range(operand));
        self.arena.alloc_expr(Expr {
            kind: ExprKind::Unary { op, operand },
            range,
        })
    }

    /// Indexing `e[i]` and casts `e as T`.
    fn postfix_expr(&mut self) -> ExprId {
        let mut expr = self.primary_expr();
        loop {
            let start = self.arena.expr_range(expr);
            let kind = if self.match_punct(PunctuationId::LBracket) {
                let index = self.expression();
                self.expect_punct(
                    PunctuationId::RBracket,
                    "to close the index",
                    RecoverySet::RBRACKET.with(RecoverySet::STMT),
                );
                ExprKind::Index { base: expr, index }
            } else if self.check_keyword(KeywordId::As) {
                self.advance();
                let ty = self.parse_type();
                ExprKind::Cast { expr, ty }
            } else {
                return expr;
            };
            expr = self.arena.alloc_expr(Expr {
                kind,
                range: self.range_since(start),
            });
        }
    }

    fn primary_expr(&mut self) -> ExprId {
        let token = self.peek();
        let kind = match &token.kind {
            TokenKind::Int(value) => ExprKind::Int(*value),
            TokenKind::Float(value) => ExprKind::Float(*value),
            TokenKind::String(value) => ExprKind::String(self.arena.intern(value)),
            TokenKind::Keyword(KeywordId::True) => ExprKind::Bool(true),
            TokenKind::Keyword(KeywordId::False) => ExprKind::Bool(false),
            TokenKind::Keyword(KeywordId::Null) => ExprKind::Null,
            TokenKind::Ident => ExprKind::VarRef(self.ident_from(token)),
            TokenKind::Punctuation(PunctuationId::LParen) => return self.paren_expr(),
            TokenKind::Punctuation(PunctuationId::LBracket) => return self.array_expr(),
            TokenKind::Keyword(KeywordId::Vec) => return self.vec_macro(),
            // Already reported by the lexer.
            TokenKind::Error => {
                let missing = self.missing_expr();
                self.advance();
                return missing;
            }
            _ => {
                self.error_expected("an expression", None);
                return self.missing_expr();
            }
        };
        self.advance();
        self.arena.alloc_expr(Expr {
            kind,
            range: token.range,
        })
    }

    /// `( expr )`. The inner expression's range is widened to cover the parentheses.
    fn paren_expr(&mut self) -> ExprId {
        let start = self.advance().range;
        let inner = self.expression();
        self.expect_punct(
            PunctuationId::RParen,
            "to close the parenthesized expression",
            RecoverySet::RPAREN.with(RecoverySet::STMT),
        );
        let range = self.range_since(start);
        self.arena.set_expr_range(inner, range);
        inner
    }

    /// `[a, b, c]` or `[value; count]`. The current token must be `[`.
    fn array_expr(&mut self) -> ExprId {
        let start = self.advance().range;
        let recovery = RecoverySet::RBRACKET.with(RecoverySet::STMT);

        let kind = if self.match_punct(PunctuationId::RBracket) {
            ExprKind::ArrayLit(Vec::new())
        } else {
            let first = self.expression();
            if self.match_punct(PunctuationId::Semi) {
                let count = self.expression();
                self.expect_punct(PunctuationId::RBracket, "to close the array", recovery);
                ExprKind::ArrayRepeat { value: first, count }
            } else {
                let mut elems = vec![first];
                while self.match_punct(PunctuationId::Comma) {
                    if self.check_punct(PunctuationId::RBracket) {
                        break;
                    }
                    elems.push(self.expression());
                }
                self.expect_punct(PunctuationId::RBracket, "to close the array", recovery);
                ExprKind::ArrayLit(elems)
            }
        };
        self.arena.alloc_expr(Expr {
            kind,
            range: self.range_since(start),
        })
    }

    /// `vec![...]`
    fn vec_macro(&mut self) -> ExprId {
        let start = self.advance().range;
        if !self.match_op(OperatorId::Bang) {
            self.error_expected("`!` after `vec`", Some("dynamic arrays are written `vec![a, b]` or `vec![value; count]`"));
            return self.missing_expr();
        }
        if !self.check_punct(PunctuationId::LBracket) {
            self.error_expected("`[` after `vec!`", None);
            return self.missing_expr();
        }
        let inner = self.array_expr();
        self.arena.alloc_expr(Expr {
            kind: ExprKind::VecMacro(inner),
            range: self.range_since(start),
        })
    }
}
