/// Type parsing.
///
/// ```text
/// Type := ( Name | "_" | "string" ["<" Int ">"] | "vec" "<" Type ">"
///         | "[" Type ";" Expr "]" | "[" Type ";" "<=" Expr "]" ) ["?"]
/// ```
impl<'a, 'src> Parser<'a, 'src> {
    fn parse_type(&mut self) -> TypeId {
        let token = self.peek();
        let start = token.range;
        let kind = match &token.kind {
            TokenKind::Infer => {
                self.advance();
                TypeKind::Infer
            }
            TokenKind::Ident => {
                self.advance();
                TypeKind::Named(self.ident_from(token))
            }
            TokenKind::Keyword(KeywordId::String) => {
                self.advance();
                let max_len = if self.match_op(OperatorId::Lt) { self.string_bound() } else { None };
                TypeKind::String { max_len }
            }
            TokenKind::Keyword(KeywordId::Vec) => {
                self.advance();
                if self.expect_op(OperatorId::Lt, "after `vec` in a type", RecoverySet::TYPE).is_some() {
                    let elem = self.parse_type();
                    self.expect_op(OperatorId::Gt, "to close `vec<T>`", RecoverySet::TYPE);
                    TypeKind::Vec(elem)
                } else {
                    TypeKind::Missing
                }
            }
            TokenKind::Punctuation(PunctuationId::LBracket) => {
                self.advance();
                self.array_type()
            }
            _ => {
                self.error_expected("a type", None);
                return self.missing_type();
            }
        };

        let mut ty = self.arena.alloc_type(TypeNode {
            kind,
            range: self.range_since(start),
        });
        if self.match_punct(PunctuationId::Question) {
            ty = self.arena.alloc_type(TypeNode {
                kind: TypeKind::Nullable(ty),
                range: self.range_since(start),
            });
        }
        ty
    }

    /// `N>` after `string<`.
    fn string_bound(&mut self) -> Option<u64> {
        let max_len = match self.peek().kind {
            TokenKind::Int(value) => {
                self.advance();
                u64::try_from(value).ok()
            }
            _ => {
                self.error_expected("a maximum length in `string<N>`", None);
                None
            }
        };
        self.expect_op(OperatorId::Gt, "to close `string<N>`", RecoverySet::TYPE);
        max_len
    }

    /// `T; N]` or `T; <=N]` after `[`.
    fn array_type(&mut self) -> TypeKind {
        let recovery = RecoverySet::RBRACKET.with(RecoverySet::STMT);
        let elem = self.parse_type();
        if self.expect_punct(PunctuationId::Semi, "after the array element type", recovery).is_none() {
            self.match_punct(PunctuationId::RBracket);
            return TypeKind::Missing;
        }
        let bounded = self.match_op(OperatorId::LtEq);
        let len = self.expression();
        self.expect_punct(PunctuationId::RBracket, "to close the array type", recovery);
        if bounded {
            TypeKind::BoundedArray { elem, max_len: len }
        } else {
            TypeKind::StaticArray { elem, len }
        }
    }
}
