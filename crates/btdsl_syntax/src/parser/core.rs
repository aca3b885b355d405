/// Parser state.
///
/// ## Notes
/// - The parser is single-pass. It never fails: errors go to the diagnostic bag and recovery
///   (see `recovery.rs`) resynchronizes at a statement or declaration boundary.
/// - `tokens` always ends with [`TokenKind::Eof`]; lookahead past the end keeps returning it.
/// - At most one syntax error is reported per token position, which keeps a single root cause
///   from producing a cascade.
struct Parser<'a, 'src> {
    tokens: &'a [Token<'src>],
    pos: usize,
    file: FileId,
    arena: &'a mut AstArena,
    diagnostics: &'a mut DiagnosticBag,
    /// Token index of the last reported syntax error.
    last_error_at: Option<usize>,
}

impl<'a, 'src> Parser<'a, 'src> {
    /// Create a parser over an `Eof`-terminated token stream.
    fn new(tokens: &'a [Token<'src>], file: FileId, arena: &'a mut AstArena, diagnostics: &'a mut DiagnosticBag) -> Self {
        debug_assert!(matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof));
        Self {
            tokens,
            pos: 0,
            file,
            arena,
            diagnostics,
            last_error_at: None,
        }
    }

    /// Parse the whole token stream.
    fn parse_program(mut self) -> Program {
        let docs = self.module_docs();
        let mut decls = Vec::new();

        while !self.is_at_end() {
            let before = self.pos;
            if let Some(decl) = self.declaration() {
                decls.push(decl);
            }
            // Every path consumes something on valid input; this guards the error paths.
            if self.pos == before {
                self.advance();
            }
        }

        let end = self.peek().range.end;
        Program {
            file: self.file,
            docs,
            decls,
            range: SourceRange::new(self.file, 0, end),
        }
    }
}
