/// Parse a token stream into a [`Program`].
///
/// This is the main public entrypoint for parsing. It never fails: syntax errors are reported into
/// `diagnostics` and the returned tree stays structurally complete.
///
/// ## Parameters
/// - `tokens`: token stream from [`lexer::lex_all`]. An `Eof` token is appended if missing.
/// - `file`: file the tokens came from; every range in the tree refers to it.
#[tracing::instrument(skip_all, fields(file = ?file, token_count = tokens.len()))]
pub fn parse_program(
    tokens: &[Token<'_>],
    file: FileId,
    arena: &mut AstArena,
    diagnostics: &mut DiagnosticBag,
) -> Program {
    let tokens: Cow<'_, [Token<'_>]> = match tokens.last() {
        Some(last) if last.kind == TokenKind::Eof => Cow::Borrowed(tokens),
        _ => {
            let end = tokens.last().map_or(0, |t| t.range.end);
            let mut owned = tokens.to_vec();
            owned.push(Token::new(TokenKind::Eof, "", SourceRange::empty_at(file, end)));
            Cow::Owned(owned)
        }
    };
    Parser::new(&tokens, file, arena, diagnostics).parse_program()
}

/// Lex and parse `source` in one step.
pub fn parse_source(source: &str, file: FileId, arena: &mut AstArena, diagnostics: &mut DiagnosticBag) -> Program {
    let tokens = lexer::lex_all(source, file, diagnostics);
    parse_program(&tokens, file, arena, diagnostics)
}
