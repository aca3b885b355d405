#![no_main]

use btdsl_syntax::ast::AstArena;
use btdsl_syntax::diagnostics::DiagnosticBag;
use btdsl_syntax::source::SourceManager;
use btdsl_syntax::{lexer, parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Lexer and parser must accept any UTF-8 input without panicking
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut sources = SourceManager::new();
    let file = sources.add_file("fuzz.bt", text);

    let mut bag = DiagnosticBag::new();
    let tokens = lexer::lex_all(text, file, &mut bag);
    assert!(tokens.iter().all(|t| t.range.end <= text.len()));

    let mut arena = AstArena::new();
    let mut bag = DiagnosticBag::new();
    let _ = parser::parse_source(text, file, &mut arena, &mut bag);
});
