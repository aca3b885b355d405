//! Property-based tests for the BT-DSL front-end
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use btdsl::ast::visit::{self, Visitor};
use btdsl::ast::{AstArena, DeclId, ExprId, StmtId, TypeId};
use btdsl::diagnostics::DiagnosticBag;
use btdsl::lexer::{self, TokenKind};
use btdsl::parser;
use btdsl::source::{SourceManager, SourceRange};
use proptest::prelude::*;

// =============================================================================
// Lexer Properties
// =============================================================================

mod lexer_tests {
    use super::*;

    proptest! {
        /// Property: any input lexes to ordered, in-bounds tokens ending in a single `Eof`
        #[test]
        fn lexer_is_total(src in "\\PC{0,200}") {
            let mut sources = SourceManager::new();
            let file = sources.add_file("p.bt", src.as_str());
            let mut bag = DiagnosticBag::new();
            let tokens = lexer::lex_all(&src, file, &mut bag);

            prop_assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
            prop_assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);

            let mut previous_end = 0;
            for token in &tokens {
                prop_assert!(token.range.start >= previous_end);
                prop_assert!(token.range.start <= token.range.end);
                prop_assert!(token.range.end <= src.len());
                prop_assert_eq!(src.get(token.range.start..token.range.end), Some(token.text));
                previous_end = token.range.end;
            }
        }

        /// Property: ASCII soup full of delimiters and quotes still lexes with diagnostics in bounds
        #[test]
        fn lexer_diagnostics_stay_in_bounds(src in "[a-z0-9 \"'\\\\/*@#(){};:=<>!&|.\n]{0,120}") {
            let mut sources = SourceManager::new();
            let file = sources.add_file("p.bt", src.as_str());
            let mut bag = DiagnosticBag::new();
            let _ = lexer::lex_all(&src, file, &mut bag);
            for diagnostic in bag.iter() {
                let range = diagnostic.primary_range();
                prop_assert!(range.end <= src.len(), "{:?}", diagnostic);
            }
        }
    }
}

// =============================================================================
// Parser Properties
// =============================================================================

/// Checks that every node's range lies within its parent's and is non-empty.
struct NestingCheck {
    parents: Vec<SourceRange>,
    source_len: usize,
    violations: Vec<String>,
}

impl NestingCheck {
    fn enter(&mut self, what: &str, range: SourceRange) {
        if range.is_empty() || range.end > self.source_len {
            self.violations.push(format!("{what} has a bad range {range:?}"));
        }
        if let Some(parent) = self.parents.last() {
            if !parent.covers(&range) {
                self.violations.push(format!("{what} {range:?} escapes its parent {parent:?}"));
            }
        }
        self.parents.push(range);
    }
}

impl Visitor for NestingCheck {
    fn visit_decl(&mut self, arena: &AstArena, id: DeclId) {
        self.enter("declaration", arena.decl(id).range);
        visit::walk_decl(self, arena, id);
        self.parents.pop();
    }

    fn visit_stmt(&mut self, arena: &AstArena, id: StmtId) {
        self.enter("statement", arena.stmt_range(id));
        visit::walk_stmt(self, arena, id);
        self.parents.pop();
    }

    fn visit_expr(&mut self, arena: &AstArena, id: ExprId) {
        self.enter("expression", arena.expr_range(id));
        visit::walk_expr(self, arena, id);
        self.parents.pop();
    }

    fn visit_type(&mut self, arena: &AstArena, id: TypeId) {
        self.enter("type", arena.type_range(id));
        visit::walk_type(self, arena, id);
        self.parents.pop();
    }
}

fn expr_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (0i64..1000).prop_map(|n| n.to_string()),
        "x_[a-z0-9]{0,5}",
        Just("true".to_string()),
        Just("\"text\"".to_string()),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} + {b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("({a}) * {b}")),
            inner.clone().prop_map(|a| format!("-({a})")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("[{a}, {b}]")),
        ]
    })
}

fn stmt_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        ("[A-Z][a-zA-Z0-9]{0,6}", "x_[a-z0-9]{0,5}", expr_strategy())
            .prop_map(|(node, port, value)| format!("    {node}({port}: {value});")),
        ("x_[a-z0-9]{0,5}", expr_strategy()).prop_map(|(name, value)| format!("    var {name} = {value};")),
        ("[A-Z][a-zA-Z0-9]{0,6}", "[A-Z][a-zA-Z0-9]{0,6}")
            .prop_map(|(outer, inner)| format!("    {outer} {{\n        {inner}();\n    }}")),
    ]
}

fn program_strategy() -> impl Strategy<Value = String> {
    (
        "[A-Z][a-zA-Z0-9]{0,6}",
        prop::collection::vec(stmt_strategy(), 0..6),
        prop::option::of(expr_strategy()),
    )
        .prop_map(|(tree, body, global)| {
            let mut src = String::new();
            if let Some(init) = global {
                src.push_str(&format!("var x_global: int32 = {init};\n"));
            }
            src.push_str("extern action Probe(in value: int32, out result: vec<int32>);\n");
            src.push_str(&format!("tree {tree}(in limit: int32) {{\n"));
            for stmt in body {
                src.push_str(&stmt);
                src.push('\n');
            }
            src.push_str("}\n");
            src
        })
}

mod parser_tests {
    use super::*;

    proptest! {
        /// Property: well-formed programs parse cleanly with properly nested ranges
        #[test]
        fn ranges_nest_in_valid_programs(src in program_strategy()) {
            let mut sources = SourceManager::new();
            let file = sources.add_file("p.bt", src.as_str());
            let mut arena = AstArena::new();
            let mut bag = DiagnosticBag::new();
            let program = parser::parse_source(&src, file, &mut arena, &mut bag);
            prop_assert!(bag.is_empty(), "{:?}\n{}", bag, src);

            let mut check = NestingCheck {
                parents: vec![program.range],
                source_len: src.len(),
                violations: Vec::new(),
            };
            visit::walk_program(&mut check, &arena, &program);
            prop_assert!(check.violations.is_empty(), "{:?}\n{}", check.violations, src);
        }

        /// Property: the parser never panics and always returns within the source
        #[test]
        fn parser_accepts_any_input(src in "[a-zA-Z0-9_ (){}\\[\\];:,=<>!&|+*/@#\"\n-]{0,160}") {
            let mut sources = SourceManager::new();
            let file = sources.add_file("p.bt", src.as_str());
            let mut arena = AstArena::new();
            let mut bag = DiagnosticBag::new();
            let program = parser::parse_source(&src, file, &mut arena, &mut bag);
            prop_assert!(program.range.end <= src.len());
            for diagnostic in bag.iter() {
                prop_assert!(diagnostic.primary_range().end <= src.len(), "{:?}", diagnostic);
            }
        }
    }
}
