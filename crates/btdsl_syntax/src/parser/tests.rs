#[cfg(test)]
/// Parser unit tests.
///
/// These focus on the shape of specific syntactic forms and on error recovery (one root cause,
/// one diagnostic).
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::source::SourceManager;
    use btdsl_core::lang::policies::PreconditionKind;

    struct Parsed {
        sources: SourceManager,
        arena: AstArena,
        bag: DiagnosticBag,
        program: Program,
    }

    impl Parsed {
        fn decl(&self, index: usize) -> &DeclKind {
            &self.arena.decl(self.program.decls[index]).kind
        }

        fn tree_body(&self, index: usize) -> &[StmtId] {
            match self.decl(index) {
                DeclKind::Tree(tree) => &tree.body,
                other => panic!("expected tree, got {other:?}"),
            }
        }

        fn node(&self, stmt: StmtId) -> &NodeStmt {
            match &self.arena.stmt(stmt).kind {
                StmtKind::Node(node) => node,
                other => panic!("expected node statement, got {other:?}"),
            }
        }

        fn name(&self, ident: &Ident) -> &str {
            self.arena.resolve(ident.name)
        }

        fn errors(&self) -> Vec<&str> {
            self.bag
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .map(|d| d.message.as_str())
                .collect()
        }

        fn line_of_first(&self) -> usize {
            let diag = self.bag.iter().next().expect("a diagnostic");
            let range = diag.primary_range();
            self.sources.line_col(range.file, range.start).0
        }
    }

    fn parse(source: &str) -> Parsed {
        let mut sources = SourceManager::new();
        let file = sources.add_file("main.bt", source);
        let mut arena = AstArena::new();
        let mut bag = DiagnosticBag::new();
        let program = parse_source(sources.text(file), file, &mut arena, &mut bag);
        Parsed {
            sources,
            arena,
            bag,
            program,
        }
    }

    #[test]
    fn parses_every_declaration_kind() {
        let p = parse(
            r#"//! Patrol behavior.
import "./nodes.bt";
/// Moves the robot.
#[behavior(Any, Isolated)]
extern action MoveTo(in target: Pose, out reached: bool = false);
extern type Pose;
type Path = vec<Pose>;
var battery: float = 1.0;
const MAX_RETRIES = 3;
tree Main(ref goal: Pose) {
    Sequence {
        MoveTo(target: goal);
    }
}
"#,
        );
        assert!(p.bag.is_empty(), "{:?}", p.bag.iter().collect::<Vec<_>>());
        assert_eq!(p.program.docs, vec!["Patrol behavior.".to_string()]);
        assert_eq!(p.program.decls.len(), 7);

        match p.decl(0) {
            DeclKind::Import(import) => assert_eq!(p.arena.resolve(import.path), "./nodes.bt"),
            other => panic!("expected import, got {other:?}"),
        }
        match p.decl(1) {
            DeclKind::Extern(ext) => {
                assert_eq!(ext.category, NodeCategory::Action);
                assert_eq!(p.name(&ext.name), "MoveTo");
                assert_eq!(ext.ports.len(), 2);
                assert_eq!(ext.ports[0].direction, Some(PortDirection::In));
                assert_eq!(ext.ports[1].direction, Some(PortDirection::Out));
                assert!(ext.ports[1].default.is_some());
                let behavior = ext.behavior.expect("behavior attribute");
                assert_eq!(behavior.data, DataPolicy::Any);
                assert_eq!(behavior.flow, FlowPolicy::Isolated);
            }
            other => panic!("expected extern, got {other:?}"),
        }
        let decl = p.arena.decl(p.program.decls[1]);
        assert_eq!(decl.docs, vec!["Moves the robot.".to_string()]);
        assert!(matches!(p.decl(2), DeclKind::ExternType { .. }));
        assert!(matches!(p.decl(3), DeclKind::TypeAlias { .. }));
        assert!(matches!(p.decl(4), DeclKind::GlobalVar { ty: Some(_), init: Some(_), .. }));
        assert!(matches!(p.decl(5), DeclKind::GlobalConst { ty: None, .. }));
        match p.decl(6) {
            DeclKind::Tree(tree) => {
                assert_eq!(tree.params.len(), 1);
                assert_eq!(tree.params[0].direction, Some(PortDirection::Ref));
            }
            other => panic!("expected tree, got {other:?}"),
        }
    }

    #[test]
    fn behavior_flow_defaults_to_chained() {
        let p = parse("#[behavior(All)] extern control Fallback();");
        assert!(p.bag.is_empty());
        match p.decl(0) {
            DeclKind::Extern(ext) => {
                let behavior = ext.behavior.expect("behavior attribute");
                assert_eq!(behavior.flow, FlowPolicy::Chained);
                assert!(p.arena.decl(p.program.decls[0]).range.covers(&behavior.range));
            }
            other => panic!("expected extern, got {other:?}"),
        }
    }

    #[test]
    fn leaf_and_compound_node_shapes() {
        let p = parse("tree T() { Leaf(); Seq { A(); } Retry(n: 3) { B(); } }");
        assert!(p.bag.is_empty());
        let body = p.tree_body(0);
        assert_eq!(body.len(), 3);

        let leaf = p.node(body[0]);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.args.as_deref().map(<[_]>::len), Some(0));

        let seq = p.node(body[1]);
        assert!(seq.args.is_none());
        assert_eq!(seq.children.as_deref().map(<[_]>::len), Some(1));

        let retry = p.node(body[2]);
        let args = retry.args.as_deref().expect("args");
        assert_eq!(p.name(args[0].name.as_ref().expect("named")), "n");
        assert!(!retry.is_leaf());
    }

    #[test]
    fn semicolon_after_compound_block_is_rejected() {
        let p = parse("tree T() { Seq { A(); }; }");
        assert_eq!(p.errors(), vec!["unexpected `;` after a node block"]);
        let diag = p.bag.iter().next().expect("diagnostic");
        assert_eq!(diag.fixits.len(), 1);
        assert_eq!(diag.fixits[0].replacement, "");
    }

    #[test]
    fn missing_semicolon_on_later_line_reports_previous_line() {
        let p = parse("tree T() {\n  AlwaysSuccess()\n  AlwaysFailure();\n}\n");
        assert_eq!(p.bag.len(), 1);
        assert_eq!(p.line_of_first(), 2);
        let diag = p.bag.iter().next().expect("diagnostic");
        assert_eq!(diag.code.as_deref(), Some(codes::EXPECTED_TOKEN));
        assert_eq!(diag.fixits[0].replacement, ";");
        // Both statements survive.
        assert_eq!(p.tree_body(0).len(), 2);
    }

    #[test]
    fn missing_semicolon_on_same_line_points_at_next_token() {
        let p = parse("tree T() { A() B(); C(); }");
        assert_eq!(p.errors(), vec!["expected `;` after node call, found identifier `B`"]);
        assert_eq!(p.tree_body(0).len(), 2);
    }

    #[test]
    fn missing_closing_paren_is_one_diagnostic() {
        let p = parse("tree T() {\n  Wait(ms: 10;\n  Done();\n}\n");
        assert_eq!(p.bag.len(), 1, "{:?}", p.errors());
        assert_eq!(p.tree_body(0).len(), 2);
    }

    #[test]
    fn missing_closing_paren_before_next_line_is_inserted() {
        let p = parse("tree T() {\n  A(x: 1\n  B();\n}\n");
        assert_eq!(p.errors(), vec!["expected `)` to close the argument list"]);
        assert_eq!(p.line_of_first(), 2);
        let diag = p.bag.iter().next().expect("diagnostic");
        assert_eq!(diag.fixits[0].replacement, ")");
        assert_eq!(p.tree_body(0).len(), 2);
        assert_eq!(p.node(p.tree_body(0)[0]).args.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn trailing_comma_before_next_line_is_one_diagnostic() {
        let p = parse("tree T() {\n  A(x: 1,\n  B();\n}\n");
        assert_eq!(p.bag.len(), 1, "{:?}", p.errors());
        assert_eq!(p.line_of_first(), 2);
        assert_eq!(p.tree_body(0).len(), 2);
    }

    #[test]
    fn missing_paren_after_nested_group_is_one_diagnostic() {
        let p = parse("tree T() {\n  A(x: foo(1);\n  B();\n}\n");
        assert_eq!(p.bag.len(), 1, "{:?}", p.errors());
        assert_eq!(p.tree_body(0).len(), 2);
    }

    #[test]
    fn multi_line_arguments_still_parse() {
        let p = parse("tree T() {\n  A(\n    x: 1,\n    y: 2,\n  );\n}\n");
        assert!(p.bag.is_empty(), "{:?}", p.errors());
        assert_eq!(p.node(p.tree_body(0)[0]).args.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn unclosed_port_list_before_next_declaration_is_one_diagnostic() {
        let p = parse("extern action A(in x: int32\nextern action B();\n");
        assert_eq!(p.errors(), vec!["expected `)` to close the port list"]);
        assert_eq!(p.program.decls.len(), 2);
    }

    #[test]
    fn unclosed_parameter_list_before_body_is_one_diagnostic() {
        let p = parse("tree T(in x: int32 {\n  A();\n}\n");
        assert_eq!(p.bag.len(), 1, "{:?}", p.errors());
        assert_eq!(p.tree_body(0).len(), 1);
    }

    #[test]
    fn unbalanced_brackets_inside_foreign_block_are_skipped() {
        let p = parse("tree T() {\n  if x { Foo(; }\n  Baz();\n}\n");
        assert_eq!(p.bag.len(), 1, "{:?}", p.errors());
        assert_eq!(p.tree_body(0).len(), 1);

        let p = parse("tree T() {\n  if x { Foo(; Bar(]; }\n  Baz();\n}\n");
        assert_eq!(p.bag.len(), 1, "{:?}", p.errors());
        assert_eq!(p.tree_body(0).len(), 1);
    }

    #[test]
    fn unclosed_index_in_assignment_reports_the_bracket() {
        let p = parse("tree T() {\n  x[1 = 2;\n  A();\n}\n");
        assert_eq!(p.errors(), vec!["expected `]` to close the index, found `=`"]);
        assert_eq!(p.tree_body(0).len(), 2);
        assert!(matches!(
            &p.arena.stmt(p.tree_body(0)[0]).kind,
            StmtKind::Assignment { indices, .. } if indices.len() == 1
        ));
    }

    #[test]
    fn foreign_keywords_produce_a_single_targeted_error() {
        let p = parse("tree T() {\n  let x = 1;\n  if x { A(); } else if y { B(); } else { C(); }\n  D();\n}\n");
        let errors: Vec<_> = p.bag.iter().collect();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|d| d.code.as_deref() == Some(codes::UNSUPPORTED_KEYWORD)));
        assert!(errors[0].help.as_deref().is_some_and(|h| h.contains("var")));
        assert_eq!(p.tree_body(0).len(), 1);
    }

    #[test]
    fn foreign_definition_at_top_level_is_skipped() {
        let p = parse("fn main() { return 1; }\ntree T() { A(); }\n");
        assert_eq!(p.bag.len(), 1);
        assert_eq!(p.program.decls.len(), 1);
    }

    #[test]
    fn binary_precedence_follows_the_registry() {
        let p = parse("var x = a || b && c + 1 * 2;");
        assert!(p.bag.is_empty());
        let DeclKind::GlobalVar { init: Some(init), .. } = p.decl(0) else {
            panic!("expected var with initializer");
        };
        let ExprKind::Binary { op, rhs, .. } = &p.arena.expr(*init).kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Or);
        let ExprKind::Binary { op, rhs, .. } = &p.arena.expr(*rhs).kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::And);
        let ExprKind::Binary { op, rhs, .. } = &p.arena.expr(*rhs).kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(p.arena.expr(*rhs).kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn chained_comparison_reports_once() {
        let p = parse("var x = a < b < c < d;");
        let diags: Vec<_> = p.bag.iter().collect();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some(codes::NON_ASSOCIATIVE_CHAIN));
        assert!(diags[0].help.as_deref().is_some_and(|h| h.contains("parentheses")));
    }

    #[test]
    fn mixed_equality_and_comparison_is_allowed() {
        let p = parse("var x = a < b == c;");
        assert!(p.bag.is_empty());
    }

    #[test]
    fn parentheses_widen_the_inner_range() {
        let p = parse("var x = (a + b) * c;");
        let DeclKind::GlobalVar { init: Some(init), .. } = p.decl(0) else {
            panic!("expected var with initializer");
        };
        let ExprKind::Binary { lhs, .. } = &p.arena.expr(*init).kind else {
            panic!("expected binary");
        };
        assert_eq!(p.sources.slice(p.arena.expr_range(*lhs)), Some("(a + b)"));
        assert_eq!(p.sources.slice(p.arena.expr_range(*init)), Some("(a + b) * c"));
    }

    #[test]
    fn unary_postfix_and_cast() {
        let p = parse("var x = -items[0] as float32;");
        assert!(p.bag.is_empty());
        let DeclKind::GlobalVar { init: Some(init), .. } = p.decl(0) else {
            panic!("expected var with initializer");
        };
        let ExprKind::Unary { op: UnaryOp::Neg, operand } = &p.arena.expr(*init).kind else {
            panic!("expected negation");
        };
        let ExprKind::Cast { expr, .. } = &p.arena.expr(*operand).kind else {
            panic!("expected cast");
        };
        assert!(matches!(p.arena.expr(*expr).kind, ExprKind::Index { .. }));
    }

    #[test]
    fn array_literals_and_vec_macro() {
        let p = parse("var a = [1, 2, 3,];\nvar b = [0; 4];\nvar c = vec![];\n");
        assert!(p.bag.is_empty());
        let init = |i: usize| match p.decl(i) {
            DeclKind::GlobalVar { init: Some(init), .. } => &p.arena.expr(*init).kind,
            other => panic!("expected var, got {other:?}"),
        };
        assert!(matches!(init(0), ExprKind::ArrayLit(elems) if elems.len() == 3));
        assert!(matches!(init(1), ExprKind::ArrayRepeat { .. }));
        let ExprKind::VecMacro(inner) = init(2) else {
            panic!("expected vec macro");
        };
        assert!(matches!(&p.arena.expr(*inner).kind, ExprKind::ArrayLit(elems) if elems.is_empty()));
    }

    #[test]
    fn type_forms() {
        let p = parse("type A = [int32; <=4]?;\ntype B = vec<string<8>>;\ntype C = [bool; 3];\ntype D = _;\n");
        assert!(p.bag.is_empty(), "{:?}", p.errors());
        let ty = |i: usize| match p.decl(i) {
            DeclKind::TypeAlias { ty, .. } => &p.arena.ty(*ty).kind,
            other => panic!("expected alias, got {other:?}"),
        };
        let TypeKind::Nullable(inner) = ty(0) else {
            panic!("expected nullable");
        };
        assert!(matches!(p.arena.ty(*inner).kind, TypeKind::BoundedArray { .. }));
        let TypeKind::Vec(elem) = ty(1) else {
            panic!("expected vec");
        };
        assert_eq!(p.arena.ty(*elem).kind, TypeKind::String { max_len: Some(8) });
        assert!(matches!(ty(2), TypeKind::StaticArray { .. }));
        assert_eq!(*ty(3), TypeKind::Infer);
    }

    #[test]
    fn assignment_is_told_apart_from_node_calls() {
        let p = parse("tree T() { grid[1][2] += 3; Grid(); count = 0; }");
        assert!(p.bag.is_empty());
        let body = p.tree_body(0);
        match &p.arena.stmt(body[0]).kind {
            StmtKind::Assignment { indices, op, .. } => {
                assert_eq!(indices.len(), 2);
                assert_eq!(*op, AssignOp::Add);
            }
            other => panic!("expected assignment, got {other:?}"),
        }
        assert!(matches!(p.arena.stmt(body[1]).kind, StmtKind::Node(_)));
        assert!(matches!(p.arena.stmt(body[2]).kind, StmtKind::Assignment { op: AssignOp::Assign, .. }));
    }

    #[test]
    fn preconditions_attach_to_the_following_statement() {
        let p = parse("tree T() {\n  @guard(ready) @run_while(!done)\n  Work();\n}\n");
        assert!(p.bag.is_empty());
        let stmt = p.arena.stmt(p.tree_body(0)[0]);
        let kinds: Vec<_> = stmt.preconditions.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PreconditionKind::Guard, PreconditionKind::RunWhile]);
        assert!(stmt.range.covers(&stmt.preconditions[0].range));
    }

    #[test]
    fn unknown_precondition_is_an_error() {
        let p = parse("tree T() { @when(x) Work(); }");
        let diags: Vec<_> = p.bag.iter().collect();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some(codes::UNKNOWN_PRECONDITION));
        assert!(diags[0].help.as_deref().is_some_and(|h| h.contains("`guard`")));
        assert_eq!(p.tree_body(0).len(), 1);
    }

    #[test]
    fn unknown_attribute_and_policy_are_errors() {
        let p = parse("#[inline] extern action A();\n#[behavior(Some)] extern action B();\n");
        let codes_seen: Vec<_> = p.bag.iter().map(|d| d.code.as_deref()).collect();
        assert_eq!(codes_seen, vec![Some(codes::UNKNOWN_ATTRIBUTE), Some(codes::UNKNOWN_ATTRIBUTE)]);
        assert_eq!(p.program.decls.len(), 2);
    }

    #[test]
    fn dangling_doc_comment_is_a_warning() {
        let p = parse("tree T() {\n  A();\n  /// nothing here\n}\n/// trailing\n");
        assert_eq!(p.bag.warning_count(), 2);
        assert!(!p.bag.has_errors());
        assert!(p.bag.iter().all(|d| d.code.as_deref() == Some(codes::DANGLING_DOC_COMMENT)));
    }

    #[test]
    fn docs_attach_to_statements_and_params() {
        let p = parse("tree T(\n  /// The target.\n  target: Pose,\n) {\n  /// Go.\n  Go();\n}\n");
        assert!(p.bag.is_empty());
        let DeclKind::Tree(tree) = p.decl(0) else {
            panic!("expected tree");
        };
        assert_eq!(tree.params[0].docs, vec!["The target.".to_string()]);
        assert_eq!(p.arena.stmt(tree.body[0]).docs, vec!["Go.".to_string()]);
    }

    #[test]
    fn unclosed_block_before_next_tree() {
        let p = parse("tree A() {\n  X();\ntree B() { Y(); }\n");
        assert_eq!(p.errors().len(), 1);
        assert!(p.errors()[0].starts_with("expected `}` to close the block"));
        assert_eq!(p.program.decls.len(), 2);
    }

    #[test]
    fn missing_expression_inserts_placeholder() {
        let p = parse("var x = ;\nconst Y;\n");
        assert_eq!(p.errors(), vec!["expected an expression, found `;`", "expected `=` in constant declaration, found `;`"]);
        assert!(matches!(
            p.decl(0),
            DeclKind::GlobalVar { init: Some(init), .. } if p.arena.expr(*init).kind == ExprKind::Missing
        ));
        assert!(matches!(
            p.decl(1),
            DeclKind::GlobalConst { value, .. } if p.arena.expr(*value).kind == ExprKind::Missing
        ));
    }

    #[test]
    fn reserved_word_as_name_gets_help() {
        let p = parse("tree tree() {}");
        let diag = p.bag.iter().next().expect("diagnostic");
        assert_eq!(diag.message, "expected a tree name, found keyword `tree`");
        assert!(diag.help.as_deref().is_some_and(|h| h.contains("reserved")));
        assert_eq!(p.bag.len(), 1);
        assert_eq!(p.program.decls.len(), 1);
    }

    #[test]
    fn stray_top_level_statement_recovers_at_next_declaration() {
        let p = parse("Foo(); Bar();\ntree T() { A(); }\n");
        assert_eq!(p.errors().len(), 1);
        assert_eq!(p.program.decls.len(), 1);
    }

    #[test]
    fn empty_token_stream_gets_an_eof() {
        let mut arena = AstArena::new();
        let mut bag = DiagnosticBag::new();
        let program = parse_program(&[], FileId::DETACHED, &mut arena, &mut bag);
        assert!(program.decls.is_empty());
        assert!(bag.is_empty());
    }

    #[test]
    fn child_ranges_nest_inside_parents() {
        let p = parse("tree T() {\n  @guard(a && b)\n  Seq(x: [1, 2]) {\n    Leaf(y: -c);\n  }\n}\n");
        assert!(p.bag.is_empty());
        let tree_range = p.arena.decl(p.program.decls[0]).range;
        assert!(p.program.range.covers(&tree_range));
        let seq = p.tree_body(0)[0];
        let seq_range = p.arena.stmt_range(seq);
        assert!(tree_range.covers(&seq_range));
        let node = p.node(seq);
        for arg in node.args.iter().flatten() {
            assert!(seq_range.covers(&arg.range));
            assert!(arg.range.covers(&p.arena.expr_range(arg.value)));
        }
        let leaf = node.children.as_ref().expect("children")[0];
        assert!(seq_range.covers(&p.arena.stmt_range(leaf)));
        assert_eq!(p.sources.slice(p.arena.stmt_range(leaf)), Some("Leaf(y: -c);"));
    }
}
