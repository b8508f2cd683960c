use covenant::lexer::lex;
use covenant::lower::lower;
use covenant::parser::ast::{Expr, TopLevel};
use covenant::parser::Parser;

fn lowered(src: &str) -> covenant::parser::ast::Program {
    let tokens = lex(src).unwrap();
    let mut parser = Parser::new(&tokens);
    lower(parser.parse_program().unwrap())
}

#[test]
fn no_binary_node_survives_lowering() {
    let prog = lowered("let x: Int = (1 + 2 * 3 - 4)\nvar y: Float = (1.0 / 2.0)\n");
    fn assert_no_binary(e: &Expr) {
        match e {
            Expr::Binary { .. } => panic!("a Binary node survived lowering"),
            Expr::Call { args, .. } => {
                for a in args {
                    assert_no_binary(&a.expr().node);
                }
            }
            _ => {}
        }
    }
    for item in &prog.items {
        if let TopLevel::Var(v) = &item.node {
            assert_no_binary(&v.expr.node);
        }
    }
}

#[test]
fn division_lowers_to_a_call_named_div() {
    let prog = lowered("let x: Float = (1.0 / 2.0)\n");
    match &prog.items[0].node {
        TopLevel::Var(v) => match &v.expr.node {
            Expr::Call { callee, args } => {
                assert_eq!(callee.node, "div");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected a call, got {other:?}"),
        },
        other => panic!("expected a var, got {other:?}"),
    }
}

#[test]
fn lowering_reaches_into_function_bodies() {
    let prog = lowered("sig f(Int, Int) -> Int {\n    failure Never\n}\nfunc f(a: Int, b: Int) {\n    return (a + b)\n}\n");
    match &prog.items[1].node {
        TopLevel::Func(f) => match &f.body.stmts[0].node {
            covenant::parser::ast::FuncStmt::Return(Some(e)) => {
                assert!(matches!(e.node, Expr::Call { .. }));
            }
            other => panic!("expected a return, got {other:?}"),
        },
        other => panic!("expected a func, got {other:?}"),
    }
}

#[test]
fn lowering_a_program_with_no_binary_expressions_is_a_no_op() {
    let prog = lowered("print(1)\n");
    match &prog.items[0].node {
        TopLevel::Expr(e) => assert!(matches!(e.expr.node, Expr::Call { .. })),
        other => panic!("expected an expr stmt, got {other:?}"),
    }
}
