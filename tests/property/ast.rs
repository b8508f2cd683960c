//! Property-based tests for the parser and lowering pass.
//!
//! These generate a variety of small well-formed programs and check
//! invariants that should hold across all of them, rather than any single
//! hand-picked example.

use covenant::lexer::lex;
use covenant::lower::lower;
use covenant::parser::ast::{Expr, TopLevel};
use covenant::parser::Parser;
use proptest::prelude::*;

fn arb_int() -> impl Strategy<Value = i64> {
    0i64..1000
}

/// A chain of `+`/`*`-joined integer literals, always wrapped in one
/// enclosing pair of parens so it parses as a legal infix expression.
fn arb_infix_chain() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_int(), 2..6).prop_flat_map(|nums| {
        prop::collection::vec(prop_oneof![Just('+'), Just('*'), Just('-')], nums.len() - 1).prop_map(move |ops| {
            let mut s = nums[0].to_string();
            for (n, op) in nums[1..].iter().zip(ops.iter()) {
                s.push(' ');
                s.push(*op);
                s.push(' ');
                s.push_str(&n.to_string());
            }
            format!("({s})")
        })
    })
}

fn arb_ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,8}".prop_map(|s| s)
}

fn arb_let_program() -> impl Strategy<Value = String> {
    (arb_ident(), arb_infix_chain()).prop_map(|(name, expr)| format!("let {name}: Int = {expr}\n"))
}

fn no_binary_survives(e: &Expr) -> bool {
    match e {
        Expr::Binary { .. } => false,
        Expr::Call { args, .. } => args.iter().all(|a| no_binary_survives(&a.expr().node)),
        _ => true,
    }
}

proptest! {
    /// Every generated let-binding with a parenthesized infix chain parses
    /// without panicking and lowers to a tree with no surviving `Binary`.
    #[test]
    fn lowering_removes_every_binary_node(src in arb_let_program()) {
        let tokens = lex(&src).expect("generated source always lexes");
        let mut parser = Parser::new(&tokens);
        let program = parser.parse_program().expect("generated source always parses");
        let program = lower(program);
        match &program.items[0].node {
            TopLevel::Var(v) => prop_assert!(no_binary_survives(&v.expr.node)),
            other => prop_assert!(false, "expected a var declaration, got {other:?}"),
        }
    }

    /// Lowering an already-lowered program is a no-op: applying it twice
    /// produces the same debug representation as applying it once.
    #[test]
    fn lowering_is_idempotent_on_generated_programs(src in arb_let_program()) {
        let tokens = lex(&src).unwrap();
        let mut parser = Parser::new(&tokens);
        let once = lower(parser.parse_program().unwrap());
        let once_repr = format!("{:?}", once.items);
        let twice = lower(once);
        let twice_repr = format!("{:?}", twice.items);
        prop_assert_eq!(once_repr, twice_repr);
    }

    /// The lexer never panics on any ASCII-identifier-and-digit source,
    /// whether or not it ultimately parses.
    #[test]
    fn lexer_never_panics_on_identifier_and_digit_soup(src in "[A-Za-z0-9_ \n]{0,80}") {
        let _ = lex(&src);
    }
}
