use covenant::lexer::lex;
use covenant::lexer::token::Token;

#[test]
fn lexes_a_full_sig_declaration() {
    let tokens = lex("sig add(T, T) -> T {\n    require T guarantees Addable\n    failure Never\n}\n").unwrap();
    assert!(matches!(tokens[0].node, Token::Sig));
    assert!(tokens.iter().any(|t| matches!(&t.node, Token::Ident(s) if s == "add")));
    assert!(tokens.iter().any(|t| matches!(t.node, Token::Arrow)));
}

#[test]
fn int_and_float_literals_are_distinct_tokens() {
    let tokens = lex("1 1.0").unwrap();
    assert!(matches!(tokens[0].node, Token::IntLit(1)));
    assert!(matches!(tokens[1].node, Token::FloatLit(f) if f == 1.0));
}

#[test]
fn dotted_builtin_id_lexes_as_ident_dot_ident() {
    let tokens = lex("builtin core.int.add").unwrap();
    assert!(matches!(tokens[0].node, Token::Builtin));
    assert!(matches!(&tokens[1].node, Token::Ident(s) if s == "core"));
    assert!(matches!(tokens[2].node, Token::Dot));
}

#[test]
fn attr_literal_lexes_as_at_ident_dot_ident() {
    let tokens = lex("@attr.handled").unwrap();
    assert!(matches!(tokens[0].node, Token::At));
    assert!(matches!(&tokens[1].node, Token::Ident(s) if s == "attr"));
    assert!(matches!(tokens[2].node, Token::Dot));
    assert!(matches!(&tokens[3].node, Token::Ident(s) if s == "handled"));
}

#[test]
fn spans_cover_the_matched_text() {
    let tokens = lex("  func").unwrap();
    assert_eq!(tokens[0].span.start, 2);
    assert_eq!(tokens[0].span.end, 6);
}

#[test]
fn rejects_a_bare_trailing_dot_on_a_number() {
    let err = lex("let x: Float = 1.\n").unwrap_err();
    assert!(matches!(err, covenant::diagnostics::CompileError::Syntax { .. }));
}
