use covenant::diagnostics::CompileError;
use covenant::lexer::lex;
use covenant::parser::Parser;

fn parse_err(src: &str) -> CompileError {
    let tokens = lex(src).unwrap();
    let mut parser = Parser::new(&tokens);
    parser.parse_program().unwrap_err()
}

#[test]
fn bare_infix_at_top_level_is_a_syntax_error() {
    assert!(matches!(parse_err("1 + 2\n"), CompileError::Syntax { .. }));
}

#[test]
fn a_bare_operand_in_parens_must_contain_an_operator() {
    assert!(matches!(parse_err("let x: Int = (1)\n"), CompileError::Syntax { .. }));
}

#[test]
fn a_nested_call_alone_in_parens_is_still_rejected() {
    assert!(matches!(parse_err("let x: Int = (add(1, 2))\n"), CompileError::Syntax { .. }));
}

#[test]
fn catch_with_no_preceding_try_is_a_syntax_error() {
    // The parser accepts a lone `catch` as a statement; adjacency to a
    // `try` is enforced later, by the checker and evaluator.
    let tokens = lex("catch PrintErr print(0)\n").unwrap();
    let mut parser = Parser::new(&tokens);
    assert!(parser.parse_program().is_ok());
}

#[test]
fn try_or_catch_may_not_nest_inside_a_catch_handler() {
    assert!(matches!(parse_err("catch PrintErr try print(1)\n"), CompileError::Syntax { .. }));
    assert!(matches!(parse_err("catch PrintErr catch IOErr print(1)\n"), CompileError::Syntax { .. }));
}

#[test]
fn mixing_positional_and_named_arguments_is_rejected() {
    assert!(matches!(parse_err("print(1, x: 2)\n"), CompileError::Syntax { .. }));
}

#[test]
fn never_combined_with_another_failure_name_is_rejected() {
    let src = "sig f(Int) -> Unit {\n    failure Never\n    failure PrintErr\n}\n";
    assert!(matches!(parse_err(src), CompileError::Syntax { .. }));
}

#[test]
fn a_repeated_failure_name_is_rejected() {
    let src = "sig f(Int) -> Unit {\n    failure PrintErr\n    failure PrintErr\n}\n";
    assert!(matches!(parse_err(src), CompileError::Syntax { .. }));
}

#[test]
fn unexpected_end_of_file_mid_expression_is_reported() {
    assert!(matches!(parse_err("let x: Int ="), CompileError::Syntax { .. }));
}

#[test]
fn an_unknown_character_is_rejected_before_parsing_starts() {
    assert!(lex("let x: Int = 1 $ 2\n").is_err());
}
