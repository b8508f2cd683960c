use covenant::diagnostics::{CompileError, Diagnostics};
use covenant::host::StringHost;
use covenant::lexer::lex;
use covenant::lower::lower;
use covenant::parser::Parser;
use covenant::symbols::build_symbols;
use covenant::typeck::check_program;

fn check(src: &str) -> Result<Diagnostics, CompileError> {
    let tokens = lex(src).unwrap();
    let mut parser = Parser::new(&tokens);
    let program = lower(parser.parse_program().unwrap());
    let host = StringHost::new(src);
    let symbols = build_symbols(&program, &host).unwrap();
    check_program(&program, &symbols)
}

#[test]
fn a_well_typed_program_checks_clean() {
    let diags = check("let x: Int = (1 + 2)\nvar y: Float = (1.0 * 2.0)\nprint(x)\nprint(y)\n").unwrap();
    assert!(diags.is_empty());
}

#[test]
fn binding_a_float_expression_to_an_int_let_is_a_type_error() {
    let err = check("let x: Int = (1.0 + 2.0)\n").unwrap_err();
    assert!(matches!(err, CompileError::Type { .. }));
}

#[test]
fn reassigning_an_immutable_let_is_a_type_error() {
    let err = check("let x: Int = (1 + 2)\nx = (3 + 4)\n").unwrap_err();
    assert!(matches!(err, CompileError::Type { .. }));
}

#[test]
fn a_var_may_be_reassigned_with_a_matching_type() {
    let diags = check("var x: Int = (1 + 2)\nx = (x + 1)\nprint(x)\n").unwrap();
    assert!(diags.is_empty());
}

#[test]
fn calling_with_the_wrong_arity_is_rejected() {
    let err = check("let x: Int = add(1)\n").unwrap_err();
    assert!(matches!(err, CompileError::Type { .. }));
}

#[test]
fn an_unknown_call_target_is_rejected() {
    let err = check("bogus(1)\n").unwrap_err();
    assert!(matches!(err, CompileError::Type { .. }));
}

#[test]
fn a_generic_sigs_type_variable_resolves_from_the_expected_return_type() {
    let diags = check("let x: Float = add(1.0, 2.0)\nprint(x)\n").unwrap();
    assert!(diags.is_empty());
}

#[test]
fn calling_div_on_mismatched_types_gets_a_div_specific_hint() {
    let err = check("let x: Float = div(1, 2.0)\n").unwrap_err();
    match err {
        CompileError::Type { msg, .. } => assert!(msg.contains("toFloat")),
        other => panic!("expected a type error, got {other:?}"),
    }
}

#[test]
fn using_an_unknown_identifier_is_rejected() {
    let err = check("print(missing)\n").unwrap_err();
    assert!(matches!(err, CompileError::Type { .. }));
}

#[test]
fn a_user_function_whose_return_disagrees_with_its_sig_is_rejected() {
    let src = "sig f(Int) -> Float {\n    failure Never\n}\nfunc f(a: Int) {\n    return (a + 1)\n}\n";
    let err = check(src).unwrap_err();
    assert!(matches!(err, CompileError::Type { .. }));
}

#[test]
fn a_function_with_no_return_must_have_a_unit_sig() {
    let src = "sig f(Int) -> Int {\n    failure Never\n}\nfunc f(a: Int) {\n    print(a)\n}\n";
    let err = check(src).unwrap_err();
    assert!(matches!(err, CompileError::Type { .. }));
}
