//! Snapshot tests for the pipeline's rendered error messages. Run
//! `cargo insta review` after a deliberate wording change.

use covenant::host::StringHost;
use insta::assert_snapshot;

fn err_message(src: &str) -> String {
    let mut host = StringHost::new(src);
    covenant::run(&mut host).unwrap_err().to_string()
}

#[test]
fn syntax_error_message_for_a_bare_infix_expression() {
    assert_snapshot!(err_message("1 + 2\n"));
}

#[test]
fn syntax_error_message_for_a_parenthesized_operand_with_no_operator() {
    assert_snapshot!(err_message("let x: Int = (1)\n"));
}

#[test]
fn type_error_message_for_a_mismatched_let_binding() {
    assert_snapshot!(err_message("let x: Int = (1.0 + 2.0)\n"));
}

#[test]
fn type_error_message_for_reassigning_an_immutable_binding() {
    assert_snapshot!(err_message("let x: Int = (1 + 2)\nx = (3 + 4)\n"));
}

#[test]
fn div_specific_hint_appears_in_the_type_error_message() {
    assert_snapshot!(err_message("let x: Float = div(1, 2.0)\n"));
}

#[test]
fn catalog_error_message_for_an_unreadable_catalog_directory() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("program.lang");
    std::fs::write(&source_path, "print(1)\n").unwrap();
    let mut host = covenant::host::FsHost::load(&source_path, dir.path()).unwrap();
    assert_snapshot!(covenant::run(&mut host).unwrap_err().to_string());
}
