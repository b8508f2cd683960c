use covenant::diagnostics::CompileError;
use covenant::host::StringHost;

fn run_lines(src: &str) -> Vec<String> {
    let mut host = StringHost::new(src);
    covenant::run(&mut host).unwrap();
    host.lines().to_vec()
}

#[test]
fn a_caught_divide_by_zero_runs_its_handler() {
    let lines = run_lines("try print(div(1.0, 0.0))\ncatch DivideByZero print(999)\n");
    assert_eq!(lines, ["999"]);
}

#[test]
fn an_uncaught_failure_halts_the_run_and_skips_later_statements() {
    let mut host = StringHost::new("print(div(1.0, 0.0))\nprint(1)\n");
    let diags = covenant::run(&mut host).unwrap();
    assert!(!diags.is_empty());
    assert!(host.lines().is_empty());
}

#[test]
fn a_catch_naming_the_wrong_failure_does_not_intercept_it() {
    let mut host = StringHost::new("try print(div(1.0, 0.0))\ncatch PrintErr print(0)\n");
    let diags = covenant::run(&mut host).unwrap();
    assert!(!diags.is_empty());
    assert!(host.lines().is_empty());
}

#[test]
fn multiple_adjacent_catches_each_get_a_chance_to_match() {
    let lines = run_lines("try print(div(1.0, 0.0))\ncatch PrintErr print(1)\ncatch DivideByZero print(2)\n");
    assert_eq!(lines, ["2"]);
}

#[test]
fn a_successful_try_runs_no_catch_handler() {
    let lines = run_lines("try print(div(4.0, 2.0))\ncatch DivideByZero print(0)\n");
    assert_eq!(lines, ["2.0"]);
}

#[test]
fn a_stray_catch_with_no_preceding_try_is_a_type_error() {
    let mut host = StringHost::new("catch DivideByZero print(0)\n");
    assert!(matches!(covenant::run(&mut host), Err(CompileError::Type { .. })));
}

#[test]
fn a_handler_that_re_raises_its_own_failure_name_is_swallowed() {
    let lines = run_lines("try print(div(1.0, 0.0))\ncatch DivideByZero print(div(1.0, 0.0))\n");
    assert!(lines.is_empty());
}
