use covenant::host::StringHost;

fn run_lines(src: &str) -> Vec<String> {
    let mut host = StringHost::new(src);
    covenant::run(&mut host).unwrap();
    host.lines().to_vec()
}

#[test]
fn arithmetic_lowers_and_evaluates_to_the_right_value() {
    assert_eq!(run_lines("print((2 + 3 * 4))\n"), ["14"]);
}

#[test]
fn float_division_evaluates_correctly() {
    assert_eq!(run_lines("print((10.0 / 4.0))\n"), ["2.5"]);
}

#[test]
fn a_whole_valued_float_still_prints_with_a_decimal_point() {
    assert_eq!(run_lines("print((2.0 * 1.0))\n"), ["2.0"]);
}

#[test]
fn to_float_converts_an_int_before_dividing() {
    assert_eq!(run_lines("print((toFloat(1) / toFloat(2)))\n"), ["0.5"]);
}

#[test]
fn cmp_reports_left_flat_or_right() {
    assert_eq!(run_lines("print(cmp(2, 1))\nprint(cmp(1, 1))\nprint(cmp(1, 2))\n"), ["Left", "Flat", "Right"]);
}

#[test]
fn a_user_defined_function_is_called_like_any_other_sig() {
    let src = "sig doubled(Int) -> Int {\n    failure Never\n}\nfunc doubled(n: Int) {\n    return (n * 2)\n}\nprint(doubled(21))\n";
    assert_eq!(run_lines(src), ["42"]);
}

#[test]
fn a_user_declared_guarantee_dispatches_to_its_registered_builtin() {
    let src = "guarantee Loud {\n    shout(Self) -> Unit\n}\nimpl Int Loud shout builtin core.int.print\nsig shout(T) -> Unit {\n    require T guarantees Loud\n    failure Never\n}\nshout(7)\n";
    assert_eq!(run_lines(src), ["7"]);
}

#[test]
fn a_funcs_parameters_bind_by_the_sigs_positional_order_not_its_own_written_order() {
    let src = "sig combine(Int, Float) -> Float {\n    failure Never\n}\nfunc combine(y: Float, x: Int) {\n    return (y - toFloat(x))\n}\nprint(combine(10, 1.0))\n";
    assert_eq!(run_lines(src), ["-9.0"]);
}

#[test]
fn arguments_are_evaluated_left_to_right() {
    assert_eq!(run_lines("print(1)\nprint(2)\nprint(3)\n"), ["1", "2", "3"]);
}
