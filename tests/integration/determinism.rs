use covenant::host::StringHost;

fn run_lines(src: &str) -> Vec<String> {
    let mut host = StringHost::new(src);
    covenant::run(&mut host).unwrap();
    host.lines().to_vec()
}

/// Every builtin in this surface is a pure function of its arguments (and,
/// for `print`, the host's own line buffer) — no clocks, randomness, or
/// filesystem state enters the evaluator. Running the same program twice
/// through two independent hosts must always produce identical output.
#[test]
fn the_same_program_produces_the_same_output_every_time() {
    let src = "var total: Int = (1 + 1)\ntotal = (total * 21)\nprint(total)\nprint(cmp(total, 42))\nprint((10.0 / 4.0))\n";
    let first = run_lines(src);
    let second = run_lines(src);
    assert_eq!(first, second);
}

#[test]
fn diagnostics_for_an_unhandled_failure_are_reproducible() {
    let src = "print(div(1.0, 0.0))\n";
    let mut host_a = StringHost::new(src);
    let diags_a = covenant::run(&mut host_a).unwrap();
    let mut host_b = StringHost::new(src);
    let diags_b = covenant::run(&mut host_b).unwrap();
    let msgs_a: Vec<&str> = diags_a.iter().map(|d| d.message.as_str()).collect();
    let msgs_b: Vec<&str> = diags_b.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(msgs_a, msgs_b);
}

#[test]
fn a_handled_function_never_leaks_its_swallowed_failure_across_runs() {
    let src = "@attr.handled\nsig safeDiv(Float, Float) -> Unit {\n    failure DivideByZero\n}\nfunc safeDiv(a: Float, b: Float) {\n    print(div(a, b))\n}\nsafeDiv(1.0, 0.0)\nprint(1)\n";
    for _ in 0..3 {
        assert_eq!(run_lines(src), ["1"]);
    }
}
