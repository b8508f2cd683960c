pub mod catalog;
pub mod diagnostics;
pub mod effects;
pub mod eval;
pub mod host;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod span;
pub mod symbols;
pub mod typeck;

use diagnostics::{CompileError, Diagnostics};
use host::Host;

/// Runs the full pipeline — lex, parse, lower, build symbols, check,
/// evaluate — against `host`'s source and prelude catalogs. Returns the
/// diagnostics accumulated by both the static checker and the evaluator
/// (unhandled dynamic failures surface here too, not as a second error type).
pub fn run(host: &mut dyn Host) -> Result<Diagnostics, CompileError> {
    let source = host.source().to_string();
    let tokens = lexer::lex(&source)?;
    let mut parser = parser::Parser::new(&tokens);
    let program = parser.parse_program()?;
    let program = lower::lower(program);

    let symbols = symbols::build_symbols(&program, host)?;

    let mut diags = typeck::check_program(&program, &symbols)?;
    let eval_diags = eval::run(&program, &symbols, host);
    diags.extend(eval_diags);

    Ok(diags)
}
