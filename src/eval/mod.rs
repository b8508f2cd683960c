pub mod builtins;

use crate::diagnostics::{Code, Diagnostics};
use crate::effects::FailureId;
use crate::host::Host;
use crate::parser::ast::{Arg, AssignStmt, Block, CatchStmt, Expr, FuncStmt, Program, RequireClause, TopLevel, TryStmt, TypeRef, VarDecl};
use crate::span::{Span, Spanned};
use crate::symbols::Symbols;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingTag {
    Left,
    Flat,
    Right,
}

/// A tagged runtime value. The evaluator's capability dispatch reads a
/// value's `type_name()` to resolve `Self` at call sites.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Unit,
    Ordering(OrderingTag),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Unit => "Unit",
            Value::Ordering(_) => "Ordering",
        }
    }
}

#[derive(Debug, Clone)]
struct Cell {
    value: Value,
    mutable: bool,
}

type Env = HashMap<String, Cell>;

/// Runtime carrier of a dynamic failure. Never escapes `run` as a Rust
/// `Err` — an unhandled one is folded into the returned `Diagnostics`,
/// matching the one-error-type contract in `crate::diagnostics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaisedFailure(pub FailureId);

type EvalResult<T> = Result<T, RaisedFailure>;

/// Walks the lowered program's top-level items, dispatching builtin and
/// user calls through `symbols`. Runtime side effects go through `host`.
/// Any failure that escapes every enclosing try/catch group halts the run
/// and is reported as an `UNHANDLED_FAILURES` diagnostic, not a Rust `Err`.
pub fn run(program: &Program, symbols: &Symbols, host: &mut dyn Host) -> Diagnostics {
    let mut env: Env = HashMap::new();
    let mut diags = Diagnostics::new();
    let items = &program.items;
    let mut i = 0;
    while i < items.len() {
        match &items[i].node {
            TopLevel::Guarantee(_)
            | TopLevel::TypeGroup(_)
            | TopLevel::Register(_)
            | TopLevel::Impl(_)
            | TopLevel::Sig(_)
            | TopLevel::Func(_) => {
                i += 1;
            }
            TopLevel::Var(v) => {
                if let Err(raised) = eval_var(v, &mut env, symbols, host) {
                    warn_unhandled(&mut diags, raised, v.expr.span);
                    break;
                }
                i += 1;
            }
            TopLevel::Assign(a) => {
                if let Err(raised) = eval_assign(a, &mut env, symbols, host) {
                    warn_unhandled(&mut diags, raised, a.expr.span);
                    break;
                }
                i += 1;
            }
            TopLevel::Expr(e) => {
                if let Err(raised) = eval_expr(&e.expr, &env, symbols, host) {
                    warn_unhandled(&mut diags, raised, e.expr.span);
                    break;
                }
                i += 1;
            }
            TopLevel::Try(t) => {
                let mut catches = Vec::new();
                let mut j = i + 1;
                while j < items.len() {
                    if let TopLevel::Catch(c) = &items[j].node {
                        catches.push(c);
                        j += 1;
                    } else {
                        break;
                    }
                }
                if let Err(raised) = eval_try_catch(t, &catches, &mut env, symbols, host) {
                    warn_unhandled(&mut diags, raised, t.expr.span);
                    i = j;
                    break;
                }
                i = j;
            }
            TopLevel::Catch(_) => {
                // The checker rejects a stray catch before eval ever runs.
                i += 1;
            }
        }
    }
    diags
}

fn warn_unhandled(diags: &mut Diagnostics, raised: RaisedFailure, span: Span) {
    diags.warn(Code::UnhandledFailures, format!("unhandled failure: {}", raised.0.as_str()), Some(span));
}

fn eval_var(v: &VarDecl, env: &mut Env, symbols: &Symbols, host: &mut dyn Host) -> EvalResult<()> {
    let value = eval_expr(&v.expr, env, symbols, host)?;
    env.insert(v.name.node.clone(), Cell { value, mutable: v.mutable });
    Ok(())
}

fn eval_assign(a: &AssignStmt, env: &mut Env, symbols: &Symbols, host: &mut dyn Host) -> EvalResult<()> {
    let value = eval_expr(&a.expr, env, symbols, host)?;
    let mutable = env.get(&a.name.node).expect("checked by typeck").mutable;
    env.insert(a.name.node.clone(), Cell { value, mutable });
    Ok(())
}

fn eval_try_catch(
    t: &TryStmt,
    catches: &[&CatchStmt],
    env: &mut Env,
    symbols: &Symbols,
    host: &mut dyn Host,
) -> EvalResult<()> {
    match eval_expr(&t.expr, env, symbols, host) {
        Ok(_) => Ok(()),
        Err(RaisedFailure(fid)) => {
            for c in catches {
                if c.failure_name.node == fid.as_str() {
                    return match eval_expr(&c.expr, env, symbols, host) {
                        Ok(_) => Ok(()),
                        // A further raise of the same name the catch handles is swallowed.
                        Err(RaisedFailure(inner)) if inner.as_str() == c.failure_name.node => Ok(()),
                        Err(other) => Err(other),
                    };
                }
            }
            Err(RaisedFailure(fid))
        }
    }
}

fn eval_expr(e: &Spanned<Expr>, env: &Env, symbols: &Symbols, host: &mut dyn Host) -> EvalResult<Value> {
    match &e.node {
        Expr::IntLit(n) => Ok(Value::Int(*n)),
        Expr::FloatLit(n) => Ok(Value::Float(*n)),
        Expr::Ident(name) => Ok(env.get(name).expect("checked by typeck").value.clone()),
        Expr::Binary { .. } => unreachable!("BinaryExpr survives lowering: checker invariant violated"),
        Expr::Call { callee, args } => eval_call(callee, args, env, symbols, host),
    }
}

fn eval_call(
    callee: &Spanned<String>,
    args: &[Arg],
    env: &Env,
    symbols: &Symbols,
    host: &mut dyn Host,
) -> EvalResult<Value> {
    let sig = symbols.sigs.get(&callee.node).expect("checked by typeck");

    let mut values = Vec::with_capacity(args.len());
    for a in args {
        values.push(eval_expr(a.expr(), env, symbols, host)?);
    }

    if let Some(func) = symbols.funcs.get(&callee.node) {
        // Values are in the sig's positional order; a func's own parameter
        // order is free, so bind each value by matching the sig's param type
        // to the func's declared parameter of that same type.
        let mut call_env: Env = HashMap::new();
        let mut remaining: Vec<&(String, TypeRef)> = func.params.iter().collect();
        for (value, param_ty) in values.into_iter().zip(sig.params.iter()) {
            let idx = remaining
                .iter()
                .position(|(_, t)| t.name == param_ty.name)
                .expect("checked by typeck: func params match sig params by multiset");
            let (name, _) = remaining.remove(idx);
            call_env.insert(name.clone(), Cell { value, mutable: false });
        }
        return match eval_block(&func.body, &call_env, symbols, host) {
            Ok(v) => Ok(v),
            Err(_) if func.attrs.contains("handled") => Ok(Value::Unit),
            Err(raised) => Err(raised),
        };
    }

    let result = if let Some(builtin_id) = &sig.builtin {
        builtins::call_builtin(builtin_id, &values, host)
    } else {
        // Runtime capability dispatch: the sig's sole RequireGuarantees
        // clause names the guarantee; `Self` is the first argument's tag.
        let guarantee = sig
            .requires
            .iter()
            .find_map(|r| match r {
                RequireClause::RequireGuarantees { guarantee, .. } => Some(guarantee.node.clone()),
                _ => None,
            })
            .expect("checked by typeck");
        let self_ty = values[0].type_name().to_string();
        let builtin_id = symbols.impls.get(&(self_ty, guarantee, callee.node.clone())).expect("checked by typeck");
        builtins::call_builtin(builtin_id, &values, host)
    };

    // The surface `print` pseudo-sig wraps any underlying error as PrintErr.
    if callee.node == "print" {
        result.map_err(|_| RaisedFailure(FailureId::PrintErr))
    } else {
        result
    }
}

fn eval_block(body: &Block, env: &Env, symbols: &Symbols, host: &mut dyn Host) -> EvalResult<Value> {
    for stmt in &body.stmts {
        match &stmt.node {
            FuncStmt::Return(Some(e)) => return eval_expr(e, env, symbols, host),
            FuncStmt::Return(None) => return Ok(Value::Unit),
            FuncStmt::Expr(e) => {
                eval_expr(e, env, symbols, host)?;
            }
        }
    }
    Ok(Value::Unit)
}
