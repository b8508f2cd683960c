use crate::diagnostics::{CompileError, Diagnostics};
use crate::effects::FailureSet;
use crate::parser::ast::{
    AssignStmt, CatchStmt, Expr, FuncDecl, FuncStmt, Program, RequireClause, TopLevel, TryStmt, TypeRef, VarDecl,
};
use crate::span::{Span, Spanned};
use crate::symbols::Symbols;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Binding {
    ty: TypeRef,
    mutable: bool,
}

type TypeEnv = HashMap<String, Binding>;

/// Type-checks and computes effect sets for a whole lowered program.
/// Returns the accumulated non-fatal diagnostics on success.
pub fn check_program(program: &Program, symbols: &Symbols) -> Result<Diagnostics, CompileError> {
    let mut diags = Diagnostics::new();

    for item in &program.items {
        if let TopLevel::Func(f) = &item.node {
            check_func_body(f, symbols)?;
        }
    }

    check_top_level(program, symbols, &mut diags)?;

    Ok(diags)
}

fn check_func_body(f: &FuncDecl, symbols: &Symbols) -> Result<(), CompileError> {
    let mut env: TypeEnv = HashMap::new();
    for (name, ty) in &f.params {
        env.insert(name.node.clone(), Binding { ty: ty.clone(), mutable: false });
    }

    let sig = symbols
        .sigs
        .get(&f.name.node)
        .ok_or_else(|| CompileError::type_err(format!("func '{}' has no matching sig", f.name.node), f.name.span))?;

    let mut returns: Vec<(TypeRef, Span)> = Vec::new();
    for stmt in &f.body.stmts {
        match &stmt.node {
            FuncStmt::Return(Some(e)) => {
                let (ty, _) = infer(e, &env, symbols, None)?;
                returns.push((ty, e.span));
            }
            FuncStmt::Return(None) => returns.push((TypeRef::new("Unit"), stmt.span)),
            FuncStmt::Expr(e) => {
                infer(e, &env, symbols, None)?;
            }
        }
    }

    if returns.is_empty() {
        if sig.ret.name != "Unit" {
            return Err(CompileError::type_err(
                format!("func '{}' has no return but sig expects '{}'", f.name.node, sig.ret.name),
                f.name.span,
            ));
        }
    } else {
        let first = returns[0].0.clone();
        for (ty, span) in &returns {
            if *ty != first {
                return Err(CompileError::type_err(
                    format!("func '{}' returns disagree: '{}' vs '{}'", f.name.node, first.name, ty.name),
                    *span,
                ));
            }
        }
        if first != sig.ret {
            return Err(CompileError::type_err(
                format!("func '{}' returns '{}' but sig expects '{}'", f.name.node, first.name, sig.ret.name),
                returns[0].1,
            ));
        }
    }

    Ok(())
}

/// Top-level items in order, grouping adjacent `Try` + `Catch*` as a unit.
fn check_top_level(program: &Program, symbols: &Symbols, diags: &mut Diagnostics) -> Result<(), CompileError> {
    let mut env: TypeEnv = HashMap::new();
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
                check_var(v, &mut env, symbols)?;
                i += 1;
            }
            TopLevel::Assign(a) => {
                check_assign(a, &mut env, symbols)?;
                i += 1;
            }
            TopLevel::Expr(e) => {
                let (ty, fset) = infer(&e.expr, &env, symbols, None)?;
                if ty.name != "Unit" {
                    return Err(CompileError::type_err("only Unit expressions are allowed as statements", e.expr.span));
                }
                warn_if_residual(diags, &fset, e.expr.span);
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
                check_try_catch(t, &catches, &env, symbols, diags)?;
                i = j;
            }
            TopLevel::Catch(c) => {
                return Err(CompileError::type_err("stray 'catch' with no preceding 'try'", c.failure_name.span));
            }
        }
    }
    Ok(())
}

fn check_var(v: &VarDecl, env: &mut TypeEnv, symbols: &Symbols) -> Result<(), CompileError> {
    if env.contains_key(&v.name.node) {
        return Err(CompileError::type_err(format!("redeclaration of '{}'", v.name.node), v.name.span));
    }
    let (ty, _) = infer(&v.expr, env, symbols, Some(&v.ty))?;
    if ty != v.ty {
        return Err(CompileError::type_err(
            format!("'{}' declared as '{}' but initializer is '{}'", v.name.node, v.ty.name, ty.name),
            v.expr.span,
        ));
    }
    env.insert(v.name.node.clone(), Binding { ty: v.ty.clone(), mutable: v.mutable });
    Ok(())
}

fn check_assign(a: &AssignStmt, env: &mut TypeEnv, symbols: &Symbols) -> Result<(), CompileError> {
    let binding = env
        .get(&a.name.node)
        .cloned()
        .ok_or_else(|| CompileError::type_err(format!("unknown identifier '{}'", a.name.node), a.name.span))?;
    if !binding.mutable {
        return Err(CompileError::type_err(format!("cannot assign to immutable '{}'", a.name.node), a.name.span));
    }
    let (ty, _) = infer(&a.expr, env, symbols, Some(&binding.ty))?;
    if ty != binding.ty {
        return Err(CompileError::type_err(
            format!("cannot assign '{}' to '{}' of type '{}'", ty.name, a.name.node, binding.ty.name),
            a.expr.span,
        ));
    }
    Ok(())
}

fn check_try_catch(
    t: &TryStmt,
    catches: &[&CatchStmt],
    env: &TypeEnv,
    symbols: &Symbols,
    diags: &mut Diagnostics,
) -> Result<(), CompileError> {
    let (try_ty, mut try_fset) = infer(&t.expr, env, symbols, None)?;
    if try_ty.name != "Unit" {
        return Err(CompileError::type_err("try expression must be of type 'Unit'", t.expr.span));
    }
    for c in catches {
        if let Some(fid) = crate::effects::FailureId::parse(&c.failure_name.node) {
            try_fset.remove(&fid);
        } else {
            return Err(CompileError::type_err(format!("unknown failure name '{}'", c.failure_name.node), c.failure_name.span));
        }
    }

    let mut catch_fset = FailureSet::new();
    for c in catches {
        let (catch_ty, mut fset) = infer(&c.expr, env, symbols, None)?;
        if catch_ty.name != "Unit" {
            return Err(CompileError::type_err("catch expression must be of type 'Unit'", c.expr.span));
        }
        if let Some(fid) = crate::effects::FailureId::parse(&c.failure_name.node) {
            fset.remove(&fid);
        }
        catch_fset.extend(fset);
    }

    let residual: FailureSet = try_fset.union(&catch_fset).copied().collect();
    warn_if_residual(diags, &residual, t.expr.span);
    Ok(())
}

fn warn_if_residual(diags: &mut Diagnostics, fset: &FailureSet, span: Span) {
    if fset.is_empty() {
        return;
    }
    let mut names: Vec<&str> = fset.iter().map(|f| f.as_str()).collect();
    names.sort_unstable();
    diags.warn(crate::diagnostics::Code::UnhandledFailures, format!("unhandled failures: {}", names.join(", ")), Some(span));
}

/// Infers `(TypeRef, FailureSet)` for an expression, given an optional
/// expected type used only to resolve a type-variable return at call sites.
fn infer(
    e: &Spanned<Expr>,
    env: &TypeEnv,
    symbols: &Symbols,
    expected: Option<&TypeRef>,
) -> Result<(TypeRef, FailureSet), CompileError> {
    match &e.node {
        Expr::IntLit(_) => Ok((TypeRef::new("Int"), FailureSet::new())),
        Expr::FloatLit(_) => Ok((TypeRef::new("Float"), FailureSet::new())),
        Expr::Ident(name) => {
            let binding = env
                .get(name)
                .ok_or_else(|| CompileError::type_err(format!("unknown identifier '{name}'"), e.span))?;
            Ok((binding.ty.clone(), FailureSet::new()))
        }
        Expr::Binary { .. } => Err(CompileError::eval("internal error: BinaryExpr survived lowering", e.span)),
        Expr::Call { callee, args } => infer_call(e.span, callee, args, env, symbols, expected),
    }
}

fn infer_call(
    span: Span,
    callee: &Spanned<String>,
    args: &[crate::parser::ast::Arg],
    env: &TypeEnv,
    symbols: &Symbols,
    expected: Option<&TypeRef>,
) -> Result<(TypeRef, FailureSet), CompileError> {
    let sig = symbols
        .sigs
        .get(&callee.node)
        .ok_or_else(|| CompileError::type_err(format!("unknown call target '{}'", callee.node), callee.span))?;

    if args.iter().any(|a| matches!(a, crate::parser::ast::Arg::Named(..))) {
        return Err(CompileError::type_err(
            format!("named arguments are not allowed when calling sig '{}'", callee.node),
            callee.span,
        ));
    }

    if args.len() != sig.params.len() {
        return Err(CompileError::type_err(
            format!("'{}' expects {} argument(s), got {}", callee.node, sig.params.len(), args.len()),
            span,
        ));
    }

    let mut tmap: HashMap<String, TypeRef> = HashMap::new();
    if sig.ret.is_type_var() {
        match expected {
            Some(exp) => {
                tmap.insert(sig.ret.name.clone(), exp.clone());
            }
            None => {
                return Err(CompileError::type_err(
                    format!("cannot determine type variable '{}' for '{}'", sig.ret.name, callee.node),
                    span,
                ));
            }
        }
    }

    let mut arg_failures = FailureSet::new();

    for (param_ty, arg) in sig.params.iter().zip(args.iter()) {
        let arg_expected = if param_ty.is_type_var() { tmap.get(&param_ty.name).cloned() } else { Some(param_ty.clone()) };
        let (arg_ty, arg_fset) = infer(arg.expr(), env, symbols, arg_expected.as_ref())?;
        if param_ty.is_type_var() && !tmap.contains_key(&param_ty.name) {
            tmap.insert(param_ty.name.clone(), arg_ty.clone());
        }
        arg_failures.extend(arg_fset);
    }

    // `handled` swallows the callee's own declared failures but never the
    // failures its arguments raise.
    let mut fset = if sig.attrs.contains("handled") { FailureSet::new() } else { sig.failures.iter().copied().collect() };
    fset.extend(arg_failures);

    for req in &sig.requires {
        match req {
            RequireClause::RequireIn { type_var, group } => {
                let bound = tmap.get(&type_var.node).ok_or_else(|| {
                    CompileError::type_err(format!("type variable '{}' is not determined", type_var.node), span)
                })?;
                let members = symbols
                    .typegroups
                    .get(&group.node)
                    .ok_or_else(|| CompileError::type_err(format!("unknown type group '{}'", group.node), group.span))?;
                if !members.contains(&bound.name) {
                    return Err(CompileError::type_err(
                        format!("type '{}' is not a member of group '{}'", bound.name, group.node),
                        span,
                    ));
                }
            }
            RequireClause::RequireGuarantees { type_var, guarantee } => {
                let bound = tmap.get(&type_var.node).ok_or_else(|| {
                    CompileError::type_err(format!("type variable '{}' is not determined", type_var.node), span)
                })?;
                let advertises = symbols.type_guarantees.get(&bound.name).map(|s| s.contains(&guarantee.node)).unwrap_or(false);
                if !advertises {
                    return Err(div_aware_error(
                        &callee.node,
                        format!("type '{}' does not implement guarantee '{}'", bound.name, guarantee.node),
                        span,
                    ));
                }
            }
        }
    }

    for (param_ty, arg) in sig.params.iter().zip(args.iter()) {
        let resolved = if param_ty.is_type_var() { tmap.get(&param_ty.name).cloned().unwrap_or_else(|| param_ty.clone()) } else { param_ty.clone() };
        let (arg_ty, _) = infer(arg.expr(), env, symbols, Some(&resolved))?;
        if arg_ty != resolved {
            return Err(div_aware_error(
                &callee.node,
                format!("'{}' expects '{}', got '{}'", callee.node, resolved.name, arg_ty.name),
                arg.expr().span,
            ));
        }
    }

    let ret = if sig.ret.is_type_var() { tmap.get(&sig.ret.name).cloned().unwrap_or_else(|| sig.ret.clone()) } else { sig.ret.clone() };
    Ok((ret, fset))
}

fn div_aware_error(callee: &str, msg: String, span: Span) -> CompileError {
    if callee == "div" {
        CompileError::type_err(format!("{msg} ('div' is declared on Float only; write 1.0/2.0 or use toFloat(...))"), span)
    } else {
        CompileError::type_err(msg, span)
    }
}
