use crate::parser::ast::{Arg, Block, Expr, FuncStmt, Program, TopLevel};
use crate::span::Spanned;

/// Rewrites every `BinaryExpr` into the equivalent `CallExpr` and
/// recursively lowers expressions nested in statements, call arguments,
/// and function bodies. Declarations with no expression content pass
/// through untouched. Idempotent: lowering an already-lowered program is
/// a no-op, since no `Expr::Binary` node survives the first pass.
pub fn lower(program: Program) -> Program {
    Program { items: program.items.into_iter().map(lower_top_level).collect() }
}

fn lower_top_level(item: Spanned<TopLevel>) -> Spanned<TopLevel> {
    let Spanned { node, span } = item;
    let node = match node {
        TopLevel::Var(mut v) => {
            v.expr = lower_expr(v.expr);
            TopLevel::Var(v)
        }
        TopLevel::Assign(mut a) => {
            a.expr = lower_expr(a.expr);
            TopLevel::Assign(a)
        }
        TopLevel::Expr(mut e) => {
            e.expr = lower_expr(e.expr);
            TopLevel::Expr(e)
        }
        TopLevel::Try(mut t) => {
            t.expr = lower_expr(t.expr);
            TopLevel::Try(t)
        }
        TopLevel::Catch(mut c) => {
            c.expr = lower_expr(c.expr);
            TopLevel::Catch(c)
        }
        TopLevel::Func(mut f) => {
            f.body = lower_block(f.body);
            TopLevel::Func(f)
        }
        other @ (TopLevel::Guarantee(_)
        | TopLevel::TypeGroup(_)
        | TopLevel::Register(_)
        | TopLevel::Impl(_)
        | TopLevel::Sig(_)) => other,
    };
    Spanned::new(node, span)
}

fn lower_block(block: Block) -> Block {
    Block { stmts: block.stmts.into_iter().map(lower_func_stmt).collect() }
}

fn lower_func_stmt(stmt: Spanned<FuncStmt>) -> Spanned<FuncStmt> {
    let Spanned { node, span } = stmt;
    let node = match node {
        FuncStmt::Return(Some(e)) => FuncStmt::Return(Some(lower_expr(e))),
        FuncStmt::Return(None) => FuncStmt::Return(None),
        FuncStmt::Expr(e) => FuncStmt::Expr(lower_expr(e)),
    };
    Spanned::new(node, span)
}

fn lower_expr(expr: Spanned<Expr>) -> Spanned<Expr> {
    let Spanned { node, span } = expr;
    let node = match node {
        Expr::Binary { op, left, right } => {
            let left = lower_expr(*left);
            let right = lower_expr(*right);
            let callee = Spanned::new(callee_name(op).to_string(), span);
            Expr::Call { callee, args: vec![Arg::Pos(left), Arg::Pos(right)] }
        }
        Expr::Call { callee, args } => Expr::Call { callee, args: args.into_iter().map(lower_arg).collect() },
        other @ (Expr::IntLit(_) | Expr::FloatLit(_) | Expr::Ident(_)) => other,
    };
    Spanned::new(node, span)
}

fn lower_arg(arg: Arg) -> Arg {
    match arg {
        Arg::Pos(e) => Arg::Pos(lower_expr(e)),
        Arg::Named(name, e) => Arg::Named(name, lower_expr(e)),
    }
}

fn callee_name(op: crate::parser::ast::BinOp) -> &'static str {
    use crate::parser::ast::BinOp;
    match op {
        BinOp::Add => "add",
        BinOp::Sub => "sub",
        BinOp::Mul => "mul",
        BinOp::Div => "div",
    }
}
