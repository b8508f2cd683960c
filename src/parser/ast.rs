use crate::span::Spanned;

#[derive(Debug)]
pub struct Program {
    pub items: Vec<Spanned<TopLevel>>,
}

#[derive(Debug)]
pub enum TopLevel {
    Guarantee(GuaranteeDecl),
    TypeGroup(TypeGroupDecl),
    Register(RegisterDecl),
    Impl(ImplDecl),
    Sig(SigDecl),
    Func(FuncDecl),
    Var(VarDecl),
    Assign(AssignStmt),
    Expr(ExprStmt),
    Try(TryStmt),
    Catch(CatchStmt),
}

/// A single identifier naming a concrete type, a type-group, or (when it
/// is exactly one uppercase letter) a type variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_type_var(&self) -> bool {
        let mut chars = self.name.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase())
    }
}

#[derive(Debug, Clone)]
pub struct MethodSig {
    pub name: Spanned<String>,
    pub params: Vec<TypeRef>,
    pub ret: TypeRef,
}

#[derive(Debug, Clone)]
pub struct GuaranteeDecl {
    pub name: Spanned<String>,
    pub methods: Vec<MethodSig>,
}

#[derive(Debug, Clone)]
pub struct TypeGroupDecl {
    pub name: Spanned<String>,
    pub members: Vec<Spanned<String>>,
}

#[derive(Debug, Clone)]
pub struct RegisterDecl {
    pub ty: Spanned<String>,
    pub guarantee: Spanned<String>,
}

#[derive(Debug, Clone)]
pub struct ImplDecl {
    pub ty: Spanned<String>,
    pub guarantee: Spanned<String>,
    pub method: Spanned<String>,
    pub builtin: Spanned<String>,
}

#[derive(Debug, Clone)]
pub enum RequireClause {
    RequireIn { type_var: Spanned<String>, group: Spanned<String> },
    RequireGuarantees { type_var: Spanned<String>, guarantee: Spanned<String> },
}

#[derive(Debug, Clone)]
pub struct SigDecl {
    pub name: Spanned<String>,
    pub params: Vec<TypeRef>,
    pub ret: TypeRef,
    pub requires: Vec<RequireClause>,
    /// Empty means `failure Never` (or no failure lines at all).
    pub failures: Vec<Spanned<String>>,
    pub attrs: Vec<String>,
    pub builtin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Spanned<String>,
    pub params: Vec<(Spanned<String>, TypeRef)>,
    pub body: Block,
    pub attrs: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Spanned<FuncStmt>>,
}

#[derive(Debug, Clone)]
pub enum FuncStmt {
    Return(Option<Spanned<Expr>>),
    Expr(Spanned<Expr>),
}

#[derive(Debug)]
pub struct VarDecl {
    pub mutable: bool,
    pub ty: TypeRef,
    pub name: Spanned<String>,
    pub expr: Spanned<Expr>,
}

#[derive(Debug)]
pub struct AssignStmt {
    pub name: Spanned<String>,
    pub expr: Spanned<Expr>,
}

#[derive(Debug)]
pub struct ExprStmt {
    pub expr: Spanned<Expr>,
}

#[derive(Debug)]
pub struct TryStmt {
    pub expr: Spanned<Expr>,
}

#[derive(Debug)]
pub struct CatchStmt {
    pub failure_name: Spanned<String>,
    pub expr: Spanned<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone)]
pub enum Arg {
    Pos(Spanned<Expr>),
    Named(Spanned<String>, Spanned<Expr>),
}

impl Arg {
    pub fn expr(&self) -> &Spanned<Expr> {
        match self {
            Arg::Pos(e) => e,
            Arg::Named(_, e) => e,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit(i64),
    FloatLit(f64),
    Ident(String),
    Binary { op: BinOp, left: Box<Spanned<Expr>>, right: Box<Spanned<Expr>> },
    Call { callee: Spanned<String>, args: Vec<Arg> },
}
