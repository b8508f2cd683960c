use crate::catalog;
use crate::diagnostics::CompileError;
use crate::effects::{self, FailureSet};
use crate::host::Host;
use crate::parser::ast::{
    Block, FuncDecl, GuaranteeDecl, ImplDecl, Program, RegisterDecl, RequireClause, SigDecl, TopLevel, TypeGroupDecl,
    TypeRef,
};
use std::collections::{HashMap, HashSet};

/// Builtin identifiers the evaluator's dispatch table actually implements.
/// `_validate_catalog` checks every `Impl`'s builtin id against this set.
pub const KNOWN_BUILTINS: &[&str] = &[
    "core.int.add",
    "core.float.add",
    "core.int.sub",
    "core.float.sub",
    "core.int.mul",
    "core.float.mul",
    "core.int.neg",
    "core.float.neg",
    "core.float.div",
    "core.int.toFloat",
    "core.int.cmp",
    "core.float.cmp",
    "core.int.print",
    "core.float.print",
    "core.string.print",
    "core.ordering.print",
];

const KNOWN_ATTRS: &[&str] = &["io", "handled"];

#[derive(Debug, Clone)]
pub struct SigEntry {
    pub params: Vec<TypeRef>,
    pub ret: TypeRef,
    pub requires: Vec<RequireClause>,
    pub failures: FailureSet,
    pub attrs: HashSet<String>,
    pub builtin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FuncEntry {
    pub params: Vec<(String, TypeRef)>,
    pub body: Block,
    pub attrs: HashSet<String>,
}

/// Immutable once built: the merged prelude + user symbol table that the
/// checker and evaluator both query by name or by `(Type, Guarantee, Method)`.
#[derive(Debug, Default)]
pub struct Symbols {
    pub guarantees: HashMap<String, Vec<crate::parser::ast::MethodSig>>,
    pub typegroups: HashMap<String, HashSet<String>>,
    pub type_guarantees: HashMap<String, HashSet<String>>,
    pub sigs: HashMap<String, SigEntry>,
    pub funcs: HashMap<String, FuncEntry>,
    pub impls: HashMap<(String, String, String), String>,
    pub known_types: HashSet<String>,
}

impl Symbols {
    fn add_guarantee(&mut self, g: &GuaranteeDecl) -> Result<(), CompileError> {
        if self.guarantees.contains_key(&g.name.node) {
            return Err(CompileError::catalog(format!("duplicate guarantee '{}'", g.name.node)));
        }
        self.guarantees.insert(g.name.node.clone(), g.methods.clone());
        Ok(())
    }

    fn add_typegroup(&mut self, t: &TypeGroupDecl) -> Result<(), CompileError> {
        if self.typegroups.contains_key(&t.name.node) {
            return Err(CompileError::syntax(format!("duplicate typegroup '{}'", t.name.node), t.name.span));
        }
        let members: HashSet<String> = t.members.iter().map(|m| m.node.clone()).collect();
        for m in &members {
            self.known_types.insert(m.clone());
        }
        self.known_types.insert(t.name.node.clone());
        self.typegroups.insert(t.name.node.clone(), members);
        Ok(())
    }

    fn add_register(&mut self, r: &RegisterDecl) -> Result<(), CompileError> {
        let methods = self
            .guarantees
            .get(&r.guarantee.node)
            .ok_or_else(|| CompileError::syntax(format!("unknown guarantee '{}'", r.guarantee.node), r.guarantee.span))?;
        if !methods.is_empty() {
            return Err(CompileError::syntax(
                format!("guarantee '{}' declares methods; register T guarantees it via impl instead", r.guarantee.node),
                r.guarantee.span,
            ));
        }
        self.known_types.insert(r.ty.node.clone());
        let entry = self.type_guarantees.entry(r.ty.node.clone()).or_default();
        if !entry.insert(r.guarantee.node.clone()) {
            return Err(CompileError::syntax(
                format!("'{}' is already registered for guarantee '{}'", r.ty.node, r.guarantee.node),
                r.ty.span,
            ));
        }
        Ok(())
    }

    fn add_impl(&mut self, i: &ImplDecl) -> Result<(), CompileError> {
        let key = (i.ty.node.clone(), i.guarantee.node.clone(), i.method.node.clone());
        if self.impls.contains_key(&key) {
            return Err(CompileError::syntax(
                format!("duplicate impl for ({}, {}, {})", i.ty.node, i.guarantee.node, i.method.node),
                i.ty.span,
            ));
        }
        self.known_types.insert(i.ty.node.clone());
        self.type_guarantees.entry(i.ty.node.clone()).or_default().insert(i.guarantee.node.clone());
        self.impls.insert(key, i.builtin.node.clone());
        Ok(())
    }

    fn add_sig(&mut self, s: &SigDecl) -> Result<(), CompileError> {
        if self.sigs.contains_key(&s.name.node) {
            return Err(CompileError::syntax(format!("duplicate sig '{}'", s.name.node), s.name.span));
        }
        for attr in &s.attrs {
            if !KNOWN_ATTRS.contains(&attr.as_str()) {
                return Err(CompileError::syntax(format!("unknown attribute '{attr}'"), s.name.span));
            }
            if attr == "handled" && s.ret.name != "Unit" {
                return Err(CompileError::syntax(
                    "'handled' sigs must return Unit",
                    s.name.span,
                ));
            }
        }
        let raw_failures: Vec<String> = s.failures.iter().map(|f| f.node.clone()).collect();
        let failures = effects::parse_failure_list(&raw_failures)
            .map_err(|msg| CompileError::syntax(format!("sig '{}': {msg}", s.name.node), s.name.span))?;
        let attrs: HashSet<String> = s.attrs.iter().cloned().collect();
        self.sigs.insert(
            s.name.node.clone(),
            SigEntry { params: s.params.clone(), ret: s.ret.clone(), requires: s.requires.clone(), failures, attrs, builtin: s.builtin.clone() },
        );
        Ok(())
    }

    fn add_func(&mut self, f: &FuncDecl) -> Result<(), CompileError> {
        if self.funcs.contains_key(&f.name.node) {
            return Err(CompileError::syntax(format!("duplicate func '{}'", f.name.node), f.name.span));
        }
        let sig = self
            .sigs
            .get(&f.name.node)
            .ok_or_else(|| CompileError::syntax(format!("func '{}' has no matching sig", f.name.node), f.name.span))?;

        let mut sig_multiset: Vec<&str> = sig.params.iter().map(|p| p.name.as_str()).collect();
        sig_multiset.sort_unstable();
        let mut func_multiset: Vec<&str> = f.params.iter().map(|(_, t)| t.name.as_str()).collect();
        func_multiset.sort_unstable();
        if sig_multiset != func_multiset {
            return Err(CompileError::syntax(
                format!("func '{}' parameter types do not match its sig", f.name.node),
                f.name.span,
            ));
        }

        let params = f.params.iter().map(|(n, t)| (n.node.clone(), t.clone())).collect();
        let attrs: HashSet<String> = f.attrs.iter().cloned().collect();
        self.funcs.insert(f.name.node.clone(), FuncEntry { params, body: f.body.clone(), attrs });
        Ok(())
    }

    /// Checks that every guarantee a type advertises is fully implemented,
    /// and that every impl's builtin id is one the evaluator knows.
    fn validate_catalog(&self) -> Result<(), CompileError> {
        for (ty, guarantees) in &self.type_guarantees {
            for guarantee_name in guarantees {
                let methods = self
                    .guarantees
                    .get(guarantee_name)
                    .ok_or_else(|| CompileError::catalog(format!("type '{ty}' advertises unknown guarantee '{guarantee_name}'")))?;
                for method in methods {
                    let key = (ty.clone(), guarantee_name.clone(), method.name.node.clone());
                    let builtin = self.impls.get(&key).ok_or_else(|| {
                        CompileError::catalog(format!(
                            "type '{ty}' advertises guarantee '{guarantee_name}' but has no impl for method '{}'",
                            method.name.node
                        ))
                    })?;
                    if !KNOWN_BUILTINS.contains(&builtin.as_str()) {
                        return Err(CompileError::catalog(format!("impl for ({ty}, {guarantee_name}, {}) references unknown builtin '{builtin}'", method.name.node)));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Merges the fixed prelude catalogs (in `math, cast, ordering, io` order,
/// fetched through `host` per the external-interfaces contract) with the
/// user program's declarations into a frozen `Symbols` table.
pub fn build_symbols(program: &Program, host: &dyn Host) -> Result<Symbols, CompileError> {
    let mut sym = Symbols::default();

    for name in catalog::prelude::NAMES {
        let text = host.prelude_catalog(name)?;
        let items = catalog::load_catalog(name, &text)?;
        for g in &items.guarantees {
            sym.add_guarantee(g)?;
        }
        for s in &items.sigs {
            sym.add_sig(s)?;
        }
        for i in &items.impls {
            sym.add_impl(i)?;
        }
    }

    // Guarantees, typegroups and sigs must all be visible before impls and
    // funcs are processed, so walk the program twice.
    for item in &program.items {
        match &item.node {
            TopLevel::Guarantee(g) => sym.add_guarantee(g)?,
            TopLevel::TypeGroup(t) => sym.add_typegroup(t)?,
            TopLevel::Sig(s) => sym.add_sig(s)?,
            _ => {}
        }
    }
    for item in &program.items {
        match &item.node {
            TopLevel::Register(r) => sym.add_register(r)?,
            TopLevel::Impl(i) => sym.add_impl(i)?,
            TopLevel::Func(f) => sym.add_func(f)?,
            _ => {}
        }
    }

    sym.validate_catalog()?;
    Ok(sym)
}
