use crate::diagnostics::CompileError;
use crate::parser::ast::{GuaranteeDecl, ImplDecl, MethodSig, RequireClause, SigDecl, TypeRef};
use crate::span::{Span, Spanned};
use serde_json::Value;

/// The four fixed prelude catalogs, embedded so a `Host` can serve them
/// without touching the filesystem (see `crate::host::StringHost`).
pub mod prelude {
    pub const MATH: &str = include_str!("prelude/math.json");
    pub const CAST: &str = include_str!("prelude/cast.json");
    pub const ORDERING: &str = include_str!("prelude/ordering.json");
    pub const IO: &str = include_str!("prelude/io.json");

    pub const NAMES: [&str; 4] = ["math", "cast", "ordering", "io"];

    pub fn text(name: &str) -> Option<&'static str> {
        match name {
            "math" => Some(MATH),
            "cast" => Some(CAST),
            "ordering" => Some(ORDERING),
            "io" => Some(IO),
            _ => None,
        }
    }
}

/// Declarations parsed out of a single catalog file.
#[derive(Debug, Default)]
pub struct CatalogItems {
    pub guarantees: Vec<GuaranteeDecl>,
    pub impls: Vec<ImplDecl>,
    pub sigs: Vec<SigDecl>,
}

/// Parses one catalog JSON document (`{"guarantees": [...], "impls": [...], "sigs": [...]}`)
/// into AST declarations. `catalog_name` is only used to name the offending node in errors.
pub fn load_catalog(catalog_name: &str, json_text: &str) -> Result<CatalogItems, CompileError> {
    let root: Value = serde_json::from_str(json_text)
        .map_err(|e| CompileError::catalog(format!("{catalog_name}: invalid JSON: {e}")))?;
    let obj = root
        .as_object()
        .ok_or_else(|| CompileError::catalog(format!("{catalog_name}: catalog root must be an object")))?;

    let mut items = CatalogItems::default();

    for raw in array_field(obj, "guarantees", catalog_name)? {
        items.guarantees.push(parse_guarantee(raw, catalog_name)?);
    }
    for raw in array_field(obj, "impls", catalog_name)? {
        items.impls.push(parse_impl(raw, catalog_name)?);
    }
    for raw in array_field(obj, "sigs", catalog_name)? {
        items.sigs.push(parse_sig(raw, catalog_name)?);
    }

    Ok(items)
}

fn array_field<'a>(
    obj: &'a serde_json::Map<String, Value>,
    key: &str,
    catalog_name: &str,
) -> Result<&'a [Value], CompileError> {
    match obj.get(key) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(CompileError::catalog(format!("{catalog_name}: '{key}' must be an array"))),
    }
}

fn str_field(obj: &serde_json::Map<String, Value>, key: &str, catalog_name: &str) -> Result<String, CompileError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(CompileError::catalog(format!("{catalog_name}: missing or non-string field '{key}'"))),
    }
}

fn spanned(name: String) -> Spanned<String> {
    Spanned::new(name, Span::dummy())
}

fn type_ref(v: &Value, catalog_name: &str) -> Result<TypeRef, CompileError> {
    match v {
        Value::String(s) => Ok(TypeRef::new(s.clone())),
        Value::Object(map) => match map.get("ref") {
            Some(Value::String(s)) => Ok(TypeRef::new(s.clone())),
            _ => Err(CompileError::catalog(format!("{catalog_name}: type ref object missing string 'ref'"))),
        },
        other => Err(CompileError::catalog(format!("{catalog_name}: invalid type ref {other}"))),
    }
}

fn parse_guarantee(v: &Value, catalog_name: &str) -> Result<GuaranteeDecl, CompileError> {
    let obj = v
        .as_object()
        .ok_or_else(|| CompileError::catalog(format!("{catalog_name}: guarantee entry must be an object")))?;
    let name = str_field(obj, "name", catalog_name)?;
    let methods_raw = array_field(obj, "methods", catalog_name)?;
    let mut methods = Vec::with_capacity(methods_raw.len());
    for m in methods_raw {
        let mobj = m
            .as_object()
            .ok_or_else(|| CompileError::catalog(format!("{catalog_name}: method entry must be an object")))?;
        let mname = str_field(mobj, "name", catalog_name)?;
        let params_raw = array_field(mobj, "params", catalog_name)?;
        let mut params = Vec::with_capacity(params_raw.len());
        for p in params_raw {
            params.push(type_ref(p, catalog_name)?);
        }
        let ret = mobj
            .get("ret")
            .ok_or_else(|| CompileError::catalog(format!("{catalog_name}: method '{mname}' missing 'ret'")))?;
        let ret = type_ref(ret, catalog_name)?;
        methods.push(MethodSig { name: spanned(mname), params, ret });
    }
    Ok(GuaranteeDecl { name: spanned(name), methods })
}

fn parse_impl(v: &Value, catalog_name: &str) -> Result<ImplDecl, CompileError> {
    let obj = v
        .as_object()
        .ok_or_else(|| CompileError::catalog(format!("{catalog_name}: impl entry must be an object")))?;
    Ok(ImplDecl {
        ty: spanned(str_field(obj, "type", catalog_name)?),
        guarantee: spanned(str_field(obj, "guarantee", catalog_name)?),
        method: spanned(str_field(obj, "method", catalog_name)?),
        builtin: spanned(str_field(obj, "builtin", catalog_name)?),
    })
}

fn parse_sig(v: &Value, catalog_name: &str) -> Result<SigDecl, CompileError> {
    let obj = v
        .as_object()
        .ok_or_else(|| CompileError::catalog(format!("{catalog_name}: sig entry must be an object")))?;
    let name = str_field(obj, "name", catalog_name)?;

    let params_raw = array_field(obj, "params", catalog_name)?;
    let mut params = Vec::with_capacity(params_raw.len());
    for p in params_raw {
        params.push(type_ref(p, catalog_name)?);
    }

    let ret = obj
        .get("ret")
        .ok_or_else(|| CompileError::catalog(format!("{catalog_name}: sig '{name}' missing 'ret'")))?;
    let ret = type_ref(ret, catalog_name)?;

    let mut requires = Vec::new();
    for r in array_field(obj, "requires", catalog_name)? {
        requires.push(parse_require(r, catalog_name)?);
    }

    let mut failures = Vec::new();
    for f in array_field(obj, "failures", catalog_name)? {
        match f.as_str() {
            Some(s) => failures.push(spanned(s.to_string())),
            None => return Err(CompileError::catalog(format!("{catalog_name}: sig '{name}' failure name must be a string"))),
        }
    }

    let mut attrs = Vec::new();
    for a in array_field(obj, "attrs", catalog_name)? {
        match a.as_str() {
            Some(s) => attrs.push(s.to_string()),
            None => return Err(CompileError::catalog(format!("{catalog_name}: sig '{name}' attr must be a string"))),
        }
    }

    // The 'builtin' key must be present (string or explicit null); a missing key is rejected.
    let builtin = match obj.get("builtin") {
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(CompileError::catalog(format!("{catalog_name}: sig '{name}' 'builtin' must be a string or null"))),
        None => return Err(CompileError::catalog(format!("{catalog_name}: sig '{name}' is missing the 'builtin' key"))),
    };

    Ok(SigDecl { name: spanned(name), params, ret, requires, failures, attrs, builtin })
}

fn parse_require(v: &Value, catalog_name: &str) -> Result<RequireClause, CompileError> {
    let obj = v
        .as_object()
        .ok_or_else(|| CompileError::catalog(format!("{catalog_name}: require entry must be an object")))?;
    let kind = str_field(obj, "kind", catalog_name)?;
    let type_var = spanned(str_field(obj, "type_var", catalog_name)?);
    match kind.as_str() {
        "in" => Ok(RequireClause::RequireIn { type_var, group: spanned(str_field(obj, "group", catalog_name)?) }),
        "guarantees" => {
            Ok(RequireClause::RequireGuarantees { type_var, guarantee: spanned(str_field(obj, "guarantee", catalog_name)?) })
        }
        other => Err(CompileError::catalog(format!("{catalog_name}: unknown require kind '{other}'"))),
    }
}
