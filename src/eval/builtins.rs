use super::{EvalResult, OrderingTag, RaisedFailure, Value};
use crate::effects::FailureId;
use crate::host::Host;

/// Dispatches a dotted builtin id to its implementation. `args` have
/// already been validated by the checker; an id missing from this match
/// can only mean the catalog-closure invariant was violated.
pub fn call_builtin(id: &str, args: &[Value], host: &mut dyn Host) -> EvalResult<Value> {
    match id {
        "core.int.add" => Ok(Value::Int(int(args, 0) + int(args, 1))),
        "core.float.add" => Ok(Value::Float(float(args, 0) + float(args, 1))),
        "core.int.sub" => Ok(Value::Int(int(args, 0) - int(args, 1))),
        "core.float.sub" => Ok(Value::Float(float(args, 0) - float(args, 1))),
        "core.int.mul" => Ok(Value::Int(int(args, 0) * int(args, 1))),
        "core.float.mul" => Ok(Value::Float(float(args, 0) * float(args, 1))),
        "core.int.neg" => Ok(Value::Int(-int(args, 0))),
        "core.float.neg" => Ok(Value::Float(-float(args, 0))),
        "core.float.div" => {
            let divisor = float(args, 1);
            if divisor == 0.0 {
                return Err(RaisedFailure(FailureId::DivideByZero));
            }
            Ok(Value::Float(float(args, 0) / divisor))
        }
        "core.int.toFloat" => Ok(Value::Float(int(args, 0) as f64)),
        "core.int.cmp" => Ok(Value::Ordering(cmp_tag(int(args, 0) as f64, int(args, 1) as f64))),
        "core.float.cmp" => Ok(Value::Ordering(cmp_tag(float(args, 0), float(args, 1)))),
        "core.int.print" => {
            host.emit_line(&int(args, 0).to_string());
            Ok(Value::Unit)
        }
        "core.float.print" => {
            host.emit_line(&format_float(float(args, 0)));
            Ok(Value::Unit)
        }
        "core.string.print" => {
            host.emit_line(string(args, 0));
            Ok(Value::Unit)
        }
        "core.ordering.print" => {
            host.emit_line(ordering_str(args, 0));
            Ok(Value::Unit)
        }
        other => unreachable!("builtin '{other}' is not registered: catalog closure invariant violated"),
    }
}

fn int(args: &[Value], i: usize) -> i64 {
    match &args[i] {
        Value::Int(n) => *n,
        other => unreachable!("expected Int argument, got {other:?}: checker invariant violated"),
    }
}

fn float(args: &[Value], i: usize) -> f64 {
    match &args[i] {
        Value::Float(n) => *n,
        other => unreachable!("expected Float argument, got {other:?}: checker invariant violated"),
    }
}

fn string(args: &[Value], i: usize) -> &str {
    match &args[i] {
        Value::String(s) => s,
        other => unreachable!("expected String argument, got {other:?}: checker invariant violated"),
    }
}

fn ordering_str(args: &[Value], i: usize) -> &'static str {
    match &args[i] {
        Value::Ordering(OrderingTag::Left) => "Left",
        Value::Ordering(OrderingTag::Flat) => "Flat",
        Value::Ordering(OrderingTag::Right) => "Right",
        other => unreachable!("expected Ordering argument, got {other:?}: checker invariant violated"),
    }
}

fn cmp_tag(a: f64, b: f64) -> OrderingTag {
    if a > b {
        OrderingTag::Left
    } else if a < b {
        OrderingTag::Right
    } else {
        OrderingTag::Flat
    }
}

/// Floats always print with a decimal point, matching `1.0` rather than
/// Rust's default `1` for whole-valued floats.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}
