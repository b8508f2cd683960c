use std::collections::HashSet;

/// The closed enumeration of dynamic failure kinds a sig may declare and
/// the evaluator may raise. `IOErr`, `TimeErr`, `RandomErr` and
/// `UnexpectedErr` are reserved: they round out the catalog's effect
/// vocabulary but no builtin in this surface produces them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureId {
    PrintErr,
    IOErr,
    TimeErr,
    RandomErr,
    DivideByZero,
    UnexpectedErr,
}

impl FailureId {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "PrintErr" => Some(Self::PrintErr),
            "IOErr" => Some(Self::IOErr),
            "TimeErr" => Some(Self::TimeErr),
            "RandomErr" => Some(Self::RandomErr),
            "DivideByZero" => Some(Self::DivideByZero),
            "UnexpectedErr" => Some(Self::UnexpectedErr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrintErr => "PrintErr",
            Self::IOErr => "IOErr",
            Self::TimeErr => "TimeErr",
            Self::RandomErr => "RandomErr",
            Self::DivideByZero => "DivideByZero",
            Self::UnexpectedErr => "UnexpectedErr",
        }
    }
}

impl std::fmt::Display for FailureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type FailureSet = HashSet<FailureId>;

/// Converts a sig's raw `failures` name list into a `FailureSet`.
/// `Never` denotes the empty set and may not be combined with other names;
/// duplicate names (other than `Never`) are rejected.
pub fn parse_failure_list(names: &[String]) -> Result<FailureSet, String> {
    if names.iter().any(|n| n == "Never") {
        if names.len() > 1 {
            return Err("'Never' may not be combined with other failure names".to_string());
        }
        return Ok(FailureSet::new());
    }
    let mut set = FailureSet::new();
    for n in names {
        let fid = FailureId::parse(n).ok_or_else(|| format!("unknown failure name '{n}'"))?;
        if !set.insert(fid) {
            return Err(format!("duplicate failure name '{n}'"));
        }
    }
    Ok(set)
}
