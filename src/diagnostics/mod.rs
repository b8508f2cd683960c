use crate::span::Span;
use thiserror::Error;

/// Every fatal error the pipeline can surface to a Rust caller.
///
/// Dynamic failures (`RaisedFailure`) are a separate, evaluator-internal
/// control-flow type (see `crate::eval::RaisedFailure`) and never appear
/// here unless they escape a program entirely unhandled, in which case
/// they are reported as a diagnostic warning, not a `CompileError`.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("syntax error: {msg}")]
    Syntax { msg: String, span: Span },

    #[error("type error: {msg}")]
    Type { msg: String, span: Span },

    #[error("catalog error: {msg}")]
    Catalog { msg: String },

    #[error("eval error: {msg}")]
    Eval { msg: String, span: Span },
}

impl CompileError {
    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span }
    }

    pub fn type_err(msg: impl Into<String>, span: Span) -> Self {
        Self::Type { msg: msg.into(), span }
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog { msg: msg.into() }
    }

    pub fn eval(msg: impl Into<String>, span: Span) -> Self {
        Self::Eval { msg: msg.into(), span }
    }

    /// Best-effort span for diagnostic rendering; catalog errors have none.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Syntax { span, .. }
            | CompileError::Type { span, .. }
            | CompileError::Eval { span, .. } => Some(*span),
            CompileError::Catalog { .. } => None,
        }
    }
}

/// Diagnostic levels emitted by the checker; never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Warning,
    Note,
}

/// Known diagnostic codes, kept as an enum rather than a bare string so
/// adding one is a compile-time decision, matching the fixed registry in
/// the specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    UnhandledFailures,
}

impl Code {
    fn as_str(self) -> &'static str {
        match self {
            Code::UnhandledFailures => "UNHANDLED_FAILURES",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
}

/// Append-only collector for non-fatal diagnostics, drained by the host
/// after checking. Generalizes the reference codebase's single-purpose
/// `CompileWarning` collection with a diagnostic code.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, code: Code, message: impl Into<String>, span: Option<Span>) {
        self.items.push(Diagnostic { level: Level::Warning, code, message: message.into(), span });
    }

    pub fn note(&mut self, code: Code, message: impl Into<String>, span: Option<Span>) {
        self.items.push(Diagnostic { level: Level::Note, code, message: message.into(), span });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

/// Render a `CompileError` with ariadne for terminal output.
pub fn render_error(source: &str, err: &CompileError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err.span() {
        Some(span) => {
            Report::build(ReportKind::Error, (), span.start)
                .with_message(err.to_string())
                .with_label(Label::new(span.start..span.end).with_message(err.to_string()))
                .finish()
                .eprint(Source::from(source))
                .unwrap();
        }
        None => eprintln!("error: {err}"),
    }
}

/// Render a single diagnostic with ariadne (yellow for warnings).
pub fn render_diagnostic(source: &str, diag: &Diagnostic) {
    use ariadne::{Label, Report, ReportKind, Source};

    let kind = match diag.level {
        Level::Warning => ReportKind::Warning,
        Level::Note => ReportKind::Advice,
    };

    match diag.span {
        Some(span) => {
            Report::build(kind, (), span.start)
                .with_message(format!("{}: {}", diag.code.as_str(), diag.message))
                .with_label(Label::new(span.start..span.end).with_message(&diag.message))
                .finish()
                .eprint(Source::from(source))
                .unwrap();
        }
        None => eprintln!("{}[{}]: {}", level_str(diag.level), diag.code.as_str(), diag.message),
    }
}

fn level_str(level: Level) -> &'static str {
    match level {
        Level::Warning => "warning",
        Level::Note => "note",
    }
}
