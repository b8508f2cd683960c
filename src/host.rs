use crate::catalog::prelude;
use crate::diagnostics::CompileError;
use std::fs;
use std::path::{Path, PathBuf};

/// External collaborator supplying source text, prelude catalog text, and
/// an output/diagnostics sink. The core never touches a filesystem or
/// stdout directly; every side effect runs through a `Host`.
pub trait Host {
    fn source(&self) -> &str;
    fn prelude_catalog(&self, name: &str) -> Result<String, CompileError>;
    fn emit_line(&mut self, line: &str);
}

/// In-memory host backed by the four catalogs compiled into the binary.
/// Used by tests and by embeddable consumers that don't want to touch disk.
pub struct StringHost {
    source: String,
    lines: Vec<String>,
}

impl StringHost {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), lines: Vec::new() }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Host for StringHost {
    fn source(&self) -> &str {
        &self.source
    }

    fn prelude_catalog(&self, name: &str) -> Result<String, CompileError> {
        prelude::text(name).map(str::to_string).ok_or_else(|| CompileError::catalog(format!("unknown prelude catalog '{name}'")))
    }

    fn emit_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Filesystem-backed host used by the CLI: reads a source file and a
/// catalog directory, writes program output straight to stdout.
pub struct FsHost {
    source: String,
    catalog_dir: PathBuf,
}

impl FsHost {
    pub fn load(source_path: &Path, catalog_dir: &Path) -> std::io::Result<Self> {
        let source = fs::read_to_string(source_path)?;
        Ok(Self { source, catalog_dir: catalog_dir.to_path_buf() })
    }
}

impl Host for FsHost {
    fn source(&self) -> &str {
        &self.source
    }

    fn prelude_catalog(&self, name: &str) -> Result<String, CompileError> {
        let path = self.catalog_dir.join(format!("{name}.json"));
        fs::read_to_string(&path).map_err(|e| CompileError::catalog(format!("failed to read catalog '{}': {e}", path.display())))
    }

    fn emit_line(&mut self, line: &str) {
        println!("{line}");
    }
}
