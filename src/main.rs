use clap::{Parser, Subcommand};
use covenant::catalog::prelude;
use covenant::diagnostics::{render_diagnostic, render_error, CompileError};
use covenant::host::Host;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "covenant", about = "The covenant interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lex, parse, lower, check and evaluate a source file
    Run {
        /// Source file path
        file: PathBuf,
        /// Prelude catalog directory; omit to use the bundled prelude
        #[arg(short, long)]
        catalog_dir: Option<PathBuf>,
    },
}

/// The CLI's own `Host`: source and prelude come from disk (or the
/// embedded prelude when no catalog directory is given), output goes
/// straight to stdout.
struct CliHost {
    source: String,
    catalog_dir: Option<PathBuf>,
}

impl Host for CliHost {
    fn source(&self) -> &str {
        &self.source
    }

    fn prelude_catalog(&self, name: &str) -> Result<String, CompileError> {
        match &self.catalog_dir {
            Some(dir) => {
                let path = dir.join(format!("{name}.json"));
                std::fs::read_to_string(&path)
                    .map_err(|e| CompileError::catalog(format!("failed to read catalog '{}': {e}", path.display())))
            }
            None => prelude::text(name).map(str::to_string).ok_or_else(|| CompileError::catalog(format!("unknown prelude catalog '{name}'"))),
        }
    }

    fn emit_line(&mut self, line: &str) {
        println!("{line}");
    }
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { file, catalog_dir } => run_file(&file, catalog_dir),
    }
}

fn run_file(file: &std::path::Path, catalog_dir: Option<PathBuf>) {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read '{}': {e}", file.display());
            std::process::exit(1);
        }
    };

    let mut host = CliHost { source: source.clone(), catalog_dir };

    match covenant::run(&mut host) {
        Ok(diags) => {
            for diag in diags.iter() {
                render_diagnostic(&source, diag);
            }
        }
        Err(err) => {
            render_error(&source, &err);
            std::process::exit(1);
        }
    }
}
