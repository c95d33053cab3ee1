//! CMC - semantic analyzer for C-minus
//!
//! Usage: cmc [OPTIONS] <input>

use anyhow::Context;
use clap::Parser as ClapParser;
use cminus::common::DiagnosticReporter;
use cminus::{AnalysisConfig, Session};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "cmc")]
#[command(author = "CMC Team")]
#[command(version = "0.1.0")]
#[command(about = "Symbol table and semantic checks for C-minus programs", long_about = None)]
struct Args {
    /// Input source file (.cm)
    #[arg(required = true)]
    input: PathBuf,

    /// Skip the type-check pass
    #[arg(long)]
    no_type_check: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Returns whether the program analyzed cleanly
fn run(args: &Args) -> anyhow::Result<bool> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    if args.verbose {
        eprintln!("Analyzing {}", args.input.display());
    }

    let config = AnalysisConfig {
        type_check: !args.no_type_check,
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        verbose: args.verbose,
    };

    let output = match Session::new(config).run(&source) {
        Ok(output) => output,
        Err(e) => {
            reporter.report_error(file_id, &e);
            return Ok(false);
        }
    };

    output
        .diagnostics
        .emit(&mut io::stderr().lock())
        .context("failed to write diagnostics")?;
    print!("{}", output.report());

    Ok(output.can_proceed())
}
