//! MiniSoft compiler - semantic analysis and quadruple generation
//!
//! Usage: msc [OPTIONS] <input>

use anyhow::{Context, Result};
use clap::{ArgAction, Parser as ClapParser};
use minisoft_compiler::{CompilerConfig, DiagnosticReporter, Pipeline};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "msc")]
#[command(author = "MiniSoft Team")]
#[command(version)]
#[command(about = "MiniSoft compiler: type checking and three-address code", long_about = None)]
struct Args {
    /// Input source file
    #[arg(required = true)]
    input: PathBuf,

    /// Write the quadruple listing to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump the symbol table
    #[arg(long)]
    dump_symbols: bool,

    /// Dump the quadruple listing to stderr
    #[arg(long)]
    dump_ir: bool,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `Ok(false)` when the program has diagnostics
fn run(args: &Args) -> Result<bool> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    let config = CompilerConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        dump_symbols: args.dump_symbols,
        dump_ir: args.dump_ir,
        verbose: args.verbose > 0,
    };
    let pipeline = Pipeline::new(config);

    let compilation = match pipeline.compile(&source) {
        Ok(compilation) => compilation,
        Err(err) => {
            reporter.report_error(file_id, &err);
            return Ok(false);
        }
    };

    if let Some(tokens) = &compilation.token_dump {
        eprintln!("=== Tokens ===");
        eprint!("{}", tokens);
        eprintln!("=== End Tokens ===\n");
    }
    if let Some(ast) = &compilation.ast_dump {
        eprintln!("=== AST ===");
        eprintln!("{}", ast);
        eprintln!("=== End AST ===\n");
    }
    if pipeline.config().dump_symbols {
        if let Some(symbols) = compilation.symbol_dump() {
            eprintln!("=== Symbols ===");
            eprint!("{}", symbols);
            eprintln!("=== End Symbols ===\n");
        }
    }

    for diagnostic in &compilation.diagnostics {
        reporter.report_diagnostic(file_id, diagnostic);
    }

    let Some(listing) = compilation.ir_listing() else {
        eprintln!(
            "Compilation failed with {} error(s).",
            compilation.diagnostics.len()
        );
        return Ok(false);
    };

    if pipeline.config().dump_ir {
        eprintln!("=== IR ===");
        eprint!("{}", listing);
        eprintln!("=== End IR ===\n");
    }

    println!("Compilation successful!");
    match &args.output {
        Some(path) => {
            fs::write(path, &listing)
                .with_context(|| format!("cannot write {}", path.display()))?;
            if args.verbose > 0 {
                eprintln!("Wrote quadruples to {}", path.display());
            }
        }
        None => print!("{}", listing),
    }

    Ok(true)
}
