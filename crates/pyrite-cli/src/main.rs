//! Pyrite compiler CLI.
//!
//! Provides the `pyrite` binary. The `compile` subcommand reads a parsed
//! syntax tree (JSON), lowers it to the operation tree, verifies it, runs
//! the optimizer pipeline when requested, and emits the textual operation
//! tree dump.
//!
//! The lexer and parser live outside this workspace; the expected input is
//! their serialized output.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pyrite_frontend::{Converter, SyntaxTree};
use pyrite_optimizer::{create_canonicalizer, create_erase_unused_functions, Optimizer};
use pyrite_semantizer::{verify_dominance, Semantizer};

/// Pyrite compiler and tools.
#[derive(Parser)]
#[command(name = "pyrite", about = "Pyrite compiler and tools")]
struct Cli {
    /// Log verbosity; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Lower a syntax tree to a verified (and optionally optimized)
    /// operation tree.
    Compile {
        /// Path to the serialized syntax tree (JSON).
        input: PathBuf,

        /// Run the default optimization pipeline.
        #[arg(long)]
        opt: bool,

        /// Iteration bound of the fixed-point driver.
        #[arg(long, default_value_t = 100)]
        iter_limit: usize,

        /// Also check operand dominance after verification.
        #[arg(long)]
        check_dominance: bool,

        /// Output file for the operation-tree dump (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compile {
            input,
            opt,
            iter_limit,
            check_dominance,
            output,
        } => {
            let exit_code = run_compile(&input, opt, iter_limit, check_dominance, output);
            process::exit(exit_code);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute the compile subcommand.
///
/// Returns exit code: 0 = success, 1 = converter error,
/// 2 = semantizer error, 3 = I/O error.
fn run_compile(
    input: &PathBuf,
    opt: bool,
    iter_limit: usize,
    check_dominance: bool,
    output: Option<PathBuf>,
) -> i32 {
    let text = match fs::read_to_string(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", input.display(), e);
            return 3;
        }
    };

    let syntax_tree: SyntaxTree = match serde_json::from_str(&text) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Error: failed to parse '{}': {}", input.display(), e);
            return 3;
        }
    };

    let mut program = match Converter::process(&syntax_tree) {
        Ok(program) => program,
        Err(errors) => {
            eprintln!("Conversion failed with {} error(s):", errors.len());
            for error in errors.iter() {
                eprintln!("  - {}", error);
            }
            return 1;
        }
    };
    tracing::info!("conversion finished");

    if let Err(errors) = Semantizer::process(&program) {
        eprintln!("Verification failed with {} error(s):", errors.len());
        for error in errors.iter() {
            eprintln!("  - {}", error);
        }
        return 2;
    }
    if check_dominance {
        if let Err(errors) = verify_dominance(&program.tree, program.root) {
            eprintln!("Dominance check failed with {} error(s):", errors.len());
            for error in errors.iter() {
                eprintln!("  - {}", error);
            }
            return 2;
        }
    }
    tracing::info!("verification finished");

    if opt {
        let mut optimizer = Optimizer::with_iter_limit(iter_limit);
        optimizer.add(create_canonicalizer());
        optimizer.add(create_erase_unused_functions());
        optimizer.process(&mut program);
        tracing::info!("optimization finished");

        // Rewrites must not break well-formedness.
        if let Err(errors) = Semantizer::process(&program) {
            eprintln!(
                "Verification after optimization failed with {} error(s):",
                errors.len()
            );
            for error in errors.iter() {
                eprintln!("  - {}", error);
            }
            return 2;
        }
    }

    let dump = program.dump();
    match output {
        Some(path) => {
            if let Err(e) = fs::write(&path, dump) {
                eprintln!("Error: failed to write '{}': {}", path.display(), e);
                return 3;
            }
        }
        None => print!("{dump}"),
    }
    0
}
