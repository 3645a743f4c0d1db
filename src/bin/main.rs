//! Command-line entry point: load a bytecode file and run it.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use timid_vm::Error;

/// Run a compiled bytecode file.
#[derive(Parser, Debug)]
#[command(name = "timid-vm")]
#[command(author = "Timid VM contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run a compiled bytecode file", long_about = None)]
struct Cli {
    /// Path to the bytecode file to load and run
    path: Option<PathBuf>,

    /// Enable verbose (debug-level) tracing
    #[arg(short, long, env = "TIMID_VM_VERBOSE")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("error: {err:#}");
        return ExitCode::from(1);
    }

    let Some(path) = cli.path else {
        return ExitCode::SUCCESS;
    };

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .context("failed to initialize logging")
}

fn run(path: &PathBuf) -> anyhow::Result<()> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    timid_vm::run(&bytes).map_err(anyhow::Error::from)
}

/// Map load errors to exit code 1 and runtime errors to exit code 2, per the
/// surfacing policy: print a human-readable message and abort.
fn report(err: anyhow::Error) -> ExitCode {
    eprintln!("error: {err:#}");
    match err.downcast_ref::<Error>() {
        Some(Error::Load(_)) => ExitCode::from(1),
        Some(Error::Runtime(_)) => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}
