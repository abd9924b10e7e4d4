//! monover - Dependency-aware release versioning for JavaScript monorepos
//!
//! Computes new versions for changed workspace packages and their dependents,
//! then rewrites every affected package.json in place.

use clap::Parser;
use monover::cli::CliArgs;
use monover::logging;
use monover::orchestrator::Orchestrator;
use std::io::{self, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(args.verbose);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    // Print version info in verbose mode
    if args.verbose {
        eprintln!("monover v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.path.display());
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let orchestrator = Orchestrator::new(args)?;

    let mut stdout = io::stdout().lock();
    orchestrator.run(&mut stdout).await?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
