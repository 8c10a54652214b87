//! Zipline - Self-Updating Zip-Bundle Launcher
//!
//! CLI entry point: parse flags, run the pipeline, map the outcome to an
//! exit code. The child's exit code passes through on success; launcher
//! failures use the stage-specific codes from `ZiplineError::exit_code`.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zipline::cli::Cli;
use zipline::run;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("zipline=warn"),
        1 => EnvFilter::new("zipline=info"),
        _ => EnvFilter::new("zipline=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run::run(&cli) {
        Ok(code) => ExitCode::from((code & 0xff) as u8),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}
