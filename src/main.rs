//! Application entry point.
//!
//! Parses command-line arguments, merges configuration, and delegates
//! execution to [`runner::run`].

use diplomat::{cli, runner};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn init_logging(verbose: bool) {
    let max_level = if verbose { Level::DEBUG } else { Level::ERROR };
    fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let (parsed, matches) = match cli::parse_from(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => err.exit(),
    };
    let cli = match cli::merge_with_config(&parsed, &matches) {
        Ok(merged) => merged.with_default_command(),
        Err(err) => {
            init_logging(parsed.verbose);
            tracing::error!(error = %err, "configuration failed");
            return ExitCode::FAILURE;
        }
    };
    init_logging(cli.verbose);
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "runner failed");
            ExitCode::FAILURE
        }
    }
}
