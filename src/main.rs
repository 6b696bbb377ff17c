//! hunkscope: structured git diffs for diff viewers.
//!
//! This is the main entry point for the `hunkscope` CLI. It parses
//! arguments, sets up logging on stderr, runs the diff and maps usage
//! errors to exit codes. Stdout only ever carries one JSON document.

use hunkscope::cli::Cli;
use hunkscope::commands;
use hunkscope::diff::DiffReport;
use hunkscope::error::DiffError;
use hunkscope::exit_codes;
use std::process::ExitCode;
use tracing::Level;

fn main() -> ExitCode {
    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(err) => return fail(err),
    };

    init_logging(cli.log_level());

    match commands::run(&cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => fail(err),
    }
}

/// Log to stderr so stdout stays machine-readable.
fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Report an error as JSON and return its exit code.
///
/// If stdout itself is unusable the error goes to stderr instead.
fn fail(err: DiffError) -> ExitCode {
    if let DiffError::Output(_) = err {
        eprintln!("Error: {}", err);
        return ExitCode::from(err.exit_code() as u8);
    }

    match commands::print_report(&DiffReport::error(err.to_string()), false) {
        Ok(()) => ExitCode::from(err.exit_code() as u8),
        Err(write_err) => fail(DiffError::Output(write_err)),
    }
}
