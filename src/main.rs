//! `untracker` binary.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use untracker::cli::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.into_builder().run() {
        Ok(report) => {
            tracing::info!(
                written = report.written().len(),
                silent = report.silent().len(),
                failed = report.failed().len(),
                "Stem extraction completed successfully"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
