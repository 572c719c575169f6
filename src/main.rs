//! housekeep - Main entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use housekeep::cli::Cli;

/// Initialize the logger; `RUST_LOG` overrides the verbosity flags.
fn init_logger(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Help and version go to stdout and are not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logger(cli.verbose);
    debug!("CLI arguments parsed: {:?}", cli);

    match housekeep::commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("command failed: {:?}", e);
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
