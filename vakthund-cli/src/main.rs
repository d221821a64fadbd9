//! ## vakthund-cli
//! **Benchmarking driver for the Vakthund signature scanner.**
//!
//! Implements spec §6's CLI contract: `vakthund-cli scan <a|d|p|h|b>
//! <rules-file> <capture-file>` builds the selected engine, runs one scan,
//! prints `[MATCH] pid <n> at <offset>` lines followed by the `Stats`
//! dump, and exits `0` on success or `1` on argument/IO error. The scan
//! path itself is synchronous (spec §5) — no async runtime is needed here.

use clap::Parser;
use std::process::ExitCode;

mod capture;
mod commands;
mod error;
mod rules;

use commands::{Cli, Commands};

fn main() -> ExitCode {
    vakthund_telemetry::EventLogger::init();
    let metrics = vakthund_telemetry::MetricsRecorder::new();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan(args) => commands::run_scan(args, &metrics),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
