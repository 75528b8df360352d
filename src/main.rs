//! # jobscope
//!
//! A command-line tool over the itjobs.pt listings API. It fetches postings,
//! normalizes their loosely structured records, and derives views from them:
//! top-N listings, part-time search, remote/hybrid/on-site classification,
//! skill frequencies over a date range and zone × job-type statistics.
//! Single postings can be enriched with their employer's Teamlyzer profile.
//!
//! ## Usage
//!
//! ```sh
//! export ITJOBS_API_KEY=...
//! jobscope top 10 --csv
//! jobscope skills 2024-01-01 2024-03-31
//! RUST_LOG=jobscope=debug jobscope get jobID 123456
//! ```
//!
//! ## Architecture
//!
//! | Module | Role |
//! |--------|------|
//! | [`api`] | listings client and the `JobListings` seam |
//! | [`scrapers`] | HTML fetching, the `Page` query wrapper, Teamlyzer |
//! | [`normalize`] | date parsing and field extraction into `NormalizedJob` |
//! | [`analysis`] | employment mode, skill counts, zone tally, tag ranking |
//! | [`outputs`] | pretty JSON and CSV writers |
//! | [`commands`] | one handler per subcommand |
//!
//! Results go to stdout as JSON; logs go to stderr.

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod api;
mod cli;
mod commands;
mod config;
mod error;
mod models;
mod normalize;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(?args.command, config = ?args.config, "Parsed CLI arguments");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_user_error() {
                error!(error = %e, "Command failed");
            }
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[instrument(level = "debug", skip_all)]
async fn run(args: Cli) -> error::Result<()> {
    let config = Config::load(args.config.as_deref(), args.api_key)?;
    commands::run(args.command, &config).await
}
