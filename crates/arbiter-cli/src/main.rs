// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Command-Line Interface
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! `arbiter` — score, rank and report on goal arbitration contexts.
//!
//! # Commands
//!
//! - `score`: run one decision cycle over a context JSON file
//! - `rank`: run a batch of contexts (JSON array or NDJSON)
//! - `report`: aggregate a decision log by configuration with ablation deltas
//!
//! Exit codes: 0 on success, 1 on validation or configuration failure,
//! 2 on I/O failure.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod error;

/// Goal arbitration scoring engine
#[derive(Parser)]
#[command(name = "arbiter")]
#[command(version)]
#[command(about = "Score and rank competing goals for an autonomous agent")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    engine: commands::EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one decision cycle and print the ranked outcome as JSON
    Score(commands::score::ScoreArgs),
    /// Run every context of a batch file and print one outcome per line
    Rank(commands::rank::RankArgs),
    /// Aggregate a decision log by configuration
    Report(commands::report::ReportArgs),
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Score(args) => commands::score::handle_score(&cli.engine, args),
        Commands::Rank(args) => commands::rank::handle_rank(&cli.engine, args),
        Commands::Report(args) => commands::report::handle_report(args),
    };

    std::process::exit(exit_code);
}
