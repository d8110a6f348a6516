//! `arbiter report <log.jsonl>`: per-configuration metrics and ablation
//! deltas against a baseline configuration.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::{error, info, warn};

use arbiter_core::report::DEFAULT_BASELINE;
use arbiter_core::{
    ablation_deltas, aggregate_by_configuration, read_decision_log, AblationComparison,
    AggregatedMetrics,
};
use arbiter_types::ArbiterResult;

use super::write_json;
use crate::error::{exit_code_for_error, CliExitCode};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Decision log written by `score --log` or `rank --log`
    pub log: PathBuf,

    /// Configuration the ablation deltas are measured against
    #[arg(long, default_value = DEFAULT_BASELINE)]
    pub baseline: String,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub records: usize,
    pub configurations: Vec<AggregatedMetrics>,
    pub ablations: Vec<AblationComparison>,
}

pub fn build_report(args: &ReportArgs) -> ArbiterResult<Report> {
    let file = File::open(&args.log)?;
    let records = read_decision_log(BufReader::new(file))?;
    if records.is_empty() {
        warn!("{} holds no decision records", args.log.display());
    }
    let aggregated = aggregate_by_configuration(&records);
    let ablations = ablation_deltas(&aggregated, &args.baseline);
    info!(
        "{} records across {} configurations",
        records.len(),
        aggregated.len()
    );
    Ok(Report {
        records: records.len(),
        configurations: aggregated.into_values().collect(),
        ablations,
    })
}

pub fn handle_report(args: ReportArgs) -> i32 {
    let result = build_report(&args)
        .and_then(|report| write_json(&mut io::stdout().lock(), &report, true));
    match result {
        Ok(()) => CliExitCode::Success.into(),
        Err(e) => {
            error!("report failed for {}: {e}", args.log.display());
            exit_code_for_error(&e).into()
        }
    }
}
