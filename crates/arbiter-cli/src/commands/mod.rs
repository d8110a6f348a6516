//! CLI command handlers
//!
//! # Modules
//!
//! - `score`: one decision cycle over a single context
//! - `rank`: independent cycles over a batch of contexts
//! - `report`: per-configuration metrics and ablation deltas from a log
//!
//! Handlers return the process exit code; see `crate::error`.

pub mod rank;
pub mod report;
pub mod score;

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::debug;

use arbiter_core::{ArbitrationEngine, DecisionLogWriter};
use arbiter_types::{ArbiterError, ArbiterResult, EngineConfig, ReferenceTables, ScoringContext};

/// Options shared by every command that builds an engine.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Reference tables JSON (measurability, correlations, observations).
    /// Defaults to the built-in energy/exploration/affinity baseline.
    #[arg(long, global = true)]
    pub tables: Option<PathBuf>,

    /// Engine configuration JSON. Missing fields take their defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Read a whole file, tagging the error with its path.
pub fn read_file(path: &Path) -> ArbiterResult<String> {
    fs::read_to_string(path).map_err(|e| {
        ArbiterError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })
}

pub fn load_engine(args: &EngineArgs) -> ArbiterResult<ArbitrationEngine> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json(&read_file(path)?)?,
        None => EngineConfig::default(),
    };
    let tables = match &args.tables {
        Some(path) => ReferenceTables::from_json(&read_file(path)?)?,
        None => ReferenceTables::baseline(),
    };
    debug!(
        "engine '{}': {} profiles, {} correlations, {} observation series",
        config.label,
        tables.measurability.len(),
        tables.correlations.len(),
        tables.observations.len()
    );
    ArbitrationEngine::new(config, &tables)
}

/// Open `path` for appending decision records, creating it if needed.
pub fn open_log(path: &Path) -> ArbiterResult<DecisionLogWriter<BufWriter<File>>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(DecisionLogWriter::new(BufWriter::new(file)))
}

/// Scenario id written to the decision log.
///
/// A context's own `scenarioId` wins inside a batch (`index` set); for a
/// single context the explicit `--scenario` value wins. The fallback is
/// `<explicit or "batch">-<index>` in a batch and `tick-<tick>` otherwise.
pub fn scenario_id(explicit: Option<&str>, ctx: &ScoringContext, index: Option<usize>) -> String {
    match index {
        Some(i) => ctx
            .scenario_id
            .clone()
            .unwrap_or_else(|| format!("{}-{i}", explicit.unwrap_or("batch"))),
        None => explicit
            .map(str::to_string)
            .or_else(|| ctx.scenario_id.clone())
            .unwrap_or_else(|| format!("tick-{}", ctx.tick)),
    }
}

/// Serialize `value` as one JSON document followed by a newline.
pub fn write_json<W: Write, T: Serialize>(
    out: &mut W,
    value: &T,
    pretty: bool,
) -> ArbiterResult<()> {
    let result = if pretty {
        serde_json::to_writer_pretty(&mut *out, value)
    } else {
        serde_json::to_writer(&mut *out, value)
    };
    result.map_err(std::io::Error::from)?;
    out.write_all(b"\n")?;
    Ok(())
}
