//! `arbiter score <context.json>`: one decision cycle.

use std::io;
use std::path::PathBuf;

use clap::Args;
use tracing::{error, info, warn};

use arbiter_types::{ArbiterResult, DecisionLogRecord, ScoringContext};

use super::{load_engine, open_log, read_file, scenario_id, write_json, EngineArgs};
use crate::error::{exit_code_for_error, CliExitCode};

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Scoring context JSON file
    pub context: PathBuf,

    /// Append a decision record to this NDJSON log
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Scenario id for the decision record
    #[arg(long)]
    pub scenario: Option<String>,

    /// Print the outcome on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Exit code: 0 success, 1 invalid context/config/tables, 2 I/O failure.
pub fn handle_score(engine_args: &EngineArgs, args: ScoreArgs) -> i32 {
    match run(engine_args, &args, &mut io::stdout().lock()) {
        Ok(()) => CliExitCode::Success.into(),
        Err(e) => {
            error!("score failed for {}: {e}", args.context.display());
            exit_code_for_error(&e).into()
        }
    }
}

fn run(engine_args: &EngineArgs, args: &ScoreArgs, out: &mut impl io::Write) -> ArbiterResult<()> {
    let engine = load_engine(engine_args)?;
    let ctx = ScoringContext::from_json(&read_file(&args.context)?)?;
    let outcome = engine.run_cycle(&ctx)?;

    match &outcome.primary {
        Some(primary) => info!("tick {}: primary goal '{primary}'", outcome.tick),
        None => warn!("tick {}: every candidate was vetoed", outcome.tick),
    }
    write_json(out, &outcome, !args.compact)?;

    if let Some(path) = &args.log {
        let id = scenario_id(args.scenario.as_deref(), &ctx, None);
        let mut log = open_log(path)?;
        log.append(&DecisionLogRecord::from_outcome(
            id,
            engine.config().label.as_str(),
            &outcome,
        ))?;
        log.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CONTEXT: &str = r#"{
        "scenarioId": "energy-crisis",
        "goals": [
            {"id": "energy", "importance": 0.9, "satisfaction": 0.1},
            {"id": "exploration", "importance": 0.6, "satisfaction": 0.5},
            {"id": "affinity", "importance": 0.3, "satisfaction": 0.2}
        ],
        "modulators": [{"name": "arousal", "intensity": 0.8}],
        "metagoals": ["coherence"],
        "tick": 3
    }"#;

    fn args(context: PathBuf, log: Option<PathBuf>) -> ScoreArgs {
        ScoreArgs {
            context,
            log,
            scenario: None,
            compact: true,
        }
    }

    #[test]
    fn test_score_prints_outcome_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let ctx_path = dir.path().join("ctx.json");
        let log_path = dir.path().join("decisions.jsonl");
        fs::write(&ctx_path, CONTEXT).unwrap();

        let mut out = Vec::new();
        let a = args(ctx_path, Some(log_path.clone()));
        run(&EngineArgs::default(), &a, &mut out).unwrap();
        run(&EngineArgs::default(), &a, &mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        let first: serde_json::Value =
            serde_json::from_str(printed.lines().next().unwrap()).unwrap();
        assert_eq!(first["primary"], "energy");
        assert_eq!(first["tick"], 3);

        let log = fs::read_to_string(&log_path).unwrap();
        assert_eq!(log.lines().count(), 2);
        let record: DecisionLogRecord = serde_json::from_str(log.lines().next().unwrap()).unwrap();
        assert_eq!(record.scenario_id, "energy-crisis");
        assert_eq!(record.configuration, "full-system");
        assert_eq!(record.plan[0], "energy");
    }

    #[test]
    fn test_invalid_context_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let ctx_path = dir.path().join("ctx.json");
        fs::write(&ctx_path, r#"{"goals": []}"#).unwrap();
        assert_eq!(handle_score(&EngineArgs::default(), args(ctx_path, None)), 1);
    }

    #[test]
    fn test_missing_context_exits_two() {
        let dir = tempfile::tempdir().unwrap();
        let ctx_path = dir.path().join("absent.json");
        assert_eq!(handle_score(&EngineArgs::default(), args(ctx_path, None)), 2);
    }
}
