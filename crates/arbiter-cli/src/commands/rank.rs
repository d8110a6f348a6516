//! `arbiter rank <batch>`: independent cycles over a batch of contexts.
//!
//! The batch is either a JSON array of contexts or NDJSON with one
//! context per line. Output is NDJSON, one line per input context, in
//! input order: the outcome, or `{"index", "error"}` for a context that
//! failed to parse or to score. A failing context does not stop the
//! batch; only a file that is not a JSON array at all, or cannot be
//! read, fails the whole command.

use std::io;
use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use tracing::{error, info};

use arbiter_types::{ArbiterError, ArbiterResult, DecisionLogRecord, ScoringContext};

use super::{load_engine, open_log, read_file, scenario_id, write_json, EngineArgs};
use crate::error::{exit_code_for_error, CliExitCode};

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Batch file: JSON array or NDJSON of scoring contexts
    pub batch: PathBuf,

    /// Append one decision record per successful cycle to this NDJSON log
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Scenario id prefix for contexts without their own `scenarioId`
    #[arg(long)]
    pub scenario: Option<String>,
}

/// Parse a JSON array or NDJSON batch into one entry per context.
///
/// Entries that are not valid contexts are kept as errors in place so
/// the caller can report them by index.
pub fn parse_batch(text: &str) -> ArbiterResult<Vec<ArbiterResult<ScoringContext>>> {
    if text.trim_start().starts_with('[') {
        let items: Vec<serde_json::Value> = serde_json::from_str(text)
            .map_err(|e| ArbiterError::Configuration(format!("batch JSON parse error: {e}")))?;
        return Ok(items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value(item).map_err(|e| {
                    ArbiterError::Configuration(format!("batch element {i}: {e}"))
                })
            })
            .collect());
    }
    Ok(text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            ScoringContext::from_json(line).map_err(|e| {
                ArbiterError::Configuration(format!("batch line {}: {e}", i + 1))
            })
        })
        .collect())
}

/// Exit code: the most severe failure across the batch, 0 if none.
pub fn handle_rank(engine_args: &EngineArgs, args: RankArgs) -> i32 {
    match run(engine_args, &args, &mut io::stdout().lock()) {
        Ok(code) => code.into(),
        Err(e) => {
            error!("rank failed for {}: {e}", args.batch.display());
            exit_code_for_error(&e).into()
        }
    }
}

fn run(
    engine_args: &EngineArgs,
    args: &RankArgs,
    out: &mut impl io::Write,
) -> ArbiterResult<CliExitCode> {
    let engine = load_engine(engine_args)?;
    let entries = parse_batch(&read_file(&args.batch)?)?;

    // Parsed contexts go through the engine together; each entry keeps
    // its input position and either a slot in `contexts` or its error.
    let mut contexts = Vec::with_capacity(entries.len());
    let slots: Vec<ArbiterResult<usize>> = entries
        .into_iter()
        .map(|entry| {
            entry.map(|ctx| {
                contexts.push(ctx);
                contexts.len() - 1
            })
        })
        .collect();
    let results = engine.run_batch(&contexts);

    let mut log = args.log.as_deref().map(open_log).transpose()?;
    let mut worst = CliExitCode::Success;
    let mut failed = 0usize;

    for (i, slot) in slots.iter().enumerate() {
        let outcome = match slot {
            Ok(k) => results[*k].as_ref().map(|outcome| (&contexts[*k], outcome)),
            Err(e) => Err(e),
        };
        match outcome {
            Ok((ctx, outcome)) => {
                write_json(out, outcome, false)?;
                if let Some(log) = log.as_mut() {
                    let id = scenario_id(args.scenario.as_deref(), ctx, Some(i));
                    log.append(&DecisionLogRecord::from_outcome(
                        id,
                        engine.config().label.as_str(),
                        outcome,
                    ))?;
                }
            }
            Err(e) => {
                error!("context {i}: {e}");
                failed += 1;
                let code = exit_code_for_error(e);
                if i32::from(code) > i32::from(worst) {
                    worst = code;
                }
                write_json(out, &json!({ "index": i, "error": e.to_string() }), false)?;
            }
        }
    }
    if let Some(log) = log.as_mut() {
        log.flush()?;
    }

    info!("ranked {} contexts ({failed} failed)", slots.len());
    Ok(worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GOOD: &str = r#"{"goals": [{"id": "energy", "importance": 0.8, "satisfaction": 0.1}, {"id": "exploration", "importance": 0.6, "satisfaction": 0.7}]}"#;
    const BAD: &str = r#"{"goals": [{"id": "energy", "importance": 1.8, "satisfaction": 0.1}]}"#;

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let text = format!("{GOOD}\n\n{GOOD}\n");
        let entries = parse_batch(&text).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(Result::is_ok));
    }

    #[test]
    fn test_parse_json_array() {
        let text = format!("  [{GOOD}, {GOOD}, {GOOD}]");
        assert_eq!(parse_batch(&text).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_keeps_bad_entries_in_place() {
        let text = format!("{GOOD}\nnot json\n{GOOD}\n");
        let entries = parse_batch(&text).unwrap();
        assert_eq!(entries.len(), 3);
        let err = entries[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(entries[2].is_ok());

        let array = format!(r#"[{GOOD}, {{"goals": 7}}]"#);
        let entries = parse_batch(&array).unwrap();
        assert!(entries[1].as_ref().unwrap_err().to_string().contains("element 1"));
    }

    #[test]
    fn test_unreadable_array_fails_whole_batch() {
        assert!(parse_batch("[{\"goals\": ").is_err());
    }

    #[test]
    fn test_malformed_line_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("batch.jsonl");
        fs::write(&batch, format!("{GOOD}\n{{not json\n{GOOD}\n")).unwrap();
        let args = RankArgs {
            batch,
            log: None,
            scenario: None,
        };
        let mut out = Vec::new();
        let code = run(&EngineArgs::default(), &args, &mut out).unwrap();
        assert_eq!(code, CliExitCode::Validation);

        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = printed
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["primary"], "energy");
        assert_eq!(lines[1]["index"], 1);
        assert!(lines[1]["error"].as_str().unwrap().contains("line 2"));
        assert_eq!(lines[2]["primary"], "energy");
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("batch.jsonl");
        let log_path = dir.path().join("decisions.jsonl");
        fs::write(&batch, format!("{GOOD}\n{BAD}\n{GOOD}\n")).unwrap();

        let args = RankArgs {
            batch,
            log: Some(log_path.clone()),
            scenario: Some("sweep".into()),
        };
        let mut out = Vec::new();
        let code = run(&EngineArgs::default(), &args, &mut out).unwrap();
        assert_eq!(code, CliExitCode::Validation);

        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = printed
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["primary"], "energy");
        assert_eq!(lines[1]["index"], 1);
        assert_eq!(lines[2]["primary"], "energy");

        let log = fs::read_to_string(&log_path).unwrap();
        let ids: Vec<String> = log
            .lines()
            .map(|l| serde_json::from_str::<DecisionLogRecord>(l).unwrap().scenario_id)
            .collect();
        assert_eq!(ids, vec!["sweep-0", "sweep-2"]);
    }
}
