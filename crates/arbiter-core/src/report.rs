// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Decision Log & Metrics
// ─────────────────────────────────────────────────────────────────────
//! Newline-delimited decision log plus the pure aggregation used for
//! ablation studies: per-configuration means and totals, and deltas of
//! every ablated configuration against a baseline.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use arbiter_types::{ArbiterResult, DecisionLogRecord};

/// Configuration label ablation deltas are measured against by default.
pub const DEFAULT_BASELINE: &str = "full-system";

/// Appends one JSON object per line to any writer.
pub struct DecisionLogWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> DecisionLogWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn append(&mut self, record: &DecisionLogRecord) -> ArbiterResult<()> {
        serde_json::to_writer(&mut self.inner, record).map_err(std::io::Error::from)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> ArbiterResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Records appended through this writer.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Parse an NDJSON decision log. Blank lines are ignored; malformed
/// lines are logged and skipped. Read errors propagate.
pub fn read_decision_log<R: BufRead>(reader: R) -> ArbiterResult<Vec<DecisionLogRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("decision log line {}: skipped ({e})", i + 1),
        }
    }
    Ok(records)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub configuration: String,
    /// Distinct scenario ids.
    pub total_scenarios: usize,
    /// Mean decision score.
    pub goal_satisfaction_mean: f64,
    pub hard_violations_total: usize,
    pub soft_violations_total: usize,
    pub decision_latency_mean: f64,
    /// Mean of Σ|metagoal contribution| per record.
    pub metagoal_contribution_mean: f64,
    /// Mean of Σ positive antigoal penalties per record.
    pub antigoal_penalty_mean: f64,
    pub plan_length_mean: f64,
}

impl AggregatedMetrics {
    /// Named numeric fields compared by `ablation_deltas`.
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("goal_satisfaction_mean", self.goal_satisfaction_mean),
            ("hard_violations_total", self.hard_violations_total as f64),
            ("soft_violations_total", self.soft_violations_total as f64),
            ("decision_latency_mean", self.decision_latency_mean),
            ("metagoal_contribution_mean", self.metagoal_contribution_mean),
            ("antigoal_penalty_mean", self.antigoal_penalty_mean),
            ("plan_length_mean", self.plan_length_mean),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AblationComparison {
    pub configuration: String,
    pub metric_name: String,
    pub baseline_value: f64,
    pub ablated_value: f64,
    pub delta: f64,
    /// `delta / baseline × 100`, or 0 when the baseline is 0.
    pub percent_change: f64,
}

#[derive(Default)]
struct Accumulator<'a> {
    scenarios: BTreeSet<&'a str>,
    records: usize,
    decision_score: f64,
    hard: usize,
    soft: usize,
    latency: f64,
    metagoal: f64,
    antigoal: f64,
    plan_len: f64,
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

pub fn aggregate_by_configuration(
    records: &[DecisionLogRecord],
) -> BTreeMap<String, AggregatedMetrics> {
    let mut groups: BTreeMap<&str, Accumulator<'_>> = BTreeMap::new();
    for r in records {
        let acc = groups.entry(r.configuration.as_str()).or_default();
        acc.scenarios.insert(r.scenario_id.as_str());
        acc.records += 1;
        acc.decision_score += r.decision_score;
        acc.hard += r.hard_violations;
        acc.soft += r.soft_violations;
        acc.latency += r.latency_ms;
        acc.metagoal += r.metagoal.values().map(|v| v.abs()).sum::<f64>();
        acc.antigoal += r.antigoal.values().filter(|&&v| v > 0.0).sum::<f64>();
        acc.plan_len += r.plan.len() as f64;
    }

    groups
        .into_iter()
        .map(|(config, acc)| {
            let n = acc.records;
            let metrics = AggregatedMetrics {
                configuration: config.to_string(),
                total_scenarios: acc.scenarios.len(),
                goal_satisfaction_mean: mean(acc.decision_score, n),
                hard_violations_total: acc.hard,
                soft_violations_total: acc.soft,
                decision_latency_mean: mean(acc.latency, n),
                metagoal_contribution_mean: mean(acc.metagoal, n),
                antigoal_penalty_mean: mean(acc.antigoal, n),
                plan_length_mean: mean(acc.plan_len, n),
            };
            (config.to_string(), metrics)
        })
        .collect()
}

/// Compare every non-baseline configuration against `baseline`.
/// Returns nothing (with a warning) when the baseline is absent.
pub fn ablation_deltas(
    aggregated: &BTreeMap<String, AggregatedMetrics>,
    baseline: &str,
) -> Vec<AblationComparison> {
    let Some(base) = aggregated.get(baseline) else {
        log::warn!("baseline configuration '{baseline}' not found");
        return Vec::new();
    };

    let mut out = Vec::new();
    for (config, metrics) in aggregated {
        if config == baseline {
            continue;
        }
        for ((name, baseline_value), (_, ablated_value)) in
            base.fields().into_iter().zip(metrics.fields())
        {
            let delta = ablated_value - baseline_value;
            let percent_change = if baseline_value != 0.0 {
                delta / baseline_value * 100.0
            } else {
                0.0
            };
            out.push(AblationComparison {
                configuration: config.clone(),
                metric_name: name.to_string(),
                baseline_value,
                ablated_value,
                delta,
                percent_change,
            });
        }
    }
    out
}
