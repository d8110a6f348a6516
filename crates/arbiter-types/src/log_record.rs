// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Decision Log Record
// ─────────────────────────────────────────────────────────────────────

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::score::CycleOutcome;

/// One line of the newline-delimited decision log consumed by the
/// external metrics/reporting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionLogRecord {
    pub scenario_id: String,
    pub configuration: String,
    /// Total of the primary goal; 0 when no goal was eligible.
    pub decision_score: f64,
    pub latency_ms: f64,
    pub hard_violations: usize,
    pub soft_violations: usize,
    #[serde(default)]
    pub metagoal: BTreeMap<String, f64>,
    #[serde(default)]
    pub antigoal: BTreeMap<String, f64>,
    /// Ranked action names, or ranked goal ids when no actions were scored.
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
}

impl DecisionLogRecord {
    pub fn from_outcome(
        scenario_id: impl Into<String>,
        configuration: impl Into<String>,
        outcome: &CycleOutcome,
    ) -> Self {
        let primary = outcome.primary_score();
        let plan = if outcome.actions.is_empty() {
            outcome.ranked.iter().map(|r| r.goal_id.clone()).collect()
        } else {
            outcome.actions.iter().map(|a| a.action.clone()).collect()
        };
        Self {
            scenario_id: scenario_id.into(),
            configuration: configuration.into(),
            decision_score: primary.map_or(0.0, |s| s.total),
            latency_ms: outcome.latency_ms,
            hard_violations: outcome.hard_violations(),
            soft_violations: outcome.soft_violations(),
            metagoal: primary.map(|s| s.metagoals.clone()).unwrap_or_default(),
            antigoal: primary.map(|s| s.antigoals.clone()).unwrap_or_default(),
            plan,
            tick: Some(outcome.tick),
        }
    }
}
