// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Score Types
// ─────────────────────────────────────────────────────────────────────

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Total assigned to a vetoed candidate.
///
/// `f64::MIN` rather than negative infinity so the value survives JSON.
/// Every non-vetoed total is bounded below by the weighted metagoal terms
/// and the sum of soft penalties, which `MAX_METAGOAL_WEIGHT` and
/// `MAX_PENALTY_WEIGHT` keep many orders of magnitude above this.
pub const FLOOR_VALUE: f64 = f64::MIN;

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_score: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Fully explained score of one goal candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionScore {
    pub base_utility: f64,
    pub metagoal_adjustment: f64,
    pub overgoal_bonus: f64,
    pub modulation_factor: f64,
    pub antigoal_penalty: f64,
    pub vetoed: bool,
    pub total: f64,
    /// Contribution of each recognised metagoal.
    #[serde(default)]
    pub metagoals: BTreeMap<String, f64>,
    /// Penalty of each soft antigoal (0 when under threshold).
    #[serde(default)]
    pub antigoals: BTreeMap<String, f64>,
    /// Hard antigoals that triggered a veto.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
    /// Number of soft antigoals whose threshold was exceeded.
    #[serde(default)]
    pub soft_violations: usize,
}

impl DecisionScore {
    /// `(base + metagoal + overgoal) × modulation − penalty`, or
    /// `FLOOR_VALUE` when vetoed.
    pub fn compose(
        base_utility: f64,
        metagoal_adjustment: f64,
        overgoal_bonus: f64,
        modulation_factor: f64,
        antigoal_penalty: f64,
        vetoed: bool,
    ) -> f64 {
        if vetoed {
            return FLOOR_VALUE;
        }
        (base_utility + metagoal_adjustment + overgoal_bonus) * modulation_factor - antigoal_penalty
    }

    /// Recompute `total` from the stored components.
    pub fn recomposed_total(&self) -> f64 {
        Self::compose(
            self.base_utility,
            self.metagoal_adjustment,
            self.overgoal_bonus,
            self.modulation_factor,
            self.antigoal_penalty,
            self.vetoed,
        )
    }
}

/// One entry of the ranked output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedGoal {
    pub goal_id: String,
    pub score: DecisionScore,
}

/// Score of a candidate action across all active goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionScore {
    pub action: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A candidate could not be scored and was left out of the ranking.
    CandidateExcluded,
    /// A correlation lookup had no data and defaulted to 0.
    MissingCorrelationData,
    /// A partner goal had no measurability profile and was skipped.
    MissingMeasurability,
    /// A metagoal name was not recognised and was ignored.
    UnknownMetagoal,
    /// A vetoed candidate was removed from the ranking.
    Vetoed,
}

/// Non-fatal condition observed during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, goal_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            goal_id: goal_id.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.goal_id {
            Some(id) => write!(f, "[{:?}] {id}: {}", self.kind, self.message),
            None => write!(f, "[{:?}] {}", self.kind, self.message),
        }
    }
}

/// Result of one decision cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub tick: u64,
    /// Candidates in rank order.
    pub ranked: Vec<RankedGoal>,
    /// Vetoed candidates removed from `ranked` under `VetoPolicy::Drop`,
    /// ordered by goal id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<RankedGoal>,
    /// Highest-ranked non-vetoed goal, `None` when every candidate is vetoed.
    pub primary: Option<String>,
    /// Candidate actions in rank order (empty when the context has none).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionScore>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    /// Wall-clock scoring time; not part of the deterministic output.
    #[serde(default)]
    pub latency_ms: f64,
}

impl CycleOutcome {
    pub fn primary_score(&self) -> Option<&DecisionScore> {
        let id = self.primary.as_deref()?;
        self.ranked
            .iter()
            .find(|r| r.goal_id == id)
            .map(|r| &r.score)
    }

    /// Every scored candidate, ranked or dropped.
    pub fn scored(&self) -> impl Iterator<Item = &RankedGoal> {
        self.ranked.iter().chain(&self.dropped)
    }

    pub fn hard_violations(&self) -> usize {
        self.scored().map(|r| r.score.violations.len()).sum()
    }

    pub fn soft_violations(&self) -> usize {
        self.scored().map(|r| r.score.soft_violations).sum()
    }
}
