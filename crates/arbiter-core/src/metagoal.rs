// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Metagoal Adjuster
// ─────────────────────────────────────────────────────────────────────
//! Higher-order objectives adding a weighted contribution to a
//! candidate's score. Metagoals are strictly additive: an empty or
//! unrecognised set leaves the score untouched.

use std::collections::BTreeMap;

use arbiter_types::{Diagnostic, DiagnosticKind, Goal, MetagoalWeights, ScoringContext};

use crate::scorer::goal_weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetagoalKind {
    /// Rewards coherence with the active goal set.
    Coherence,
    /// Rewards goals whose priority beats the active-set average.
    Efficiency,
    /// Rewards urgent goals whose satisfaction is poorly observed.
    Learning,
    /// Rewards important goals whose satisfaction is poorly observed.
    UncertaintyReduction,
}

impl MetagoalKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "coherence" => Some(Self::Coherence),
            "efficiency" => Some(Self::Efficiency),
            "learning" => Some(Self::Learning),
            "uncertainty-reduction" => Some(Self::UncertaintyReduction),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Coherence => "coherence",
            Self::Efficiency => "efficiency",
            Self::Learning => "learning",
            Self::UncertaintyReduction => "uncertainty-reduction",
        }
    }

    /// Whether the contribution depends on the candidate's measurability
    /// profile, directly or through its overgoal score.
    pub fn reads_measurability(self) -> bool {
        !matches!(self, Self::Efficiency)
    }

    pub fn weight(self, weights: &MetagoalWeights) -> f64 {
        match self {
            Self::Coherence => weights.coherence,
            Self::Efficiency => weights.efficiency,
            Self::Learning => weights.learning,
            Self::UncertaintyReduction => weights.uncertainty_reduction,
        }
    }
}

/// Per-candidate quantities the metagoal functions read.
#[derive(Debug, Clone, Copy)]
pub struct MetagoalInputs<'a> {
    pub goal: &'a Goal,
    pub ctx: &'a ScoringContext,
    /// Candidate measurability in [0, 1].
    pub measurability: f64,
    /// Unweighted overgoal score of the candidate.
    pub overgoal_score: f64,
}

/// Unweighted contribution of one metagoal.
pub fn contribution(kind: MetagoalKind, inputs: &MetagoalInputs<'_>) -> f64 {
    let goal = inputs.goal;
    let opacity = 1.0 - inputs.measurability;
    match kind {
        MetagoalKind::Coherence => inputs.overgoal_score,
        MetagoalKind::Efficiency => {
            let goals = &inputs.ctx.goals;
            let mean = goals.iter().map(goal_weight).sum::<f64>() / goals.len().max(1) as f64;
            goal_weight(goal) - mean
        }
        MetagoalKind::Learning => goal.urgency() * opacity,
        MetagoalKind::UncertaintyReduction => goal.importance * opacity,
    }
}

/// Metagoal set recognised for one cycle.
#[derive(Debug, Clone)]
pub struct MetagoalAdjuster<'a> {
    active: Vec<MetagoalKind>,
    weights: &'a MetagoalWeights,
}

impl<'a> MetagoalAdjuster<'a> {
    /// Resolve metagoal names. Unknown names are logged, reported in
    /// `diagnostics`, and otherwise ignored; repeated names count once.
    pub fn new(
        names: &[String],
        weights: &'a MetagoalWeights,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let mut active = Vec::with_capacity(names.len());
        for name in names {
            match MetagoalKind::from_name(name) {
                Some(kind) if !active.contains(&kind) => active.push(kind),
                Some(_) => {}
                None => {
                    log::warn!("ignoring unknown metagoal '{name}'");
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnknownMetagoal,
                        None,
                        format!("metagoal '{name}' is not recognised and was ignored"),
                    ));
                }
            }
        }
        Self { active, weights }
    }

    pub fn active(&self) -> &[MetagoalKind] {
        &self.active
    }

    /// Σ `weight × contribution` over active metagoals, with the
    /// per-metagoal breakdown.
    pub fn adjust(&self, inputs: &MetagoalInputs<'_>) -> (f64, BTreeMap<String, f64>) {
        let mut breakdown = BTreeMap::new();
        let mut total = 0.0;
        for &kind in &self.active {
            let value = kind.weight(self.weights) * contribution(kind, inputs);
            total += value;
            breakdown.insert(kind.name().to_string(), value);
        }
        (total, breakdown)
    }
}
