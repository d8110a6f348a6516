// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Antigoal Constraints
// ─────────────────────────────────────────────────────────────────────
//! Hard constraints veto a candidate outright; soft constraints subtract
//! `(value − threshold) × penalty_weight` once the measured value
//! exceeds the threshold. Hard constraints never add a numeric penalty.

use std::collections::BTreeMap;

use arbiter_types::{
    AntigoalSpec, ArbiterError, ArbiterResult, ConstraintKind, Goal, ScoringContext,
};

use crate::scorer::goal_weight;

/// Goal id read by the `energy-depletion` measure.
pub const ENERGY_GOAL: &str = "energy";

/// The quantity an antigoal compares against its threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AntigoalMeasure {
    /// Urgency of the active energy goal, for every other candidate.
    EnergyDepletion,
    /// The candidate's own risk.
    RiskExposure,
    /// The candidate's own satisfaction.
    Overcommitment,
    /// Largest priority among the other active goals.
    GoalNeglect,
    /// A named environment signal from the context.
    Signal(String),
}

impl AntigoalMeasure {
    /// Resolve an antigoal name against the built-in measures, then the
    /// context signals. Anything else is a configuration error.
    pub fn resolve(name: &str, ctx: &ScoringContext) -> ArbiterResult<Self> {
        match name {
            "energy-depletion" => Ok(Self::EnergyDepletion),
            "risk-exposure" => Ok(Self::RiskExposure),
            "overcommitment" => Ok(Self::Overcommitment),
            "goal-neglect" => Ok(Self::GoalNeglect),
            other if ctx.signals.contains_key(other) => Ok(Self::Signal(other.to_string())),
            other => Err(ArbiterError::Configuration(format!(
                "antigoal '{other}' names neither a known measure nor a context signal"
            ))),
        }
    }

    /// Measured value in [0, 1] for `goal` under `ctx`.
    pub fn measure(&self, goal: &Goal, ctx: &ScoringContext) -> f64 {
        match self {
            Self::EnergyDepletion => {
                if goal.id == ENERGY_GOAL {
                    return 0.0;
                }
                ctx.goal(ENERGY_GOAL).map_or(0.0, Goal::urgency)
            }
            Self::RiskExposure => goal.risk,
            Self::Overcommitment => goal.satisfaction,
            Self::GoalNeglect => ctx
                .goals
                .iter()
                .filter(|g| g.id != goal.id)
                .map(goal_weight)
                .fold(0.0, f64::max),
            Self::Signal(name) => ctx.signals.get(name).copied().unwrap_or(0.0),
        }
    }
}

/// `max(0, value − threshold) × penalty_weight`.
pub fn soft_penalty(value: f64, threshold: f64, penalty_weight: f64) -> f64 {
    ((value - threshold) * penalty_weight).max(0.0)
}

/// An antigoal spec paired with its resolved measure.
#[derive(Debug, Clone)]
pub struct ResolvedAntigoal<'a> {
    pub spec: &'a AntigoalSpec,
    pub measure: AntigoalMeasure,
}

/// Constraint evaluation outcome for one candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AntigoalOutcome {
    pub penalty: f64,
    pub vetoed: bool,
    /// Names of triggered hard antigoals.
    pub violations: Vec<String>,
    /// Penalty per soft antigoal.
    pub penalties: BTreeMap<String, f64>,
    pub soft_violations: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AntigoalEvaluator<'a> {
    antigoals: Vec<ResolvedAntigoal<'a>>,
}

impl<'a> AntigoalEvaluator<'a> {
    /// Resolve every antigoal in the context up front, failing fast on
    /// an unresolvable name before any candidate is scored.
    pub fn new(ctx: &'a ScoringContext) -> ArbiterResult<Self> {
        let antigoals = ctx
            .antigoals
            .iter()
            .map(|spec| {
                AntigoalMeasure::resolve(&spec.name, ctx)
                    .map(|measure| ResolvedAntigoal { spec, measure })
            })
            .collect::<ArbiterResult<Vec<_>>>()?;
        Ok(Self { antigoals })
    }

    pub fn evaluate(&self, goal: &Goal, ctx: &ScoringContext) -> AntigoalOutcome {
        let mut outcome = AntigoalOutcome::default();
        for ag in &self.antigoals {
            let value = ag.measure.measure(goal, ctx);
            match ag.spec.kind {
                ConstraintKind::Hard => {
                    if value > ag.spec.threshold {
                        log::debug!(
                            "hard antigoal '{}' vetoes '{}' ({value:.4} > {})",
                            ag.spec.name,
                            goal.id,
                            ag.spec.threshold
                        );
                        outcome.vetoed = true;
                        outcome.violations.push(ag.spec.name.clone());
                    }
                }
                ConstraintKind::Soft => {
                    let penalty = soft_penalty(value, ag.spec.threshold, ag.spec.penalty_weight());
                    if value > ag.spec.threshold {
                        outcome.soft_violations += 1;
                    }
                    outcome.penalty += penalty;
                    outcome.penalties.insert(ag.spec.name.clone(), penalty);
                }
            }
        }
        outcome
    }
}
