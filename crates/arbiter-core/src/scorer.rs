// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Decision Scorer
// ─────────────────────────────────────────────────────────────────────
//! Composes base utility, metagoal adjustment, overgoal bonus,
//! modulation and antigoal penalty into an explainable `DecisionScore`:
//!
//! `total = (base + metagoal + overgoal) × modulation − penalty`
//!
//! or `FLOOR_VALUE` when a hard antigoal vetoes the candidate.

use arbiter_types::{
    ActionCandidate, ArbiterError, ArbiterResult, DecisionScore, Diagnostic, EngineConfig, Goal,
    ScoringContext,
};

use crate::antigoal::AntigoalEvaluator;
use crate::metagoal::{MetagoalAdjuster, MetagoalInputs, MetagoalKind};
use crate::modulator::ModulatorBank;
use crate::overgoal::OvergoalCoherence;
use crate::store::ReferenceSnapshot;

/// Geometric mean; 0 for an empty slice.
pub fn geometric_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let log_sum: f64 = values.iter().map(|v| v.ln()).sum();
    (log_sum / values.len() as f64).exp()
}

/// Product; 1 for an empty slice (nothing blocks).
pub fn product(values: &[f64]) -> f64 {
    values.iter().product()
}

/// Goal priority: `importance × urgency`.
#[inline]
pub fn goal_weight(goal: &Goal) -> f64 {
    goal.importance * goal.urgency()
}

/// Base utility of pursuing `goal` directly.
///
/// Without considerations the goal scores its plain priority.
pub fn base_utility(goal: &Goal) -> f64 {
    let support = goal
        .considerations
        .as_deref()
        .map_or(1.0, geometric_mean);
    goal_weight(goal) * support * product(&goal.discouragements)
}

/// `Σ_g goal_weight(g) × gm(considerations) × Π(discouragements)` over
/// every active goal. Goals the action has no evidence for contribute 0.
pub fn score_action(action: &ActionCandidate, goals: &[Goal]) -> f64 {
    goals
        .iter()
        .map(|goal| match action.goals.get(&goal.id) {
            Some(evidence) => {
                goal_weight(goal)
                    * geometric_mean(&evidence.considerations)
                    * product(&evidence.discouragements)
            }
            None => 0.0,
        })
        .sum()
}

/// Per-cycle scorer over one context and one reference snapshot.
///
/// Everything that does not depend on the candidate (modulation, the
/// metagoal set, resolved antigoals) is settled in `new`.
pub struct DecisionScorer<'a> {
    config: &'a EngineConfig,
    ctx: &'a ScoringContext,
    snapshot: &'a ReferenceSnapshot,
    overgoal: OvergoalCoherence<'a>,
    metagoals: MetagoalAdjuster<'a>,
    antigoals: AntigoalEvaluator<'a>,
    modulation: f64,
}

impl<'a> DecisionScorer<'a> {
    /// Cycle-level diagnostics (unknown metagoals) go to `diagnostics`.
    /// An unresolvable antigoal fails here, before any candidate is scored.
    pub fn new(
        config: &'a EngineConfig,
        snapshot: &'a ReferenceSnapshot,
        ctx: &'a ScoringContext,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ArbiterResult<Self> {
        let ablation = &config.ablation;

        let antigoals = if ablation.antigoals {
            AntigoalEvaluator::new(ctx)?
        } else {
            AntigoalEvaluator::default()
        };

        let names: &[String] = if ablation.metagoals { &ctx.metagoals } else { &[] };
        let metagoals = MetagoalAdjuster::new(names, &config.metagoal_weights, diagnostics);

        let modulation = if ablation.modulators {
            ModulatorBank.overall_modulation(&ctx.modulators)
        } else {
            1.0
        };

        Ok(Self {
            config,
            ctx,
            snapshot,
            overgoal: OvergoalCoherence::new(
                &snapshot.measurability,
                snapshot.correlation.as_ref(),
                config.coherence_weight,
            ),
            metagoals,
            antigoals,
            modulation,
        })
    }

    fn needs_overgoal_score(&self) -> bool {
        self.config.ablation.overgoal || self.metagoals.active().contains(&MetagoalKind::Coherence)
    }

    fn needs_measurability(&self) -> bool {
        self.config.ablation.overgoal
            || self
                .metagoals
                .active()
                .iter()
                .any(|kind| kind.reads_measurability())
    }

    /// Score one candidate. Per-candidate diagnostics are returned with
    /// the score so the caller can merge them across parallel workers.
    pub fn score_goal(&self, goal: &Goal) -> ArbiterResult<(DecisionScore, Vec<Diagnostic>)> {
        let mut diagnostics = Vec::new();

        let measurability = if self.needs_measurability() {
            self.snapshot.measurability.get_measurability(&goal.id)?
        } else {
            0.0
        };

        let overgoal_score = if self.needs_overgoal_score() {
            self.overgoal
                .overgoal_score(&goal.id, &self.ctx.goals, &mut diagnostics)?
        } else {
            0.0
        };
        let overgoal_bonus = if self.config.ablation.overgoal {
            self.overgoal.bonus_from_score(overgoal_score)
        } else {
            0.0
        };

        let (metagoal_adjustment, metagoals) = self.metagoals.adjust(&MetagoalInputs {
            goal,
            ctx: self.ctx,
            measurability,
            overgoal_score,
        });

        let constraints = self.antigoals.evaluate(goal, self.ctx);
        let base = base_utility(goal);

        let total = DecisionScore::compose(
            base,
            metagoal_adjustment,
            overgoal_bonus,
            self.modulation,
            constraints.penalty,
            constraints.vetoed,
        );
        if !constraints.vetoed && !total.is_finite() {
            return Err(ArbiterError::Numerical(format!(
                "goal '{}' produced non-finite total {total}",
                goal.id
            )));
        }

        log::trace!(
            "scored '{}': base={base:.4} meta={metagoal_adjustment:.4} over={overgoal_bonus:.4} \
             mod={:.4} pen={:.4} vetoed={} total={total:.4}",
            goal.id,
            self.modulation,
            constraints.penalty,
            constraints.vetoed,
        );

        let score = DecisionScore {
            base_utility: base,
            metagoal_adjustment,
            overgoal_bonus,
            modulation_factor: self.modulation,
            antigoal_penalty: constraints.penalty,
            vetoed: constraints.vetoed,
            total,
            metagoals,
            antigoals: constraints.penalties,
            violations: constraints.violations,
            soft_violations: constraints.soft_violations,
        };
        Ok((score, diagnostics))
    }
}
