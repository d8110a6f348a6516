// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Arbitration Engine
// ─────────────────────────────────────────────────────────────────────
//! One decision cycle: validate, score every candidate against a single
//! reference snapshot, rank, select the primary goal.
//!
//! Structural problems (invalid context, unresolvable antigoal) abort
//! the cycle before any scoring. A failure confined to one candidate is
//! recorded as a `CandidateExcluded` diagnostic and the rest of the
//! cycle proceeds.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use arbiter_types::{
    ArbiterResult, CycleOutcome, DecisionScore, Diagnostic, DiagnosticKind, EngineConfig,
    RankedGoal, ReferenceTables, ScoringContext,
};

use crate::ranker::{rank_actions, select_primary, GoalRanker, Ranking};
use crate::scorer::DecisionScorer;
use crate::store::{ReferenceSnapshot, ReferenceStore};

type CandidateResult = (String, ArbiterResult<(DecisionScore, Vec<Diagnostic>)>);

pub struct ArbitrationEngine {
    config: EngineConfig,
    store: ReferenceStore,
    ranker: GoalRanker,
}

impl ArbitrationEngine {
    pub fn new(config: EngineConfig, tables: &ReferenceTables) -> ArbiterResult<Self> {
        config.validate()?;
        let store = ReferenceStore::new(tables, &config)?;
        log::debug!(
            "arbitration engine '{}' ready (provider={}, veto_policy={:?})",
            config.label,
            store.snapshot().correlation.provider_name(),
            config.veto_policy
        );
        Ok(Self {
            ranker: GoalRanker::new(config.veto_policy),
            config,
            store,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<ReferenceSnapshot> {
        self.store.snapshot()
    }

    /// Swap in new reference tables. Cycles already running keep the
    /// snapshot they started with.
    pub fn update_tables(&self, tables: &ReferenceTables) -> ArbiterResult<u64> {
        self.store.replace(tables)
    }

    pub fn run_cycle(&self, ctx: &ScoringContext) -> ArbiterResult<CycleOutcome> {
        let start = Instant::now();
        ctx.validate()?;

        let snapshot = self.store.snapshot();
        let mut diagnostics = Vec::new();
        let scorer = DecisionScorer::new(&self.config, &snapshot, ctx, &mut diagnostics)?;

        let results: Vec<CandidateResult> = if self.config.parallel {
            ctx.goals
                .par_iter()
                .map(|g| (g.id.clone(), scorer.score_goal(g)))
                .collect()
        } else {
            ctx.goals
                .iter()
                .map(|g| (g.id.clone(), scorer.score_goal(g)))
                .collect()
        };

        let mut candidates = Vec::with_capacity(results.len());
        for (goal_id, result) in results {
            match result {
                Ok((score, diags)) => {
                    diagnostics.extend(diags);
                    candidates.push(RankedGoal { goal_id, score });
                }
                Err(e) if e.is_structural() => return Err(e),
                Err(e) => {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::CandidateExcluded,
                        Some(&goal_id),
                        e.to_string(),
                    ));
                }
            }
        }

        let Ranking { ranked, dropped } = self.ranker.rank(candidates);
        diagnostics.extend(dropped.iter().map(|r| {
            Diagnostic::new(
                DiagnosticKind::Vetoed,
                Some(&r.goal_id),
                format!("dropped by hard antigoals: {}", r.score.violations.join(", ")),
            )
        }));

        diagnostics.sort();
        diagnostics.dedup();
        for d in &diagnostics {
            log::warn!("tick {}: {d}", ctx.tick);
        }

        let primary = select_primary(&ranked).goal_id().map(str::to_string);
        if primary.is_none() {
            log::warn!("tick {}: no eligible goal", ctx.tick);
        }
        let actions = rank_actions(&ctx.actions, &ctx.goals);

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        log::debug!(
            "tick {}: {} ranked, primary={:?}, snapshot v{}, {latency_ms:.3}ms",
            ctx.tick,
            ranked.len(),
            primary,
            snapshot.version
        );

        Ok(CycleOutcome {
            tick: ctx.tick,
            ranked,
            dropped,
            primary,
            actions,
            diagnostics,
            latency_ms,
        })
    }

    /// Run independent cycles in order; one failing context does not
    /// stop the others.
    pub fn run_batch(&self, contexts: &[ScoringContext]) -> Vec<ArbiterResult<CycleOutcome>> {
        contexts.iter().map(|ctx| self.run_cycle(ctx)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_types::{AntigoalSpec, ArbiterError, DecisionLogRecord, Goal, VetoPolicy};

    fn engine() -> ArbitrationEngine {
        ArbitrationEngine::new(EngineConfig::default(), &ReferenceTables::baseline()).unwrap()
    }

    fn baseline_ctx() -> ScoringContext {
        ScoringContext::new(vec![
            Goal::new("energy", 0.9, 0.1),
            Goal::new("exploration", 0.6, 0.5),
            Goal::new("affinity", 0.3, 0.2),
        ])
    }

    #[test]
    fn test_cycle_selects_primary() {
        let out = engine().run_cycle(&baseline_ctx()).unwrap();
        assert_eq!(out.primary.as_deref(), Some("energy"));
        assert_eq!(out.ranked.len(), 3);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_context_aborts() {
        let mut ctx = baseline_ctx();
        ctx.goals[1].importance = 1.5;
        assert!(matches!(
            engine().run_cycle(&ctx),
            Err(ArbiterError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_unknown_antigoal_aborts() {
        let mut ctx = baseline_ctx();
        ctx.antigoals = vec![AntigoalSpec::hard("boredom", 0.5)];
        assert!(matches!(
            engine().run_cycle(&ctx),
            Err(ArbiterError::Configuration(_))
        ));
    }

    #[test]
    fn test_candidate_failure_is_isolated() {
        let mut ctx = baseline_ctx();
        ctx.goals.push(Goal::new("hunger", 0.9, 0.0));
        let out = engine().run_cycle(&ctx).unwrap();
        assert_eq!(out.ranked.len(), 3);
        assert!(out.ranked.iter().all(|r| r.goal_id != "hunger"));
        let excluded: Vec<_> = out
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::CandidateExcluded)
            .collect();
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].goal_id.as_deref(), Some("hunger"));
        // Reported once even though three candidates skipped it.
        let skipped = out
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::MissingMeasurability)
            .count();
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_all_vetoed_has_no_primary() {
        let mut ctx = baseline_ctx();
        ctx.antigoals = vec![AntigoalSpec::hard("goal-neglect", 0.0)];
        let out = engine().run_cycle(&ctx).unwrap();
        assert!(out.primary.is_none());
        assert_eq!(out.ranked.len(), 3);
        assert!(out.ranked.iter().all(|r| r.score.vetoed));
    }

    #[test]
    fn test_drop_policy_removes_vetoed() {
        let config = EngineConfig {
            veto_policy: VetoPolicy::Drop,
            ..Default::default()
        };
        let engine = ArbitrationEngine::new(config, &ReferenceTables::baseline()).unwrap();
        let mut ctx = baseline_ctx();
        ctx.goals[1].risk = 0.9;
        ctx.antigoals = vec![AntigoalSpec::hard("risk-exposure", 0.5)];
        let out = engine.run_cycle(&ctx).unwrap();
        assert_eq!(out.ranked.len(), 2);
        assert!(out.ranked.iter().all(|r| r.goal_id != "exploration"));
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].score.violations, vec!["risk-exposure"]);
        let vetoed: Vec<_> = out
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Vetoed)
            .collect();
        assert_eq!(vetoed.len(), 1);
        assert_eq!(vetoed[0].goal_id.as_deref(), Some("exploration"));
        assert!(vetoed[0].message.contains("risk-exposure"));
    }

    #[test]
    fn test_violation_counts_independent_of_veto_policy() {
        let drop = ArbitrationEngine::new(
            EngineConfig {
                veto_policy: VetoPolicy::Drop,
                ..Default::default()
            },
            &ReferenceTables::baseline(),
        )
        .unwrap();
        let mut ctx = baseline_ctx();
        ctx.goals[1].risk = 0.9;
        ctx.antigoals = vec![
            AntigoalSpec::hard("risk-exposure", 0.5),
            AntigoalSpec::soft("overcommitment", 0.3, 1.0),
        ];
        let kept = engine().run_cycle(&ctx).unwrap();
        let dropped = drop.run_cycle(&ctx).unwrap();
        assert_eq!(kept.hard_violations(), 1);
        assert_eq!(dropped.hard_violations(), kept.hard_violations());
        assert_eq!(dropped.soft_violations(), kept.soft_violations());
        assert_eq!(kept.primary, dropped.primary);
        let record = DecisionLogRecord::from_outcome("risky", "drop", &dropped);
        assert_eq!(record.hard_violations, 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = ArbitrationEngine::new(
            EngineConfig {
                parallel: false,
                ..Default::default()
            },
            &ReferenceTables::baseline(),
        )
        .unwrap();
        let mut ctx = baseline_ctx();
        ctx.metagoals = vec!["coherence".into(), "efficiency".into()];
        let a = engine().run_cycle(&ctx).unwrap();
        let b = sequential.run_cycle(&ctx).unwrap();
        assert_eq!(a.ranked, b.ranked);
        assert_eq!(a.primary, b.primary);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let mut bad = baseline_ctx();
        bad.goals.clear();
        let results = engine().run_batch(&[baseline_ctx(), bad, baseline_ctx()]);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
