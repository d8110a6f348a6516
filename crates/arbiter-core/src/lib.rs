// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Scoring Engine Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Multi-objective goal arbitration: every active goal is scored from
//! base utility, metagoal adjustments, overgoal coherence, affective and
//! attentional modulation and antigoal constraints, then ranked.
//!
//! # Invariants
//!
//! 1. **Measurability is bounded**: `confidence × clarity` always lands
//!    in [0, 1], so a weighted correlation never exceeds its base value
//!    in magnitude.
//!
//! 2. **Vetoes dominate**: a candidate vetoed by a hard antigoal ranks
//!    below every non-vetoed candidate regardless of its other
//!    components, and is never selected as primary.
//!
//! 3. **Deterministic ranking**: identical context and reference
//!    snapshot give identical ranked output and primary goal. Ties break
//!    on goal id, never on input order or worker scheduling.
//!
//! 4. **One snapshot per cycle**: a cycle reads a single immutable
//!    reference snapshot; table updates only affect later cycles.

pub mod antigoal;
pub mod correlation;
pub mod engine;
pub mod measurability;
pub mod metagoal;
pub mod modulator;
pub mod overgoal;
pub mod ranker;
pub mod report;
pub mod scorer;
pub mod store;

pub use antigoal::{AntigoalEvaluator, AntigoalMeasure};
pub use correlation::{ComputedProvider, CorrelationLookup, CorrelationModel, StaticProvider};
pub use engine::ArbitrationEngine;
pub use measurability::MeasurabilityModel;
pub use metagoal::{MetagoalAdjuster, MetagoalKind};
pub use modulator::ModulatorBank;
pub use overgoal::OvergoalCoherence;
pub use ranker::{rank_actions, select_primary, GoalRanker, Ranking, Selection};
pub use report::{
    ablation_deltas, aggregate_by_configuration, read_decision_log, AblationComparison,
    AggregatedMetrics, DecisionLogWriter,
};
pub use scorer::{score_action, DecisionScorer};
pub use store::{ReferenceSnapshot, ReferenceStore};
