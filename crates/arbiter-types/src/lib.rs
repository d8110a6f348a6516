// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Data model, configuration, and error hierarchy for the goal
//! arbitration engine.

pub mod config;
pub mod context;
pub mod error;
pub mod log_record;
pub mod score;
pub mod tables;

pub use config::{
    Ablation, CorrelationSource, EngineConfig, MetagoalWeights, VetoPolicy, MAX_METAGOAL_WEIGHT,
    MAX_PENALTY_WEIGHT,
};
pub use context::{
    ActionCandidate, AntigoalSpec, ConstraintKind, Goal, GoalEvidence, Modulator, ModulatorKind,
    ScoringContext,
};
pub use error::{ArbiterError, ArbiterResult};
pub use log_record::DecisionLogRecord;
pub use score::{
    ActionScore, CycleOutcome, DecisionScore, Diagnostic, DiagnosticKind, RankedGoal, FLOOR_VALUE,
};
pub use tables::{CorrelationEntry, MeasurabilityProfile, PairedObservations, ReferenceTables};
