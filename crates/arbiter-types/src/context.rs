// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Scoring Context
// ─────────────────────────────────────────────────────────────────────
//! Per-cycle input snapshot: goals, modulators, metagoals, antigoals.
//!
//! A `ScoringContext` is built by the decision-cycle caller, passed by
//! shared reference into every component, and dropped after ranking.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::MAX_PENALTY_WEIGHT;
use crate::error::{ensure_in_range, ensure_unit, ArbiterError, ArbiterResult};

/// Penalty weight assumed for a soft antigoal that does not set one.
pub const DEFAULT_PENALTY_WEIGHT: f64 = 0.5;

/// One active goal of the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    /// Static importance in [0, 1].
    pub importance: f64,
    /// Current satisfaction in [0, 1], updated by the agent loop each tick.
    pub satisfaction: f64,
    /// Exposure to harm when pursuing this goal, in [0, 1].
    #[serde(default)]
    pub risk: f64,
    /// Evidence for pursuing this goal now. `None` means pure priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub considerations: Option<Vec<f64>>,
    /// Blocking factors in [0, 1]; the empty list never blocks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discouragements: Vec<f64>,
}

impl Goal {
    pub fn new(id: impl Into<String>, importance: f64, satisfaction: f64) -> Self {
        Self {
            id: id.into(),
            importance,
            satisfaction,
            risk: 0.0,
            considerations: None,
            discouragements: Vec::new(),
        }
    }

    pub fn with_risk(mut self, risk: f64) -> Self {
        self.risk = risk;
        self
    }

    pub fn with_evidence(mut self, considerations: Vec<f64>, discouragements: Vec<f64>) -> Self {
        self.considerations = Some(considerations);
        self.discouragements = discouragements;
        self
    }

    /// `1 - satisfaction`: the less satisfied, the more urgent.
    pub fn urgency(&self) -> f64 {
        1.0 - self.satisfaction
    }

    fn validate(&self) -> ArbiterResult<()> {
        if self.id.trim().is_empty() {
            return Err(ArbiterError::Configuration(
                "goal id must not be empty".to_string(),
            ));
        }
        ensure_unit(&format!("goal[{}].importance", self.id), self.importance)?;
        ensure_unit(&format!("goal[{}].satisfaction", self.id), self.satisfaction)?;
        ensure_unit(&format!("goal[{}].risk", self.id), self.risk)?;
        for (i, &c) in self.considerations.iter().flatten().enumerate() {
            ensure_unit(&format!("goal[{}].considerations[{i}]", self.id), c)?;
        }
        for (i, &d) in self.discouragements.iter().enumerate() {
            ensure_unit(&format!("goal[{}].discouragements[{i}]", self.id), d)?;
        }
        Ok(())
    }
}

/// The six modulator axes: PAD (pleasure, arousal, dominance) and the
/// attentional axes (focus, resolution, exteroception).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulatorKind {
    Pleasure,
    Arousal,
    Dominance,
    Focus,
    Resolution,
    Exteroception,
}

impl ModulatorKind {
    pub const ALL: [ModulatorKind; 6] = [
        ModulatorKind::Pleasure,
        ModulatorKind::Arousal,
        ModulatorKind::Dominance,
        ModulatorKind::Focus,
        ModulatorKind::Resolution,
        ModulatorKind::Exteroception,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModulatorKind::Pleasure => "pleasure",
            ModulatorKind::Arousal => "arousal",
            ModulatorKind::Dominance => "dominance",
            ModulatorKind::Focus => "focus",
            ModulatorKind::Resolution => "resolution",
            ModulatorKind::Exteroception => "exteroception",
        }
    }
}

impl fmt::Display for ModulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An active modulator and its intensity in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modulator {
    pub name: ModulatorKind,
    pub intensity: f64,
}

impl Modulator {
    pub fn new(name: ModulatorKind, intensity: f64) -> Self {
        Self { name, intensity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Vetoes the candidate outright when triggered.
    Hard,
    /// Subtracts a proportional penalty when the threshold is exceeded.
    Soft,
}

/// A hard or soft constraint limiting goal selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntigoalSpec {
    pub name: String,
    pub kind: ConstraintKind,
    /// Measured values strictly above this trigger the constraint.
    pub threshold: f64,
    /// Soft antigoals only. Defaults to `DEFAULT_PENALTY_WEIGHT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_weight: Option<f64>,
}

impl AntigoalSpec {
    pub fn hard(name: impl Into<String>, threshold: f64) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Hard,
            threshold,
            penalty_weight: None,
        }
    }

    pub fn soft(name: impl Into<String>, threshold: f64, penalty_weight: f64) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Soft,
            threshold,
            penalty_weight: Some(penalty_weight),
        }
    }

    pub fn penalty_weight(&self) -> f64 {
        self.penalty_weight.unwrap_or(DEFAULT_PENALTY_WEIGHT)
    }

    fn validate(&self) -> ArbiterResult<()> {
        if self.name.trim().is_empty() {
            return Err(ArbiterError::Configuration(
                "antigoal name must not be empty".to_string(),
            ));
        }
        ensure_unit(&format!("antigoal[{}].threshold", self.name), self.threshold)?;
        if let Some(weight) = self.penalty_weight {
            if self.kind == ConstraintKind::Hard {
                log::warn!(
                    "antigoal '{}' is hard; penalty_weight {weight} is ignored",
                    self.name
                );
            }
            ensure_in_range(
                &format!("antigoal[{}].penalty_weight", self.name),
                weight,
                0.0,
                MAX_PENALTY_WEIGHT,
            )?;
        }
        Ok(())
    }
}

/// Per-goal evidence attached to a candidate action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalEvidence {
    #[serde(default)]
    pub considerations: Vec<f64>,
    #[serde(default)]
    pub discouragements: Vec<f64>,
}

/// A candidate action evaluated against every active goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCandidate {
    pub name: String,
    /// Evidence keyed by goal id. Goals without an entry contribute 0.
    #[serde(default)]
    pub goals: BTreeMap<String, GoalEvidence>,
}

/// Immutable per-cycle scoring input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringContext {
    /// Identifier carried into decision logs; not used for scoring.
    #[serde(default, rename = "scenarioId", skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub modulators: Vec<Modulator>,
    #[serde(default)]
    pub metagoals: Vec<String>,
    #[serde(default)]
    pub antigoals: Vec<AntigoalSpec>,
    /// Environment readings in [0, 1], read by signal-based antigoals.
    #[serde(default)]
    pub signals: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionCandidate>,
    #[serde(default)]
    pub tick: u64,
}

impl ScoringContext {
    pub fn new(goals: Vec<Goal>) -> Self {
        Self {
            goals,
            ..Default::default()
        }
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    /// Structural validation. Runs before any scoring; a failure here
    /// aborts the whole cycle with no partial results.
    pub fn validate(&self) -> ArbiterResult<()> {
        if self.goals.is_empty() {
            return Err(ArbiterError::Configuration(
                "scoring context has no active goals".to_string(),
            ));
        }

        let mut ids = HashSet::with_capacity(self.goals.len());
        for goal in &self.goals {
            goal.validate()?;
            if !ids.insert(goal.id.as_str()) {
                return Err(ArbiterError::Configuration(format!(
                    "duplicate goal id '{}'",
                    goal.id
                )));
            }
        }

        let mut seen = HashSet::with_capacity(self.modulators.len());
        for m in &self.modulators {
            ensure_unit(&format!("modulator[{}].intensity", m.name), m.intensity)?;
            if !seen.insert(m.name) {
                return Err(ArbiterError::Configuration(format!(
                    "modulator '{}' listed more than once",
                    m.name
                )));
            }
        }

        for ag in &self.antigoals {
            ag.validate()?;
        }

        for (name, &value) in &self.signals {
            ensure_unit(&format!("signal[{name}]"), value)?;
        }

        let mut action_names = HashSet::with_capacity(self.actions.len());
        for action in &self.actions {
            if !action_names.insert(action.name.as_str()) {
                return Err(ArbiterError::Configuration(format!(
                    "duplicate action '{}'",
                    action.name
                )));
            }
            for (goal_id, evidence) in &action.goals {
                if !ids.contains(goal_id.as_str()) {
                    return Err(ArbiterError::Configuration(format!(
                        "action '{}' references inactive goal '{goal_id}'",
                        action.name
                    )));
                }
                for &v in evidence.considerations.iter().chain(&evidence.discouragements) {
                    ensure_unit(&format!("action[{}].goals[{goal_id}]", action.name), v)?;
                }
            }
        }

        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> ArbiterResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ArbiterError::Configuration(format!("JSON parse error: {e}")))
    }
}
