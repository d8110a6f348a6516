// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Engine Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{ArbiterError, ArbiterResult};

/// Upper bound accepted for any soft antigoal penalty weight.
///
/// Keeps every non-vetoed total far above `score::FLOOR_VALUE`.
pub const MAX_PENALTY_WEIGHT: f64 = 1.0e6;

/// Upper bound on the magnitude of any metagoal weight.
pub const MAX_METAGOAL_WEIGHT: f64 = 1.0e3;

/// What the ranker does with vetoed candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VetoPolicy {
    /// Keep vetoed candidates at the bottom of the ranking with `vetoed = true`.
    #[default]
    KeepLast,
    /// Remove vetoed candidates from the ranked output entirely.
    Drop,
}

/// Which correlation provider backs a reference snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrelationSource {
    /// Constant per-pair table (historical baselines).
    #[default]
    Static,
    /// Mutual information estimated from paired satisfaction observations.
    Computed,
}

/// Per-metagoal contribution weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetagoalWeights {
    pub coherence: f64,
    pub efficiency: f64,
    pub learning: f64,
    pub uncertainty_reduction: f64,
}

impl Default for MetagoalWeights {
    fn default() -> Self {
        Self {
            coherence: 0.1,
            efficiency: 0.1,
            learning: 0.1,
            uncertainty_reduction: 0.1,
        }
    }
}

/// Component switches used for ablation runs.
///
/// A disabled component contributes its neutral value: no metagoal
/// adjustment, no overgoal bonus, a modulation factor of 1.0, and no
/// antigoal penalty or veto.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ablation {
    pub metagoals: bool,
    pub overgoal: bool,
    pub modulators: bool,
    pub antigoals: bool,
}

impl Default for Ablation {
    fn default() -> Self {
        Self {
            metagoals: true,
            overgoal: true,
            modulators: true,
            antigoals: true,
        }
    }
}

/// Runtime configuration for the arbitration engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Configuration label written to decision logs.
    /// Default: "full-system" (the ablation baseline).
    pub label: String,

    /// Weight applied to the overgoal score to form the overgoal bonus.
    /// Default: 0.3.
    pub coherence_weight: f64,

    /// Placement of vetoed candidates in the ranked output.
    pub veto_policy: VetoPolicy,

    /// Correlation provider used when building reference snapshots.
    pub correlation_source: CorrelationSource,

    /// Sign computed correlations by the raw linear trend.
    /// Only read when `correlation_source` is `Computed`.
    pub directional_correlation: bool,

    pub metagoal_weights: MetagoalWeights,

    pub ablation: Ablation,

    /// Fan per-goal scoring out across the rayon pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            label: "full-system".to_string(),
            coherence_weight: 0.3,
            veto_policy: VetoPolicy::KeepLast,
            correlation_source: CorrelationSource::Static,
            directional_correlation: false,
            metagoal_weights: MetagoalWeights::default(),
            ablation: Ablation::default(),
            parallel: true,
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> ArbiterResult<()> {
        if self.label.trim().is_empty() {
            return Err(ArbiterError::Configuration(
                "label must not be empty".to_string(),
            ));
        }
        if !self.coherence_weight.is_finite() || !(0.0..=1.0).contains(&self.coherence_weight) {
            return Err(ArbiterError::Configuration(format!(
                "coherence_weight must be in [0, 1], got {}",
                self.coherence_weight
            )));
        }
        let w = &self.metagoal_weights;
        for (name, value) in [
            ("coherence", w.coherence),
            ("efficiency", w.efficiency),
            ("learning", w.learning),
            ("uncertainty_reduction", w.uncertainty_reduction),
        ] {
            if !value.is_finite() || value.abs() > MAX_METAGOAL_WEIGHT {
                return Err(ArbiterError::Configuration(format!(
                    "metagoal_weights.{name} must be in [-{MAX_METAGOAL_WEIGHT}, \
                     {MAX_METAGOAL_WEIGHT}], got {value}"
                )));
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
