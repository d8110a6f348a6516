// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Reference Tables
// ─────────────────────────────────────────────────────────────────────
//! Static per-goal and per-pair reference data.
//!
//! Tables are owned by the configuration layer, validated once, and
//! handed to the engine as an immutable snapshot. Updates build a new
//! snapshot; nothing is mutated in place while a cycle runs.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ensure_in_range, ensure_unit, ArbiterError, ArbiterResult};

/// How reliably a goal's satisfaction can be observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurabilityProfile {
    pub goal_id: String,
    pub confidence: f64,
    pub clarity: f64,
}

impl MeasurabilityProfile {
    pub fn new(goal_id: impl Into<String>, confidence: f64, clarity: f64) -> Self {
        Self {
            goal_id: goal_id.into(),
            confidence,
            clarity,
        }
    }

    /// `confidence × clarity`.
    pub fn measurability(&self) -> f64 {
        self.confidence * self.clarity
    }
}

/// Symmetric association between two goals, in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub goal_a: String,
    pub goal_b: String,
    pub value: f64,
}

impl CorrelationEntry {
    pub fn new(goal_a: impl Into<String>, goal_b: impl Into<String>, value: f64) -> Self {
        Self {
            goal_a: goal_a.into(),
            goal_b: goal_b.into(),
            value,
        }
    }
}

/// Paired satisfaction observations for two goals, `(sat_a, sat_b)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedObservations {
    pub goal_a: String,
    pub goal_b: String,
    pub samples: Vec<(f64, f64)>,
}

/// Canonical unordered key for a goal pair.
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    #[serde(default)]
    pub measurability: Vec<MeasurabilityProfile>,
    #[serde(default)]
    pub correlations: Vec<CorrelationEntry>,
    /// Raw observations for the computed correlation provider.
    #[serde(default)]
    pub observations: Vec<PairedObservations>,
}

impl ReferenceTables {
    /// The historical three-goal baseline (energy, exploration, affinity).
    pub fn baseline() -> Self {
        Self {
            measurability: vec![
                MeasurabilityProfile::new("energy", 0.8, 0.9),
                MeasurabilityProfile::new("exploration", 0.7, 0.8),
                MeasurabilityProfile::new("affinity", 0.5, 0.4),
            ],
            correlations: vec![
                CorrelationEntry::new("energy", "exploration", 0.7),
                CorrelationEntry::new("energy", "affinity", 0.5),
                CorrelationEntry::new("exploration", "affinity", 0.3),
            ],
            observations: Vec::new(),
        }
    }

    pub fn validate(&self) -> ArbiterResult<()> {
        let mut profiles = HashSet::with_capacity(self.measurability.len());
        for p in &self.measurability {
            ensure_unit(&format!("measurability[{}].confidence", p.goal_id), p.confidence)?;
            ensure_unit(&format!("measurability[{}].clarity", p.goal_id), p.clarity)?;
            if !profiles.insert(p.goal_id.as_str()) {
                return Err(ArbiterError::Configuration(format!(
                    "duplicate measurability profile for '{}'",
                    p.goal_id
                )));
            }
        }

        let mut pairs: HashMap<(String, String), f64> = HashMap::new();
        for e in &self.correlations {
            let field = format!("correlation[{}, {}]", e.goal_a, e.goal_b);
            ensure_in_range(&field, e.value, -1.0, 1.0)?;
            if e.goal_a == e.goal_b {
                return Err(ArbiterError::Configuration(format!(
                    "{field}: self-correlation is fixed at 1.0"
                )));
            }
            // (a, b) and (b, a) may both be listed, but only if they agree.
            if let Some(prev) = pairs.insert(pair_key(&e.goal_a, &e.goal_b), e.value) {
                if (prev - e.value).abs() > 1e-12 {
                    return Err(ArbiterError::Configuration(format!(
                        "{field}: asymmetric entries {prev} and {}",
                        e.value
                    )));
                }
            }
        }

        let mut observed = HashSet::new();
        for obs in &self.observations {
            if !observed.insert(pair_key(&obs.goal_a, &obs.goal_b)) {
                return Err(ArbiterError::Configuration(format!(
                    "duplicate observations for ({}, {})",
                    obs.goal_a, obs.goal_b
                )));
            }
            for &(x, y) in &obs.samples {
                let field = format!("observations[{}, {}]", obs.goal_a, obs.goal_b);
                ensure_unit(&field, x)?;
                ensure_unit(&field, y)?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_is_valid() {
        assert!(ReferenceTables::baseline().validate().is_ok());
    }

    #[test]
    fn test_profile_product() {
        let p = MeasurabilityProfile::new("energy", 0.8, 0.9);
        assert!((p.measurability() - 0.72).abs() < 1e-12);
    }

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(pair_key("b", "a"), pair_key("a", "b"));
    }

    #[test]
    fn test_asymmetric_entries_rejected() {
        let mut tables = ReferenceTables::baseline();
        tables
            .correlations
            .push(CorrelationEntry::new("exploration", "energy", 0.4));
        assert!(tables.validate().unwrap_err().to_string().contains("asymmetric"));
    }

    #[test]
    fn test_mirrored_entries_accepted() {
        let mut tables = ReferenceTables::baseline();
        tables
            .correlations
            .push(CorrelationEntry::new("exploration", "energy", 0.7));
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn test_correlation_out_of_range() {
        let mut tables = ReferenceTables::baseline();
        tables.correlations[0].value = -1.5;
        assert!(matches!(
            tables.validate().unwrap_err(),
            ArbiterError::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_duplicate_profile_rejected() {
        let mut tables = ReferenceTables::baseline();
        tables
            .measurability
            .push(MeasurabilityProfile::new("energy", 0.1, 0.1));
        assert!(tables.validate().is_err());
    }
}
