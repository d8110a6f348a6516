// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Measurability Model
// ─────────────────────────────────────────────────────────────────────
//! Per-goal measurability: `confidence × clarity`, always in [0, 1].

use std::collections::HashMap;

use arbiter_types::score::clamp_score;
use arbiter_types::{ArbiterError, ArbiterResult, MeasurabilityProfile, ReferenceTables};

#[derive(Debug, Clone, Default)]
pub struct MeasurabilityModel {
    profiles: HashMap<String, MeasurabilityProfile>,
}

impl MeasurabilityModel {
    pub fn new(profiles: impl IntoIterator<Item = MeasurabilityProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.goal_id.clone(), p))
                .collect(),
        }
    }

    pub fn from_tables(tables: &ReferenceTables) -> Self {
        Self::new(tables.measurability.iter().cloned())
    }

    /// Measurability of `goal_id`, or `UnknownGoal` if it has no profile.
    pub fn get_measurability(&self, goal_id: &str) -> ArbiterResult<f64> {
        let profile = self
            .profiles
            .get(goal_id)
            .ok_or_else(|| ArbiterError::UnknownGoal(goal_id.to_string()))?;
        Ok(clamp_score(profile.measurability(), 0.0, 1.0))
    }

    /// Arithmetic mean over `goal_ids`; 0 for an empty set.
    pub fn average_measurability<'a>(
        &self,
        goal_ids: impl IntoIterator<Item = &'a str>,
    ) -> ArbiterResult<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for id in goal_ids {
            sum += self.get_measurability(id)?;
            count += 1;
        }
        if count == 0 {
            return Ok(0.0);
        }
        Ok(clamp_score(sum / count as f64, 0.0, 1.0))
    }

    pub fn contains(&self, goal_id: &str) -> bool {
        self.profiles.contains_key(goal_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
