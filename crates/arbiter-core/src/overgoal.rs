// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Overgoal Coherence
// ─────────────────────────────────────────────────────────────────────
//! Synergy reward for a goal's coherence with the active goal set.
//!
//! Each pairwise correlation is discounted by the geometric mean of the
//! two goals' measurabilities, so poorly observable goals contribute
//! less than their raw correlation suggests:
//!
//! `weighted(a, b) = corr(a, b) × sqrt(m(a) × m(b))`
//!
//! Since `sqrt(m(a) × m(b)) ≤ 1`, `|weighted| ≤ |corr|` always holds.

use arbiter_types::{ArbiterError, ArbiterResult, Diagnostic, DiagnosticKind, Goal};

use crate::correlation::CorrelationModel;
use crate::measurability::MeasurabilityModel;

/// `base_corr × sqrt(m_a × m_b)` for measurabilities in [0, 1].
#[inline]
pub fn weighted_correlation(base_corr: f64, m_a: f64, m_b: f64) -> f64 {
    base_corr * (m_a * m_b).max(0.0).sqrt()
}

pub struct OvergoalCoherence<'a> {
    measurability: &'a MeasurabilityModel,
    correlation: &'a dyn CorrelationModel,
    coherence_weight: f64,
}

impl<'a> OvergoalCoherence<'a> {
    pub fn new(
        measurability: &'a MeasurabilityModel,
        correlation: &'a dyn CorrelationModel,
        coherence_weight: f64,
    ) -> Self {
        Self {
            measurability,
            correlation,
            coherence_weight,
        }
    }

    /// Weighted correlation for a pair, given its base correlation.
    pub fn weighted_correlation(&self, a: &str, b: &str, base_corr: f64) -> ArbiterResult<f64> {
        let m_a = self.measurability.get_measurability(a)?;
        let m_b = self.measurability.get_measurability(b)?;
        Ok(weighted_correlation(base_corr, m_a, m_b))
    }

    /// Mean weighted correlation between `goal` and every other active goal.
    ///
    /// The candidate's own profile is required. Partners without a
    /// measurability profile are skipped, and pairs without correlation
    /// data count as 0; both are pushed to `diagnostics`.
    pub fn overgoal_score(
        &self,
        goal: &str,
        active_goals: &[Goal],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ArbiterResult<f64> {
        let m_goal = self.measurability.get_measurability(goal)?;

        let mut sum = 0.0;
        let mut count = 0usize;
        for other in active_goals.iter().filter(|g| g.id != goal) {
            let m_other = match self.measurability.get_measurability(&other.id) {
                Ok(m) => m,
                Err(_) => {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::MissingMeasurability,
                        Some(&other.id),
                        "no measurability profile; skipped as overgoal partner",
                    ));
                    continue;
                }
            };
            let corr = self.correlation.get_correlation(goal, &other.id);
            if corr.is_missing() {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MissingCorrelationData,
                    None,
                    missing_pair_message(goal, &other.id),
                ));
            }
            sum += weighted_correlation(corr.value(), m_goal, m_other);
            count += 1;
        }

        if count == 0 {
            return Ok(0.0);
        }
        Ok(sum / count as f64)
    }

    /// `coherence_weight × score`.
    pub fn bonus_from_score(&self, score: f64) -> f64 {
        self.coherence_weight * score
    }

    /// `coherence_weight × overgoal_score(goal, active_goals)`.
    pub fn overgoal_bonus(
        &self,
        goal: &str,
        active_goals: &[Goal],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ArbiterResult<f64> {
        let score = self.overgoal_score(goal, active_goals, diagnostics)?;
        Ok(self.bonus_from_score(score))
    }
}

/// Order-independent message so duplicate reports collapse.
fn missing_pair_message(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let err = ArbiterError::MissingCorrelationData(lo.to_string(), hi.to_string());
    format!("{err}; using 0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::StaticProvider;
    use arbiter_types::{MeasurabilityProfile, ReferenceTables};

    fn baseline_goals() -> Vec<Goal> {
        vec![
            Goal::new("energy", 0.9, 0.8),
            Goal::new("exploration", 0.6, 0.5),
            Goal::new("affinity", 0.3, 0.2),
        ]
    }

    #[test]
    fn test_weighted_energy_exploration() {
        let m = MeasurabilityModel::from_tables(&ReferenceTables::baseline());
        let c = StaticProvider::baseline();
        let og = OvergoalCoherence::new(&m, &c, 0.3);
        let w = og.weighted_correlation("energy", "exploration", 0.7).unwrap();
        assert!(((0.72f64 * 0.56).sqrt() - 0.6349).abs() < 1e-4);
        assert!((w - 0.4445).abs() < 1e-4);
    }

    #[test]
    fn test_weighted_bound() {
        let grid = [-1.0, -0.4, 0.0, 0.3, 0.7, 1.0];
        let ms = [0.0, 0.2, 0.56, 0.72, 1.0];
        for &c in &grid {
            for &a in &ms {
                for &b in &ms {
                    assert!(weighted_correlation(c, a, b).abs() <= c.abs() + 1e-15);
                }
            }
        }
    }

    #[test]
    fn test_overgoal_bonus_scenario() {
        let m = MeasurabilityModel::from_tables(&ReferenceTables::baseline());
        let c = StaticProvider::baseline();
        let og = OvergoalCoherence::new(&m, &c, 0.3);
        let mut diags = Vec::new();
        let score = og.overgoal_score("energy", &baseline_goals(), &mut diags).unwrap();
        assert!((score - 0.3171).abs() < 1e-4);
        let bonus = og.bonus_from_score(score);
        assert!((bonus - 0.0951).abs() < 1e-4);
        assert!((0.08..=0.12).contains(&bonus));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_alone_scores_zero() {
        let m = MeasurabilityModel::from_tables(&ReferenceTables::baseline());
        let c = StaticProvider::baseline();
        let og = OvergoalCoherence::new(&m, &c, 0.3);
        let mut diags = Vec::new();
        let goals = vec![Goal::new("energy", 0.9, 0.1)];
        assert_eq!(og.overgoal_bonus("energy", &goals, &mut diags).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_own_profile_fails() {
        let m = MeasurabilityModel::from_tables(&ReferenceTables::baseline());
        let c = StaticProvider::baseline();
        let og = OvergoalCoherence::new(&m, &c, 0.3);
        let mut diags = Vec::new();
        let mut goals = baseline_goals();
        goals.push(Goal::new("hunger", 0.5, 0.5));
        let err = og.overgoal_score("hunger", &goals, &mut diags).unwrap_err();
        assert!(matches!(err, ArbiterError::UnknownGoal(_)));
    }

    #[test]
    fn test_missing_partner_profile_is_skipped() {
        let m = MeasurabilityModel::from_tables(&ReferenceTables::baseline());
        let c = StaticProvider::baseline();
        let og = OvergoalCoherence::new(&m, &c, 0.3);
        let mut diags = Vec::new();
        let mut goals = baseline_goals();
        goals.push(Goal::new("hunger", 0.5, 0.5));
        let score = og.overgoal_score("energy", &goals, &mut diags).unwrap();
        assert!((score - 0.3171).abs() < 1e-4);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::MissingMeasurability);
    }

    #[test]
    fn test_missing_correlation_counts_as_zero() {
        let m = MeasurabilityModel::new([
            MeasurabilityProfile::new("a", 1.0, 1.0),
            MeasurabilityProfile::new("b", 1.0, 1.0),
        ]);
        let c = StaticProvider::default();
        let og = OvergoalCoherence::new(&m, &c, 0.3);
        let mut diags = Vec::new();
        let goals = vec![Goal::new("a", 0.5, 0.5), Goal::new("b", 0.5, 0.5)];
        assert_eq!(og.overgoal_score("a", &goals, &mut diags).unwrap(), 0.0);
        assert_eq!(diags[0].kind, DiagnosticKind::MissingCorrelationData);
    }
}
