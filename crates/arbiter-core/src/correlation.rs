// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Correlation Model
// ─────────────────────────────────────────────────────────────────────
//! Symmetric pairwise association between goals.
//!
//! Two providers satisfy the same lookup contract:
//! - `StaticProvider` — constant per-pair table, for reproducing
//!   historical baselines.
//! - `ComputedProvider` — discretized mutual information estimated from
//!   paired satisfaction observations.
//!
//! Pairs without data resolve to `CorrelationLookup::Missing`, which
//! scores as 0 and is reported, never raised.

use std::collections::HashMap;

use arbiter_types::score::clamp_score;
use arbiter_types::{CorrelationEntry, PairedObservations, ReferenceTables};

/// Number of satisfaction bins used by the estimator.
pub const BINS: usize = 3;

/// Outcome of a correlation lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrelationLookup {
    Known(f64),
    /// No data for the pair; scores as 0.
    Missing,
}

impl CorrelationLookup {
    pub fn value(self) -> f64 {
        match self {
            CorrelationLookup::Known(v) => v,
            CorrelationLookup::Missing => 0.0,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, CorrelationLookup::Missing)
    }
}

/// Trait for correlation providers.
///
/// Implementations must be symmetric:
/// `get_correlation(a, b) == get_correlation(b, a)`, and a goal is
/// perfectly correlated with itself.
pub trait CorrelationModel: Send + Sync {
    fn get_correlation(&self, a: &str, b: &str) -> CorrelationLookup;

    /// Short provider name for logs.
    fn provider_name(&self) -> &'static str;
}

/// Both-direction pair table; symmetric by construction.
#[derive(Debug, Clone, Default)]
struct PairTable {
    values: HashMap<String, HashMap<String, f64>>,
}

impl PairTable {
    fn insert(&mut self, a: &str, b: &str, value: f64) {
        self.values
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), value);
        self.values
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string(), value);
    }

    fn lookup(&self, a: &str, b: &str) -> CorrelationLookup {
        if a == b {
            return CorrelationLookup::Known(1.0);
        }
        self.values
            .get(a)
            .and_then(|row| row.get(b))
            .map_or(CorrelationLookup::Missing, |&v| CorrelationLookup::Known(v))
    }

    fn pair_count(&self) -> usize {
        self.values.values().map(HashMap::len).sum::<usize>() / 2
    }
}

/// Constant per-pair correlation table.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    table: PairTable,
}

impl StaticProvider {
    pub fn new(entries: impl IntoIterator<Item = CorrelationEntry>) -> Self {
        let mut table = PairTable::default();
        for e in entries {
            table.insert(&e.goal_a, &e.goal_b, clamp_score(e.value, -1.0, 1.0));
        }
        Self { table }
    }

    pub fn from_tables(tables: &ReferenceTables) -> Self {
        Self::new(tables.correlations.iter().cloned())
    }

    /// Energy–exploration 0.7, energy–affinity 0.5, exploration–affinity 0.3.
    pub fn baseline() -> Self {
        Self::from_tables(&ReferenceTables::baseline())
    }

    pub fn pair_count(&self) -> usize {
        self.table.pair_count()
    }
}

impl CorrelationModel for StaticProvider {
    fn get_correlation(&self, a: &str, b: &str) -> CorrelationLookup {
        self.table.lookup(a, b)
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}

/// Mutual-information estimator over paired satisfaction observations.
///
/// Estimates are computed once at construction; the provider is an
/// immutable table afterwards.
#[derive(Debug, Clone, Default)]
pub struct ComputedProvider {
    table: PairTable,
}

impl ComputedProvider {
    pub fn from_observations(series: &[PairedObservations], directional: bool) -> Self {
        let mut table = PairTable::default();
        for obs in series {
            if obs.samples.is_empty() {
                log::warn!(
                    "no samples for ({}, {}); pair left without correlation data",
                    obs.goal_a,
                    obs.goal_b
                );
                continue;
            }
            let mut value = normalized_mutual_information(&obs.samples);
            if directional && linear_trend(&obs.samples) < 0.0 {
                value = -value;
            }
            log::debug!(
                "estimated correlation ({}, {}) = {value:.4} from {} samples",
                obs.goal_a,
                obs.goal_b,
                obs.samples.len()
            );
            table.insert(&obs.goal_a, &obs.goal_b, value);
        }
        Self { table }
    }

    pub fn from_tables(tables: &ReferenceTables, directional: bool) -> Self {
        Self::from_observations(&tables.observations, directional)
    }

    pub fn pair_count(&self) -> usize {
        self.table.pair_count()
    }
}

impl CorrelationModel for ComputedProvider {
    fn get_correlation(&self, a: &str, b: &str) -> CorrelationLookup {
        self.table.lookup(a, b)
    }

    fn provider_name(&self) -> &'static str {
        "computed"
    }
}

/// Bin a satisfaction value: `[0, 0.33] → 0`, `(0.33, 0.66] → 1`,
/// `(0.66, 1] → 2`.
pub fn discretize(value: f64) -> usize {
    if value <= 0.33 {
        0
    } else if value <= 0.66 {
        1
    } else {
        2
    }
}

/// 3×3 joint occupancy histogram of binned observations.
pub fn joint_histogram(samples: &[(f64, f64)]) -> [[u32; BINS]; BINS] {
    let mut hist = [[0u32; BINS]; BINS];
    for &(x, y) in samples {
        hist[discretize(x)][discretize(y)] += 1;
    }
    hist
}

/// Mutual information of the binned samples divided by `ln 3`, in [0, 1].
pub fn normalized_mutual_information(samples: &[(f64, f64)]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let hist = joint_histogram(samples);
    let n = samples.len() as f64;

    let mut px = [0.0f64; BINS];
    let mut py = [0.0f64; BINS];
    for (i, row) in hist.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            px[i] += count as f64 / n;
            py[j] += count as f64 / n;
        }
    }

    let mut mi = 0.0;
    for (i, row) in hist.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let pxy = count as f64 / n;
            mi += pxy * (pxy / (px[i] * py[j])).ln();
        }
    }
    clamp_score(mi / (BINS as f64).ln(), 0.0, 1.0)
}

/// Sample covariance of the raw observations; only its sign is used.
pub fn linear_trend(samples: &[(f64, f64)]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let n = samples.len() as f64;
    let (sx, sy) = samples
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
    let (mx, my) = (sx / n, sy / n);
    samples
        .iter()
        .map(|&(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / (n - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(a: &str, b: &str, samples: Vec<(f64, f64)>) -> PairedObservations {
        PairedObservations {
            goal_a: a.into(),
            goal_b: b.into(),
            samples,
        }
    }

    #[test]
    fn test_discretize_boundaries() {
        assert_eq!(discretize(0.0), 0);
        assert_eq!(discretize(0.33), 0);
        assert_eq!(discretize(0.34), 1);
        assert_eq!(discretize(0.66), 1);
        assert_eq!(discretize(0.67), 2);
        assert_eq!(discretize(1.0), 2);
    }

    #[test]
    fn test_static_baseline() {
        let p = StaticProvider::baseline();
        assert_eq!(p.get_correlation("energy", "exploration"), CorrelationLookup::Known(0.7));
        assert_eq!(p.get_correlation("affinity", "energy"), CorrelationLookup::Known(0.5));
        assert_eq!(p.pair_count(), 3);
    }

    #[test]
    fn test_static_symmetry() {
        let p = StaticProvider::baseline();
        let ids = ["energy", "exploration", "affinity", "hunger"];
        for a in ids {
            for b in ids {
                assert_eq!(p.get_correlation(a, b), p.get_correlation(b, a));
            }
        }
    }

    #[test]
    fn test_missing_defaults_to_zero() {
        let p = StaticProvider::baseline();
        let c = p.get_correlation("energy", "hunger");
        assert!(c.is_missing());
        assert_eq!(c.value(), 0.0);
    }

    #[test]
    fn test_self_correlation() {
        let p = StaticProvider::default();
        assert_eq!(p.get_correlation("energy", "energy"), CorrelationLookup::Known(1.0));
    }

    #[test]
    fn test_mi_perfect_dependence() {
        let samples = vec![(0.1, 0.2), (0.5, 0.5), (0.9, 0.8)];
        assert!((normalized_mutual_information(&samples) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mi_independence() {
        let levels = [0.1, 0.5, 0.9];
        let samples: Vec<(f64, f64)> = levels
            .iter()
            .flat_map(|&x| levels.iter().map(move |&y| (x, y)))
            .collect();
        assert!(normalized_mutual_information(&samples).abs() < 1e-9);
    }

    #[test]
    fn test_mi_symmetric_under_swap() {
        let samples = vec![(0.1, 0.05), (0.2, 0.7), (0.45, 0.4), (0.8, 0.8), (0.7, 0.2), (0.9, 0.95)];
        let swapped: Vec<(f64, f64)> = samples.iter().map(|&(x, y)| (y, x)).collect();
        let a = normalized_mutual_information(&samples);
        let b = normalized_mutual_information(&swapped);
        assert!((a - b).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&a));
    }

    #[test]
    fn test_computed_provider_symmetric_lookup() {
        let p = ComputedProvider::from_observations(
            &[series("energy", "exploration", vec![(0.1, 0.1), (0.5, 0.5), (0.9, 0.9)])],
            false,
        );
        let ab = p.get_correlation("energy", "exploration");
        assert_eq!(ab, p.get_correlation("exploration", "energy"));
        assert!((ab.value() - 1.0).abs() < 1e-9);
        assert!(p.get_correlation("energy", "affinity").is_missing());
    }

    #[test]
    fn test_computed_directional_sign() {
        let inverse = vec![(0.1, 0.9), (0.5, 0.5), (0.9, 0.1)];
        let signed = ComputedProvider::from_observations(&[series("a", "b", inverse.clone())], true);
        let unsigned = ComputedProvider::from_observations(&[series("a", "b", inverse)], false);
        assert!(signed.get_correlation("a", "b").value() < 0.0);
        assert!(unsigned.get_correlation("a", "b").value() > 0.0);
    }

    #[test]
    fn test_computed_skips_empty_series() {
        let p = ComputedProvider::from_observations(&[series("a", "b", Vec::new())], false);
        assert_eq!(p.pair_count(), 0);
        assert!(p.get_correlation("a", "b").is_missing());
    }

    #[test]
    fn test_linear_trend_sign() {
        assert!(linear_trend(&[(0.1, 0.1), (0.9, 0.8)]) > 0.0);
        assert!(linear_trend(&[(0.1, 0.8), (0.9, 0.1)]) < 0.0);
        assert_eq!(linear_trend(&[(0.5, 0.5)]), 0.0);
    }
}
