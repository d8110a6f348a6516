// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all arbitration failures.
///
/// A triggered hard antigoal is *not* an error: it is an expected veto
/// outcome carried in the `DecisionScore` breakdown.
#[derive(Error, Debug)]
pub enum ArbiterError {
    /// Lookup miss for a goal id (no measurability profile, unknown reference).
    #[error("unknown goal: {0}")]
    UnknownGoal(String),

    /// A value outside its declared bound, caught at ingestion.
    #[error("invalid range: {field} = {value} is outside [{lo}, {hi}]")]
    InvalidRange {
        field: String,
        value: f64,
        lo: f64,
        hi: f64,
    },

    /// No correlation data for a goal pair. Non-fatal inside a cycle:
    /// lookups default to 0 and surface this as a diagnostic instead.
    #[error("no correlation data for ({0}, {1})")]
    MissingCorrelationData(String, String),

    /// Malformed scoring context or engine configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Numerical error (NaN/Inf in a composed score).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Reading or writing decision logs, tables, or contexts failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArbiterError {
    /// Structural errors abort a whole cycle; anything else is isolated
    /// to the candidate that produced it.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ArbiterError::Configuration(_) | ArbiterError::InvalidRange { .. }
        )
    }
}

pub type ArbiterResult<T> = Result<T, ArbiterError>;

/// Reject `value` unless it is finite and inside `[lo, hi]`.
pub fn ensure_in_range(field: &str, value: f64, lo: f64, hi: f64) -> ArbiterResult<()> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        return Ok(());
    }
    Err(ArbiterError::InvalidRange {
        field: field.to_string(),
        value,
        lo,
        hi,
    })
}

/// Shorthand for the common `[0, 1]` bound.
pub fn ensure_unit(field: &str, value: f64) -> ArbiterResult<()> {
    ensure_in_range(field, value, 0.0, 1.0)
}
