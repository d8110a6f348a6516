// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Modulator Bank
// ─────────────────────────────────────────────────────────────────────
//! Affective (pleasure, arousal, dominance) and attentional (focus,
//! resolution, exteroception) multipliers.
//!
//! Every modulator maps intensity through a monotonic piecewise-linear
//! curve with knots at `(0, low)`, `(0.5, 1.0)`, `(1, high)`. Neutral
//! intensity leaves the score unchanged; the extremes reach the bounds
//! of the modulator's range.

use arbiter_types::{Modulator, ModulatorKind};

/// Multiplier range of one modulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulatorCurve {
    /// Multiplier at intensity 0.
    pub low: f64,
    /// Multiplier at intensity 1.
    pub high: f64,
}

/// Intensity at which every curve passes through 1.0.
pub const NEUTRAL_INTENSITY: f64 = 0.5;

impl ModulatorCurve {
    pub fn apply(&self, intensity: f64) -> f64 {
        let x = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            NEUTRAL_INTENSITY
        };
        if x <= NEUTRAL_INTENSITY {
            self.low + (1.0 - self.low) * (x / NEUTRAL_INTENSITY)
        } else {
            1.0 + (self.high - 1.0) * ((x - NEUTRAL_INTENSITY) / (1.0 - NEUTRAL_INTENSITY))
        }
    }
}

/// Curve table for the six modulators.
pub const fn curve(kind: ModulatorKind) -> ModulatorCurve {
    match kind {
        ModulatorKind::Pleasure => ModulatorCurve { low: 0.9, high: 1.1 },
        ModulatorKind::Arousal => ModulatorCurve { low: 0.8, high: 1.2 },
        ModulatorKind::Dominance => ModulatorCurve { low: 0.85, high: 1.15 },
        ModulatorKind::Focus => ModulatorCurve { low: 0.7, high: 1.3 },
        ModulatorKind::Resolution => ModulatorCurve { low: 0.75, high: 1.25 },
        ModulatorKind::Exteroception => ModulatorCurve { low: 0.8, high: 1.2 },
    }
}

/// Multiplier produced by one modulator at `intensity`.
pub fn effect(kind: ModulatorKind, intensity: f64) -> f64 {
    curve(kind).apply(intensity)
}

/// Stateless bank combining active modulators.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModulatorBank;

impl ModulatorBank {
    /// Product of every active modulator's effect. Absent modulators
    /// contribute 1.0, so an empty slice yields 1.0.
    pub fn overall_modulation(&self, active: &[Modulator]) -> f64 {
        active
            .iter()
            .map(|m| effect(m.name, m.intensity))
            .product()
    }
}
