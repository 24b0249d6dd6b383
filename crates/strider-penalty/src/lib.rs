//! Augmented-Lagrangian penalty family.
//!
//! Each penalty maps a multiplier `λ` and a constraint value `h` to a scalar
//! cost contribution, its first and second derivatives in `h`, and a
//! proposed next multiplier. [`AugmentedPenalty`] is a closed enum with static
//! dispatch over the three shapes:
//!
//! - [`ModifiedRelaxedBarrierPenalty`]: inequality `h ≥ 0`, smooth-PHR.
//! - [`SlacknessSquaredHingePenalty`]: inequality `h ≥ 0`, squared hinge.
//! - [`QuadraticPenalty`]: equality `h = 0`, method of multipliers.

pub mod multiplier;
pub mod quadratic;
pub mod relaxed_barrier;
pub mod squared_hinge;

use serde::{Deserialize, Serialize};
use strider_core::ConfigError;

pub use multiplier::{Multiplier, MultiplierCollection};
pub use quadratic::{QuadraticPenalty, QuadraticPenaltyConfig};
pub use relaxed_barrier::{ModifiedRelaxedBarrierPenalty, RelaxedBarrierConfig};
pub use squared_hinge::{SlacknessSquaredHingePenalty, SquaredHingeConfig};

/// Lower bound on multipliers proposed by the relaxed barrier. Keeps a
/// constraint's influence from vanishing once it is comfortably satisfied.
pub const MULTIPLIER_FLOOR: f64 = 1e-4;

// ---------------------------------------------------------------------------
// AugmentedPenalty
// ---------------------------------------------------------------------------

/// One penalty shape, selected at configuration time.
#[derive(Debug, Clone, PartialEq)]
pub enum AugmentedPenalty {
    RelaxedBarrier(ModifiedRelaxedBarrierPenalty),
    SquaredHinge(SlacknessSquaredHingePenalty),
    Quadratic(QuadraticPenalty),
}

impl AugmentedPenalty {
    pub fn relaxed_barrier(config: RelaxedBarrierConfig) -> Self {
        Self::RelaxedBarrier(ModifiedRelaxedBarrierPenalty::new(config))
    }

    pub const fn squared_hinge(config: SquaredHingeConfig) -> Self {
        Self::SquaredHinge(SlacknessSquaredHingePenalty::new(config))
    }

    pub const fn quadratic(config: QuadraticPenaltyConfig) -> Self {
        Self::Quadratic(QuadraticPenalty::new(config))
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::RelaxedBarrier(_) => "ModifiedRelaxedBarrierPenalty",
            Self::SquaredHinge(_) => "SlacknessSquaredHingePenalty",
            Self::Quadratic(_) => "QuadraticPenalty",
        }
    }

    /// Penalty value `p(h, λ)`.
    pub fn value(&self, t: f64, l: f64, h: f64) -> f64 {
        match self {
            Self::RelaxedBarrier(p) => p.value(t, l, h),
            Self::SquaredHinge(p) => p.value(t, l, h),
            Self::Quadratic(p) => p.value(t, l, h),
        }
    }

    /// `∂p/∂h`.
    pub fn derivative(&self, t: f64, l: f64, h: f64) -> f64 {
        match self {
            Self::RelaxedBarrier(p) => p.derivative(t, l, h),
            Self::SquaredHinge(p) => p.derivative(t, l, h),
            Self::Quadratic(p) => p.derivative(t, l, h),
        }
    }

    /// `∂²p/∂h²`, never negative.
    pub fn second_derivative(&self, t: f64, l: f64, h: f64) -> f64 {
        match self {
            Self::RelaxedBarrier(p) => p.second_derivative(t, l, h),
            Self::SquaredHinge(p) => p.second_derivative(t, l, h),
            Self::Quadratic(p) => p.second_derivative(t, l, h),
        }
    }

    /// Proposed next multiplier.
    pub fn update_multiplier(&self, t: f64, l: f64, h: f64) -> f64 {
        match self {
            Self::RelaxedBarrier(p) => p.update_multiplier(t, l, h),
            Self::SquaredHinge(p) => p.update_multiplier(t, l, h),
            Self::Quadratic(p) => p.update_multiplier(t, l, h),
        }
    }

    /// Multiplier used when no previous iterate exists.
    pub const fn initialize_multiplier(&self) -> f64 {
        match self {
            Self::RelaxedBarrier(p) => p.initialize_multiplier(),
            Self::SquaredHinge(p) => p.initialize_multiplier(),
            Self::Quadratic(p) => p.initialize_multiplier(),
        }
    }
}

// ---------------------------------------------------------------------------
// PenaltyConfig
// ---------------------------------------------------------------------------

/// Serializable penalty selection.
///
/// ```toml
/// type = "relaxed_barrier"
/// scale = 100.0
/// relaxation = 0.01
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PenaltyConfig {
    RelaxedBarrier(RelaxedBarrierConfig),
    SquaredHinge(SquaredHingeConfig),
    Quadratic(QuadraticPenaltyConfig),
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self::RelaxedBarrier(RelaxedBarrierConfig::default())
    }
}

impl PenaltyConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (scale, step_size) = match self {
            Self::RelaxedBarrier(c) => {
                if !(c.relaxation.is_finite() && c.relaxation > -1.0) {
                    return Err(ConfigError::invalid(
                        "penalty.relaxation",
                        format!("must be finite and > -1, got {}", c.relaxation),
                    ));
                }
                (c.scale, c.step_size)
            }
            Self::SquaredHinge(c) => (c.scale, c.step_size),
            Self::Quadratic(c) => (c.scale, c.step_size),
        };
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ConfigError::invalid(
                "penalty.scale",
                format!("must be finite and > 0, got {scale}"),
            ));
        }
        if !(step_size.is_finite() && step_size >= 0.0) {
            return Err(ConfigError::invalid(
                "penalty.step_size",
                format!("must be finite and >= 0, got {step_size}"),
            ));
        }
        Ok(())
    }

    /// Validate and construct the penalty.
    pub fn build(&self) -> Result<AugmentedPenalty, ConfigError> {
        self.validate()?;
        Ok(match *self {
            Self::RelaxedBarrier(c) => AugmentedPenalty::relaxed_barrier(c),
            Self::SquaredHinge(c) => AugmentedPenalty::squared_hinge(c),
            Self::Quadratic(c) => AugmentedPenalty::quadratic(c),
        })
    }
}
