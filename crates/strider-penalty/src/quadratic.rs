//! Classic augmented-Lagrangian penalty for an equality `h = 0`:
//! `p(h, λ) = λ·h + ½·scale·h²`.

use serde::{Deserialize, Serialize};

const fn default_scale() -> f64 {
    100.0
}
const fn default_step_size() -> f64 {
    1.0
}

/// Tuning of the quadratic penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticPenaltyConfig {
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Fraction of the full method-of-multipliers step `scale·h`.
    #[serde(default = "default_step_size")]
    pub step_size: f64,
}

impl Default for QuadraticPenaltyConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            step_size: default_step_size(),
        }
    }
}

/// Quadratic equality penalty. Multipliers are sign-free, so no floor applies.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticPenalty {
    config: QuadraticPenaltyConfig,
}

impl QuadraticPenalty {
    pub const fn new(config: QuadraticPenaltyConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &QuadraticPenaltyConfig {
        &self.config
    }

    pub fn value(&self, _t: f64, l: f64, h: f64) -> f64 {
        (0.5 * self.config.scale * h).mul_add(h, l * h)
    }

    pub fn derivative(&self, _t: f64, l: f64, h: f64) -> f64 {
        self.config.scale.mul_add(h, l)
    }

    pub const fn second_derivative(&self, _t: f64, _l: f64, _h: f64) -> f64 {
        self.config.scale
    }

    pub fn update_multiplier(&self, _t: f64, l: f64, h: f64) -> f64 {
        (self.config.step_size * self.config.scale).mul_add(h, l)
    }

    pub const fn initialize_multiplier(&self) -> f64 {
        0.0
    }
}
