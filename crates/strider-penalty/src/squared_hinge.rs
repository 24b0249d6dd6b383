//! Slackness squared-hinge penalty for `h ≥ 0`.
//!
//! ```text
//! p(h, λ) = −λ·h + ½·scale·h²     h < λ/scale
//!         = −λ²/(2·scale)         otherwise
//! ```
//!
//! Multipliers start at 0 and are floored at 0, not at the positive
//! [`MULTIPLIER_FLOOR`](crate::MULTIPLIER_FLOOR) the relaxed barrier needs.

use serde::{Deserialize, Serialize};

const fn default_scale() -> f64 {
    100.0
}
const fn default_step_size() -> f64 {
    1.0
}

/// Tuning of the squared-hinge penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquaredHingeConfig {
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
}

impl Default for SquaredHingeConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            step_size: default_step_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlacknessSquaredHingePenalty {
    config: SquaredHingeConfig,
}

impl SlacknessSquaredHingePenalty {
    pub const fn new(config: SquaredHingeConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &SquaredHingeConfig {
        &self.config
    }

    pub fn value(&self, _t: f64, l: f64, h: f64) -> f64 {
        if self.active(l, h) {
            (0.5 * self.config.scale * h).mul_add(h, -l * h)
        } else {
            -0.5 * l * l / self.config.scale
        }
    }

    pub fn derivative(&self, _t: f64, l: f64, h: f64) -> f64 {
        if self.active(l, h) {
            self.config.scale.mul_add(h, -l)
        } else {
            0.0
        }
    }

    pub fn second_derivative(&self, _t: f64, l: f64, h: f64) -> f64 {
        if self.active(l, h) {
            self.config.scale
        } else {
            0.0
        }
    }

    /// Projected dual ascent `max(λ − step·scale·h, 0)`.
    pub fn update_multiplier(&self, _t: f64, l: f64, h: f64) -> f64 {
        (-self.config.step_size * self.config.scale)
            .mul_add(h, l)
            .max(0.0)
    }

    pub const fn initialize_multiplier(&self) -> f64 {
        0.0
    }

    fn active(&self, l: f64, h: f64) -> bool {
        h < l / self.config.scale
    }
}
