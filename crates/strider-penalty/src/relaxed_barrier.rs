//! Modified relaxed log-barrier (smooth-PHR) penalty for `h ≥ 0`.
//!
//! With `v = h / (scale·λ)` and `w = scale·λ²` the penalty is
//!
//! ```text
//! p(h, λ) = −w·ln(1 + v)                          v > δ
//!         = w·(½a(v − δ)² + b(v − δ) + c)         v ≤ δ
//! ```
//!
//! where `a = 1/(1+δ)²`, `b = −1/(1+δ)`, `c = −ln(1+δ)`. The constants make
//! the value and its first derivative agree at `v = δ`, so the penalty is C¹
//! across the branch boundary and convex in `h` on both sides.

use serde::{Deserialize, Serialize};

use crate::MULTIPLIER_FLOOR;

const fn default_scale() -> f64 {
    100.0
}
const fn default_relaxation() -> f64 {
    1e-2
}

/// Tuning of the relaxed barrier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelaxedBarrierConfig {
    /// Penalty scale `μ`.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Relaxation threshold `δ` in normalized constraint units.
    #[serde(default = "default_relaxation")]
    pub relaxation: f64,
    /// Damping of the multiplier update on the relaxed (`v ≤ δ`) branch.
    #[serde(default)]
    pub step_size: f64,
}

impl Default for RelaxedBarrierConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            relaxation: default_relaxation(),
            step_size: 0.0,
        }
    }
}

/// Modified relaxed barrier penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedRelaxedBarrierPenalty {
    config: RelaxedBarrierConfig,
    a: f64,
    b: f64,
    c: f64,
}

impl ModifiedRelaxedBarrierPenalty {
    pub fn new(config: RelaxedBarrierConfig) -> Self {
        let delta = config.relaxation;
        Self {
            config,
            a: 1.0 / (1.0 + delta).powi(2),
            b: -1.0 / (1.0 + delta),
            c: -(1.0 + delta).ln(),
        }
    }

    pub const fn config(&self) -> &RelaxedBarrierConfig {
        &self.config
    }

    pub fn value(&self, _t: f64, l: f64, h: f64) -> f64 {
        let v = self.v(l, h);
        if v > self.config.relaxation {
            -self.w(l) * v.ln_1p()
        } else {
            let v_rel = v - self.config.relaxation;
            self.w(l) * (0.5 * self.a * v_rel).mul_add(v_rel, self.b.mul_add(v_rel, self.c))
        }
    }

    pub fn derivative(&self, _t: f64, l: f64, h: f64) -> f64 {
        let v = self.v(l, h);
        if v > self.config.relaxation {
            -self.w(l) / (1.0 + v) * self.dl_dh(l)
        } else {
            self.w(l) * self.a.mul_add(v - self.config.relaxation, self.b) * self.dl_dh(l)
        }
    }

    pub fn second_derivative(&self, _t: f64, l: f64, h: f64) -> f64 {
        let v = self.v(l, h);
        let dl_dh = self.dl_dh(l);
        if v > self.config.relaxation {
            self.w(l) / ((1.0 + v) * (1.0 + v)) * dl_dh * dl_dh
        } else {
            self.w(l) * self.a * dl_dh * dl_dh
        }
    }

    /// Damped dual ascent `λ⁺ = −λ·ψ'(v)`, clamped to [`MULTIPLIER_FLOOR`].
    pub fn update_multiplier(&self, _t: f64, l: f64, h: f64) -> f64 {
        let v = self.v(l, h);
        let proposed = if v > self.config.relaxation {
            self.w(l) / (1.0 + v) * self.dl_dh(l)
        } else {
            self.config.step_size
                * self.w(l)
                * (-self.a).mul_add(v - self.config.relaxation, -self.b)
                * self.dl_dh(l)
        };
        proposed.max(MULTIPLIER_FLOOR)
    }

    pub const fn initialize_multiplier(&self) -> f64 {
        1.0
    }

    fn v(&self, l: f64, h: f64) -> f64 {
        assert!(
            l > 0.0,
            "relaxed barrier requires a positive multiplier, got {l}"
        );
        h / (self.config.scale * l)
    }

    fn w(&self, l: f64) -> f64 {
        self.config.scale * l * l
    }

    fn dl_dh(&self, l: f64) -> f64 {
        1.0 / (self.config.scale * l)
    }
}
