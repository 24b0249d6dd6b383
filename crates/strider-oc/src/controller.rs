//! Time-indexed control laws and the line-search increment rule.
//!
//! Both controllers here interpolate **linearly** between neighbouring time
//! stamps and hold the first/last sample outside the stamped range. At a
//! repeated stamp (an event time) the later sample, i.e. the post-event one,
//! is used.

use nalgebra::{DMatrix, DVector};
use strider_core::{Controller, ValidationError, trapezoidal_integration_by};

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Neighbouring indices and the weight of the second one for time `t`.
fn interpolation_weights(stamps: &[f64], t: f64) -> (usize, usize, f64) {
    let n = stamps.len();
    let upper = stamps.partition_point(|&s| s <= t);
    if upper == 0 {
        (0, 0, 0.0)
    } else if upper == n {
        (n - 1, n - 1, 0.0)
    } else {
        let lower = upper - 1;
        let alpha = (t - stamps[lower]) / (stamps[upper] - stamps[lower]);
        (lower, upper, alpha)
    }
}

fn check_sorted(stamps: &[f64]) -> Result<(), ValidationError> {
    match stamps.windows(2).position(|w| w[1] < w[0]) {
        Some(position) => Err(ValidationError::UnsortedTimeStamps {
            position: position + 1,
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// LinearController
// ---------------------------------------------------------------------------

/// Affine feedback law `u = K(t)·x + b(t)`.
///
/// `gains`, `biases` (and `delta_biases` when a proposed update is attached)
/// always have the same length as `time_stamps`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearController {
    time_stamps: Vec<f64>,
    gains: Vec<DMatrix<f64>>,
    biases: Vec<DVector<f64>>,
    delta_biases: Vec<DVector<f64>>,
}

impl LinearController {
    pub fn new(
        time_stamps: Vec<f64>,
        gains: Vec<DMatrix<f64>>,
        biases: Vec<DVector<f64>>,
    ) -> Result<Self, ValidationError> {
        if gains.len() != time_stamps.len() || biases.len() != time_stamps.len() {
            return Err(ValidationError::ControllerLengthMismatch {
                stamps: time_stamps.len(),
                gains: gains.len(),
                biases: biases.len(),
            });
        }
        check_sorted(&time_stamps)?;
        Ok(Self {
            time_stamps,
            gains,
            biases,
            delta_biases: Vec::new(),
        })
    }

    /// Zero gains and biases on the given stamps.
    pub fn zeros(time_stamps: Vec<f64>, state_dim: usize, input_dim: usize) -> Result<Self, ValidationError> {
        let n = time_stamps.len();
        Self::new(
            time_stamps,
            vec![DMatrix::zeros(input_dim, state_dim); n],
            vec![DVector::zeros(input_dim); n],
        )
    }

    /// Attach the proposed bias update produced by the backward pass.
    pub fn with_delta_biases(mut self, delta_biases: Vec<DVector<f64>>) -> Result<Self, ValidationError> {
        if delta_biases.len() != self.time_stamps.len() {
            return Err(ValidationError::ControllerLengthMismatch {
                stamps: self.time_stamps.len(),
                gains: self.gains.len(),
                biases: delta_biases.len(),
            });
        }
        self.delta_biases = delta_biases;
        Ok(self)
    }

    pub fn time_stamps(&self) -> &[f64] {
        &self.time_stamps
    }

    pub fn gains(&self) -> &[DMatrix<f64>] {
        &self.gains
    }

    pub fn biases(&self) -> &[DVector<f64>] {
        &self.biases
    }

    /// Proposed bias update; empty when none is attached.
    pub fn delta_biases(&self) -> &[DVector<f64>] {
        &self.delta_biases
    }

    pub fn len(&self) -> usize {
        self.time_stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_stamps.is_empty()
    }

    /// Controller for the next rollout trial: same stamps and gains,
    /// `b_k + step_length·δb_k`. The proposed update is carried over, so a
    /// controller without one is returned unchanged.
    #[must_use]
    pub fn increment(&self, step_length: f64) -> Self {
        let biases = if self.delta_biases.is_empty() {
            self.biases.clone()
        } else {
            self.biases
                .iter()
                .zip(&self.delta_biases)
                .map(|(b, db)| b + db * step_length)
                .collect()
        };
        Self {
            time_stamps: self.time_stamps.clone(),
            gains: self.gains.clone(),
            biases,
            delta_biases: self.delta_biases.clone(),
        }
    }

    /// Trapezoidal integral of `‖δb(t)‖²` over the controller's own stamps.
    ///
    /// Step-length independent measure of how large the proposed correction
    /// is. Zero with fewer than two stamps or no attached update.
    pub fn update_input_sensitivity(&self) -> f64 {
        if self.delta_biases.is_empty() {
            return 0.0;
        }
        trapezoidal_integration_by(&self.time_stamps, &self.delta_biases, |db| db.norm_squared())
    }
}

impl Controller for LinearController {
    /// Empty controllers produce an empty input.
    fn compute_input(&self, t: f64, x: &DVector<f64>) -> DVector<f64> {
        if self.is_empty() {
            return DVector::zeros(0);
        }
        let (lo, hi, alpha) = interpolation_weights(&self.time_stamps, t);
        if lo == hi {
            return &self.gains[lo] * x + &self.biases[lo];
        }
        let gain = &self.gains[lo] * (1.0 - alpha) + &self.gains[hi] * alpha;
        let bias = &self.biases[lo] * (1.0 - alpha) + &self.biases[hi] * alpha;
        gain * x + bias
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "LinearController"
    }
}

/// Free-function form of [`LinearController::increment`].
pub fn increment_controller(step_length: f64, unoptimized: &LinearController) -> LinearController {
    unoptimized.increment(step_length)
}

// ---------------------------------------------------------------------------
// FeedforwardController
// ---------------------------------------------------------------------------

/// Open-loop input trajectory `u(t)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedforwardController {
    time_stamps: Vec<f64>,
    inputs: Vec<DVector<f64>>,
}

impl FeedforwardController {
    pub fn new(time_stamps: Vec<f64>, inputs: Vec<DVector<f64>>) -> Result<Self, ValidationError> {
        if inputs.len() != time_stamps.len() {
            return Err(ValidationError::ControllerLengthMismatch {
                stamps: time_stamps.len(),
                gains: 0,
                biases: inputs.len(),
            });
        }
        check_sorted(&time_stamps)?;
        Ok(Self {
            time_stamps,
            inputs,
        })
    }

    pub fn time_stamps(&self) -> &[f64] {
        &self.time_stamps
    }

    pub fn inputs(&self) -> &[DVector<f64>] {
        &self.inputs
    }
}

impl From<&LinearController> for FeedforwardController {
    /// Drops the feedback part: `u(t) = b(t)`.
    fn from(controller: &LinearController) -> Self {
        Self {
            time_stamps: controller.time_stamps.clone(),
            inputs: controller.biases.clone(),
        }
    }
}

impl Controller for FeedforwardController {
    fn compute_input(&self, t: f64, _x: &DVector<f64>) -> DVector<f64> {
        if self.time_stamps.is_empty() {
            return DVector::zeros(0);
        }
        let (lo, hi, alpha) = interpolation_weights(&self.time_stamps, t);
        if lo == hi {
            return self.inputs[lo].clone();
        }
        &self.inputs[lo] * (1.0 - alpha) + &self.inputs[hi] * alpha
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "FeedforwardController"
    }
}
