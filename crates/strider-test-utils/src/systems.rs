//! Small dynamical systems and control laws with known behaviour.

use nalgebra::{DMatrix, DVector};
use strider_core::{Controller, SystemDynamics};

// ---------------------------------------------------------------------------
// LinearSystem
// ---------------------------------------------------------------------------

/// `dx/dt = A x + B u`, with an optional linear jump map `x⁺ = J x⁻`.
#[derive(Clone, Debug)]
pub struct LinearSystem {
    pub a: DMatrix<f64>,
    pub b: DMatrix<f64>,
    pub jump: Option<DMatrix<f64>>,
}

impl LinearSystem {
    pub fn new(a: DMatrix<f64>, b: DMatrix<f64>) -> Self {
        Self { a, b, jump: None }
    }

    /// Attach a linear jump map applied at every event.
    #[must_use]
    pub fn with_jump(mut self, jump: DMatrix<f64>) -> Self {
        self.jump = Some(jump);
        self
    }

    /// The scalar system `dx/dt = −x + u`.
    pub fn scalar_decay() -> Self {
        Self::new(
            DMatrix::from_element(1, 1, -1.0),
            DMatrix::from_element(1, 1, 1.0),
        )
    }

    /// Double integrator `[p, v]`, `dv/dt = u`.
    pub fn double_integrator() -> Self {
        Self::new(
            DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 0.0]),
            DMatrix::from_row_slice(2, 1, &[0.0, 1.0]),
        )
    }
}

impl SystemDynamics for LinearSystem {
    fn state_dim(&self) -> usize {
        self.a.nrows()
    }

    fn input_dim(&self) -> usize {
        self.b.ncols()
    }

    fn flow_map(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        &self.a * x + &self.b * u
    }

    fn jump_map(&self, _t: f64, x: &DVector<f64>) -> DVector<f64> {
        self.jump.as_ref().map_or_else(|| x.clone(), |j| j * x)
    }
}

// ---------------------------------------------------------------------------
// UnstableSystem
// ---------------------------------------------------------------------------

/// Scalar system whose derivative turns NaN after `blow_up_time`.
#[derive(Clone, Copy, Debug)]
pub struct UnstableSystem {
    pub blow_up_time: f64,
}

impl SystemDynamics for UnstableSystem {
    fn state_dim(&self) -> usize {
        1
    }

    fn input_dim(&self) -> usize {
        1
    }

    fn flow_map(&self, t: f64, x: &DVector<f64>, _u: &DVector<f64>) -> DVector<f64> {
        if t > self.blow_up_time {
            DVector::from_element(x.len(), f64::NAN)
        } else {
            DVector::zeros(x.len())
        }
    }
}

// ---------------------------------------------------------------------------
// ConstantController
// ---------------------------------------------------------------------------

/// Returns the same input regardless of time and state.
#[derive(Clone, Debug)]
pub struct ConstantController {
    pub input: DVector<f64>,
}

impl ConstantController {
    pub const fn new(input: DVector<f64>) -> Self {
        Self { input }
    }

    pub fn zeros(input_dim: usize) -> Self {
        Self::new(DVector::zeros(input_dim))
    }
}

impl Controller for ConstantController {
    fn compute_input(&self, _t: f64, _x: &DVector<f64>) -> DVector<f64> {
        self.input.clone()
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ConstantController"
    }
}
