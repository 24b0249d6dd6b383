//! Shared systems and configuration for the strider demos.

use nalgebra::DVector;
use serde::Deserialize;
use strider_core::{ConfigError, StateConstraint, StateInputCost, StriderConfig, SystemDynamics};
use strider_oc::{OptimalControlProblem, StateAugmentedLagrangian};
use strider_penalty::{AugmentedPenalty, PenaltyConfig};
use strider_switched::GRAVITY;
use tracing_subscriber::EnvFilter;

/// Hopper demo configuration: rollout, line search and penalty.
pub const HOPPER_CONFIG: &str = include_str!("../config/hopper.toml");

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HopperConfig {
    pub solver: StriderConfig,
    pub penalty: PenaltyConfig,
}

#[derive(Deserialize)]
struct PenaltySection {
    #[serde(default)]
    penalty: PenaltyConfig,
}

impl HopperConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let solver = StriderConfig::from_toml_str(content)?;
        let PenaltySection { penalty } = toml::from_str(content)?;
        penalty.validate()?;
        Ok(Self { solver, penalty })
    }
}

/// `RUST_LOG`-driven fmt subscriber, `info` by default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ---------------------------------------------------------------------------
// Hopper
// ---------------------------------------------------------------------------

/// Point mass moving vertically: state `[height, velocity]`, input thrust
/// per unit mass. Each event is a ground impact that reverses the velocity
/// scaled by `restitution`.
#[derive(Debug, Clone, Copy)]
pub struct Hopper {
    pub restitution: f64,
}

impl SystemDynamics for Hopper {
    fn state_dim(&self) -> usize {
        2
    }

    fn input_dim(&self) -> usize {
        1
    }

    fn flow_map(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![x[1], u[0] - GRAVITY])
    }

    fn jump_map(&self, _t: f64, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![x[0], -self.restitution * x[1]])
    }
}

/// `(h − target)² + weight·u²`.
#[derive(Debug, Clone, Copy)]
pub struct HeightTrackingCost {
    pub target_height: f64,
    pub input_weight: f64,
}

impl StateInputCost for HeightTrackingCost {
    fn value(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>) -> f64 {
        let error = x[0] - self.target_height;
        self.input_weight.mul_add(u[0] * u[0], error * error)
    }
}

/// `h ≥ 0`.
#[derive(Debug, Clone, Copy)]
pub struct AboveGround;

impl StateConstraint for AboveGround {
    fn num_constraints(&self, _t: f64) -> usize {
        1
    }

    fn value(&self, _t: f64, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_element(1, x[0])
    }
}

/// Height tracking with the ground as an inequality on every sample.
pub fn hopper_problem(cost: HeightTrackingCost, penalty: AugmentedPenalty) -> OptimalControlProblem {
    let mut problem = OptimalControlProblem::new().with_cost(cost);
    problem
        .intermediate
        .state_ineq_lagrangians
        .push(StateAugmentedLagrangian::new("above_ground", AboveGround, penalty));
    problem
}

/// Thrust a PD law around `target_height` would apply at `x`. Stands in for
/// the backward pass when proposing bias updates.
pub fn pd_thrust(target_height: f64, x: &DVector<f64>) -> f64 {
    const KP: f64 = 25.0;
    const KD: f64 = 10.0;
    KP.mul_add(target_height - x[0], GRAVITY) - KD * x[1]
}
