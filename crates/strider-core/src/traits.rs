//! Collaborator interfaces consumed by the rollout, metrics and initializer.
//!
//! Implementations must be side-effect free for a fixed `(t, x, u)`: the
//! same handle may be evaluated from several line-search threads at once.

use nalgebra::DVector;

// ---------------------------------------------------------------------------
// SystemDynamics
// ---------------------------------------------------------------------------

/// Continuous flow map plus the discrete jump map applied at events.
pub trait SystemDynamics: Send + Sync {
    /// Number of state components.
    fn state_dim(&self) -> usize;

    /// Number of input components.
    fn input_dim(&self) -> usize;

    /// State derivative `dx/dt = f(t, x, u)`.
    fn flow_map(&self, t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64>;

    /// Post-event state `x⁺ = g(t, x⁻)`. Defaults to the identity.
    fn jump_map(&self, _t: f64, x: &DVector<f64>) -> DVector<f64> {
        x.clone()
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// A time-varying control law `u = π(t, x)`.
pub trait Controller: Send + Sync {
    /// Evaluate the input at `(t, x)`.
    fn compute_input(&self, t: f64, x: &DVector<f64>) -> DVector<f64>;

    /// Human-readable name for this controller.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// ---------------------------------------------------------------------------
// Cost terms
// ---------------------------------------------------------------------------

/// Running cost `L(t, x, u)`.
pub trait StateInputCost: Send + Sync {
    fn value(&self, t: f64, x: &DVector<f64>, u: &DVector<f64>) -> f64;
}

/// State-only cost used at pre-jump and final times.
pub trait StateCost: Send + Sync {
    fn value(&self, t: f64, x: &DVector<f64>) -> f64;
}

// ---------------------------------------------------------------------------
// Constraint terms
// ---------------------------------------------------------------------------

/// Vector-valued constraint `h(t, x)`.
///
/// Whether `h = 0` or `h ≥ 0` is meant depends on where the term is
/// registered, not on the term itself.
pub trait StateConstraint: Send + Sync {
    /// Number of constraint components at time `t`.
    fn num_constraints(&self, t: f64) -> usize;

    fn value(&self, t: f64, x: &DVector<f64>) -> DVector<f64>;
}

/// Vector-valued constraint `h(t, x, u)`.
pub trait StateInputConstraint: Send + Sync {
    /// Number of constraint components at time `t`.
    fn num_constraints(&self, t: f64) -> usize;

    fn value(&self, t: f64, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64>;
}
