//! Rollout, metrics and controller-update machinery for hybrid optimal
//! control.
//!
//! One solver iteration, as driven by an external optimizer:
//!
//! 1. [`rollout_trajectory`] simulates the current controller across the
//!    mode schedule's events into a [`PrimalSolution`].
//! 2. [`compute_rollout_metrics`] evaluates every cost and constraint term
//!    against a [`DualSolution`] and [`compute_rollout_performance_index`]
//!    reduces them to a [`PerformanceIndex`].
//! 3. A [`LineSearchContext`] tries incremented controllers and
//!    [`select_step_length`] picks one.
//! 4. [`update_dual_solution`] moves the multipliers.

pub mod controller;
pub mod dual;
pub mod lagrangian;
pub mod line_search;
pub mod metrics;
pub mod performance_index;
pub mod problem;
pub mod rollout;
pub mod solution;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use controller::{FeedforwardController, LinearController, increment_controller};
pub use dual::{initialize_dual_solution, update_dual_solution};
pub use lagrangian::{
    AugmentedLagrangian, LagrangianMetrics, StateAugmentedLagrangian, StateInputAugmentedLagrangian,
};
pub use line_search::{
    LineSearchContext, LineSearchTrial, evaluate_step_length, evaluate_step_lengths, select_step_length,
};
pub use metrics::{
    Metrics, MetricsCollection, compute_final_metrics, compute_intermediate_metrics, compute_pre_jump_metrics,
    compute_rollout_metrics,
};
pub use performance_index::{PerformanceIndex, compute_rollout_performance_index};
pub use problem::{EventTerms, IntermediateTerms, OptimalControlProblem};
pub use rollout::{TimeTriggeredRollout, rollout_trajectory};
pub use solution::{DualSolution, PrimalSolution};
