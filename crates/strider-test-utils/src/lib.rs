//! Shared test fixtures and utilities for strider crates.
//!
//! Provides small linear and unstable systems, constant controllers,
//! quadratic costs, affine constraints and deterministic RNG setup.

pub mod rng;
pub mod systems;
pub mod terms;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use rng::{deterministic_vector, seeded_rng};
pub use systems::{ConstantController, LinearSystem, UnstableSystem};
pub use terms::{
    LinearStateConstraint, LinearStateInputConstraint, QuadraticStateCost,
    QuadraticStateInputCost,
};
