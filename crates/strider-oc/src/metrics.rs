//! Per-sample cost and constraint metrics along a rollout.

use nalgebra::DVector;
use strider_core::ValidationError;
use strider_penalty::{Multiplier, MultiplierCollection};

use crate::lagrangian::{LagrangianMetrics, StateAugmentedLagrangian, StateInputAugmentedLagrangian};
use crate::problem::{EventTerms, OptimalControlProblem};
use crate::solution::{DualSolution, PrimalSolution};

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Cost, stacked equality constraints and penalty terms at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub cost: f64,
    pub state_eq_constraint: DVector<f64>,
    pub state_input_eq_constraint: DVector<f64>,
    pub state_eq_lagrangian: Vec<LagrangianMetrics>,
    pub state_ineq_lagrangian: Vec<LagrangianMetrics>,
    pub state_input_eq_lagrangian: Vec<LagrangianMetrics>,
    pub state_input_ineq_lagrangian: Vec<LagrangianMetrics>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            cost: 0.0,
            state_eq_constraint: DVector::zeros(0),
            state_input_eq_constraint: DVector::zeros(0),
            state_eq_lagrangian: Vec::new(),
            state_ineq_lagrangian: Vec::new(),
            state_input_eq_lagrangian: Vec::new(),
            state_input_ineq_lagrangian: Vec::new(),
        }
    }
}

impl Metrics {
    /// Squared norm of both stacked equality constraints.
    pub fn equality_constraints_sse(&self) -> f64 {
        self.state_eq_constraint.norm_squared() + self.state_input_eq_constraint.norm_squared()
    }

    pub fn equality_lagrangians_penalty(&self) -> f64 {
        sum_penalty(&self.state_eq_lagrangian) + sum_penalty(&self.state_input_eq_lagrangian)
    }

    pub fn inequality_lagrangians_penalty(&self) -> f64 {
        sum_penalty(&self.state_ineq_lagrangian) + sum_penalty(&self.state_input_ineq_lagrangian)
    }
}

fn sum_penalty(terms: &[LagrangianMetrics]) -> f64 {
    terms.iter().map(|m| m.penalty).sum()
}

/// Metrics of a whole rollout, partitioned like [`DualSolution`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsCollection {
    pub final_: Metrics,
    pub pre_jumps: Vec<Metrics>,
    pub intermediates: Vec<Metrics>,
}

// ---------------------------------------------------------------------------
// Evaluation helpers
// ---------------------------------------------------------------------------

fn check_group(partition: &'static str, terms: usize, multipliers: &[Multiplier]) -> Result<(), ValidationError> {
    if terms == multipliers.len() {
        Ok(())
    } else {
        Err(ValidationError::DualLengthMismatch {
            partition,
            expected: terms,
            got: multipliers.len(),
        })
    }
}

fn stack(parts: impl Iterator<Item = DVector<f64>>) -> DVector<f64> {
    let mut values = Vec::new();
    for part in parts {
        values.extend(part.iter());
    }
    DVector::from_vec(values)
}

fn state_lagrangians(
    partition: &'static str,
    terms: &[StateAugmentedLagrangian],
    multipliers: &[Multiplier],
    t: f64,
    x: &DVector<f64>,
) -> Result<Vec<LagrangianMetrics>, ValidationError> {
    check_group(partition, terms.len(), multipliers)?;
    terms
        .iter()
        .zip(multipliers)
        .map(|(term, multiplier)| term.evaluate(t, x, multiplier))
        .collect()
}

fn state_input_lagrangians(
    partition: &'static str,
    terms: &[StateInputAugmentedLagrangian],
    multipliers: &[Multiplier],
    t: f64,
    x: &DVector<f64>,
    u: &DVector<f64>,
) -> Result<Vec<LagrangianMetrics>, ValidationError> {
    check_group(partition, terms.len(), multipliers)?;
    terms
        .iter()
        .zip(multipliers)
        .map(|(term, multiplier)| term.evaluate(t, x, u, multiplier))
        .collect()
}

fn event_metrics(
    terms: &EventTerms,
    t: f64,
    x: &DVector<f64>,
    multipliers: &MultiplierCollection,
) -> Result<Metrics, ValidationError> {
    Ok(Metrics {
        cost: terms.costs.iter().map(|c| c.value(t, x)).sum(),
        state_eq_constraint: stack(terms.state_eq_constraints.iter().map(|c| c.value(t, x))),
        state_eq_lagrangian: state_lagrangians(
            "state_eq multipliers",
            &terms.state_eq_lagrangians,
            &multipliers.state_eq,
            t,
            x,
        )?,
        state_ineq_lagrangian: state_lagrangians(
            "state_ineq multipliers",
            &terms.state_ineq_lagrangians,
            &multipliers.state_ineq,
            t,
            x,
        )?,
        ..Metrics::default()
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Metrics of the intermediate terms at `(t, x, u)`.
pub fn compute_intermediate_metrics(
    problem: &OptimalControlProblem,
    t: f64,
    x: &DVector<f64>,
    u: &DVector<f64>,
    multipliers: &MultiplierCollection,
) -> Result<Metrics, ValidationError> {
    let terms = &problem.intermediate;
    Ok(Metrics {
        cost: terms.costs.iter().map(|c| c.value(t, x, u)).sum(),
        state_eq_constraint: stack(terms.state_eq_constraints.iter().map(|c| c.value(t, x))),
        state_input_eq_constraint: stack(terms.state_input_eq_constraints.iter().map(|c| c.value(t, x, u))),
        state_eq_lagrangian: state_lagrangians(
            "state_eq multipliers",
            &terms.state_eq_lagrangians,
            &multipliers.state_eq,
            t,
            x,
        )?,
        state_ineq_lagrangian: state_lagrangians(
            "state_ineq multipliers",
            &terms.state_ineq_lagrangians,
            &multipliers.state_ineq,
            t,
            x,
        )?,
        state_input_eq_lagrangian: state_input_lagrangians(
            "state_input_eq multipliers",
            &terms.state_input_eq_lagrangians,
            &multipliers.state_input_eq,
            t,
            x,
            u,
        )?,
        state_input_ineq_lagrangian: state_input_lagrangians(
            "state_input_ineq multipliers",
            &terms.state_input_ineq_lagrangians,
            &multipliers.state_input_ineq,
            t,
            x,
            u,
        )?,
    })
}

/// Metrics of the pre-jump terms at the state just before an event.
pub fn compute_pre_jump_metrics(
    problem: &OptimalControlProblem,
    t: f64,
    x: &DVector<f64>,
    multipliers: &MultiplierCollection,
) -> Result<Metrics, ValidationError> {
    event_metrics(&problem.pre_jump, t, x, multipliers)
}

/// Metrics of the final terms.
pub fn compute_final_metrics(
    problem: &OptimalControlProblem,
    t: f64,
    x: &DVector<f64>,
    multipliers: &MultiplierCollection,
) -> Result<Metrics, ValidationError> {
    event_metrics(&problem.final_, t, x, multipliers)
}

/// Evaluate every term along `primal` in one forward pass.
///
/// The sample before each post-event index is the pre-jump state of that
/// event and gets pre-jump metrics in addition to its intermediate ones.
/// Final metrics are evaluated at the last sample when the trajectory is
/// non-empty.
pub fn compute_rollout_metrics(
    problem: &OptimalControlProblem,
    primal: &PrimalSolution,
    dual: &DualSolution,
) -> Result<MetricsCollection, ValidationError> {
    primal.validate()?;
    dual.validate_against(primal)?;

    let n = primal.len();
    let post_events = &primal.post_event_indices;
    let mut collection = MetricsCollection {
        final_: Metrics::default(),
        pre_jumps: Vec::with_capacity(post_events.len()),
        intermediates: Vec::with_capacity(n),
    };

    let mut next_event = 0;
    for k in 0..n {
        let t = primal.time_trajectory[k];
        let x = &primal.state_trajectory[k];
        collection.intermediates.push(compute_intermediate_metrics(
            problem,
            t,
            x,
            &primal.input_trajectory[k],
            &dual.intermediates[k],
        )?);
        if next_event < post_events.len() && k + 1 == post_events[next_event] {
            collection
                .pre_jumps
                .push(compute_pre_jump_metrics(problem, t, x, &dual.pre_jumps[next_event])?);
            next_event += 1;
        }
    }

    if let (Some(t), Some(x)) = (primal.final_time(), primal.final_state()) {
        collection.final_ = compute_final_metrics(problem, t, x, &dual.final_)?;
    }
    Ok(collection)
}
