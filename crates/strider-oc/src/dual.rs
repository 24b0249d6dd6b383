//! Multiplier initialization and updates along a rollout.

use strider_core::ValidationError;
use strider_penalty::{Multiplier, MultiplierCollection};
use tracing::debug;

use crate::lagrangian::{
    AugmentedLagrangian, LagrangianMetrics, StateAugmentedLagrangian, StateInputAugmentedLagrangian,
};
use crate::metrics::{Metrics, MetricsCollection};
use crate::problem::{EventTerms, IntermediateTerms, OptimalControlProblem};
use crate::solution::{DualSolution, PrimalSolution};

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

fn initialize_intermediate(terms: &IntermediateTerms, t: f64) -> MultiplierCollection {
    MultiplierCollection {
        state_eq: terms.state_eq_lagrangians.iter().map(|l| l.initialize(t)).collect(),
        state_ineq: terms.state_ineq_lagrangians.iter().map(|l| l.initialize(t)).collect(),
        state_input_eq: terms.state_input_eq_lagrangians.iter().map(|l| l.initialize(t)).collect(),
        state_input_ineq: terms.state_input_ineq_lagrangians.iter().map(|l| l.initialize(t)).collect(),
    }
}

fn initialize_event(terms: &EventTerms, t: f64) -> MultiplierCollection {
    MultiplierCollection {
        state_eq: terms.state_eq_lagrangians.iter().map(|l| l.initialize(t)).collect(),
        state_ineq: terms.state_ineq_lagrangians.iter().map(|l| l.initialize(t)).collect(),
        ..MultiplierCollection::default()
    }
}

/// Fresh multipliers for every term, shaped like `primal`.
pub fn initialize_dual_solution(problem: &OptimalControlProblem, primal: &PrimalSolution) -> DualSolution {
    let times = &primal.time_trajectory;
    DualSolution {
        final_: primal
            .final_time()
            .map(|t| initialize_event(&problem.final_, t))
            .unwrap_or_default(),
        pre_jumps: primal
            .post_event_indices
            .iter()
            .map(|&index| initialize_event(&problem.pre_jump, times[index - 1]))
            .collect(),
        intermediates: times
            .iter()
            .map(|&t| initialize_intermediate(&problem.intermediate, t))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

fn update_group<C: ?Sized>(
    partition: &'static str,
    terms: &[AugmentedLagrangian<C>],
    metrics: &[LagrangianMetrics],
    multipliers: &mut [Multiplier],
    t: f64,
) -> Result<(), ValidationError> {
    if metrics.len() != terms.len() || multipliers.len() != terms.len() {
        return Err(ValidationError::DualLengthMismatch {
            partition,
            expected: terms.len(),
            got: multipliers.len().min(metrics.len()),
        });
    }
    for ((term, metric), multiplier) in terms.iter().zip(metrics).zip(multipliers.iter_mut()) {
        *multiplier = term.update_from_constraint(t, &metric.constraint, multiplier)?;
    }
    Ok(())
}

fn update_state_groups(
    state_eq: &[StateAugmentedLagrangian],
    state_ineq: &[StateAugmentedLagrangian],
    metrics: &Metrics,
    multipliers: &mut MultiplierCollection,
    t: f64,
) -> Result<(), ValidationError> {
    update_group("state_eq multipliers", state_eq, &metrics.state_eq_lagrangian, &mut multipliers.state_eq, t)?;
    update_group(
        "state_ineq multipliers",
        state_ineq,
        &metrics.state_ineq_lagrangian,
        &mut multipliers.state_ineq,
        t,
    )
}

fn update_state_input_groups(
    state_input_eq: &[StateInputAugmentedLagrangian],
    state_input_ineq: &[StateInputAugmentedLagrangian],
    metrics: &Metrics,
    multipliers: &mut MultiplierCollection,
    t: f64,
) -> Result<(), ValidationError> {
    update_group(
        "state_input_eq multipliers",
        state_input_eq,
        &metrics.state_input_eq_lagrangian,
        &mut multipliers.state_input_eq,
        t,
    )?;
    update_group(
        "state_input_ineq multipliers",
        state_input_ineq,
        &metrics.state_input_ineq_lagrangian,
        &mut multipliers.state_input_ineq,
        t,
    )
}

/// Apply every term's multiplier update at every sample.
///
/// Constraint values are taken from `metrics`, which must come from
/// [`compute_rollout_metrics`](crate::metrics::compute_rollout_metrics) on
/// the same `primal` and `dual`.
pub fn update_dual_solution(
    problem: &OptimalControlProblem,
    primal: &PrimalSolution,
    metrics: &MetricsCollection,
    dual: &mut DualSolution,
) -> Result<(), ValidationError> {
    dual.validate_against(primal)?;
    if metrics.intermediates.len() != primal.len() || metrics.pre_jumps.len() != primal.post_event_indices.len() {
        return Err(ValidationError::DualLengthMismatch {
            partition: "metrics",
            expected: primal.len(),
            got: metrics.intermediates.len(),
        });
    }

    let intermediate = &problem.intermediate;
    for ((&t, sample), multipliers) in primal
        .time_trajectory
        .iter()
        .zip(&metrics.intermediates)
        .zip(dual.intermediates.iter_mut())
    {
        update_state_groups(
            &intermediate.state_eq_lagrangians,
            &intermediate.state_ineq_lagrangians,
            sample,
            multipliers,
            t,
        )?;
        update_state_input_groups(
            &intermediate.state_input_eq_lagrangians,
            &intermediate.state_input_ineq_lagrangians,
            sample,
            multipliers,
            t,
        )?;
    }

    for ((&index, sample), multipliers) in primal
        .post_event_indices
        .iter()
        .zip(&metrics.pre_jumps)
        .zip(dual.pre_jumps.iter_mut())
    {
        let t = primal.time_trajectory[index - 1];
        update_state_groups(
            &problem.pre_jump.state_eq_lagrangians,
            &problem.pre_jump.state_ineq_lagrangians,
            sample,
            multipliers,
            t,
        )?;
    }

    if let Some(t) = primal.final_time() {
        update_state_groups(
            &problem.final_.state_eq_lagrangians,
            &problem.final_.state_ineq_lagrangians,
            &metrics.final_,
            &mut dual.final_,
            t,
        )?;
    }

    debug!(
        samples = primal.len(),
        events = primal.post_event_indices.len(),
        "dual solution updated"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};
    use strider_core::ModeSchedule;
    use strider_penalty::{AugmentedPenalty, QuadraticPenaltyConfig, RelaxedBarrierConfig};
    use strider_test_utils::LinearStateConstraint;

    use crate::metrics::compute_rollout_metrics;

    fn scalar(v: f64) -> DVector<f64> {
        DVector::from_element(1, v)
    }

    fn primal() -> PrimalSolution {
        PrimalSolution {
            time_trajectory: vec![0.0, 0.5, 0.5, 1.0],
            state_trajectory: vec![scalar(10.0), scalar(10.0), scalar(-0.5), scalar(10.0)],
            input_trajectory: vec![scalar(0.0); 4],
            post_event_indices: vec![2],
            mode_schedule: ModeSchedule::new(vec![0.5], vec![0, 1]).unwrap(),
        }
    }

    fn positive_state() -> StateAugmentedLagrangian {
        StateAugmentedLagrangian::new(
            "positive_state",
            LinearStateConstraint::new(DMatrix::identity(1, 1), DVector::zeros(1)),
            AugmentedPenalty::relaxed_barrier(RelaxedBarrierConfig::default()),
        )
    }

    fn problem() -> OptimalControlProblem {
        let mut problem = OptimalControlProblem::new();
        problem.intermediate.state_ineq_lagrangians.push(positive_state());
        problem.pre_jump.state_ineq_lagrangians.push(positive_state());
        problem.final_.state_eq_lagrangians.push(StateAugmentedLagrangian::new(
            "final_target",
            LinearStateConstraint::new(DMatrix::identity(1, 1), scalar(-1.0)),
            AugmentedPenalty::quadratic(QuadraticPenaltyConfig {
                scale: 2.0,
                step_size: 1.0,
            }),
        ));
        problem
    }

    #[test]
    fn initialization_matches_trajectory_shape() {
        let primal = primal();
        let dual = initialize_dual_solution(&problem(), &primal);
        assert!(dual.validate_against(&primal).is_ok());
        assert_eq!(dual.intermediates[0].state_ineq.len(), 1);
        assert_relative_eq!(dual.intermediates[0].state_ineq[0].lagrangian[0], 1.0);
        assert_eq!(dual.pre_jumps[0].state_ineq.len(), 1);
        assert_relative_eq!(dual.final_.state_eq[0].lagrangian[0], 0.0);
    }

    #[test]
    fn update_floors_satisfied_multipliers() {
        let problem = problem();
        let primal = primal();
        let mut dual = initialize_dual_solution(&problem, &primal);
        let metrics = compute_rollout_metrics(&problem, &primal, &dual).unwrap();
        update_dual_solution(&problem, &primal, &metrics, &mut dual).unwrap();

        // h = 10, λ = 1: 100/(1 + 0.1)/100
        assert_relative_eq!(dual.intermediates[0].state_ineq[0].lagrangian[0], 1.0 / 1.1, epsilon = 1e-12);
        for collection in &dual.intermediates {
            assert!(collection.state_ineq[0].lagrangian[0] >= strider_penalty::MULTIPLIER_FLOOR);
        }
        // pre-jump sample is index 1 (x = 10), not the post-jump one
        assert_relative_eq!(dual.pre_jumps[0].state_ineq[0].lagrangian[0], 1.0 / 1.1, epsilon = 1e-12);
        // 0 + 1·2·(10 - 1)
        assert_relative_eq!(dual.final_.state_eq[0].lagrangian[0], 18.0, epsilon = 1e-12);
    }

    #[test]
    fn update_records_penalty_at_new_multipliers() {
        let problem = problem();
        let primal = primal();
        let mut dual = initialize_dual_solution(&problem, &primal);
        let metrics = compute_rollout_metrics(&problem, &primal, &dual).unwrap();
        update_dual_solution(&problem, &primal, &metrics, &mut dual).unwrap();
        let updated = &dual.final_.state_eq[0];
        // 18·9 + ½·2·81
        assert_relative_eq!(updated.penalty, 243.0, epsilon = 1e-9);
    }

    #[test]
    fn update_rejects_foreign_metrics() {
        let problem = problem();
        let primal = primal();
        let mut dual = initialize_dual_solution(&problem, &primal);
        let err = update_dual_solution(&problem, &primal, &MetricsCollection::default(), &mut dual).unwrap_err();
        assert!(matches!(err, ValidationError::DualLengthMismatch { partition: "metrics", .. }));
    }
}
