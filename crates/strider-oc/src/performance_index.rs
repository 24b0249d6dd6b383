//! Scalar summary of a rollout used to accept or reject a step.

use std::fmt;

use strider_core::trapezoidal_integration_by;

use crate::metrics::{Metrics, MetricsCollection};

/// Integrated cost and constraint measures of one rollout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerformanceIndex {
    pub total_cost: f64,
    /// Always zero for single-shooting rollouts.
    pub dynamics_violation_sse: f64,
    pub equality_constraints_sse: f64,
    pub equality_lagrangians_penalty: f64,
    pub inequality_lagrangians_penalty: f64,
}

impl PerformanceIndex {
    /// Merit function compared by the line search.
    pub fn merit(&self) -> f64 {
        self.total_cost + self.equality_lagrangians_penalty + self.inequality_lagrangians_penalty
    }

    /// Point contribution of a pre-jump or final metrics record.
    fn from_point(metrics: &Metrics) -> Self {
        Self {
            total_cost: metrics.cost,
            dynamics_violation_sse: 0.0,
            equality_constraints_sse: metrics.equality_constraints_sse(),
            equality_lagrangians_penalty: metrics.equality_lagrangians_penalty(),
            inequality_lagrangians_penalty: metrics.inequality_lagrangians_penalty(),
        }
    }

    fn accumulate(&mut self, other: &Self) {
        self.total_cost += other.total_cost;
        self.dynamics_violation_sse += other.dynamics_violation_sse;
        self.equality_constraints_sse += other.equality_constraints_sse;
        self.equality_lagrangians_penalty += other.equality_lagrangians_penalty;
        self.inequality_lagrangians_penalty += other.inequality_lagrangians_penalty;
    }
}

impl fmt::Display for PerformanceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "merit {:.6e} (cost {:.6e}, dynamics SSE {:.3e}, equality SSE {:.3e}, \
             equality penalty {:.3e}, inequality penalty {:.3e})",
            self.merit(),
            self.total_cost,
            self.dynamics_violation_sse,
            self.equality_constraints_sse,
            self.equality_lagrangians_penalty,
            self.inequality_lagrangians_penalty,
        )
    }
}

/// Final + Σ pre-jump + trapezoidal integral of the intermediate metrics.
///
/// # Panics
///
/// Panics if `time_trajectory` and `metrics.intermediates` differ in length.
pub fn compute_rollout_performance_index(time_trajectory: &[f64], metrics: &MetricsCollection) -> PerformanceIndex {
    assert_eq!(
        time_trajectory.len(),
        metrics.intermediates.len(),
        "compute_rollout_performance_index: {} times vs {} intermediate metrics",
        time_trajectory.len(),
        metrics.intermediates.len()
    );

    let mut index = PerformanceIndex::from_point(&metrics.final_);
    for pre_jump in &metrics.pre_jumps {
        index.accumulate(&PerformanceIndex::from_point(pre_jump));
    }

    let intermediates = &metrics.intermediates;
    index.accumulate(&PerformanceIndex {
        total_cost: trapezoidal_integration_by(time_trajectory, intermediates, |m| m.cost),
        dynamics_violation_sse: 0.0,
        equality_constraints_sse: trapezoidal_integration_by(
            time_trajectory,
            intermediates,
            Metrics::equality_constraints_sse,
        ),
        equality_lagrangians_penalty: trapezoidal_integration_by(
            time_trajectory,
            intermediates,
            Metrics::equality_lagrangians_penalty,
        ),
        inequality_lagrangians_penalty: trapezoidal_integration_by(
            time_trajectory,
            intermediates,
            Metrics::inequality_lagrangians_penalty,
        ),
    });
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use nalgebra::DVector;

    use crate::lagrangian::LagrangianMetrics;

    fn with_cost(cost: f64) -> Metrics {
        Metrics {
            cost,
            ..Metrics::default()
        }
    }

    fn penalty(value: f64) -> LagrangianMetrics {
        LagrangianMetrics {
            name: Arc::from("term"),
            penalty: value,
            constraint: DVector::zeros(1),
        }
    }

    #[test]
    fn final_only_metrics() {
        let metrics = MetricsCollection {
            final_: Metrics {
                cost: 2.0,
                state_eq_constraint: DVector::from_vec(vec![1.0, 2.0]),
                state_ineq_lagrangian: vec![penalty(0.5)],
                ..Metrics::default()
            },
            ..MetricsCollection::default()
        };
        let index = compute_rollout_performance_index(&[], &metrics);
        assert_relative_eq!(index.total_cost, 2.0);
        assert_relative_eq!(index.equality_constraints_sse, 5.0);
        assert_relative_eq!(index.equality_lagrangians_penalty, 0.0);
        assert_relative_eq!(index.inequality_lagrangians_penalty, 0.5);
        assert_relative_eq!(index.dynamics_violation_sse, 0.0);
        assert_relative_eq!(index.merit(), 2.5);
    }

    #[test]
    fn pre_jump_terms_are_accumulated() {
        let metrics = MetricsCollection {
            final_: with_cost(1.0),
            pre_jumps: vec![with_cost(3.0), with_cost(4.0)],
            intermediates: vec![with_cost(2.0), with_cost(2.0), with_cost(2.0)],
        };
        let index = compute_rollout_performance_index(&[0.0, 0.5, 1.0], &metrics);
        // 1 + 3 + 4 + ∫2
        assert_relative_eq!(index.total_cost, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn intermediate_penalties_are_integrated() {
        let sample = Metrics {
            state_eq_lagrangian: vec![penalty(1.0)],
            state_input_ineq_lagrangian: vec![penalty(2.0), penalty(1.0)],
            ..Metrics::default()
        };
        let metrics = MetricsCollection {
            intermediates: vec![sample.clone(), sample],
            ..MetricsCollection::default()
        };
        let index = compute_rollout_performance_index(&[0.0, 2.0], &metrics);
        assert_relative_eq!(index.equality_lagrangians_penalty, 2.0, epsilon = 1e-12);
        assert_relative_eq!(index.inequality_lagrangians_penalty, 6.0, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "compute_rollout_performance_index")]
    fn length_mismatch_panics() {
        let metrics = MetricsCollection {
            intermediates: vec![with_cost(1.0)],
            ..MetricsCollection::default()
        };
        let _ = compute_rollout_performance_index(&[0.0, 1.0], &metrics);
    }

    #[test]
    fn display_includes_merit() {
        let index = PerformanceIndex {
            total_cost: 1.0,
            ..PerformanceIndex::default()
        };
        assert!(index.to_string().starts_with("merit 1.000000e0"));
    }
}
