//! Step-length trials: increment, roll out, evaluate, compare.
//!
//! Trials are independent: each owns its controller, trajectory and
//! metrics, and only reads the shared problem, rollout and dual solution.
//! With the `parallel` feature the candidates are evaluated with rayon.

use nalgebra::DVector;
use strider_core::{LineSearchSettings, ModeSchedule, RolloutError, TimeWindow};
use tracing::{debug, trace};

use crate::controller::LinearController;
use crate::metrics::{MetricsCollection, compute_rollout_metrics};
use crate::performance_index::{PerformanceIndex, compute_rollout_performance_index};
use crate::problem::OptimalControlProblem;
use crate::rollout::{TimeTriggeredRollout, rollout_trajectory};
use crate::solution::{DualSolution, PrimalSolution};

/// Everything produced by one successful trial.
#[derive(Debug, Clone)]
pub struct LineSearchTrial {
    pub step_length: f64,
    pub controller: LinearController,
    pub primal: PrimalSolution,
    pub metrics: MetricsCollection,
    pub performance_index: PerformanceIndex,
    pub average_time_step: f64,
}

/// Read-only inputs shared by all trials of one iteration.
#[derive(Clone, Copy)]
pub struct LineSearchContext<'a> {
    pub rollout: &'a TimeTriggeredRollout,
    pub problem: &'a OptimalControlProblem,
    pub window: TimeWindow,
    pub init_state: &'a DVector<f64>,
    pub mode_schedule: &'a ModeSchedule,
    pub dual: &'a DualSolution,
}

impl LineSearchContext<'_> {
    /// Roll out `unoptimized` incremented by `step_length` and evaluate it.
    pub fn evaluate_step_length(
        &self,
        step_length: f64,
        unoptimized: &LinearController,
    ) -> Result<LineSearchTrial, RolloutError> {
        let controller = unoptimized.increment(step_length);
        let mut primal = PrimalSolution::default();
        let average_time_step = rollout_trajectory(
            self.rollout,
            self.window,
            self.init_state,
            self.mode_schedule,
            &controller,
            &mut primal,
        )?;
        let metrics = compute_rollout_metrics(self.problem, &primal, self.dual)?;
        let performance_index = compute_rollout_performance_index(&primal.time_trajectory, &metrics);
        trace!(step_length, %performance_index, "line-search trial");
        Ok(LineSearchTrial {
            step_length,
            controller,
            primal,
            metrics,
            performance_index,
            average_time_step,
        })
    }

    /// Evaluate every candidate, preserving their order.
    pub fn evaluate_step_lengths(
        &self,
        step_lengths: &[f64],
        unoptimized: &LinearController,
    ) -> Vec<Result<LineSearchTrial, RolloutError>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
            step_lengths
                .par_iter()
                .map(|&alpha| self.evaluate_step_length(alpha, unoptimized))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            step_lengths
                .iter()
                .map(|&alpha| self.evaluate_step_length(alpha, unoptimized))
                .collect()
        }
    }

    /// Evaluate the step lengths from `settings` and return the accepted
    /// trial, if any.
    pub fn search(
        &self,
        unoptimized: &LinearController,
        baseline: &PerformanceIndex,
        settings: &LineSearchSettings,
    ) -> Option<LineSearchTrial> {
        let update_is = unoptimized.update_input_sensitivity();
        let mut trials = self.evaluate_step_lengths(&settings.step_lengths(), unoptimized);
        let index = select_step_length(baseline, &trials, update_is, settings)?;
        trials.swap_remove(index).ok()
    }
}

/// Free-function form of [`LineSearchContext::evaluate_step_length`].
pub fn evaluate_step_length(
    context: &LineSearchContext<'_>,
    step_length: f64,
    unoptimized: &LinearController,
) -> Result<LineSearchTrial, RolloutError> {
    context.evaluate_step_length(step_length, unoptimized)
}

/// Free-function form of [`LineSearchContext::evaluate_step_lengths`].
pub fn evaluate_step_lengths(
    context: &LineSearchContext<'_>,
    step_lengths: &[f64],
    unoptimized: &LinearController,
) -> Vec<Result<LineSearchTrial, RolloutError>> {
    context.evaluate_step_lengths(step_lengths, unoptimized)
}

/// Index of the largest step whose merit passes the Armijo test
/// `merit < baseline − armijo·α·update_is`.
///
/// Failed trials are skipped. `None` when no trial is accepted.
pub fn select_step_length(
    baseline: &PerformanceIndex,
    trials: &[Result<LineSearchTrial, RolloutError>],
    update_is: f64,
    settings: &LineSearchSettings,
) -> Option<usize> {
    let baseline_merit = baseline.merit();
    let mut best: Option<(usize, f64)> = None;
    for (index, trial) in trials.iter().enumerate() {
        let trial = match trial {
            Ok(trial) => trial,
            Err(err) => {
                debug!(%err, "line-search trial rejected");
                continue;
            }
        };
        let alpha = trial.step_length;
        let threshold = settings.armijo_coefficient.mul_add(-alpha * update_is, baseline_merit);
        let merit = trial.performance_index.merit();
        if merit < threshold && best.is_none_or(|(_, best_alpha)| alpha > best_alpha) {
            best = Some((index, alpha));
        }
    }
    match best {
        Some((_, alpha)) => debug!(step_length = alpha, "step accepted"),
        None => debug!(baseline = baseline_merit, "no step length accepted"),
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use strider_core::RolloutSettings;
    use strider_test_utils::{LinearSystem, QuadraticStateInputCost, UnstableSystem};

    fn trial(step_length: f64, cost: f64) -> Result<LineSearchTrial, RolloutError> {
        Ok(LineSearchTrial {
            step_length,
            controller: LinearController::default(),
            primal: PrimalSolution::default(),
            metrics: MetricsCollection::default(),
            performance_index: PerformanceIndex {
                total_cost: cost,
                ..PerformanceIndex::default()
            },
            average_time_step: 0.0,
        })
    }

    fn baseline(cost: f64) -> PerformanceIndex {
        PerformanceIndex {
            total_cost: cost,
            ..PerformanceIndex::default()
        }
    }

    #[test]
    fn selects_largest_accepted_step() {
        let trials = vec![trial(1.0, 12.0), trial(0.5, 8.0), trial(0.25, 9.0)];
        let selected = select_step_length(&baseline(10.0), &trials, 1.0, &LineSearchSettings::default());
        assert_eq!(selected, Some(1));
    }

    #[test]
    fn diverged_trials_are_skipped() {
        let trials = vec![Err(RolloutError::Diverged { time: 0.3 }), trial(0.5, 1.0)];
        let selected = select_step_length(&baseline(10.0), &trials, 0.0, &LineSearchSettings::default());
        assert_eq!(selected, Some(1));
    }

    #[test]
    fn armijo_margin_scales_with_update_size() {
        let settings = LineSearchSettings {
            armijo_coefficient: 0.5,
            ..LineSearchSettings::default()
        };
        // threshold = 10 − 0.5·1·4 = 8
        let trials = vec![trial(1.0, 8.5)];
        assert_eq!(select_step_length(&baseline(10.0), &trials, 4.0, &settings), None);
        let trials = vec![trial(1.0, 7.5)];
        assert_eq!(select_step_length(&baseline(10.0), &trials, 4.0, &settings), Some(0));
    }

    fn decay_context_parts() -> (TimeTriggeredRollout, OptimalControlProblem, DVector<f64>, ModeSchedule) {
        let rollout = TimeTriggeredRollout::new(
            Arc::new(LinearSystem::scalar_decay()),
            RolloutSettings {
                time_step: 0.25,
                ..RolloutSettings::default()
            },
        )
        .unwrap();
        let problem = OptimalControlProblem::new().with_cost(QuadraticStateInputCost::new(
            DMatrix::identity(1, 1),
            DMatrix::from_element(1, 1, 0.1),
        ));
        (rollout, problem, DVector::from_element(1, 1.0), ModeSchedule::default())
    }

    #[test]
    fn search_improves_on_bad_feedforward() {
        let (rollout, problem, x0, schedule) = decay_context_parts();
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let stamps = vec![0.0, 0.5, 1.0];
        let n = stamps.len();
        // 4 steps of 0.25 → 5 samples
        let dual = DualSolution {
            intermediates: vec![Default::default(); 5],
            ..DualSolution::default()
        };
        let context = LineSearchContext {
            rollout: &rollout,
            problem: &problem,
            window,
            init_state: &x0,
            mode_schedule: &schedule,
            dual: &dual,
        };

        // baseline pushes the state up with u = 2, the update removes it
        let unoptimized = LinearController::new(
            stamps,
            vec![DMatrix::zeros(1, 1); n],
            vec![DVector::from_element(1, 2.0); n],
        )
        .unwrap()
        .with_delta_biases(vec![DVector::from_element(1, -2.0); n])
        .unwrap();

        let base = context.evaluate_step_length(0.0, &unoptimized).unwrap();
        let accepted = context
            .search(&unoptimized, &base.performance_index, &LineSearchSettings::default())
            .unwrap();
        assert_relative_eq!(accepted.step_length, 1.0);
        assert!(accepted.performance_index.merit() < base.performance_index.merit());
        assert_relative_eq!(accepted.controller.biases()[0][0], 0.0);
    }

    #[test]
    fn trials_keep_candidate_order() {
        let (rollout, problem, x0, schedule) = decay_context_parts();
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let dual = DualSolution {
            intermediates: vec![Default::default(); 5],
            ..DualSolution::default()
        };
        let context = LineSearchContext {
            rollout: &rollout,
            problem: &problem,
            window,
            init_state: &x0,
            mode_schedule: &schedule,
            dual: &dual,
        };
        let unoptimized = LinearController::zeros(vec![0.0, 1.0], 1, 1).unwrap();
        let candidates = [1.0, 0.5, 0.25, 0.125];
        let trials = evaluate_step_lengths(&context, &candidates, &unoptimized);
        assert_eq!(trials.len(), candidates.len());
        for (result, &alpha) in trials.iter().zip(&candidates) {
            assert_relative_eq!(result.as_ref().unwrap().step_length, alpha);
        }
    }

    #[test]
    fn unstable_trials_report_divergence() {
        let rollout = TimeTriggeredRollout::new(
            Arc::new(UnstableSystem { blow_up_time: 0.2 }),
            RolloutSettings {
                time_step: 0.1,
                ..RolloutSettings::default()
            },
        )
        .unwrap();
        let problem = OptimalControlProblem::new();
        let x0 = DVector::from_element(1, 1.0);
        let schedule = ModeSchedule::default();
        let dual = DualSolution::default();
        let context = LineSearchContext {
            rollout: &rollout,
            problem: &problem,
            window: TimeWindow::new(0.0, 1.0).unwrap(),
            init_state: &x0,
            mode_schedule: &schedule,
            dual: &dual,
        };
        let unoptimized = LinearController::zeros(vec![0.0], 1, 1).unwrap();
        let err = evaluate_step_length(&context, 1.0, &unoptimized).unwrap_err();
        assert!(matches!(err, RolloutError::Diverged { .. }));
    }
}
