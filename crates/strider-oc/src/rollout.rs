//! Fixed-step forward simulation of hybrid dynamics.
//!
//! The window is split at the event times strictly inside it. Each
//! sub-interval is integrated with `ceil(duration / time_step)` uniform steps
//! so its endpoint is hit exactly. At an event the pre-jump sample is stored,
//! the jump map applied and the post-jump sample stored at the same time.

use std::sync::Arc;

use nalgebra::DVector;
use strider_core::{
    ConfigError, Controller, IntegratorType, ModeSchedule, RolloutError, RolloutSettings, SystemDynamics, TimeWindow,
    ValidationError,
};
use tracing::{debug, trace, warn};

use crate::solution::PrimalSolution;

fn is_finite(x: &DVector<f64>) -> bool {
    x.iter().all(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Integration step
// ---------------------------------------------------------------------------

/// Closed-loop derivative: the controller is queried at every stage.
fn closed_loop(dynamics: &dyn SystemDynamics, controller: &dyn Controller, t: f64, x: &DVector<f64>) -> DVector<f64> {
    dynamics.flow_map(t, x, &controller.compute_input(t, x))
}

/// Advance `x` from `t` to `t + h`.
fn integrate_step(
    method: IntegratorType,
    dynamics: &dyn SystemDynamics,
    controller: &dyn Controller,
    t: f64,
    x: &DVector<f64>,
    h: f64,
) -> DVector<f64> {
    match method {
        IntegratorType::Euler => x + closed_loop(dynamics, controller, t, x) * h,
        IntegratorType::Midpoint => {
            let k1 = closed_loop(dynamics, controller, t, x);
            let mid = x + &k1 * (0.5 * h);
            x + closed_loop(dynamics, controller, t + 0.5 * h, &mid) * h
        }
        IntegratorType::RungeKutta4 => {
            let half = 0.5 * h;
            let k1 = closed_loop(dynamics, controller, t, x);
            let k2 = closed_loop(dynamics, controller, t + half, &(x + &k1 * half));
            let k3 = closed_loop(dynamics, controller, t + half, &(x + &k2 * half));
            let k4 = closed_loop(dynamics, controller, t + h, &(x + &k3 * h));
            x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
        }
    }
}

// ---------------------------------------------------------------------------
// TimeTriggeredRollout
// ---------------------------------------------------------------------------

/// Rollout whose events happen at prescribed times.
#[derive(Clone)]
pub struct TimeTriggeredRollout {
    dynamics: Arc<dyn SystemDynamics>,
    settings: RolloutSettings,
}

impl TimeTriggeredRollout {
    /// Create a rollout, rejecting settings that fail
    /// [`RolloutSettings::validate`].
    pub fn new(dynamics: Arc<dyn SystemDynamics>, settings: RolloutSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { dynamics, settings })
    }

    pub const fn settings(&self) -> &RolloutSettings {
        &self.settings
    }

    pub fn dynamics(&self) -> &Arc<dyn SystemDynamics> {
        &self.dynamics
    }

    /// Integrate from `window.start` to `window.end`, overwriting the
    /// trajectories and post-event indices of `primal`.
    ///
    /// Returns the final state. Only intermediate states are checked for
    /// divergence here (when enabled); see [`rollout_trajectory`] for the
    /// terminal check.
    pub fn run(
        &self,
        window: TimeWindow,
        init_state: &DVector<f64>,
        controller: &dyn Controller,
        event_times: &[f64],
        primal: &mut PrimalSolution,
    ) -> Result<DVector<f64>, RolloutError> {
        let dynamics = self.dynamics.as_ref();
        if init_state.len() != dynamics.state_dim() {
            return Err(ValidationError::StateDimMismatch {
                expected: dynamics.state_dim(),
                got: init_state.len(),
            }
            .into());
        }

        let mut boundaries = Vec::with_capacity(event_times.len() + 2);
        boundaries.push(window.start);
        boundaries.extend(window.interior(event_times));
        boundaries.push(window.end);

        debug!(
            start = window.start,
            end = window.end,
            events = boundaries.len() - 2,
            controller = controller.name(),
            "rollout"
        );

        primal.clear();
        let settings = &self.settings;
        let mut x = init_state.clone();
        let mut total_steps = 0usize;

        for (interval, bounds) in boundaries.windows(2).enumerate() {
            let (t0, t1) = (bounds[0], bounds[1]);
            if interval > 0 {
                x = dynamics.jump_map(t0, &x);
                if settings.check_numerical_stability && !is_finite(&x) {
                    warn!(time = t0, "non-finite state after jump");
                    return Err(RolloutError::Diverged { time: t0 });
                }
                primal.post_event_indices.push(primal.len());
                trace!(time = t0, index = primal.len(), "event");
            }

            // Checked before the cast, which saturates for huge windows.
            let step_count = ((t1 - t0) / settings.time_step).ceil().max(0.0);
            #[allow(clippy::cast_precision_loss)]
            let remaining = (settings.max_num_steps - total_steps) as f64;
            if step_count > remaining {
                return Err(RolloutError::MaxStepsExceeded {
                    max_steps: settings.max_num_steps,
                    time: t0,
                });
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let num_steps = step_count as usize;
            total_steps = total_steps.saturating_add(num_steps);

            let u = controller.compute_input(t0, &x);
            if primal.is_empty() && u.len() != dynamics.input_dim() {
                return Err(ValidationError::InputDimMismatch {
                    expected: dynamics.input_dim(),
                    got: u.len(),
                }
                .into());
            }
            primal.push(t0, x.clone(), u);

            if num_steps == 0 {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let h = (t1 - t0) / num_steps as f64;
            for step in 0..num_steps {
                #[allow(clippy::cast_precision_loss)]
                let t = t0 + step as f64 * h;
                x = integrate_step(settings.integrator, dynamics, controller, t, &x, h);
                #[allow(clippy::cast_precision_loss)]
                let t_next = if step + 1 == num_steps { t1 } else { t0 + (step + 1) as f64 * h };
                if settings.check_numerical_stability && !is_finite(&x) {
                    warn!(time = t_next, "non-finite state during rollout");
                    return Err(RolloutError::Diverged { time: t_next });
                }
                let u = controller.compute_input(t_next, &x);
                primal.push(t_next, x.clone(), u);
            }
        }

        trace!(samples = primal.len(), steps = total_steps, "rollout finished");
        Ok(x)
    }
}

/// Roll out under `mode_schedule`, store the schedule in `primal`, and
/// return the average step `(end − start) / N`.
///
/// A non-finite final state is reported as [`RolloutError::Diverged`] at
/// `window.end` regardless of the stability-check setting.
pub fn rollout_trajectory(
    rollout: &TimeTriggeredRollout,
    window: TimeWindow,
    init_state: &DVector<f64>,
    mode_schedule: &ModeSchedule,
    controller: &dyn Controller,
    primal: &mut PrimalSolution,
) -> Result<f64, RolloutError> {
    primal.mode_schedule = mode_schedule.clone();
    let final_state = rollout.run(window, init_state, controller, mode_schedule.event_times(), primal)?;
    if !is_finite(&final_state) {
        warn!(time = window.end, "System became unstable during the rollout");
        return Err(RolloutError::Diverged { time: window.end });
    }
    #[allow(clippy::cast_precision_loss)]
    let average_step = window.duration() / primal.len() as f64;
    Ok(average_step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use strider_test_utils::{ConstantController, LinearSystem, UnstableSystem};

    fn settings(time_step: f64) -> RolloutSettings {
        RolloutSettings {
            time_step,
            ..RolloutSettings::default()
        }
    }

    fn decay(time_step: f64) -> TimeTriggeredRollout {
        TimeTriggeredRollout::new(Arc::new(LinearSystem::scalar_decay()), settings(time_step)).unwrap()
    }

    fn one() -> DVector<f64> {
        DVector::from_element(1, 1.0)
    }

    #[test]
    fn samples_hit_window_ends() {
        let mut primal = PrimalSolution::default();
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        decay(0.3)
            .run(window, &one(), &ConstantController::zeros(1), &[], &mut primal)
            .unwrap();
        // ceil(1 / 0.3) = 4 steps
        assert_eq!(primal.len(), 5);
        assert_relative_eq!(primal.time_trajectory[0], 0.0);
        assert_relative_eq!(primal.time_trajectory[4], 1.0);
        assert_relative_eq!(primal.time_trajectory[1], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn integrators_agree_on_decay() {
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let expected = (-1.0f64).exp();
        for (method, tol) in [
            (IntegratorType::Euler, 1e-2),
            (IntegratorType::Midpoint, 1e-4),
            (IntegratorType::RungeKutta4, 1e-9),
        ] {
            let rollout = TimeTriggeredRollout::new(
                Arc::new(LinearSystem::scalar_decay()),
                RolloutSettings {
                    time_step: 1e-2,
                    integrator: method,
                    ..RolloutSettings::default()
                },
            )
            .unwrap();
            let mut primal = PrimalSolution::default();
            let x = rollout
                .run(window, &one(), &ConstantController::zeros(1), &[], &mut primal)
                .unwrap();
            assert_relative_eq!(x[0], expected, epsilon = tol);
        }
    }

    #[test]
    fn events_produce_post_event_indices() {
        let system = LinearSystem::scalar_decay().with_jump(DMatrix::from_element(1, 1, 2.0));
        let rollout = TimeTriggeredRollout::new(Arc::new(system), settings(0.1)).unwrap();
        let schedule = ModeSchedule::new(vec![-1.0, 0.35, 0.7, 5.0], vec![0, 1, 2, 3, 4]).unwrap();
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let mut primal = PrimalSolution::default();
        rollout_trajectory(&rollout, window, &one(), &schedule, &ConstantController::zeros(1), &mut primal).unwrap();

        assert_eq!(primal.post_event_indices.len(), 2);
        assert!(primal.validate().is_ok());
        for (&index, &event) in primal.post_event_indices.iter().zip(&[0.35, 0.7]) {
            assert_relative_eq!(primal.time_trajectory[index], event);
            assert_relative_eq!(primal.time_trajectory[index - 1], event);
            let pre = primal.state_trajectory[index - 1][0];
            let post = primal.state_trajectory[index][0];
            assert_relative_eq!(post, 2.0 * pre, epsilon = 1e-12);
        }
        assert_eq!(primal.mode_schedule, schedule);
    }

    #[test]
    fn coincident_events_each_get_an_index() {
        let rollout = decay(0.1);
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let mut primal = PrimalSolution::default();
        rollout
            .run(window, &one(), &ConstantController::zeros(1), &[0.5, 0.5], &mut primal)
            .unwrap();
        assert_eq!(primal.post_event_indices.len(), 2);
        assert_eq!(primal.post_event_indices[1], primal.post_event_indices[0] + 1);
        assert!(primal.validate().is_ok());
    }

    #[test]
    fn divergence_is_reported_with_time() {
        let rollout = TimeTriggeredRollout::new(Arc::new(UnstableSystem { blow_up_time: 0.5 }), settings(0.1)).unwrap();
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let mut primal = PrimalSolution::default();
        let err = rollout_trajectory(
            &rollout,
            window,
            &one(),
            &ModeSchedule::default(),
            &ConstantController::zeros(1),
            &mut primal,
        )
        .unwrap_err();
        let RolloutError::Diverged { time } = err else {
            panic!("expected divergence, got {err:?}");
        };
        assert!((0.5..=1.0).contains(&time));
    }

    #[test]
    fn terminal_check_runs_without_stability_checks() {
        let rollout = TimeTriggeredRollout::new(
            Arc::new(UnstableSystem { blow_up_time: 0.5 }),
            RolloutSettings {
                time_step: 0.1,
                check_numerical_stability: false,
                ..RolloutSettings::default()
            },
        )
        .unwrap();
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let mut primal = PrimalSolution::default();
        let err = rollout_trajectory(
            &rollout,
            window,
            &one(),
            &ModeSchedule::default(),
            &ConstantController::zeros(1),
            &mut primal,
        )
        .unwrap_err();
        assert_eq!(err, RolloutError::Diverged { time: 1.0 });
        assert_eq!(primal.len(), 11);
    }

    #[test]
    fn max_num_steps_is_enforced() {
        let rollout = TimeTriggeredRollout::new(
            Arc::new(LinearSystem::scalar_decay()),
            RolloutSettings {
                time_step: 1e-3,
                max_num_steps: 100,
                ..RolloutSettings::default()
            },
        )
        .unwrap();
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let err = rollout
            .run(window, &one(), &ConstantController::zeros(1), &[], &mut PrimalSolution::default())
            .unwrap_err();
        assert!(matches!(err, RolloutError::MaxStepsExceeded { max_steps: 100, .. }));
    }

    #[test]
    fn invalid_time_step_is_rejected_at_construction() {
        for time_step in [-0.01, 0.0, f64::NAN, f64::INFINITY] {
            let result = TimeTriggeredRollout::new(Arc::new(LinearSystem::scalar_decay()), settings(time_step));
            let Err(err) = result else {
                panic!("time_step {time_step} must be rejected");
            };
            assert!(err.to_string().contains("rollout.time_step"));
        }
    }

    #[test]
    fn huge_window_after_event_reports_max_steps() {
        let rollout = decay(0.25);
        let window = TimeWindow::new(0.0, 1e300).unwrap();
        let mut primal = PrimalSolution::default();
        let err = rollout
            .run(window, &one(), &ConstantController::zeros(1), &[0.5], &mut primal)
            .unwrap_err();
        assert_eq!(
            err,
            RolloutError::MaxStepsExceeded {
                max_steps: RolloutSettings::default().max_num_steps,
                time: 0.5,
            }
        );
        assert_eq!(primal.post_event_indices, vec![3]);
    }

    #[test]
    fn dimension_mismatches_are_rejected() {
        let rollout = decay(0.1);
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let mut primal = PrimalSolution::default();
        let err = rollout
            .run(window, &DVector::zeros(2), &ConstantController::zeros(1), &[], &mut primal)
            .unwrap_err();
        assert_eq!(
            err,
            RolloutError::Validation(ValidationError::StateDimMismatch { expected: 1, got: 2 })
        );
        let err = rollout
            .run(window, &one(), &ConstantController::zeros(3), &[], &mut primal)
            .unwrap_err();
        assert!(matches!(
            err,
            RolloutError::Validation(ValidationError::InputDimMismatch { .. })
        ));
    }

    #[test]
    fn zero_length_window_has_single_sample() {
        let window = TimeWindow::new(0.5, 0.5).unwrap();
        let mut primal = PrimalSolution::default();
        let step = rollout_trajectory(
            &decay(0.1),
            window,
            &one(),
            &ModeSchedule::default(),
            &ConstantController::zeros(1),
            &mut primal,
        )
        .unwrap();
        assert_eq!(primal.len(), 1);
        assert_relative_eq!(step, 0.0);
    }
}
