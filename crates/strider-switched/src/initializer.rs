//! Seeds for a new solver iteration.

use std::sync::Arc;

use nalgebra::{DVector, Vector6};
use strider_core::ValidationError;
use tracing::trace;

use crate::com_model::{ComModel, weight_compensating_input};
use crate::schedule::ContactSchedule;
use crate::state::{check_state, com_pose, compose_state, joint_positions, orientation};

/// Produces a guess `(input, next_state)` for the interval `[time, next_time]`.
pub trait Initializer: Send + Sync {
    fn compute(
        &self,
        time: f64,
        state: &DVector<f64>,
        next_time: f64,
    ) -> Result<(DVector<f64>, DVector<f64>), ValidationError>;
}

/// Weight-compensating contact forces for the scheduled stance legs, and the
/// current pose and joint angles held with zero base twist.
#[derive(Clone)]
pub struct ComKinoInitializer {
    com_model: Arc<dyn ComModel>,
    contact_schedule: Arc<dyn ContactSchedule>,
}

impl ComKinoInitializer {
    pub fn new(com_model: Arc<dyn ComModel>, contact_schedule: Arc<dyn ContactSchedule>) -> Self {
        Self {
            com_model,
            contact_schedule,
        }
    }
}

impl Initializer for ComKinoInitializer {
    fn compute(
        &self,
        time: f64,
        state: &DVector<f64>,
        _next_time: f64,
    ) -> Result<(DVector<f64>, DVector<f64>), ValidationError> {
        check_state(state)?;
        let pose = com_pose(state);
        let contact_flags = self.contact_schedule.contact_flags(time)?;
        trace!(time, ?contact_flags, "com-kino initialization");

        let input = weight_compensating_input(self.com_model.as_ref(), &contact_flags, &orientation(&pose));
        let next_state = compose_state(&pose, &Vector6::zeros(), &joint_positions(state));
        Ok((input, next_state))
    }
}

/// Zero input, state held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultInitializer {
    pub input_dim: usize,
}

impl Initializer for DefaultInitializer {
    fn compute(
        &self,
        _time: f64,
        state: &DVector<f64>,
        _next_time: f64,
    ) -> Result<(DVector<f64>, DVector<f64>), ValidationError> {
        Ok((DVector::zeros(self.input_dim), state.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strider_core::ModeSchedule;

    use crate::com_model::{GRAVITY, PointMassComModel};
    use crate::contact::mode;
    use crate::schedule::ModeScheduleManager;
    use crate::state::{INPUT_DIM, STATE_DIM, com_twist, contact_force};

    fn moving_state() -> DVector<f64> {
        DVector::from_fn(STATE_DIM, |i, _| 0.1 * (i as f64 + 1.0))
    }

    fn initializer(schedule: ModeSchedule) -> ComKinoInitializer {
        ComKinoInitializer::new(
            Arc::new(PointMassComModel { total_mass: 12.0 }),
            Arc::new(ModeScheduleManager::new(schedule)),
        )
    }

    #[test]
    fn flight_phase_gives_zero_input_and_zero_twist() {
        let state = moving_state();
        let (input, next_state) = initializer(ModeSchedule::single_mode(mode::FLY))
            .compute(0.0, &state, 0.1)
            .unwrap();
        assert_eq!(input, DVector::zeros(INPUT_DIM));
        assert_eq!(com_twist(&next_state), Vector6::zeros());
        assert_eq!(com_pose(&next_state), com_pose(&state));
        assert_eq!(joint_positions(&next_state), joint_positions(&state));
    }

    #[test]
    fn stance_legs_follow_schedule_time() {
        let schedule = ModeSchedule::new(vec![1.0], vec![mode::STANCE, mode::LF_RH]).unwrap();
        let init = initializer(schedule);
        let level = DVector::zeros(STATE_DIM);

        let (before, _) = init.compute(0.5, &level, 0.6).unwrap();
        assert_relative_eq!(contact_force(&before, 1).z, 12.0 * GRAVITY / 4.0, epsilon = 1e-12);

        let (after, _) = init.compute(1.5, &level, 1.6).unwrap();
        assert_relative_eq!(contact_force(&after, 0).z, 12.0 * GRAVITY / 2.0, epsilon = 1e-12);
        assert_relative_eq!(contact_force(&after, 1).norm(), 0.0);
    }

    #[test]
    fn rejects_wrong_state_size() {
        let err = initializer(ModeSchedule::default())
            .compute(0.0, &DVector::zeros(3), 0.1)
            .unwrap_err();
        assert_eq!(err, ValidationError::StateDimMismatch { expected: STATE_DIM, got: 3 });
    }

    #[test]
    fn default_initializer_holds_state() {
        let state = moving_state();
        let (input, next_state) = DefaultInitializer { input_dim: INPUT_DIM }
            .compute(0.0, &state, 1.0)
            .unwrap();
        assert_eq!(input.len(), INPUT_DIM);
        assert!(input.iter().all(|&u| u == 0.0));
        assert_eq!(next_state, state);
    }
}
