//! Com-kino state and input layout of a four-legged robot.
//!
//! ```text
//! state  = [orientation(3), position(3), angular velocity(3), linear velocity(3), joint positions(12)]
//! input  = [contact forces(4 × 3), joint velocities(12)]
//! ```
//!
//! Orientation is XYZ Euler angles of the base in the world frame; twist and
//! contact forces are expressed in the base frame.

use nalgebra::{DVector, Vector3, Vector6};
use strider_core::ValidationError;

pub const NUM_CONTACT_POINTS: usize = 4;
pub const JOINT_COORDINATE_SIZE: usize = 12;
pub const BASE_COORDINATE_SIZE: usize = 6;
pub const STATE_DIM: usize = 2 * BASE_COORDINATE_SIZE + JOINT_COORDINATE_SIZE;
pub const INPUT_DIM: usize = 3 * NUM_CONTACT_POINTS + JOINT_COORDINATE_SIZE;

const POSE_OFFSET: usize = 0;
const TWIST_OFFSET: usize = BASE_COORDINATE_SIZE;
const JOINT_OFFSET: usize = 2 * BASE_COORDINATE_SIZE;

/// Reject vectors that are not full com-kino states.
pub fn check_state(state: &DVector<f64>) -> Result<(), ValidationError> {
    if state.len() == STATE_DIM {
        Ok(())
    } else {
        Err(ValidationError::StateDimMismatch {
            expected: STATE_DIM,
            got: state.len(),
        })
    }
}

/// `[orientation, position]`.
///
/// # Panics
///
/// Panics if `state` is shorter than [`STATE_DIM`].
pub fn com_pose(state: &DVector<f64>) -> Vector6<f64> {
    state.fixed_rows::<BASE_COORDINATE_SIZE>(POSE_OFFSET).into_owned()
}

/// `[angular velocity, linear velocity]` in the base frame.
pub fn com_twist(state: &DVector<f64>) -> Vector6<f64> {
    state.fixed_rows::<BASE_COORDINATE_SIZE>(TWIST_OFFSET).into_owned()
}

pub fn orientation(pose: &Vector6<f64>) -> Vector3<f64> {
    pose.fixed_rows::<3>(0).into_owned()
}

pub fn position(pose: &Vector6<f64>) -> Vector3<f64> {
    pose.fixed_rows::<3>(3).into_owned()
}

pub fn joint_positions(state: &DVector<f64>) -> DVector<f64> {
    state.rows(JOINT_OFFSET, JOINT_COORDINATE_SIZE).into_owned()
}

/// Assemble a state from its parts.
pub fn compose_state(pose: &Vector6<f64>, twist: &Vector6<f64>, joints: &DVector<f64>) -> DVector<f64> {
    let mut state = DVector::zeros(STATE_DIM);
    state.fixed_rows_mut::<BASE_COORDINATE_SIZE>(POSE_OFFSET).copy_from(pose);
    state.fixed_rows_mut::<BASE_COORDINATE_SIZE>(TWIST_OFFSET).copy_from(twist);
    state.rows_mut(JOINT_OFFSET, JOINT_COORDINATE_SIZE).copy_from(joints);
    state
}

/// Contact force of leg `leg` inside an input vector.
pub fn contact_force(input: &DVector<f64>, leg: usize) -> Vector3<f64> {
    input.fixed_rows::<3>(3 * leg).into_owned()
}
