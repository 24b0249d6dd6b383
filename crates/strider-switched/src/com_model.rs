//! Center-of-mass model and the weight-compensating input.

use nalgebra::{DVector, Rotation3, Vector3};

use crate::contact::{ContactFlags, num_stance_legs};
use crate::state::INPUT_DIM;

/// Standard gravity, world `-z`.
pub const GRAVITY: f64 = 9.81;

/// Mass properties of the robot's floating base.
pub trait ComModel: Send + Sync {
    fn total_mass(&self) -> f64;
}

/// Robot described only by its total mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMassComModel {
    pub total_mass: f64,
}

impl ComModel for PointMassComModel {
    fn total_mass(&self) -> f64 {
        self.total_mass
    }
}

/// Contact forces that carry the robot's weight evenly on the stance legs.
///
/// Forces are expressed in the base frame for the XYZ Euler `orientation`.
/// Joint velocities are zero. With no leg in contact the input is all zeros.
pub fn weight_compensating_input(
    com_model: &dyn ComModel,
    contact_flags: &ContactFlags,
    orientation: &Vector3<f64>,
) -> DVector<f64> {
    let mut input = DVector::zeros(INPUT_DIM);
    let stance_legs = num_stance_legs(contact_flags);
    if stance_legs == 0 {
        return input;
    }

    #[allow(clippy::cast_precision_loss)]
    let force_in_world = Vector3::new(0.0, 0.0, com_model.total_mass() * GRAVITY / stance_legs as f64);
    let base_to_world = Rotation3::from_euler_angles(orientation.x, orientation.y, orientation.z);
    let force_in_base = base_to_world.inverse() * force_in_world;

    for (leg, _) in contact_flags.iter().enumerate().filter(|&(_, &in_contact)| in_contact) {
        input.fixed_rows_mut::<3>(3 * leg).copy_from(&force_in_base);
    }
    input
}
