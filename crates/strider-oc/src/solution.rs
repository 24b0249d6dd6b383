//! Primal and dual solution containers.

use nalgebra::DVector;
use strider_core::{ModeSchedule, ValidationError};
use strider_penalty::MultiplierCollection;

// ---------------------------------------------------------------------------
// PrimalSolution
// ---------------------------------------------------------------------------

/// Time, state and input trajectories of one rollout.
///
/// `post_event_indices[i]` is the sample holding the post-jump state of the
/// `i`-th event inside the rollout window; the sample just before it is the
/// pre-jump state at the same time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimalSolution {
    pub time_trajectory: Vec<f64>,
    pub state_trajectory: Vec<DVector<f64>>,
    pub input_trajectory: Vec<DVector<f64>>,
    pub post_event_indices: Vec<usize>,
    pub mode_schedule: ModeSchedule,
}

impl PrimalSolution {
    /// Drop all trajectory data, keeping allocations.
    pub fn clear(&mut self) {
        self.time_trajectory.clear();
        self.state_trajectory.clear();
        self.input_trajectory.clear();
        self.post_event_indices.clear();
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time_trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_trajectory.is_empty()
    }

    pub fn final_time(&self) -> Option<f64> {
        self.time_trajectory.last().copied()
    }

    pub fn final_state(&self) -> Option<&DVector<f64>> {
        self.state_trajectory.last()
    }

    pub(crate) fn push(&mut self, t: f64, x: DVector<f64>, u: DVector<f64>) {
        self.time_trajectory.push(t);
        self.state_trajectory.push(x);
        self.input_trajectory.push(u);
    }

    /// Check trajectory lengths and the post-event index invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let n = self.time_trajectory.len();
        if self.state_trajectory.len() != n || self.input_trajectory.len() != n {
            return Err(ValidationError::TrajectoryLengthMismatch {
                times: n,
                states: self.state_trajectory.len(),
                inputs: self.input_trajectory.len(),
            });
        }
        let last = n.saturating_sub(1);
        let mut previous = 0;
        for &index in &self.post_event_indices {
            if index == 0 || index > last || index <= previous {
                return Err(ValidationError::PostEventIndexOutOfRange { index, last });
            }
            previous = index;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DualSolution
// ---------------------------------------------------------------------------

/// Multipliers index-aligned with a [`PrimalSolution`]: one collection per
/// sample, one per event, and one for the final time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DualSolution {
    pub final_: MultiplierCollection,
    pub pre_jumps: Vec<MultiplierCollection>,
    pub intermediates: Vec<MultiplierCollection>,
}

impl DualSolution {
    /// Empty multiplier collections shaped like `primal`.
    ///
    /// Valid for problems without augmented-Lagrangian terms.
    pub fn empty_like(primal: &PrimalSolution) -> Self {
        Self {
            final_: MultiplierCollection::default(),
            pre_jumps: vec![MultiplierCollection::default(); primal.post_event_indices.len()],
            intermediates: vec![MultiplierCollection::default(); primal.len()],
        }
    }

    /// Check that the partition lengths match `primal`.
    pub fn validate_against(&self, primal: &PrimalSolution) -> Result<(), ValidationError> {
        if self.intermediates.len() != primal.len() {
            return Err(ValidationError::DualLengthMismatch {
                partition: "intermediates",
                expected: primal.len(),
                got: self.intermediates.len(),
            });
        }
        if self.pre_jumps.len() != primal.post_event_indices.len() {
            return Err(ValidationError::DualLengthMismatch {
                partition: "pre_jumps",
                expected: primal.post_event_indices.len(),
                got: self.pre_jumps.len(),
            });
        }
        Ok(())
    }
}
