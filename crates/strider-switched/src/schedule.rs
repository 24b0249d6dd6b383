//! Shared, replaceable mode schedule queried for contact flags.

use std::sync::{PoisonError, RwLock};

use strider_core::{ModeSchedule, ValidationError};
use tracing::debug;

use crate::contact::{ContactFlags, mode_number_to_contact_flags};

/// Source of the contact configuration at a given time.
pub trait ContactSchedule: Send + Sync {
    fn contact_flags(&self, time: f64) -> Result<ContactFlags, ValidationError>;
}

/// Holds the current [`ModeSchedule`] behind a lock so a planner can swap it
/// while initializers read it. Share via `Arc`.
#[derive(Debug, Default)]
pub struct ModeScheduleManager {
    schedule: RwLock<ModeSchedule>,
}

impl ModeScheduleManager {
    pub fn new(schedule: ModeSchedule) -> Self {
        Self {
            schedule: RwLock::new(schedule),
        }
    }

    /// Snapshot of the current schedule.
    pub fn mode_schedule(&self) -> ModeSchedule {
        self.schedule.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_mode_schedule(&self, schedule: ModeSchedule) {
        debug!(events = schedule.num_events(), "mode schedule replaced");
        *self.schedule.write().unwrap_or_else(PoisonError::into_inner) = schedule;
    }

    pub fn mode_at_time(&self, time: f64) -> usize {
        self.schedule
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .mode_at_time(time)
    }
}

impl ContactSchedule for ModeScheduleManager {
    fn contact_flags(&self, time: f64) -> Result<ContactFlags, ValidationError> {
        mode_number_to_contact_flags(self.mode_at_time(time))
    }
}
