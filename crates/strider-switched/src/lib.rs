//! Switched-model pieces for a four-legged robot: com-kino state layout,
//! contact flags, the shared mode schedule and solver initializers.

pub mod com_model;
pub mod contact;
pub mod initializer;
pub mod schedule;
pub mod state;

pub use com_model::{ComModel, GRAVITY, PointMassComModel, weight_compensating_input};
pub use contact::{
    ContactFlags, contact_flags_to_mode_number, mode, mode_number_to_contact_flags, num_stance_legs,
};
pub use initializer::{ComKinoInitializer, DefaultInitializer, Initializer};
pub use schedule::{ContactSchedule, ModeScheduleManager};
pub use state::{INPUT_DIM, STATE_DIM};
