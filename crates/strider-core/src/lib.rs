// strider-core: errors, config, schedules, quadrature and collaborator traits
// for the strider hybrid optimal-control core.

pub mod config;
pub mod error;
pub mod integration;
pub mod traits;
pub mod types;

pub use config::{IntegratorType, LineSearchSettings, RolloutSettings, StriderConfig};
pub use error::{ConfigError, RolloutError, StriderError, ValidationError};
pub use integration::{trapezoidal_integration, trapezoidal_integration_by};
pub use traits::{
    Controller, StateConstraint, StateCost, StateInputConstraint, StateInputCost, SystemDynamics,
};
pub use types::{ModeSchedule, TimeWindow};
