use thiserror::Error;

/// Top-level error type for strider.
#[derive(Debug, Error)]
pub enum StriderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rollout error: {0}")]
    Rollout(#[from] RolloutError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Incompatible configuration: {0}")]
    Incompatible(String),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// Rollout failures.
///
/// [`Diverged`](Self::Diverged) is fatal for the current iterate: the caller
/// must discard the trajectory and pick another step or controller.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RolloutError {
    #[error("System became unstable during the rollout: non-finite state at t = {time}")]
    Diverged { time: f64 },

    #[error("Invalid time window: [{start}, {end}]")]
    InvalidTimeWindow { start: f64, end: f64 },

    #[error("Rollout exceeded {max_steps} integration steps at t = {time}")]
    MaxStepsExceeded { max_steps: usize, time: f64 },

    #[error("Rollout input rejected: {0}")]
    Validation(#[from] ValidationError),
}

/// Shape and precondition violations between trajectories, duals,
/// controllers and states.
///
/// Copy + static messages for cheap propagation in hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("State dimension mismatch: expected {expected}, got {got}")]
    StateDimMismatch { expected: usize, got: usize },

    #[error("Input dimension mismatch: expected {expected}, got {got}")]
    InputDimMismatch { expected: usize, got: usize },

    #[error("Trajectory length mismatch: {times} times, {states} states, {inputs} inputs")]
    TrajectoryLengthMismatch {
        times: usize,
        states: usize,
        inputs: usize,
    },

    #[error("Dual solution mismatch for {partition}: expected {expected}, got {got}")]
    DualLengthMismatch {
        partition: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Controller arrays mismatch: {stamps} stamps, {gains} gains, {biases} biases")]
    ControllerLengthMismatch {
        stamps: usize,
        gains: usize,
        biases: usize,
    },

    #[error("Post-event index {index} outside [1, {last}]")]
    PostEventIndexOutOfRange { index: usize, last: usize },

    #[error("Mode schedule needs one more mode than event times: {events} events, {modes} modes")]
    ModeCountMismatch { events: usize, modes: usize },

    #[error("Event times are not sorted at position {position}")]
    UnsortedEventTimes { position: usize },

    #[error("Time stamps are not non-decreasing at position {position}")]
    UnsortedTimeStamps { position: usize },

    #[error("Mode number {mode} does not encode a contact configuration")]
    InvalidModeNumber { mode: usize },
}
