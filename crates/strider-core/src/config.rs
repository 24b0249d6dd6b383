use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_time_step() -> f64 {
    1e-2
}
const fn default_max_num_steps() -> usize {
    100_000
}
const fn default_true() -> bool {
    true
}
const fn default_min_step_length() -> f64 {
    0.05
}
const fn default_max_step_length() -> f64 {
    1.0
}
const fn default_contraction_rate() -> f64 {
    0.5
}
const fn default_armijo_coefficient() -> f64 {
    1e-4
}

// ---------------------------------------------------------------------------
// IntegratorType
// ---------------------------------------------------------------------------

/// Fixed-step integration scheme used by the rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorType {
    /// Explicit forward Euler.
    Euler,
    /// Explicit midpoint (RK2).
    Midpoint,
    /// Classic 4th order Runge-Kutta.
    #[default]
    RungeKutta4,
}

// ---------------------------------------------------------------------------
// RolloutSettings
// ---------------------------------------------------------------------------

/// Settings for the time-triggered rollout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutSettings {
    /// Nominal integration step in seconds. Each interval between events is
    /// split into `ceil(duration / time_step)` uniform steps.
    #[serde(default = "default_time_step")]
    pub time_step: f64,

    /// Upper bound on the total number of integration steps in one rollout.
    #[serde(default = "default_max_num_steps")]
    pub max_num_steps: usize,

    /// Integration scheme.
    #[serde(default)]
    pub integrator: IntegratorType,

    /// Check every intermediate state for NaN/Inf instead of only the
    /// terminal one. Stops the rollout at the first non-finite sample.
    #[serde(default = "default_true")]
    pub check_numerical_stability: bool,
}

impl Default for RolloutSettings {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            max_num_steps: default_max_num_steps(),
            integrator: IntegratorType::default(),
            check_numerical_stability: true,
        }
    }
}

impl RolloutSettings {
    /// Validate settings. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::invalid(
                "rollout.time_step",
                format!("must be finite and > 0, got {}", self.time_step),
            ));
        }
        if self.max_num_steps == 0 {
            return Err(ConfigError::invalid("rollout.max_num_steps", "must be >= 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LineSearchSettings
// ---------------------------------------------------------------------------

/// Backtracking line-search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSearchSettings {
    /// Smallest step length tried before giving up.
    #[serde(default = "default_min_step_length")]
    pub min_step_length: f64,

    /// First (largest) step length tried.
    #[serde(default = "default_max_step_length")]
    pub max_step_length: f64,

    /// Factor in (0, 1) applied between consecutive candidates.
    #[serde(default = "default_contraction_rate")]
    pub contraction_rate: f64,

    /// Armijo sufficient-decrease coefficient.
    #[serde(default = "default_armijo_coefficient")]
    pub armijo_coefficient: f64,
}

impl Default for LineSearchSettings {
    fn default() -> Self {
        Self {
            min_step_length: default_min_step_length(),
            max_step_length: default_max_step_length(),
            contraction_rate: default_contraction_rate(),
            armijo_coefficient: default_armijo_coefficient(),
        }
    }
}

impl LineSearchSettings {
    /// Validate settings. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_step_length > 0.0 && self.min_step_length.is_finite()) {
            return Err(ConfigError::invalid(
                "line_search.min_step_length",
                format!("must be finite and > 0, got {}", self.min_step_length),
            ));
        }
        if !(self.max_step_length > 0.0 && self.max_step_length <= 1.0) {
            return Err(ConfigError::invalid(
                "line_search.max_step_length",
                format!("must be in (0, 1], got {}", self.max_step_length),
            ));
        }
        if self.min_step_length > self.max_step_length {
            return Err(ConfigError::Incompatible(
                "min_step_length > max_step_length".into(),
            ));
        }
        if !(self.contraction_rate > 0.0 && self.contraction_rate < 1.0) {
            return Err(ConfigError::invalid(
                "line_search.contraction_rate",
                format!("must be in (0, 1), got {}", self.contraction_rate),
            ));
        }
        if self.armijo_coefficient < 0.0 {
            return Err(ConfigError::invalid(
                "line_search.armijo_coefficient",
                "must be >= 0",
            ));
        }
        Ok(())
    }

    /// Candidate step lengths, largest first:
    /// `max, max·ρ, max·ρ², …` while `>= min_step_length`.
    pub fn step_lengths(&self) -> Vec<f64> {
        let mut steps = vec![self.max_step_length];
        let mut alpha = self.max_step_length * self.contraction_rate;
        while self.contraction_rate < 1.0 && alpha >= self.min_step_length && alpha > 0.0 {
            steps.push(alpha);
            alpha *= self.contraction_rate;
        }
        steps
    }
}

// ---------------------------------------------------------------------------
// StriderConfig
// ---------------------------------------------------------------------------

/// Solver-side configuration loaded from TOML.
///
/// ```toml
/// [rollout]
/// time_step = 0.005
/// integrator = "runge_kutta4"
///
/// [line_search]
/// min_step_length = 0.1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StriderConfig {
    #[serde(default)]
    pub rollout: RolloutSettings,

    #[serde(default)]
    pub line_search: LineSearchSettings,
}

impl StriderConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rollout.validate()?;
        self.line_search.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        StriderConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = StriderConfig::from_toml_str("").unwrap();
        assert_eq!(config, StriderConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = StriderConfig::from_toml_str(
            r#"
            [rollout]
            time_step = 0.005
            integrator = "euler"
            check_numerical_stability = false

            [line_search]
            contraction_rate = 0.25
            "#,
        )
        .unwrap();
        assert_relative_eq!(config.rollout.time_step, 0.005);
        assert_eq!(config.rollout.integrator, IntegratorType::Euler);
        assert!(!config.rollout.check_numerical_stability);
        assert_eq!(config.rollout.max_num_steps, 100_000);
        assert_relative_eq!(config.line_search.contraction_rate, 0.25);
    }

    #[test]
    fn rejects_non_positive_time_step() {
        let err = StriderConfig::from_toml_str("[rollout]\ntime_step = 0.0").unwrap_err();
        assert!(err.to_string().contains("rollout.time_step"));
    }

    #[test]
    fn rejects_inverted_step_bounds() {
        let settings = LineSearchSettings {
            min_step_length: 0.8,
            max_step_length: 0.5,
            ..LineSearchSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Incompatible(_))
        ));
    }

    #[test]
    fn rejects_unknown_integrator() {
        let err = StriderConfig::from_toml_str("[rollout]\nintegrator = \"leapfrog\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = StriderConfig::from_file("/nonexistent/strider.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn step_lengths_contract_geometrically() {
        let settings = LineSearchSettings {
            min_step_length: 0.1,
            max_step_length: 1.0,
            contraction_rate: 0.5,
            armijo_coefficient: 1e-4,
        };
        let steps = settings.step_lengths();
        assert_eq!(steps.len(), 4);
        assert_relative_eq!(steps[0], 1.0);
        assert_relative_eq!(steps[3], 0.125);
    }

    #[test]
    fn step_lengths_single_candidate_when_bounds_meet() {
        let settings = LineSearchSettings {
            min_step_length: 0.5,
            max_step_length: 0.5,
            ..LineSearchSettings::default()
        };
        assert_eq!(settings.step_lengths(), vec![0.5]);
    }
}
