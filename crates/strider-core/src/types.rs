//! Time windows and mode schedules shared by the rollout, metrics and
//! initializer crates.

use serde::{Deserialize, Serialize};

use crate::error::{RolloutError, ValidationError};

// ---------------------------------------------------------------------------
// TimeWindow
// ---------------------------------------------------------------------------

/// Closed time interval `[start, end]` of a rollout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    /// Create a window, rejecting non-finite bounds and `end < start`.
    pub fn new(start: f64, end: f64) -> Result<Self, RolloutError> {
        if !start.is_finite() || !end.is_finite() || end < start {
            return Err(RolloutError::InvalidTimeWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Length of the window in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` lies strictly inside the window.
    pub fn contains_strictly(&self, t: f64) -> bool {
        self.start < t && t < self.end
    }

    /// The `times` lying strictly inside the window, in their given order.
    pub fn interior(self, times: &[f64]) -> impl Iterator<Item = f64> + '_ {
        times.iter().copied().filter(move |&t| self.contains_strictly(t))
    }
}

// ---------------------------------------------------------------------------
// ModeSchedule
// ---------------------------------------------------------------------------

/// Discrete mode sequence bracketed by event times.
///
/// `mode_sequence[i]` is active on `(event_times[i-1], event_times[i]]`, with
/// the first and last modes extending to minus and plus infinity. There is
/// always exactly one more mode than event times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModeSchedule")]
pub struct ModeSchedule {
    event_times: Vec<f64>,
    mode_sequence: Vec<usize>,
}

#[derive(Deserialize)]
struct RawModeSchedule {
    event_times: Vec<f64>,
    mode_sequence: Vec<usize>,
}

impl TryFrom<RawModeSchedule> for ModeSchedule {
    type Error = ValidationError;

    fn try_from(raw: RawModeSchedule) -> Result<Self, Self::Error> {
        Self::new(raw.event_times, raw.mode_sequence)
    }
}

impl Default for ModeSchedule {
    /// A single mode `0` with no events.
    fn default() -> Self {
        Self {
            event_times: Vec::new(),
            mode_sequence: vec![0],
        }
    }
}

impl ModeSchedule {
    /// Build a schedule from sorted event times and `event_times.len() + 1`
    /// mode labels.
    pub fn new(event_times: Vec<f64>, mode_sequence: Vec<usize>) -> Result<Self, ValidationError> {
        if mode_sequence.len() != event_times.len() + 1 {
            return Err(ValidationError::ModeCountMismatch {
                events: event_times.len(),
                modes: mode_sequence.len(),
            });
        }
        if let Some(position) = event_times.iter().position(|t| !t.is_finite()) {
            return Err(ValidationError::UnsortedEventTimes { position });
        }
        if let Some(position) = event_times.windows(2).position(|w| w[1] < w[0]) {
            return Err(ValidationError::UnsortedEventTimes {
                position: position + 1,
            });
        }
        Ok(Self {
            event_times,
            mode_sequence,
        })
    }

    /// A schedule that stays in `mode` forever.
    pub fn single_mode(mode: usize) -> Self {
        Self {
            event_times: Vec::new(),
            mode_sequence: vec![mode],
        }
    }

    /// Event times in increasing order.
    pub fn event_times(&self) -> &[f64] {
        &self.event_times
    }

    /// Mode labels, one more than event times.
    pub fn mode_sequence(&self) -> &[usize] {
        &self.mode_sequence
    }

    /// Number of events.
    pub fn num_events(&self) -> usize {
        self.event_times.len()
    }

    /// Mode active at `time`. At an event time exactly, the mode before the
    /// switch is returned.
    pub fn mode_at_time(&self, time: f64) -> usize {
        let index = self.event_times.partition_point(|&e| e < time);
        self.mode_sequence[index]
    }

    /// Event times strictly inside `window`, in increasing order.
    pub fn events_in(&self, window: &TimeWindow) -> Vec<f64> {
        window.interior(&self.event_times).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_window_rejects_inverted_bounds() {
        assert!(matches!(
            TimeWindow::new(1.0, 0.5),
            Err(RolloutError::InvalidTimeWindow { .. })
        ));
        assert!(TimeWindow::new(0.0, f64::NAN).is_err());
        let w = TimeWindow::new(0.5, 0.5).unwrap();
        assert!(w.duration().abs() < 1e-15);
    }

    #[test]
    fn mode_schedule_requires_one_more_mode() {
        let err = ModeSchedule::new(vec![0.5], vec![1]).unwrap_err();
        assert_eq!(err, ValidationError::ModeCountMismatch { events: 1, modes: 1 });
    }

    #[test]
    fn mode_schedule_rejects_unsorted_events() {
        let err = ModeSchedule::new(vec![0.5, 0.2], vec![0, 1, 2]).unwrap_err();
        assert_eq!(err, ValidationError::UnsortedEventTimes { position: 1 });
    }

    #[test]
    fn mode_at_time_uses_mode_before_event() {
        let schedule = ModeSchedule::new(vec![0.3, 0.6], vec![15, 9, 6]).unwrap();
        assert_eq!(schedule.mode_at_time(0.0), 15);
        assert_eq!(schedule.mode_at_time(0.3), 15);
        assert_eq!(schedule.mode_at_time(0.31), 9);
        assert_eq!(schedule.mode_at_time(0.6), 9);
        assert_eq!(schedule.mode_at_time(5.0), 6);
        assert_eq!(schedule.mode_at_time(-5.0), 15);
    }

    #[test]
    fn events_in_excludes_window_bounds() {
        let schedule = ModeSchedule::new(vec![0.0, 0.4, 1.0, 1.5], vec![0, 1, 2, 3, 4]).unwrap();
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        assert_eq!(schedule.events_in(&window), vec![0.4]);
    }

    #[test]
    fn interior_keeps_order_and_duplicates() {
        let window = TimeWindow::new(0.0, 1.0).unwrap();
        let times: Vec<f64> = window.interior(&[0.7, 1.0, 0.2, 0.2, -0.1]).collect();
        assert_eq!(times, vec![0.7, 0.2, 0.2]);
    }

    #[test]
    fn default_is_single_mode() {
        let schedule = ModeSchedule::default();
        assert_eq!(schedule.num_events(), 0);
        assert_eq!(schedule.mode_at_time(3.0), 0);
        assert_eq!(ModeSchedule::single_mode(15).mode_at_time(0.0), 15);
    }
}
