//! Runtime configuration types for the engine.
//!
//! These are the validated-at-construction structs the components consume.
//! They are separate from the TOML-deserialized config in `setpoint_config`.

use std::time::Duration;

/// Trim-and-respond step policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimRespondCfg {
    /// Signed adjustment applied when nothing requests (e.g. -0.02 in. WC).
    pub trim_step: f64,
    /// Signed adjustment per request, opposite sign to `trim_step`.
    pub respond_step: f64,
    /// Largest magnitude a single cycle may move the setpoint.
    pub max_step: f64,
    /// Number of highest readings excluded before counting requests.
    pub ignore_count: usize,
    /// A remaining reading at or above this value is a request.
    pub high_threshold: f64,
}

impl Default for TrimRespondCfg {
    fn default() -> Self {
        Self {
            trim_step: -0.02,
            respond_step: 0.06,
            max_step: 0.15,
            ignore_count: 2,
            high_threshold: 0.85,
        }
    }
}

/// Setpoint limits with an optional condition-dependent ceiling.
///
/// The ceiling is `max_default` at or below `condition_low`,
/// `max_at_high_condition` at or above `condition_high`, and linear between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundCfg {
    pub min: f64,
    pub max_default: f64,
    pub max_at_high_condition: f64,
    pub condition_low: f64,
    pub condition_high: f64,
}

/// Start-time model limits and smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorCfg {
    /// Smoothing weight in (0, 1].
    pub forgetting_factor: f64,
    /// Latest allowed start (minutes before occupancy).
    pub low_minutes: f64,
    /// Earliest allowed start (minutes before occupancy).
    pub high_minutes: f64,
    /// Learn only from the most recent N observations of a batch.
    pub max_history: Option<usize>,
}

impl Default for EstimatorCfg {
    fn default() -> Self {
        Self {
            forgetting_factor: 0.1,
            low_minutes: 10.0,
            high_minutes: 180.0,
            max_history: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationCfg {
    /// Returned (clamped) when there is no usable history.
    pub default_minutes: f64,
    pub low_minutes: f64,
    pub high_minutes: f64,
}

impl Default for InterpolationCfg {
    fn default() -> Self {
        Self {
            default_minutes: 60.0,
            low_minutes: 10.0,
            high_minutes: 180.0,
        }
    }
}

/// Pacing for `scheduler::ControlLoop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleCfg {
    pub interval: Duration,
    pub initial_delay: Duration,
    /// Stop after this many cycles; `None` runs until stopped.
    pub max_cycles: Option<u64>,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(120),
            initial_delay: Duration::from_secs(300),
            max_cycles: None,
        }
    }
}
