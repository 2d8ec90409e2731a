//! Conversions from `setpoint_config` file types to runtime types.
//!
//! Loop sections go through `TryFrom` because the file form can hold values
//! the engine rejects (negative ignore count, inverted reset range).

use std::time::Duration;

use crate::config::{EstimatorCfg, InterpolationCfg, ScheduleCfg, TrimRespondCfg};
use crate::controller::TrimRespondController;
use crate::error::ConfigError;
use crate::estimator::{Coefficients, CurrentConditions, HistoricalObservation};

// ── Trim and respond ─────────────────────────────────────────────────────────

impl TryFrom<&setpoint_config::LoopCfg> for TrimRespondCfg {
    type Error = ConfigError;

    fn try_from(c: &setpoint_config::LoopCfg) -> Result<Self, Self::Error> {
        let ignore_count =
            usize::try_from(c.ignore_count).map_err(|_| ConfigError::NegativeIgnoreCount(c.ignore_count))?;
        Ok(Self {
            trim_step: c.trim,
            respond_step: c.respond,
            max_step: c.max_step,
            ignore_count,
            high_threshold: c.high_threshold,
        })
    }
}

/// Builds an inactive controller; the driver activates it after the
/// configured initial delay.
impl TryFrom<&setpoint_config::LoopCfg> for TrimRespondController {
    type Error = ConfigError;

    fn try_from(c: &setpoint_config::LoopCfg) -> Result<Self, Self::Error> {
        let mut b = Self::builder()
            .with_cfg(TrimRespondCfg::try_from(c)?)
            .with_limits(c.min, c.max)
            .with_initial(c.initial);
        if let Some(r) = &c.reset {
            b = b.with_reset(r.max_at_high_condition, r.condition_low, r.condition_high);
        }
        b.build_typed()
    }
}

// ── Scheduling ───────────────────────────────────────────────────────────────

impl From<&setpoint_config::ScheduleCfg> for ScheduleCfg {
    fn from(c: &setpoint_config::ScheduleCfg) -> Self {
        Self {
            interval: Duration::from_millis(c.interval_ms),
            initial_delay: Duration::from_millis(c.initial_delay_ms),
            max_cycles: None,
        }
    }
}

// ── Optimal start ────────────────────────────────────────────────────────────

impl From<&setpoint_config::ObservationRow> for HistoricalObservation {
    fn from(r: &setpoint_config::ObservationRow) -> Self {
        Self {
            zone_temp: r.zone_temp,
            outdoor_temp: r.outdoor_temp,
            duration_min: r.duration_min,
        }
    }
}

impl From<&setpoint_config::OptimalStartCfg> for EstimatorCfg {
    fn from(c: &setpoint_config::OptimalStartCfg) -> Self {
        Self {
            forgetting_factor: c.forgetting_factor,
            low_minutes: c.late_start_limit_min,
            high_minutes: c.early_start_limit_min,
            max_history: c.max_history,
        }
    }
}

impl From<&setpoint_config::OptimalStartCfg> for InterpolationCfg {
    fn from(c: &setpoint_config::OptimalStartCfg) -> Self {
        Self {
            default_minutes: c.default_minutes,
            low_minutes: c.late_start_limit_min,
            high_minutes: c.early_start_limit_min,
        }
    }
}

impl From<&setpoint_config::OptimalStartCfg> for Coefficients {
    fn from(c: &setpoint_config::OptimalStartCfg) -> Self {
        Self {
            a: c.initial_a,
            b: c.initial_b,
            d: c.initial_d,
        }
    }
}

/// Today's conditions against the configured occupied setpoint.
pub fn current_conditions(
    c: &setpoint_config::OptimalStartCfg,
    zone_temp: f64,
    outdoor_temp: f64,
) -> CurrentConditions {
    CurrentConditions {
        zone_temp,
        outdoor_temp,
        occupied_setpoint: c.occupied_setpoint,
    }
}
