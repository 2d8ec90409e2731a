//! The trim-and-respond setpoint controller.
//!
//! One cycle: count requests among the readings, look up the ceiling for the
//! cycle's condition, move the setpoint by a single bounded step and clamp it
//! into `[min, effective_max]`. Pressure and temperature loops are the same
//! controller with different step signs and ceilings.

use setpoint_traits::Snapshot;

use crate::bound::Ceiling;
use crate::config::TrimRespondCfg;
use crate::request::RequestCounter;
use crate::status::{CycleReport, CycleStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub current_setpoint: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    /// Also used for a zero adjustment.
    Decrease,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentResult {
    pub previous_setpoint: f64,
    pub new_setpoint: f64,
    /// Step after the magnitude cap, before clamping to the bounds.
    pub adjustment: f64,
    pub direction: Direction,
}

/// Apply one trim-or-respond step to `state` and return what happened.
///
/// The step is capped at `cfg.max_step` in either direction, then the result
/// is clamped to `[min, effective_max]`. If the ceiling has dropped below the
/// current setpoint the clamp wins, so that single cycle may move further
/// than `max_step`. When `min > effective_max`, `min` wins.
pub fn apply_step(
    state: &mut ControlState,
    request_count: usize,
    cfg: &TrimRespondCfg,
    min: f64,
    effective_max: f64,
) -> AdjustmentResult {
    #[allow(clippy::cast_precision_loss)]
    let raw = if request_count == 0 {
        cfg.trim_step
    } else {
        cfg.respond_step * request_count as f64
    };
    let adjustment = if raw > 0.0 {
        raw.min(cfg.max_step)
    } else if raw < 0.0 {
        raw.max(-cfg.max_step)
    } else {
        raw
    };

    let previous_setpoint = state.current_setpoint;
    let new_setpoint = (previous_setpoint + adjustment).min(effective_max).max(min);
    let direction = if adjustment > 0.0 {
        Direction::Increase
    } else {
        Direction::Decrease
    };

    state.current_setpoint = new_setpoint;
    AdjustmentResult {
        previous_setpoint,
        new_setpoint,
        adjustment,
        direction,
    }
}

/// A configured loop. Build with [`crate::ControllerBuilder`] or from a
/// `setpoint_config::LoopCfg` via `TryFrom`.
#[derive(Debug, Clone)]
pub struct TrimRespondController {
    pub(crate) state: ControlState,
    pub(crate) cfg: TrimRespondCfg,
    pub(crate) min: f64,
    pub(crate) ceiling: Ceiling,
    pub(crate) counter: RequestCounter,
}

impl TrimRespondController {
    pub fn builder() -> crate::builder::ControllerBuilder {
        crate::builder::ControllerBuilder::default()
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn setpoint(&self) -> f64 {
        self.state.current_setpoint
    }

    pub fn cfg(&self) -> &TrimRespondCfg {
        &self.cfg
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn ceiling(&self) -> &Ceiling {
        &self.ceiling
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn activate(&mut self) {
        if !self.state.active {
            tracing::info!(
                setpoint = self.state.current_setpoint,
                ignore_count = self.counter.ignore_count(),
                high_threshold = self.counter.high_threshold(),
                "controller activated"
            );
        }
        self.state.active = true;
    }

    pub fn deactivate(&mut self) {
        if self.state.active {
            tracing::info!(setpoint = self.state.current_setpoint, "controller deactivated");
        }
        self.state.active = false;
    }

    pub fn effective_max(&self, condition: Option<f64>) -> f64 {
        self.ceiling.effective_max(condition)
    }

    /// Step with an externally computed request count and ceiling.
    pub fn step(&mut self, request_count: usize, effective_max: f64) -> AdjustmentResult {
        apply_step(
            &mut self.state,
            request_count,
            &self.cfg,
            self.min,
            effective_max,
        )
    }

    /// Run a full cycle over one snapshot. Inactive controllers do nothing.
    pub fn cycle(&mut self, snapshot: &Snapshot) -> CycleStatus {
        if !self.state.active {
            return CycleStatus::Idle;
        }
        let tally = self.counter.count(&snapshot.readings);
        if tally.discarded > 0 {
            tracing::warn!(discarded = tally.discarded, "non-finite readings dropped");
        }
        let effective_max = self.ceiling.effective_max(snapshot.condition);
        let adjustment = self.step(tally.request_count, effective_max);
        tracing::debug!(
            requests = tally.request_count,
            ignored = ?tally.ignored,
            max_remaining = ?tally.max_remaining,
            condition = ?snapshot.condition,
            effective_max,
            setpoint = adjustment.new_setpoint,
            direction = %adjustment.direction,
            "cycle"
        );
        CycleStatus::Adjusted(CycleReport {
            tally,
            condition: snapshot.condition,
            effective_max,
            adjustment,
        })
    }
}
