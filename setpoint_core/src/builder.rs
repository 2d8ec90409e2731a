//! Builder for `TrimRespondController`.
//!
//! Every setter is optional at the type level; `try_build()` reports what is
//! missing or inconsistent as a typed `ConfigError` wrapped in `eyre::Report`.

use crate::bound::{Ceiling, DynamicBound};
use crate::config::{BoundCfg, TrimRespondCfg};
use crate::controller::{ControlState, TrimRespondController};
use crate::error::{ConfigError, Result};
use crate::request::RequestCounter;

#[derive(Debug, Clone, Copy)]
struct ResetParts {
    max_at_high_condition: f64,
    condition_low: f64,
    condition_high: f64,
}

#[derive(Debug, Default, Clone)]
pub struct ControllerBuilder {
    cfg: Option<TrimRespondCfg>,
    limits: Option<(f64, f64)>,
    reset: Option<ResetParts>,
    initial: Option<f64>,
    active: bool,
}

impl ControllerBuilder {
    /// Step policy. Defaults to the duct static pressure policy.
    pub fn with_cfg(mut self, cfg: TrimRespondCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }

    /// `max` is the fixed ceiling, or the default ceiling once a reset is set.
    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        self.limits = Some((min, max));
        self
    }

    /// Make the ceiling fall from `max` to `max_at_high_condition` as the
    /// condition rises from `condition_low` to `condition_high`.
    pub fn with_reset(mut self, max_at_high_condition: f64, condition_low: f64, condition_high: f64) -> Self {
        self.reset = Some(ResetParts {
            max_at_high_condition,
            condition_low,
            condition_high,
        });
        self
    }

    pub fn with_initial(mut self, setpoint: f64) -> Self {
        self.initial = Some(setpoint);
        self
    }

    /// Start already active instead of waiting for `activate()`.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn try_build(self) -> Result<TrimRespondController> {
        self.build_typed().map_err(eyre::Report::new)
    }

    pub(crate) fn build_typed(self) -> std::result::Result<TrimRespondController, ConfigError> {
        let cfg = self.cfg.unwrap_or_default();
        let (min, max) = self.limits.ok_or(ConfigError::Missing("setpoint limits"))?;
        let initial = self.initial.ok_or(ConfigError::Missing("initial setpoint"))?;

        for (name, v) in [
            ("trim step", cfg.trim_step),
            ("respond step", cfg.respond_step),
            ("max step", cfg.max_step),
            ("high threshold", cfg.high_threshold),
            ("min", min),
            ("max", max),
            ("initial setpoint", initial),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if cfg.max_step < 0.0 {
            return Err(ConfigError::NegativeStepLimit(cfg.max_step));
        }
        if min > max {
            return Err(ConfigError::InvertedBounds { min, max });
        }
        if initial < min || initial > max {
            return Err(ConfigError::InitialOutOfBounds { initial, min, max });
        }

        let ceiling = match self.reset {
            None => Ceiling::Fixed(max),
            Some(r) => Ceiling::Reset(DynamicBound::new(BoundCfg {
                min,
                max_default: max,
                max_at_high_condition: r.max_at_high_condition,
                condition_low: r.condition_low,
                condition_high: r.condition_high,
            })?),
        };

        Ok(TrimRespondController {
            state: ControlState {
                current_setpoint: initial,
                active: self.active,
            },
            cfg,
            min,
            ceiling,
            counter: RequestCounter::new(cfg.ignore_count, cfg.high_threshold),
        })
    }
}
