//! Condition-dependent setpoint ceiling.

use crate::config::BoundCfg;
use crate::error::ConfigError;

/// Piecewise-linear ceiling over an external condition.
///
/// Holds `max_default` up to `condition_low`, ramps linearly down (or up) to
/// `max_at_high_condition` at `condition_high`, then holds again. The range is
/// checked once here so `evaluate` never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicBound {
    cfg: BoundCfg,
}

impl DynamicBound {
    pub fn new(cfg: BoundCfg) -> Result<Self, ConfigError> {
        for (name, v) in [
            ("min", cfg.min),
            ("max_default", cfg.max_default),
            ("max_at_high_condition", cfg.max_at_high_condition),
            ("condition_low", cfg.condition_low),
            ("condition_high", cfg.condition_high),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if cfg.condition_high <= cfg.condition_low {
            return Err(ConfigError::InvertedConditionRange {
                low: cfg.condition_low,
                high: cfg.condition_high,
            });
        }
        if cfg.min > cfg.max_default {
            return Err(ConfigError::InvertedBounds {
                min: cfg.min,
                max: cfg.max_default,
            });
        }
        if cfg.min > cfg.max_at_high_condition {
            return Err(ConfigError::InvertedBounds {
                min: cfg.min,
                max: cfg.max_at_high_condition,
            });
        }
        Ok(Self { cfg })
    }

    pub fn cfg(&self) -> &BoundCfg {
        &self.cfg
    }

    #[allow(clippy::suboptimal_flops)] // fused multiply-add would round differently
    pub fn evaluate(&self, condition: f64) -> f64 {
        let c = &self.cfg;
        if condition <= c.condition_low {
            c.max_default
        } else if condition >= c.condition_high {
            c.max_at_high_condition
        } else {
            let frac = (condition - c.condition_low) / (c.condition_high - c.condition_low);
            c.max_default - (c.max_default - c.max_at_high_condition) * frac
        }
    }
}

/// Where the controller's upper limit comes from each cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ceiling {
    Fixed(f64),
    Reset(DynamicBound),
}

impl Ceiling {
    /// Upper limit for a cycle observed under `condition`.
    ///
    /// A reset ceiling without a condition (sensor missing or non-finite)
    /// falls back to its default maximum.
    pub fn effective_max(&self, condition: Option<f64>) -> f64 {
        match self {
            Self::Fixed(max) => *max,
            Self::Reset(bound) => match condition.filter(|c| c.is_finite()) {
                Some(c) => bound.evaluate(c),
                None => {
                    tracing::warn!("no usable condition reading; ceiling held at its default");
                    bound.cfg().max_default
                }
            },
        }
    }

    /// Largest value the ceiling can take under any condition.
    pub fn upper(&self) -> f64 {
        match self {
            Self::Fixed(max) => *max,
            Self::Reset(bound) => bound.cfg().max_default.max(bound.cfg().max_at_high_condition),
        }
    }
}
