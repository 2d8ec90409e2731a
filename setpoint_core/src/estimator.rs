//! Adaptive linear optimal-start estimator.
//!
//! The model predicts warm-up minutes as
//! `a·(Tsp − Tz) + (b·(Tsp − Tz)·(Tsp − To))/b + d`. After each observed
//! warm-up the implied coefficients are computed and blended into the running
//! ones with first-order smoothing, so recent days dominate without forgetting
//! older ones outright.
//!
//! The `/b` terms cancel algebraically. They are kept in literal form because
//! they are exactly where the model degenerates (`b == 0`), and that case is
//! reported as [`DegenerateInput::ZeroOutdoorCoefficient`] rather than hidden.

use crate::config::EstimatorCfg;
use crate::error::{ConfigError, DegenerateInput};

/// Smoothed model coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Minutes per degree of zone deficit.
    pub a: f64,
    /// Outdoor-temperature influence.
    pub b: f64,
    /// Constant offset in minutes.
    pub d: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            a: 10.0,
            b: 5.0,
            d: 0.0,
        }
    }
}

impl Coefficients {
    fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.d.is_finite()
    }
}

/// One recorded warm-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalObservation {
    pub zone_temp: f64,
    pub outdoor_temp: f64,
    pub duration_min: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentConditions {
    pub zone_temp: f64,
    pub outdoor_temp: f64,
    pub occupied_setpoint: f64,
}

/// Smoothing weight, guaranteed to lie in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForgettingFactor(f64);

impl ForgettingFactor {
    pub fn new(v: f64) -> Result<Self, ConfigError> {
        if v > 0.0 && v <= 1.0 {
            Ok(Self(v))
        } else {
            Err(ConfigError::ForgettingFactorOutOfRange(v))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Result of learning from one batch of observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSummary {
    /// Observations blended into the coefficients.
    pub applied: usize,
    /// Index into the supplied batch and why that observation was skipped.
    pub skipped: Vec<(usize, DegenerateInput)>,
    /// Older observations left out by the history window.
    pub windowed: usize,
    /// Coefficients after each applied observation, in order.
    pub trace: Vec<Coefficients>,
}

/// Coefficients implied by a single observation.
pub fn observation_coefficients(
    obs: &HistoricalObservation,
    occupied_setpoint: f64,
) -> Result<Coefficients, DegenerateInput> {
    for (name, v) in [
        ("zone_temp", obs.zone_temp),
        ("outdoor_temp", obs.outdoor_temp),
        ("duration_min", obs.duration_min),
        ("occupied_setpoint", occupied_setpoint),
    ] {
        if !v.is_finite() {
            return Err(DegenerateInput::NonFinite(name));
        }
    }
    let dz = occupied_setpoint - obs.zone_temp;
    let d_out = occupied_setpoint - obs.outdoor_temp;
    if dz == 0.0 {
        return Err(DegenerateInput::SetpointEqualsZoneTemp(occupied_setpoint));
    }
    if d_out == 0.0 {
        return Err(DegenerateInput::SetpointEqualsOutdoorTemp(occupied_setpoint));
    }

    let t = obs.duration_min;
    let a = (t / dz).abs();
    let b = (t / (dz * d_out)).abs();
    if b == 0.0 {
        return Err(DegenerateInput::ZeroOutdoorCoefficient);
    }
    let d = t - (a * dz + b * dz * d_out / b);

    let c = Coefficients { a, b, d };
    if c.is_finite() {
        Ok(c)
    } else {
        Err(DegenerateInput::NonFinite("observation coefficients"))
    }
}

/// `coef + ff·(new − coef)` for each coefficient, rounded step by step.
#[allow(clippy::suboptimal_flops)]
pub fn smooth(current: Coefficients, new: Coefficients, ff: ForgettingFactor) -> Coefficients {
    let f = ff.get();
    Coefficients {
        a: current.a + f * (new.a - current.a),
        b: current.b + f * (new.b - current.b),
        d: current.d + f * (new.d - current.d),
    }
}

/// Single forward pass over `history`, in order.
///
/// A degenerate observation is skipped and reported; the state only ever
/// holds finite values.
pub fn update_parameters(
    state: &mut Coefficients,
    history: &[HistoricalObservation],
    occupied_setpoint: f64,
    ff: ForgettingFactor,
) -> UpdateSummary {
    let mut summary = UpdateSummary::default();
    for (idx, obs) in history.iter().enumerate() {
        let next = observation_coefficients(obs, occupied_setpoint)
            .map(|new| smooth(*state, new, ff))
            .and_then(|next| {
                if next.is_finite() {
                    Ok(next)
                } else {
                    Err(DegenerateInput::NonFinite("smoothed coefficients"))
                }
            });
        match next {
            Ok(next) => {
                *state = next;
                summary.applied += 1;
                summary.trace.push(next);
            }
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "observation skipped");
                summary.skipped.push((idx, e));
            }
        }
    }
    summary
}

/// Predicted warm-up minutes, clamped to `[low_minutes, high_minutes]`.
///
/// An infinite raw prediction clamps like any other; NaN and `b == 0` are
/// errors.
pub fn estimate(
    state: &Coefficients,
    conditions: &CurrentConditions,
    low_minutes: f64,
    high_minutes: f64,
) -> Result<f64, DegenerateInput> {
    for (name, v) in [
        ("zone_temp", conditions.zone_temp),
        ("outdoor_temp", conditions.outdoor_temp),
        ("occupied_setpoint", conditions.occupied_setpoint),
    ] {
        if !v.is_finite() {
            return Err(DegenerateInput::NonFinite(name));
        }
    }
    if state.b == 0.0 {
        return Err(DegenerateInput::ZeroOutdoorCoefficient);
    }
    let dz = conditions.occupied_setpoint - conditions.zone_temp;
    let d_out = conditions.occupied_setpoint - conditions.outdoor_temp;
    let raw = state.a * dz + (state.b * dz * d_out) / state.b + state.d;
    if raw.is_nan() {
        return Err(DegenerateInput::NonFinite("estimate"));
    }
    Ok(low_minutes.max(raw.min(high_minutes)))
}

/// Coefficients plus the limits and smoothing they are learned under.
#[derive(Debug, Clone)]
pub struct AdaptiveLinearEstimator {
    cfg: EstimatorCfg,
    ff: ForgettingFactor,
    coefficients: Coefficients,
}

impl AdaptiveLinearEstimator {
    pub fn new(cfg: EstimatorCfg, initial: Coefficients) -> Result<Self, ConfigError> {
        let ff = ForgettingFactor::new(cfg.forgetting_factor)?;
        if !cfg.low_minutes.is_finite() {
            return Err(ConfigError::NonFinite("late start limit"));
        }
        if !cfg.high_minutes.is_finite() {
            return Err(ConfigError::NonFinite("early start limit"));
        }
        if cfg.low_minutes > cfg.high_minutes {
            return Err(ConfigError::InvertedStartLimits {
                low: cfg.low_minutes,
                high: cfg.high_minutes,
            });
        }
        if !initial.is_finite() {
            return Err(ConfigError::NonFinite("initial coefficients"));
        }
        Ok(Self {
            cfg,
            ff,
            coefficients: initial,
        })
    }

    pub fn cfg(&self) -> &EstimatorCfg {
        &self.cfg
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    /// Learn from `history`. With a window configured only the most recent
    /// observations (the tail of the slice) are used.
    pub fn update(
        &mut self,
        history: &[HistoricalObservation],
        occupied_setpoint: f64,
    ) -> UpdateSummary {
        let windowed = self
            .cfg
            .max_history
            .map_or(0, |n| history.len().saturating_sub(n));
        let recent = &history[windowed..];
        let mut summary =
            update_parameters(&mut self.coefficients, recent, occupied_setpoint, self.ff);
        for (idx, _) in &mut summary.skipped {
            *idx += windowed;
        }
        summary.windowed = windowed;
        tracing::debug!(
            applied = summary.applied,
            skipped = summary.skipped.len(),
            windowed,
            a = self.coefficients.a,
            b = self.coefficients.b,
            d = self.coefficients.d,
            "coefficients updated"
        );
        summary
    }

    pub fn estimate(&self, conditions: &CurrentConditions) -> Result<f64, DegenerateInput> {
        estimate(
            &self.coefficients,
            conditions,
            self.cfg.low_minutes,
            self.cfg.high_minutes,
        )
    }
}
