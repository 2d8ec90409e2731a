//! Nearest-history start-time estimate.
//!
//! No learned state: the two recorded warm-ups closest to today's conditions
//! (L1 distance over outdoor and zone temperature) are blended by inverse
//! distance.

use crate::config::InterpolationCfg;
use crate::error::ConfigError;
use crate::estimator::HistoricalObservation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHistoryEstimator {
    cfg: InterpolationCfg,
}

impl NearestHistoryEstimator {
    pub fn new(cfg: InterpolationCfg) -> Result<Self, ConfigError> {
        for (name, v) in [
            ("default minutes", cfg.default_minutes),
            ("late start limit", cfg.low_minutes),
            ("early start limit", cfg.high_minutes),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if cfg.low_minutes > cfg.high_minutes {
            return Err(ConfigError::InvertedStartLimits {
                low: cfg.low_minutes,
                high: cfg.high_minutes,
            });
        }
        Ok(Self { cfg })
    }

    pub fn cfg(&self) -> &InterpolationCfg {
        &self.cfg
    }

    /// Minutes before occupancy, clamped to the start limits.
    ///
    /// Observations with non-finite fields are ignored.
    pub fn estimate(&self, history: &[HistoricalObservation], zone_temp: f64, outdoor_temp: f64) -> f64 {
        let mut ranked: Vec<(f64, f64)> = history
            .iter()
            .filter(|o| {
                o.zone_temp.is_finite() && o.outdoor_temp.is_finite() && o.duration_min.is_finite()
            })
            .map(|o| {
                let distance = (outdoor_temp - o.outdoor_temp).abs() + (zone_temp - o.zone_temp).abs();
                (distance, o.duration_min)
            })
            .filter(|(distance, _)| distance.is_finite())
            .collect();
        ranked.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.total_cmp(&y.1)));

        let minutes = match ranked.as_slice() {
            [] => self.cfg.default_minutes,
            [(_, only)] => *only,
            [(d1, m1), (d2, m2), ..] => {
                let w1 = if *d1 == 0.0 { 1.0 } else { 1.0 / d1 };
                let w2 = if *d2 == 0.0 { 1.0 } else { 1.0 / d2 };
                ((m1 * w1 + m2 * w2) / (w1 + w2)).round_ties_even()
            }
        };
        tracing::debug!(candidates = ranked.len(), minutes, "interpolated start");
        self.cfg.low_minutes.max(minutes.min(self.cfg.high_minutes))
    }
}
