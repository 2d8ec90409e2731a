//! Optimal-start estimate from a warm-up history file.

use std::path::Path;

use eyre::WrapErr;
use setpoint_core::conversions::current_conditions;
use setpoint_core::error::Result;
use setpoint_core::{
    AdaptiveLinearEstimator, Coefficients, EstimatorCfg, HistoricalObservation, InterpolationCfg,
    NearestHistoryEstimator, ResetError,
};

use crate::cli::StartMethod;
use crate::error_fmt::{CONFIG_CONTEXT, SOURCE_CONTEXT};

pub struct StartRequest<'a> {
    pub history: &'a Path,
    pub zone_temp: f64,
    pub outdoor_temp: f64,
    pub occupied_setpoint: Option<f64>,
    pub method: StartMethod,
    pub occupancy: Option<chrono::NaiveTime>,
}

const MINUTES_PER_DAY: f64 = 1_440.0;

/// `occupancy` minus `minutes`, wrapping past midnight.
///
/// Whole days are dropped first; they do not move a wall-clock time.
pub fn start_time(occupancy: chrono::NaiveTime, minutes: f64) -> Result<chrono::NaiveTime> {
    if !minutes.is_finite() {
        eyre::bail!("start offset of {minutes} min is not finite");
    }
    #[allow(clippy::cast_possible_truncation)]
    let secs = (minutes.rem_euclid(MINUTES_PER_DAY) * 60.0).round() as i64;
    let offset = chrono::TimeDelta::try_seconds(secs)
        .ok_or_else(|| eyre::eyre!("start offset of {secs} s is out of range"))?;
    Ok(occupancy - offset)
}

pub fn run_optimal_start(
    cfg: &setpoint_config::OptimalStartCfg,
    req: &StartRequest<'_>,
    json: bool,
) -> Result<()> {
    let rows = setpoint_config::load_history_csv(req.history).wrap_err(SOURCE_CONTEXT)?;
    let history: Vec<HistoricalObservation> = rows.iter().map(HistoricalObservation::from).collect();

    let mut os_cfg = cfg.clone();
    if let Some(tsp) = req.occupied_setpoint {
        os_cfg.occupied_setpoint = tsp;
    }
    let conditions = current_conditions(&os_cfg, req.zone_temp, req.outdoor_temp);

    let mut out = serde_json::json!({
        "method": match req.method {
            StartMethod::Model => "model",
            StartMethod::Interpolate => "interpolate",
        },
        "observations": history.len(),
    });
    let minutes = match req.method {
        StartMethod::Model => {
            let mut est =
                AdaptiveLinearEstimator::new(EstimatorCfg::from(&os_cfg), Coefficients::from(&os_cfg))
                    .map_err(eyre::Report::new)
                    .wrap_err(CONFIG_CONTEXT)?;
            let summary = est.update(&history, conditions.occupied_setpoint);
            for (idx, reason) in &summary.skipped {
                tracing::warn!(row = idx + 2, %reason, "history row not learned from");
            }
            let minutes = est
                .estimate(&conditions)
                .map_err(ResetError::from)
                .map_err(eyre::Report::new)?;
            let c = est.coefficients();
            out["applied"] = summary.applied.into();
            out["skipped"] = summary.skipped.len().into();
            out["windowed"] = summary.windowed.into();
            out["coefficients"] = serde_json::json!({ "a": c.a, "b": c.b, "d": c.d });
            if !json {
                println!(
                    "learned from {} of {} observations ({} skipped, {} outside window): a={:.3} b={:.4} d={:.2}",
                    summary.applied,
                    history.len(),
                    summary.skipped.len(),
                    summary.windowed,
                    c.a,
                    c.b,
                    c.d
                );
            }
            minutes
        }
        StartMethod::Interpolate => {
            let est = NearestHistoryEstimator::new(InterpolationCfg::from(&os_cfg))
                .map_err(eyre::Report::new)
                .wrap_err(CONFIG_CONTEXT)?;
            est.estimate(&history, req.zone_temp, req.outdoor_temp)
        }
    };

    out["minutes"] = minutes.into();
    let start = req
        .occupancy
        .map(|occ| start_time(occ, minutes))
        .transpose()?;
    if let Some(s) = start {
        out["start"] = s.format("%H:%M").to_string().into();
    }

    if json {
        println!("{out}");
    } else {
        println!("optimal start: {minutes:.1} min before occupancy");
        if let (Some(occ), Some(s)) = (req.occupancy, start) {
            println!("start at {} for occupancy at {}", s.format("%H:%M"), occ.format("%H:%M"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn start_time_subtracts_minutes() {
        let occ = NaiveTime::from_hms_opt(6, 30, 0).expect("time");
        assert_eq!(
            start_time(occ, 96.0).expect("start"),
            NaiveTime::from_hms_opt(4, 54, 0).expect("time")
        );
    }

    #[test]
    fn start_time_wraps_midnight() {
        let occ = NaiveTime::from_hms_opt(0, 30, 0).expect("time");
        assert_eq!(
            start_time(occ, 60.0).expect("start"),
            NaiveTime::from_hms_opt(23, 30, 0).expect("time")
        );
    }

    #[test]
    fn whole_days_do_not_move_the_start() {
        let occ = NaiveTime::from_hms_opt(6, 30, 0).expect("time");
        assert_eq!(
            start_time(occ, 96.0 + 3.0 * 1_440.0).expect("start"),
            start_time(occ, 96.0).expect("start")
        );
    }

    #[test]
    fn huge_offsets_do_not_overflow() {
        let occ = NaiveTime::from_hms_opt(6, 30, 0).expect("time");
        assert!(start_time(occ, 1e20).is_ok());
        assert!(start_time(occ, f64::MAX).is_ok());
        assert!(start_time(occ, f64::NAN).is_err());
        assert!(start_time(occ, f64::INFINITY).is_err());
    }
}
