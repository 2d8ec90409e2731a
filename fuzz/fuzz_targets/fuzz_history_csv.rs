#![no_main]
use libfuzzer_sys::fuzz_target;
use setpoint_core::{
    AdaptiveLinearEstimator, Coefficients, CurrentConditions, EstimatorCfg, HistoricalObservation,
};

fuzz_target!(|data: &[u8]| {
    // Any accepted history must leave the estimator finite and bounded.
    let Ok(rows) = setpoint_config::read_history_from(data) else {
        return;
    };
    let history: Vec<HistoricalObservation> = rows.iter().map(HistoricalObservation::from).collect();
    let Ok(mut est) = AdaptiveLinearEstimator::new(EstimatorCfg::default(), Coefficients::default()) else {
        return;
    };
    est.update(&history, 70.0);
    let c = est.coefficients();
    assert!(c.a.is_finite() && c.b.is_finite() && c.d.is_finite());
    if let Ok(m) = est.estimate(&CurrentConditions {
        zone_temp: 50.0,
        outdoor_temp: 10.0,
        occupied_setpoint: 70.0,
    }) {
        assert!((10.0..=180.0).contains(&m));
    }
});
