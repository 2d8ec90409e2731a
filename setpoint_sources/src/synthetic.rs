use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use setpoint_traits::{ReadingSource, Snapshot};

use crate::error::{Result, SourceError};

/// Half-open `[low, high)` range; `low == high` always yields `low`.
///
/// The width `high - low` must itself be finite, otherwise uniform sampling
/// is undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if low <= high && (high - low).is_finite() {
            Ok(Self { low, high })
        } else {
            Err(SourceError::InvalidRange { low, high })
        }
    }

    fn draw(self, rng: &mut StdRng) -> f64 {
        if self.high > self.low {
            rng.random_range(self.low..self.high)
        } else {
            self.low
        }
    }
}

/// Simulated terminal units with independent uniform readings every cycle.
pub struct SyntheticSource {
    rng: StdRng,
    devices: usize,
    readings: Range,
    condition: Option<Range>,
}

impl SyntheticSource {
    pub fn new(devices: usize, readings: Range, condition: Option<Range>) -> Self {
        Self::with_seed(devices, readings, condition, rand::random())
    }

    /// Same seed, same sequence of snapshots.
    pub fn with_seed(devices: usize, readings: Range, condition: Option<Range>, seed: u64) -> Self {
        tracing::debug!(devices, seed, "synthetic source");
        Self {
            rng: StdRng::seed_from_u64(seed),
            devices,
            readings,
            condition,
        }
    }
}

impl ReadingSource for SyntheticSource {
    fn sample(&mut self) -> std::result::Result<Snapshot, Box<dyn std::error::Error + Send + Sync>> {
        let readings = (0..self.devices)
            .map(|_| self.readings.draw(&mut self.rng))
            .collect();
        let condition = self.condition.map(|c| c.draw(&mut self.rng));
        Ok(Snapshot { readings, condition })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_stay_in_range() {
        let mut s = SyntheticSource::with_seed(
            40,
            Range::new(0.3, 0.95).expect("range"),
            Some(Range::new(55.0, 75.0).expect("range")),
            7,
        );
        for _ in 0..50 {
            let snap = s.sample().expect("sample");
            assert_eq!(snap.readings.len(), 40);
            assert!(snap.readings.iter().all(|r| (0.3..0.95).contains(r)));
            let c = snap.condition.expect("condition");
            assert!((55.0..75.0).contains(&c));
        }
    }

    #[test]
    fn degenerate_range_is_constant() {
        let mut s = SyntheticSource::with_seed(3, Range::new(1.0, 1.0).expect("range"), None, 1);
        let snap = s.sample().expect("sample");
        assert_eq!(snap.readings, vec![1.0; 3]);
        assert_eq!(snap.condition, None);
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(matches!(
            Range::new(2.0, 1.0),
            Err(SourceError::InvalidRange { .. })
        ));
        assert!(Range::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn overflowing_width_rejected() {
        assert!(matches!(
            Range::new(-1e308, 1e308),
            Err(SourceError::InvalidRange { .. })
        ));
        assert!(Range::new(f64::INFINITY, f64::INFINITY).is_err());
    }
}
