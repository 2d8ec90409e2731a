//! Request counting over one cycle's terminal-unit readings.
//!
//! Readings are ranked highest first and the top `ignore_count` are set aside
//! so that a few permanently starved (or miscalibrated) units cannot pin the
//! plant setpoint at its limit. Whatever remains at or above `high_threshold`
//! counts as a request.

/// Outcome of ranking one population.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestTally {
    /// The excluded top readings, highest first.
    pub ignored: Vec<f64>,
    /// Highest reading that was not ignored; `None` when nothing remains.
    pub max_remaining: Option<f64>,
    /// Remaining readings `>= high_threshold`.
    pub request_count: usize,
    /// Non-finite readings dropped before ranking.
    pub discarded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestCounter {
    ignore_count: usize,
    high_threshold: f64,
}

impl RequestCounter {
    pub fn new(ignore_count: usize, high_threshold: f64) -> Self {
        Self {
            ignore_count,
            high_threshold,
        }
    }

    pub fn ignore_count(&self) -> usize {
        self.ignore_count
    }

    pub fn high_threshold(&self) -> f64 {
        self.high_threshold
    }

    pub fn count(&self, readings: &[f64]) -> RequestTally {
        count_requests(readings, self.ignore_count, self.high_threshold)
    }
}

/// Rank `readings`, drop the top `ignore_count`, count the rest against
/// `high_threshold` (inclusive).
///
/// Equal values may land on either side of the ignore cut; only how many
/// values sit above it matters, not which device they came from.
pub fn count_requests(readings: &[f64], ignore_count: usize, high_threshold: f64) -> RequestTally {
    let mut ranked: Vec<f64> = readings.iter().copied().filter(|r| r.is_finite()).collect();
    let discarded = readings.len() - ranked.len();
    ranked.sort_unstable_by(|a, b| b.total_cmp(a));

    let cut = ignore_count.min(ranked.len());
    let (ignored, remaining) = ranked.split_at(cut);

    // Sorted descending, so the first remaining value is the maximum.
    let max_remaining = remaining.first().copied();
    let request_count = remaining.iter().filter(|&&r| r >= high_threshold).count();

    RequestTally {
        ignored: ignored.to_vec(),
        max_remaining,
        request_count,
        discarded,
    }
}
